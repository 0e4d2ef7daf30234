//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Subscriber setup (level filter, stdout/stderr or file targets)
//! - Server lifecycle logging
//! - Access logging with multiple formats

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};
use writer::LogTarget;

/// Tracing target reserved for access log lines
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// Should be called once at application startup. Access lines are written
/// bare to the access target, everything else goes to the error target.
pub fn init(config: &LoggingConfig) -> crate::error::Result<()> {
    let access = LogTarget::open(config.access_log_file.as_deref(), LogTarget::Stdout)?;
    let errors = LogTarget::open(config.error_log_file.as_deref(), LogTarget::Stderr)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let access_layer = fmt::layer()
        .with_writer(access)
        .with_ansi(false)
        .with_level(false)
        .with_target(false)
        .without_time()
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET));

    let app_layer = fmt::layer()
        .with_writer(errors)
        .with_ansi(false)
        .with_filter(filter_fn(|meta| meta.target() != ACCESS_TARGET));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(access_layer)
        .with(app_layer)
        .try_init()?;

    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Listening on: http://{addr}");
    tracing::info!(
        root = %config.site.root.display(),
        index = %config.site.index_file,
        "Serving static site"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
    if let Some(ref path) = config.logging.error_log_file {
        tracing::info!("Error log: {path}");
    }
    if config.logging.debug {
        tracing::info!("Debug mode: per-request resolution logging enabled");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::debug!("Connection closed with error: {err:?}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown_started(in_flight: usize) {
    tracing::info!("Shutdown requested, waiting for {in_flight} connection(s) to finish");
}

pub fn log_shutdown_complete(clean: bool) {
    if clean {
        tracing::info!("All connections closed, server stopped");
    } else {
        tracing::warn!("Shutdown timeout elapsed, dropping remaining connections");
    }
}
