//! Static single-page-application server.
//!
//! Serves files from a site root and answers every path that is not an
//! existing file with the root's `index.html`, so client-side routers can
//! handle deep links.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{AppState, Config};
pub use error::{ConfigError, Error, Result};
pub use handler::StaticResolver;
