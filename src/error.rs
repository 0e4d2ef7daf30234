//! Error types for spa-serve

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Startup configuration errors. All of them are fatal: the process must not
/// begin accepting connections.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Host/port pair does not form a socket address
    #[error("Invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    /// Site root is missing or cannot be accessed
    #[error("Site root '{}' is not accessible: {source}", .path.display())]
    RootUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Site root exists but is not a directory
    #[error("Site root '{}' is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    /// Index file name is not a single plain file name
    #[error("Invalid index file name '{0}': expected a plain file name")]
    InvalidIndexFile(String),

    /// Fallback document is missing from the site root
    #[error("Fallback document '{}' does not exist or is not a regular file", .0.display())]
    IndexMissing(PathBuf),
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listener could not be created
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Global tracing subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}
