// Server module entry point
// Listener setup, connection serving and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::AppState;
use crate::error::{Error, Result};
use crate::logger;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::start_server_loop;

/// Bind the configured address and serve until SIGINT/SIGTERM
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.get_socket_addr()?;
    let listener = create_listener(addr, state.config.performance.backlog)
        .map_err(|source| Error::Bind { addr, source })?;

    let shutdown = Arc::new(Notify::new());
    signal::start_signal_handler(Arc::clone(&shutdown))?;

    logger::log_server_start(&addr, &state.config);
    start_server_loop(listener, state, shutdown).await;
    Ok(())
}
