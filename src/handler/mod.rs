//! Request handler module
//!
//! Resolves request paths against the site root and serves the result, with
//! `index.html` answering every path that is not an existing file.

pub mod resolver;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use resolver::{Miss, Resolution, ResolutionKind, StaticResolver};
pub use router::handle_request;
