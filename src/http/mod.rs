//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from file
//! resolution.

pub mod body;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::{FileBody, ResponseBody};
pub use range::parse_range_header;
pub use response::{
    build_405_response, build_416_response, build_500_response, build_options_response,
};
