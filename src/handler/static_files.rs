//! Static file serving module
//!
//! Opens a resolved file and builds a streamed response with content type
//! and Range support.

use crate::handler::resolver::Resolution;
use crate::handler::router::RequestContext;
use crate::http::body::{empty, FileBody, ResponseBody};
use crate::http::range::RangeParseResult;
use crate::http::{self, mime, response};
use hyper::Response;
use std::io;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, SeekFrom};

/// Serve the file a request resolved to.
///
/// The resolver already checked the file, but it may have vanished or become
/// unreadable since; such failures are returned to the caller.
pub async fn serve_resolved(
    ctx: &RequestContext<'_>,
    resolution: &Resolution,
) -> io::Result<Response<ResponseBody>> {
    let path = resolution.path();
    let mut file = File::open(path).await?;
    let meta = file.metadata().await?;
    if !meta.is_file() {
        return Err(io::Error::other(format!(
            "'{}' is no longer a regular file",
            path.display()
        )));
    }

    let total_size = meta.len();
    let content_type = mime::content_type_for(path);

    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeParseResult::Valid(range) => {
            let start = range.start;
            let end = range.end_position(total_size);
            let body = if ctx.is_head {
                empty()
            } else {
                file.seek(SeekFrom::Start(start)).await?;
                FileBody::new(file, range.content_length(total_size)).boxed()
            };
            Ok(response::build_partial_response(
                body,
                &content_type,
                start,
                end,
                total_size,
            ))
        }
        RangeParseResult::NotSatisfiable => Ok(http::build_416_response(total_size)),
        RangeParseResult::None => {
            let body = if ctx.is_head {
                empty()
            } else {
                FileBody::new(file, total_size).boxed()
            };
            Ok(response::build_file_response(body, &content_type, total_size))
        }
    }
}
