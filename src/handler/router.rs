//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, path
//! resolution, file serving and access logging.

use crate::config::AppState;
use crate::handler::resolver::{Miss, ResolutionKind};
use crate::handler::static_files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let path = req.uri().path();

    let (mut response, fallback) = match check_http_method(method, state.config.http.enable_cors)
    {
        Some(resp) => (resp, false),
        None => {
            let ctx = RequestContext {
                path,
                is_head: *method == Method::HEAD,
                range_header: req
                    .headers()
                    .get("range")
                    .and_then(|v| v.to_str().ok())
                    .map(ToString::to_string),
            };
            serve_path(&ctx, &state).await
        }
    };

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.config.logging.access_log {
        log_access(&req, &response, peer_addr, started, fallback, &state);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            tracing::warn!("Method not allowed: {method}");
            Some(http::build_405_response())
        }
    }
}

/// Resolve the request path and serve the result.
///
/// Returns the response and whether the fallback document answered it.
async fn serve_path(ctx: &RequestContext<'_>, state: &AppState) -> (Response<ResponseBody>, bool) {
    let resolution = match state.resolver.resolve(ctx.path).await {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::error!("Failed to resolve '{}': {e}", ctx.path);
            return (http::build_500_response(), false);
        }
    };

    match resolution.kind() {
        ResolutionKind::Fallback(Miss::Traversal) => {
            tracing::warn!("Path traversal attempt contained: {}", ctx.path);
        }
        kind if state.config.logging.debug => {
            tracing::debug!(
                path = ctx.path,
                resolved = %resolution.path().display(),
                ?kind,
                "Resolved request"
            );
        }
        _ => {}
    }

    match static_files::serve_resolved(ctx, &resolution).await {
        Ok(resp) => (resp, resolution.is_fallback()),
        Err(e) => {
            tracing::error!(
                "Failed to serve '{}' for '{}': {e}",
                resolution.path().display(),
                ctx.path
            );
            (http::build_500_response(), false)
        }
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
    fallback: bool,
    state: &AppState,
) {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format_version(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = if *req.method() == Method::HEAD {
        0
    } else {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    };
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry.fallback = fallback;

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn format_version(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_09 {
        "0.9"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use http_body_util::BodyExt;
    use hyper::header::{ACCEPT_RANGES, ALLOW, CONTENT_RANGE, CONTENT_TYPE};
    use hyper::StatusCode;
    use std::fs;
    use tempfile::TempDir;

    const INDEX: &str = "<!doctype html><div id=app></div>";
    const LOGO: &[u8] = b"\x89PNG\r\n\x1a\nlogo-bytes";

    fn state() -> (TempDir, Arc<AppState>) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dist");
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::write(root.join("index.html"), INDEX).unwrap();
        fs::write(root.join("assets/logo.png"), LOGO).unwrap();

        let overrides = Overrides {
            root: Some(root),
            ..Overrides::default()
        };
        let missing = tmp.path().join("none.toml");
        let mut config = Config::load_from(missing.to_str().unwrap(), &overrides).unwrap();
        config.logging.access_log = false;
        (tmp, Arc::new(AppState::new(config).unwrap()))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> (Response<ResponseBody>, Vec<u8>) {
        let resp = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let (parts, body) = resp.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes().to_vec();
        (Response::from_parts(parts, http::body::empty()), bytes)
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_existing_asset_is_served() {
        let (_tmp, state) = state();
        let (resp, body) = send(&state, get("/assets/logo.png")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/png");
        assert_eq!(resp.headers()[CONTENT_LENGTH], LOGO.len().to_string().as_str());
        assert_eq!(resp.headers()[ACCEPT_RANGES], "bytes");
        assert_eq!(resp.headers()[SERVER], "spa-serve");
        assert_eq!(body, LOGO);
    }

    #[tokio::test]
    async fn test_virtual_route_gets_index() {
        let (_tmp, state) = state();
        for uri in ["/", "/dashboard/settings", "/assets", "/../secret.txt", "/x?y=1"] {
            let (resp, body) = send(&state, get(uri)).await;
            assert_eq!(resp.status(), StatusCode::OK, "uri {uri}");
            assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
            assert_eq!(body, INDEX.as_bytes(), "uri {uri}");
        }
    }

    #[tokio::test]
    async fn test_head_has_headers_only() {
        let (_tmp, state) = state();
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/assets/logo.png")
            .body(())
            .unwrap();
        let (resp, body) = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], LOGO.len().to_string().as_str());
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_are_rejected() {
        let (_tmp, state) = state();
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let req = Request::builder()
                .method(method.clone())
                .uri("/assets/logo.png")
                .body(())
                .unwrap();
            let (resp, _) = send(&state, req).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(resp.headers()[ALLOW], "GET, HEAD, OPTIONS");
        }
    }

    #[tokio::test]
    async fn test_options() {
        let (_tmp, state) = state();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/anything")
            .body(())
            .unwrap();
        let (resp, body) = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_range_request() {
        let (_tmp, state) = state();
        let req = Request::builder()
            .uri("/assets/logo.png")
            .header("range", "bytes=0-3")
            .body(())
            .unwrap();
        let (resp, body) = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            resp.headers()[CONTENT_RANGE],
            format!("bytes 0-3/{}", LOGO.len()).as_str()
        );
        assert_eq!(body, &LOGO[..4]);

        let req = Request::builder()
            .uri("/assets/logo.png")
            .header("range", "bytes=9999-")
            .body(())
            .unwrap();
        let (resp, _) = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn test_vanished_index_is_server_error() {
        let (_tmp, state) = state();
        fs::remove_file(state.resolver.index()).unwrap();
        let (resp, _) = send(&state, get("/dashboard")).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // Other files are unaffected
        let (resp, body) = send(&state, get("/assets/logo.png")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body, LOGO);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_server_error() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, state) = state();
        let locked = state.resolver.root().join("locked.js");
        fs::write(&locked, "secret()").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits, nothing to observe in that case
        if fs::read(&locked).is_ok() {
            return;
        }
        let (resp, _) = send(&state, get("/locked.js")).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
