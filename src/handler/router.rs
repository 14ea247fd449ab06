//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: logs the request, resolves the path
//! against the mount registry and dispatches to the static file responder. Every
//! failure becomes exactly one error response here.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::static_files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::routing::MountRegistry;
use hyper::header::CONTENT_LENGTH;
use hyper::{Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub directory_listing: bool,
    pub request_logging: bool,
}

/// Main entry point for HTTP request handling.
///
/// The method is ignored and the request body is never read: only the URI path
/// routes.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();
    let path = parts.uri.path();

    let ctx = RequestContext {
        path,
        directory_listing: state.directory_listing(),
        request_logging: state.request_logging(),
    };
    if ctx.request_logging {
        logger::log_request(&parts.method, path);
    }

    let mut reason = None;
    let response = match route_request(&ctx, &state.registry).await {
        Ok(response) => response,
        Err(err) => {
            if ctx.request_logging {
                logger::log_error_response(path, err.status(), &err);
            }
            reason = Some(err.reason());
            http::build_error_response(&err)
        }
    };

    if ctx.request_logging {
        let mut entry = AccessLogEntry::new(peer_addr, parts.method.as_str(), path);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        entry.reason = reason;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, state.access_log_format());
    }

    Ok(response)
}

/// Resolve the mount, then hand off to the file responder
async fn route_request(
    ctx: &RequestContext<'_>,
    registry: &MountRegistry,
) -> Result<Response<ResponseBody>, ServeError> {
    let mount = registry.resolve(ctx.path)?;
    static_files::serve(ctx, &mount).await
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MountMode};
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
    use hyper::StatusCode;
    use std::path::Path;

    fn app_state(folders: Vec<String>, listing: bool, mode: MountMode) -> Arc<AppState> {
        let mut cfg = Config::with_folders(folders);
        cfg.directory_listing = listing;
        cfg.request_logging = true;
        cfg.mount_mode = mode;
        Arc::new(AppState::new(&cfg))
    }

    fn mapping(prefix: &str, dir: &Path) -> String {
        format!("{prefix}:{}", dir.display())
    }

    async fn get(state: &Arc<AppState>, path: &str) -> (StatusCode, hyper::HeaderMap, Vec<u8>) {
        request(state, "GET", path).await
    }

    async fn request(
        state: &Arc<AppState>,
        method: &str,
        path: &str,
    ) -> (StatusCode, hyper::HeaderMap, Vec<u8>) {
        let req = Request::builder().method(method).uri(path).body(()).unwrap();
        let resp = handle_request(req, Arc::clone(state), None).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_download_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let contents: Vec<u8> = (0..120u8).collect();
        std::fs::write(dir.path().join("readme.txt"), &contents).unwrap();
        let state = app_state(vec![mapping("docs", dir.path())], false, MountMode::Nested);

        let (status, headers, body) = get(&state, "/docs/readme.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "120");
        assert_eq!(headers[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(
            headers[CONTENT_DISPOSITION],
            "attachment; filename=\"readme.txt\""
        );
        assert_eq!(headers[http::response::X_FILE_SIZE], "120");
        assert_eq!(body, contents);
    }

    #[tokio::test]
    async fn test_missing_file_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(vec![mapping("docs", dir.path())], false, MountMode::Nested);

        let (status, headers, body) = get(&state, "/docs/missing.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(body, b"Error 404: File not accessible");
    }

    #[tokio::test]
    async fn test_no_matching_mount() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(vec![mapping("docs", dir.path())], true, MountMode::Nested);

        for path in ["/other/readme.txt", "/", "/doc"] {
            let (status, _, body) = get(&state, path).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, b"Error 404: Resource not found");
        }
    }

    #[tokio::test]
    async fn test_listing_disabled_scenario() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("song.mp3"), b"id3").unwrap();
        let state = app_state(vec![mapping("media", dir.path())], false, MountMode::Nested);

        let (status, _, body) = get(&state, "/media/").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, b"Error 403: Directory listing is disabled.");
    }

    #[tokio::test]
    async fn test_listing_enabled_one_level() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.txt"), b"1").unwrap();
        std::fs::create_dir_all(dir.path().join("sub").join("deeper")).unwrap();
        std::fs::write(dir.path().join("sub").join("two.txt"), b"2").unwrap();
        let state = app_state(vec![mapping("media", dir.path())], true, MountMode::Nested);

        let (status, headers, body) = get(&state, "/media/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_TYPE], "text/html");
        assert_eq!(headers[CONTENT_LENGTH], body.len().to_string().as_str());

        let html = String::from_utf8(body).unwrap();
        assert_eq!(html.matches("<a href=").count(), 2);
        assert!(html.contains("<a href=\"/media/one.txt\">one.txt</a>"));
        assert!(html.contains("<a href=\"/media/sub\">sub</a>"));
        assert!(!html.contains("two.txt"));

        let (status, _, body) = get(&state, "/media/sub").await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.starts_with("Directory: media/sub<br>"));
        assert!(html.contains("<a href=\"/media/sub/two.txt\">two.txt</a>"));
        assert!(html.contains("<a href=\"/media/sub/deeper\">deeper</a>"));
    }

    #[tokio::test]
    async fn test_nested_mount_overrides_parent() {
        let outer = tempfile::tempdir().unwrap();
        let inner = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("file"), b"outer").unwrap();
        std::fs::write(inner.path().join("file"), b"inner").unwrap();
        let state = app_state(
            vec![mapping("a", outer.path()), mapping("a/b", inner.path())],
            false,
            MountMode::Nested,
        );

        let (_, _, body) = get(&state, "/a/b/file").await;
        assert_eq!(body, b"inner");
        let (_, _, body) = get(&state, "/a/file").await;
        assert_eq!(body, b"outer");
    }

    #[tokio::test]
    async fn test_any_method_is_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.bin"), b"\x00\x01").unwrap();
        let state = app_state(vec![mapping("d", dir.path())], false, MountMode::Nested);

        let (status, _, body) = request(&state, "POST", "/d/data.bin").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"\x00\x01");
    }

    #[tokio::test]
    async fn test_query_string_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let state = app_state(vec![mapping("d", dir.path())], false, MountMode::Nested);

        let (status, _, body) = get(&state, "/d/a.txt?download=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"a");
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir(&public).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
        let state = app_state(vec![mapping("pub", &public)], true, MountMode::Nested);

        let (status, _, body) = get(&state, "/pub/../secret.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"Error 404: Resource not found");
    }

    #[tokio::test]
    async fn test_listing_links_resolve() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a b.txt"), b"spaced").unwrap();
        std::fs::write(dir.path().join("caf\u{e9}.txt"), b"accent").unwrap();
        let state = app_state(vec![mapping("d", dir.path())], true, MountMode::Nested);

        let (_, _, body) = get(&state, "/d").await;
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("href=\"/d/a%20b.txt\""));
        assert!(html.contains("href=\"/d/caf%C3%A9.txt\""));

        let (status, _, body) = get(&state, "/d/a%20b.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"spaced");
        let (status, _, body) = get(&state, "/d/caf%C3%A9.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"accent");
    }

    #[tokio::test]
    async fn test_encoded_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir(&public).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
        let state = app_state(vec![mapping("pub", &public)], true, MountMode::Nested);

        for path in ["/pub/%2e%2e/secret.txt", "/pub/x%2F..%2F..%2Fsecret.txt"] {
            let (status, _, body) = get(&state, path).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, b"Error 404: Resource not found");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_regular_file_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let _socket = std::os::unix::net::UnixListener::bind(dir.path().join("pipe")).unwrap();
        let state = app_state(vec![mapping("d", dir.path())], true, MountMode::Nested);

        let (status, headers, body) = get(&state, "/d/pipe").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(body, b"Error 500: File not accessible");
    }

    #[tokio::test]
    async fn test_invalid_mapping_skipped_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.txt"), b"ok").unwrap();
        let state = app_state(
            vec!["bad url!:/x".to_string(), mapping("good", dir.path())],
            false,
            MountMode::Nested,
        );
        assert_eq!(state.registry.len(), 1);

        let (status, _, _) = get(&state, "/bad%20url!/x").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, body) = get(&state, "/good/ok.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_flat_mode_needs_handle_and_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"mp4").unwrap();
        let state = app_state(vec![mapping("media", dir.path())], true, MountMode::Flat);

        let (status, _, body) = get(&state, "/media").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Error 400: Malformed request path");

        let (status, _, body) = get(&state, "/media/clip.mp4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"mp4");
    }
}
