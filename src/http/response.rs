//! HTTP response building module
//!
//! Builders for the handful of responses the server produces, decoupled from routing.

use super::body::{full, FileBody, ResponseBody};
use crate::error::ServeError;
use hyper::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

/// Informational size header sent alongside file downloads
pub const X_FILE_SIZE: &str = "x-file-size";

/// Build a plain-text error response: `Error <code>: <reason>`
pub fn build_error_response(err: &ServeError) -> Response<ResponseBody> {
    let status = err.status();
    let body = format!("Error {}: {}", status.as_u16(), err.reason());

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_LENGTH, body.len())
        .body(full(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status, body)
        })
}

/// Build the directory listing response
pub fn build_listing_response(html: String) -> Response<ResponseBody> {
    let content_length = html.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html")
        .header(CONTENT_LENGTH, content_length)
        .body(full(html))
        .unwrap_or_else(|e| {
            log_build_error("listing", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR, "Error 500: Server error")
        })
}

/// Build a download response around a streaming file body.
///
/// `disposition` is validated by the caller, so a bad file name surfaces as a
/// regular error response rather than this builder's fallback.
pub fn build_file_response(
    body: FileBody,
    size: u64,
    disposition: HeaderValue,
) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, size)
        .header(CONTENT_DISPOSITION, disposition)
        .header(X_FILE_SIZE, size)
        .body(body.boxed())
        .unwrap_or_else(|e| {
            log_build_error("file", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR, "Error 500: Server error")
        })
}

fn fallback(status: StatusCode, body: impl Into<hyper::body::Bytes>) -> Response<ResponseBody> {
    let mut response = Response::new(full(body));
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(what: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {what} response: {error}"));
}
