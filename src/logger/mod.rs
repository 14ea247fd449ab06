//! Logger module
//!
//! Thin event helpers on top of `tracing`, so call sites stay one line and every
//! message for a given event reads the same. Includes:
//! - Server lifecycle and mount registration logging
//! - Request logging (gated by `request_logging` at the call site)
//! - Access log lines in several formats

mod format;

pub use format::AccessLogEntry;

use crate::config::{AccessLogFormat, LogFormat, LoggingConfig, MappingSpec};
use crate::error::{MappingError, ServeError};
use hyper::StatusCode;
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Install the global subscriber. `RUST_LOG` takes precedence over `logging.level`.
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), InitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

pub fn log_server_start(addr: &SocketAddr, mounts: usize, listing: bool, logging: bool) {
    tracing::info!(
        "Setting Request Logging: {}.",
        if logging { "on" } else { "off" }
    );
    tracing::info!(
        "Setting Directory Listing: {}.",
        if listing { "on" } else { "off" }
    );
    tracing::info!("HTTP server started on {addr} with {mounts} mount(s)");
}

pub fn log_mount_registered(spec: &MappingSpec) {
    tracing::info!(
        "Serving {} at /{}",
        spec.filesystem_path,
        spec.url_prefix.trim_matches('/')
    );
}

pub fn log_mapping_skipped(err: &MappingError) {
    tracing::warn!("Skipping folder mapping: {err}");
}

pub fn log_request(method: &hyper::Method, path: &str) {
    tracing::info!("Requesting: {method} {path}");
}

pub fn log_resolved(location: &Path) {
    tracing::info!("Resolved Location: {}", location.display());
}

pub fn log_error_response(path: &str, status: StatusCode, err: &ServeError) {
    tracing::info!(
        "Returned Code {} for {path}. Reason: {} ({err})",
        status.as_u16(),
        err.reason()
    );
}

pub fn log_listing_returned(location: &Path, entries: usize) {
    tracing::info!(
        "Returned directory listing of {} ({entries} entries).",
        location.display()
    );
}

pub fn log_file_returned(location: &Path, bytes: u64) {
    tracing::info!(
        "Returned file successfully: {} ({bytes} bytes).",
        location.display()
    );
}

/// The status line is already on the wire, so this is the only trace of the failure
pub fn log_stream_failed(err: &ServeError) {
    tracing::error!("Error reading file: {err}");
}

pub fn log_stream_dropped(location: &Path, sent: u64) {
    tracing::debug!(
        "Client went away after {sent} bytes of {}; file closed",
        location.display()
    );
}

pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("Accepted connection from {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::warn!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_shutdown(active: usize) {
    tracing::info!("Shutdown requested, waiting for {active} connection(s)");
}
