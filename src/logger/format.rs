//! Access log format module
//!
//! One line per terminal response, in one of:
//! - `plain` (human readable, includes the error reason)
//! - `common` (Common Log Format - CLF)
//! - `json` (structured)

use crate::config::AccessLogFormat;
use chrono::Local;
use std::net::SocketAddr;

/// Access log entry for one request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client address, if the transport knows it
    pub remote_addr: Option<SocketAddr>,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    pub status: u16,
    /// Declared response body size; `None` when nothing is sent
    pub body_bytes: Option<u64>,
    /// Client-facing reason for error responses
    pub reason: Option<&'static str>,
    /// Time until the response head was ready, in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: Option<SocketAddr>, method: &str, path: &str) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method: method.to_string(),
            path: path.to_string(),
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: None,
            reason: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Plain => self.format_plain(),
            AccessLogFormat::Common => self.format_common(),
            AccessLogFormat::Json => self.format_json(),
        }
    }

    fn remote(&self) -> String {
        self.remote_addr
            .map_or_else(|| "-".to_string(), |addr| addr.ip().to_string())
    }

    fn format_plain(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let millis = self.request_time_us as f64 / 1000.0;
        let mut line = format!(
            "{} {} {} -> {} ({} bytes, {millis:.3}ms)",
            self.remote(),
            self.method,
            self.path,
            self.status,
            self.body_bytes.unwrap_or(0),
        );
        if let Some(reason) = self.reason {
            line.push_str(&format!(" reason: {reason}"));
        }
        line
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote(),
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.http_version,
            self.status,
            self.body_bytes
                .map_or_else(|| "-".to_string(), |b| b.to_string()),
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr.map(|a| a.ip().to_string()),
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "reason": self.reason,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}
