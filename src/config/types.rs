// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    /// Folder mappings as `"<urlPrefix>:<directory>"` entries
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub directory_listing: bool,
    #[serde(default)]
    pub request_logging: bool,
    #[serde(default)]
    pub mount_mode: MountMode,
}

/// How url prefixes are interpreted
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MountMode {
    /// Multi-segment prefixes, longest registered prefix wins
    #[default]
    Nested,
    /// One segment per handle; requests need a handle plus a path
    Flat,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Diagnostic output format (text or json)
    #[serde(default)]
    pub format: LogFormat,
    /// Access log line format (plain, common or json)
    #[serde(default)]
    pub access_log_format: AccessLogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessLogFormat {
    #[default]
    Plain,
    Common,
    Json,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a client may take to send request headers
    pub header_read_timeout: u64,
    /// Seconds in-flight connections get to finish after a shutdown signal
    pub shutdown_timeout: u64,
    pub max_connections: Option<u64>,
}
