// Application state module
// Immutable state shared by every connection: configuration plus the mount registry

use super::types::{AccessLogFormat, Config};
use crate::logger;
use crate::routing::MountRegistry;

/// Application state
///
/// Built once before the listener starts and handed to connections behind an `Arc`.
/// Nothing in here changes while requests are served.
pub struct AppState {
    pub config: Config,
    pub registry: MountRegistry,
}

impl AppState {
    /// Build state from configuration. Malformed folder entries are logged and skipped.
    pub fn new(config: &Config) -> Self {
        let specs: Vec<_> = config
            .mapping_specs()
            .into_iter()
            .filter_map(|parsed| parsed.map_err(|e| logger::log_mapping_skipped(&e)).ok())
            .collect();
        let registry = MountRegistry::from_specs(&specs, config.mount_mode);

        Self {
            config: config.clone(),
            registry,
        }
    }

    pub const fn directory_listing(&self) -> bool {
        self.config.directory_listing
    }

    pub const fn request_logging(&self) -> bool {
        self.config.request_logging
    }

    pub const fn access_log_format(&self) -> AccessLogFormat {
        self.config.logging.access_log_format
    }
}
