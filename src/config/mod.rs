// Configuration module entry point
// Loads layered configuration and holds the immutable runtime state

mod mapping;
mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use mapping::MappingSpec;
pub use state::AppState;
pub use types::{AccessLogFormat, Config, LogFormat, LoggingConfig, MountMode};

/// Environment prefix for overrides, e.g. `PUBLIC_FOLDERS__DIRECTORY_LISTING=true`
const ENV_PREFIX: &str = "PUBLIC_FOLDERS";

impl Config {
    /// Load configuration from the given file (format picked by extension).
    /// A missing file is not an error; defaults apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::builder(config_path, std::env::var("PORT").ok())?.build()?;
        settings.try_deserialize()
    }

    fn builder(
        config_path: &str,
        port_override: Option<String>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.access_log_format", "plain")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("folders", Vec::<String>::new())?
            .set_default("directory_listing", false)?
            .set_default("request_logging", false)?
            .set_default("mount_mode", "nested")?
            .set_override_option("server.port", port_override)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Parse every `folders` entry; entries without a `:` come back as errors
    pub fn mapping_specs(&self) -> Vec<Result<MappingSpec, crate::error::MappingError>> {
        self.folders.iter().map(|f| MappingSpec::parse(f)).collect()
    }
}


#[cfg(test)]
impl Config {
    /// Built-in defaults plus the given `folders` entries
    pub fn with_folders<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cfg: Self = Self::builder("does-not-exist", None)
            .and_then(|builder| builder.build())
            .and_then(|settings| settings.try_deserialize())
            .unwrap();
        cfg.folders = folders.into_iter().map(Into::into).collect();
        cfg
    }
}
