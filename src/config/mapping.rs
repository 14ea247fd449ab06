//! Folder mapping entries
//!
//! Entries arrive from configuration as `"<urlPrefix>:<directory>"` strings, e.g.
//! `"media/movies:/srv/movies"`.

use crate::error::MappingError;
use regex::Regex;
use std::sync::LazyLock;

static ALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9/_.\-]+$").unwrap());

/// One `(urlPrefix, filesystemPath)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSpec {
    pub url_prefix: String,
    pub filesystem_path: String,
}

impl MappingSpec {
    pub fn new(url_prefix: impl Into<String>, filesystem_path: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            filesystem_path: filesystem_path.into(),
        }
    }

    /// Parse a `"<urlPrefix>:<directory>"` entry, splitting on the first `:`.
    ///
    /// Only the separator is checked here; character validation happens when the
    /// entry is registered.
    pub fn parse(entry: &str) -> Result<Self, MappingError> {
        let (url_prefix, filesystem_path) = entry
            .split_once(':')
            .ok_or_else(|| MappingError::MissingSeparator(entry.to_string()))?;
        Ok(Self::new(url_prefix.trim(), filesystem_path.trim()))
    }

    /// Check both halves against `[A-Za-z0-9/_.-]+`
    pub fn validate(&self) -> Result<(), MappingError> {
        if !ALLOWED.is_match(&self.url_prefix) {
            return Err(MappingError::InvalidUrlPrefix(self.url_prefix.clone()));
        }
        if !ALLOWED.is_match(&self.filesystem_path) {
            return Err(MappingError::InvalidFilesystemPath(
                self.filesystem_path.clone(),
            ));
        }
        Ok(())
    }

    /// Non-empty `/`-separated segments of the url prefix
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.url_prefix.split('/').filter(|s| !s.is_empty())
    }
}
