//! Error types
//!
//! `MappingError` covers configuration entries rejected while the mount registry is built.
//! `ServeError` covers everything that can go wrong while answering a request; the
//! dispatcher turns each one into exactly one response.

use hyper::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A folder mapping entry that was skipped at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("mapping entry '{0}' has no ':' separating url prefix and directory")]
    MissingSeparator(String),

    #[error("invalid url path {0}")]
    InvalidUrlPrefix(String),

    #[error("invalid directory path {0}")]
    InvalidFilesystemPath(String),

    #[error("url prefix '{0}' has no path segments")]
    EmptyPrefix(String),

    #[error("url prefix '{0}' must be a single handle segment in flat mount mode")]
    NestedHandle(String),
}

/// Request-time failures
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("no mount matches {0}")]
    NoMatchingMount(String),

    #[error("request path {0} needs a handle and at least one more segment")]
    MalformedRequestPath(String),

    #[error("rejected '..' segment in {0}")]
    PathTraversal(String),

    #[error("{} does not exist", .path.display())]
    ResourceMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not accessible: {source}", .path.display())]
    ResourceInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read directory {}: {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory listing is disabled for {}", .0.display())]
    ListingDisabled(PathBuf),

    #[error("error reading file {} after headers were sent: {source}", .path.display())]
    StreamingFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ServeError {
    /// Classify a failed `stat` of `path`
    pub fn from_stat(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::ResourceMissing { path, source }
        } else {
            Self::ResourceInaccessible { path, source }
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoMatchingMount(_) | Self::PathTraversal(_) | Self::ResourceMissing { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::MalformedRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ListingDisabled(_) => StatusCode::FORBIDDEN,
            Self::ResourceInaccessible { .. }
            | Self::DirectoryRead { .. }
            | Self::StreamingFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing reason text; `Display` carries the server-side detail
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NoMatchingMount(_) | Self::PathTraversal(_) => "Resource not found",
            Self::MalformedRequestPath(_) => "Malformed request path",
            Self::ResourceMissing { .. } | Self::ResourceInaccessible { .. } => {
                "File not accessible"
            }
            Self::DirectoryRead { .. } => "Directory read error",
            Self::ListingDisabled(_) => "Directory listing is disabled.",
            Self::StreamingFailure { .. } => "Server error",
        }
    }
}
