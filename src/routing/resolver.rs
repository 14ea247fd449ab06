//! Path resolution
//!
//! Maps a request path onto the mount registry and splits it into the matched mount
//! prefix and the residual segments below it.

use super::registry::{MountRegistry, ROOT};
use crate::config::MountMode;
use crate::error::ServeError;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Result of a successful resolution, borrowed from the request path and the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountMatch<'a> {
    pub matched_prefix: Vec<&'a str>,
    pub residual: Vec<&'a str>,
    pub filesystem_root: &'a Path,
}

impl MountMatch<'_> {
    /// Filesystem target: the mount root joined with each percent-decoded residual
    /// segment.
    ///
    /// A segment that decodes to `..` or contains a separator or NUL is refused, so the
    /// target never leaves the mount root. Segments that are not UTF-8 once decoded
    /// make the request path malformed.
    pub fn target(&self) -> Result<PathBuf, ServeError> {
        let mut path = self.filesystem_root.to_path_buf();
        for raw in &self.residual {
            let segment = percent_decode_str(raw)
                .decode_utf8()
                .map_err(|_| ServeError::MalformedRequestPath(self.request_path()))?;
            if segment == ".." || segment.contains(['/', '\\', '\0']) {
                return Err(ServeError::PathTraversal(self.request_path()));
            }
            path.push(&*segment);
        }
        Ok(path)
    }

    /// URL path of the target without the leading slash
    pub fn user_path(&self) -> String {
        self.matched_prefix
            .iter()
            .chain(&self.residual)
            .copied()
            .collect::<Vec<_>>()
            .join("/")
    }

    fn request_path(&self) -> String {
        format!("/{}", self.user_path())
    }
}

impl MountRegistry {
    /// Resolve `path` against the registry.
    ///
    /// Nested mode walks as deep as the tree allows and keeps the deepest node that has
    /// a directory, so `/a/b/file` prefers an `a/b` mount over an `a` mount. Flat mode
    /// requires a handle plus at least one more segment.
    pub fn resolve<'a>(&'a self, path: &'a str) -> Result<MountMatch<'a>, ServeError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if self.mode == MountMode::Flat && segments.len() < 2 {
            return Err(ServeError::MalformedRequestPath(path.to_string()));
        }

        let mut node = ROOT;
        let mut found: Option<(usize, &Path)> = None;
        for (depth, segment) in segments.iter().enumerate() {
            let Some(next) = self.child(node, segment) else {
                break;
            };
            node = next;
            if let Some(root) = self.root_of(node) {
                found = Some((depth + 1, root));
            }
            if self.mode == MountMode::Flat {
                break;
            }
        }

        let (consumed, filesystem_root) =
            found.ok_or_else(|| ServeError::NoMatchingMount(path.to_string()))?;
        let (matched_prefix, residual) = segments.split_at(consumed);
        Ok(MountMatch {
            matched_prefix: matched_prefix.to_vec(),
            residual: residual.to_vec(),
            filesystem_root,
        })
    }
}
