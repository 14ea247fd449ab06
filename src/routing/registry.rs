//! Mount registry
//!
//! Prefix tree keyed by URL path segment. Nodes live in an arena (`Vec<MountNode>`) and
//! refer to their children by index; the root is always index 0 and never carries a
//! filesystem root. The tree is built once before the listener starts and only read
//! afterwards, so it is shared between connections without locking.

use crate::config::{MappingSpec, MountMode};
use crate::error::MappingError;
use crate::logger;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub(super) const ROOT: usize = 0;

/// One path segment of a registered URL prefix
#[derive(Debug, Default)]
pub(super) struct MountNode {
    pub(super) children: HashMap<String, usize>,
    pub(super) filesystem_root: Option<PathBuf>,
}

/// Immutable set of mounts
#[derive(Debug)]
pub struct MountRegistry {
    pub(super) nodes: Vec<MountNode>,
    pub(super) mode: MountMode,
}

impl MountRegistry {
    /// Build from mapping specs, logging and skipping invalid entries
    pub fn from_specs(specs: &[MappingSpec], mode: MountMode) -> Self {
        let mut builder = MountRegistryBuilder::new(mode);
        for spec in specs {
            match builder.register(spec) {
                Ok(()) => logger::log_mount_registered(spec),
                Err(e) => logger::log_mapping_skipped(&e),
            }
        }
        builder.build()
    }

    /// Number of registered mounts
    pub fn len(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.filesystem_root.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(super) fn child(&self, node: usize, segment: &str) -> Option<usize> {
        self.nodes[node].children.get(segment).copied()
    }

    pub(super) fn root_of(&self, node: usize) -> Option<&Path> {
        self.nodes[node].filesystem_root.as_deref()
    }
}

/// Single-threaded builder for [`MountRegistry`]
#[derive(Debug)]
pub struct MountRegistryBuilder {
    nodes: Vec<MountNode>,
    mode: MountMode,
}

impl MountRegistryBuilder {
    pub fn new(mode: MountMode) -> Self {
        Self {
            nodes: vec![MountNode::default()],
            mode,
        }
    }

    /// Validate and insert one mapping. Registering the same prefix again replaces
    /// the earlier directory.
    pub fn register(&mut self, spec: &MappingSpec) -> Result<(), MappingError> {
        spec.validate()?;

        let segments: Vec<&str> = spec.segments().collect();
        if segments.is_empty() {
            return Err(MappingError::EmptyPrefix(spec.url_prefix.clone()));
        }
        if self.mode == MountMode::Flat && segments.len() > 1 {
            return Err(MappingError::NestedHandle(spec.url_prefix.clone()));
        }

        let mut node = ROOT;
        for segment in segments {
            node = self.child_or_insert(node, segment);
        }
        self.nodes[node].filesystem_root = Some(PathBuf::from(&spec.filesystem_path));
        Ok(())
    }

    pub fn build(self) -> MountRegistry {
        MountRegistry {
            nodes: self.nodes,
            mode: self.mode,
        }
    }

    fn child_or_insert(&mut self, node: usize, segment: &str) -> usize {
        if let Some(&existing) = self.nodes[node].children.get(segment) {
            return existing;
        }
        let index = self.nodes.len();
        self.nodes.push(MountNode::default());
        self.nodes[node].children.insert(segment.to_string(), index);
        index
    }
}
