//! Routing module
//!
//! Prefix-tree mount registry and the resolver that maps request paths onto it:
//! - Multi-segment mounts with longest-prefix matching (nested mode)
//! - Single-segment handles (flat mode)

mod registry;
mod resolver;

pub use registry::MountRegistry;
pub use resolver::MountMatch;
