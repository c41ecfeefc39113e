//! Menu tree, registry and visibility resolution.
//!
//! The registry owns one [`MenuTree`] at a time and hands out immutable
//! snapshots of it:
//! - plugins insert and remove nodes through [`MenuRegistry`]
//! - renderers walk a [`VisibleMenu`] for their entitlement tier
//! - lookups return owned [`MenuNode`] copies

mod node;
mod registry;
mod tree;
mod visible;

pub use node::{MenuNode, NodeKind, NodeSource, NodeSpec, Tier};
pub use registry::MenuRegistry;
pub use tree::{MenuTree, NodeKey, TreeNode};
pub use visible::{VisibleEntry, VisibleIter, VisibleMenu};
