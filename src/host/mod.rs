//! Host bridge - the native scene graph the reconciler drives.
//!
//! The reconciler never touches native nodes directly. Every mutation goes
//! through [`HostBridge`]: create, append, remove, patch, and the geometry
//! calls used by layout (`measure`, `place`, `clip`).
//!
//! `append` has move semantics: appending a node that already has a parent
//! detaches it first. The reconciler relies on this to reorder children.

mod memory;

use std::fmt::Debug;
use std::hash::Hash;

use bitflags::bitflags;

pub use memory::{HostOp, HostStats, MemoryHost, NodeId, SceneNode};

use crate::types::{Frame, Size};
use crate::vdom::Props;

/// Tag of native nodes created for text children.
pub const TEXT_TAG: &str = "#text";
/// Tag of invisible stand-ins (malformed nodes, empty component output).
pub const PLACEHOLDER_TAG: &str = "#placeholder";

bitflags! {
    /// What a native node supports, decided once at creation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeCaps: u8 {
        /// Lays out children with the flex engine.
        const CONTAINER = 1 << 0;
        /// Reports a natural size through `measure`.
        const LAYOUT_SIZE = 1 << 1;
    }
}

pub trait HostBridge {
    type Node: Clone + Eq + Hash + Debug + 'static;

    fn create(&mut self, tag: &str, props: &Props) -> Self::Node;

    /// Append `node` as the last child of `parent`, moving it if attached elsewhere.
    fn append(&mut self, parent: &Self::Node, node: &Self::Node);

    /// Detach and release `node`. Must tolerate nodes that are already gone
    /// or were never appended.
    fn remove(&mut self, parent: &Self::Node, node: &Self::Node);

    /// Apply changed props. Only called when effective props differ.
    fn patch(&mut self, tag: &str, node: &Self::Node, old: &Props, new: &Props);

    fn caps(&self, node: &Self::Node) -> NodeCaps;

    /// Natural size for `LAYOUT_SIZE` nodes; for a mount root, its cached size.
    fn measure(&self, node: &Self::Node) -> Option<Size>;

    /// Set position (relative to the host parent) and size.
    fn place(&mut self, node: &Self::Node, frame: Frame);

    /// Clip children to `clip` (in the node's own coordinates), or stop clipping.
    fn clip(&mut self, node: &Self::Node, clip: Option<Frame>);
}
