//! In-memory host: a retained scene graph with an operation log.
//!
//! Used by the terminal renderer and by tests. Every bridge call is counted
//! and logged so callers can assert exactly which mutations a pass made.

use std::fmt::{self, Write};

use tracing::trace;

use super::{HostBridge, NodeCaps, PLACEHOLDER_TAG, TEXT_TAG};
use crate::layout::measure_text;
use crate::types::{Frame, Size};
use crate::vdom::Props;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub tag: String,
    pub props: Props,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub frame: Frame,
    pub clip: Option<Frame>,
    pub caps: NodeCaps,
    /// Cleared by `remove`.
    pub alive: bool,
}

/// Counts of bridge calls that changed the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    pub created: usize,
    pub appended: usize,
    pub removed: usize,
    pub patched: usize,
    pub placed: usize,
    pub clipped: usize,
}

impl HostStats {
    /// Total native mutations.
    pub fn mutations(&self) -> usize {
        self.created + self.appended + self.removed + self.patched + self.placed + self.clipped
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    Create(NodeId, String),
    Append { parent: NodeId, node: NodeId },
    Remove { parent: NodeId, node: NodeId },
    Patch(NodeId),
    Place(NodeId, Frame),
    Clip(NodeId, Option<Frame>),
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<SceneNode>,
    stats: HostStats,
    log: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A root node to mount into, sized like a window or terminal.
    pub fn create_root(&mut self, size: Size) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            tag: "#root".to_string(),
            props: Props::default(),
            parent: None,
            children: Vec::new(),
            frame: Frame::new(0.0, 0.0, size.width, size.height),
            clip: None,
            caps: NodeCaps::CONTAINER | NodeCaps::LAYOUT_SIZE,
            alive: true,
        });
        id
    }

    pub fn resize_root(&mut self, root: NodeId, size: Size) {
        if let Some(node) = self.nodes.get_mut(root.index()) {
            node.frame.width = size.width;
            node.frame.height = size.height;
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn frame(&self, id: NodeId) -> Option<Frame> {
        self.node(id).map(|node| node.frame)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|node| node.props.text.as_deref())
    }

    pub fn stats(&self) -> HostStats {
        self.stats
    }

    pub fn log(&self) -> &[HostOp] {
        &self.log
    }

    /// Reset counters and log, keeping the scene.
    pub fn clear_log(&mut self) {
        self.stats = HostStats::default();
        self.log.clear();
    }

    /// Nodes created and not yet removed (roots included).
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.alive).count()
    }

    /// First live node (depth-first from `from`) whose text equals `text`.
    pub fn find_text(&self, from: NodeId, text: &str) -> Option<NodeId> {
        if self.text(from) == Some(text) {
            return Some(from);
        }
        self.children(from)
            .iter()
            .find_map(|&child| self.find_text(child, text))
    }

    /// Frame of `id` in root coordinates.
    pub fn absolute_frame(&self, id: NodeId) -> Option<Frame> {
        let mut frame = self.frame(id)?;
        let mut parent = self.node(id)?.parent;
        while let Some(p) = parent {
            let node = self.node(p)?;
            if node.parent.is_some() {
                frame.x += node.frame.x;
                frame.y += node.frame.y;
            }
            parent = node.parent;
        }
        Some(frame)
    }

    /// Indented outline of the subtree at `id`, one node per line.
    pub fn outline(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_outline(id, 0, &mut out);
        out
    }

    fn write_outline(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        let _ = write!(out, "{:indent$}{}", "", node.tag, indent = depth * 2);
        if let Some(text) = &node.props.text {
            let _ = write!(out, " {text:?}");
        }
        out.push('\n');
        for &child in &node.children {
            self.write_outline(child, depth + 1, out);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.index()).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent.index()) {
            p.children.retain(|&child| child != node);
        }
        self.nodes[node.index()].parent = None;
    }
}

impl HostBridge for MemoryHost {
    type Node = NodeId;

    fn create(&mut self, tag: &str, props: &Props) -> NodeId {
        let caps = match tag {
            TEXT_TAG | "text" => NodeCaps::LAYOUT_SIZE,
            PLACEHOLDER_TAG => NodeCaps::empty(),
            _ => NodeCaps::CONTAINER,
        };
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            tag: tag.to_string(),
            props: props.clone(),
            parent: None,
            children: Vec::new(),
            frame: Frame::default(),
            clip: None,
            caps,
            alive: true,
        });
        self.stats.created += 1;
        self.log.push(HostOp::Create(id, tag.to_string()));
        trace!(%id, tag, "create");
        id
    }

    fn append(&mut self, parent: &NodeId, node: &NodeId) {
        if self.node(*parent).is_none() || self.node(*node).is_none() {
            return;
        }
        self.detach(*node);
        self.nodes[parent.index()].children.push(*node);
        self.nodes[node.index()].parent = Some(*parent);
        self.stats.appended += 1;
        self.log.push(HostOp::Append { parent: *parent, node: *node });
    }

    fn remove(&mut self, parent: &NodeId, node: &NodeId) {
        match self.nodes.get(node.index()) {
            Some(scene_node) if scene_node.alive => {}
            _ => return,
        }
        self.detach(*node);
        self.nodes[node.index()].alive = false;
        self.stats.removed += 1;
        self.log.push(HostOp::Remove { parent: *parent, node: *node });
        trace!(%node, "remove");
    }

    fn patch(&mut self, _tag: &str, node: &NodeId, _old: &Props, new: &Props) {
        if let Some(scene_node) = self.nodes.get_mut(node.index()) {
            scene_node.props = new.clone();
            self.stats.patched += 1;
            self.log.push(HostOp::Patch(*node));
        }
    }

    fn caps(&self, node: &NodeId) -> NodeCaps {
        self.node(*node).map_or(NodeCaps::empty(), |n| n.caps)
    }

    fn measure(&self, node: &NodeId) -> Option<Size> {
        let scene_node = self.node(*node)?;
        if !scene_node.caps.contains(NodeCaps::LAYOUT_SIZE) {
            return None;
        }
        match &scene_node.props.text {
            Some(text) => Some(measure_text(text)),
            None if scene_node.parent.is_none() => Some(scene_node.frame.size()),
            None => None,
        }
    }

    fn place(&mut self, node: &NodeId, frame: Frame) {
        if let Some(scene_node) = self.nodes.get_mut(node.index()) {
            scene_node.frame = frame;
            self.stats.placed += 1;
            self.log.push(HostOp::Place(*node, frame));
        }
    }

    fn clip(&mut self, node: &NodeId, clip: Option<Frame>) {
        if let Some(scene_node) = self.nodes.get_mut(node.index()) {
            scene_node.clip = clip;
            self.stats.clipped += 1;
            self.log.push(HostOp::Clip(*node, clip));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_props(text: &str) -> Props {
        Props {
            text: Some(text.into()),
            ..Props::default()
        }
    }

    #[test]
    fn test_append_moves() {
        let mut host = MemoryHost::new();
        let root = host.create_root(Size::new(10.0, 10.0));
        let a = host.create("view", &Props::default());
        let b = host.create("view", &Props::default());
        host.append(&root, &a);
        host.append(&root, &b);
        host.append(&root, &a);
        assert_eq!(host.children(root), &[b, a]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut host = MemoryHost::new();
        let root = host.create_root(Size::new(10.0, 10.0));
        let a = host.create("view", &Props::default());
        host.append(&root, &a);
        host.remove(&root, &a);
        host.remove(&root, &a);
        assert_eq!(host.stats().removed, 1);
        assert!(host.children(root).is_empty());
        assert_eq!(host.live_count(), 1);
    }

    #[test]
    fn test_measure_text_nodes() {
        let mut host = MemoryHost::new();
        let text = host.create(TEXT_TAG, &text_props("hello"));
        let view = host.create("view", &Props::default());
        assert_eq!(host.measure(&text), Some(Size::new(5.0, 1.0)));
        assert_eq!(host.measure(&view), None);
        assert!(host.caps(&view).contains(NodeCaps::CONTAINER));
        assert!(!host.caps(&text).contains(NodeCaps::CONTAINER));
    }

    #[test]
    fn test_root_measures_its_size() {
        let mut host = MemoryHost::new();
        let root = host.create_root(Size::new(80.0, 24.0));
        assert_eq!(host.measure(&root), Some(Size::new(80.0, 24.0)));
        host.resize_root(root, Size::new(100.0, 30.0));
        assert_eq!(host.measure(&root), Some(Size::new(100.0, 30.0)));
    }

    #[test]
    fn test_outline_and_absolute_frame() {
        let mut host = MemoryHost::new();
        let root = host.create_root(Size::new(80.0, 24.0));
        let outer = host.create("view", &Props::default());
        let label = host.create(TEXT_TAG, &text_props("hi"));
        host.append(&root, &outer);
        host.append(&outer, &label);
        host.place(&outer, Frame::new(2.0, 3.0, 10.0, 10.0));
        host.place(&label, Frame::new(1.0, 1.0, 2.0, 1.0));

        assert_eq!(host.outline(root), "#root\n  view\n    #text \"hi\"\n");
        assert_eq!(host.absolute_frame(label), Some(Frame::new(3.0, 4.0, 2.0, 1.0)));
        assert_eq!(host.find_text(root, "hi"), Some(label));
    }
}
