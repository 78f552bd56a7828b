//! Gesture hit areas.
//!
//! Interaction is registered outside the reconciler (usually from a ref
//! callback). After layout changes a node's size, the runtime refreshes the
//! hit area of registered nodes on the next frame.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::types::{Frame, Size};

pub trait GestureSink<N> {
    fn is_registered(&self, node: &N) -> bool;

    fn refresh_hit_area(&mut self, node: &N, width: f32, height: f32);

    /// The node was removed from the scene.
    fn forget(&mut self, _node: &N) {}
}

/// Sink for runtimes without gesture support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGestures;

impl<N> GestureSink<N> for NoGestures {
    fn is_registered(&self, _node: &N) -> bool {
        false
    }

    fn refresh_hit_area(&mut self, _node: &N, _width: f32, _height: f32) {}
}

impl<N, G: GestureSink<N>> GestureSink<N> for Rc<RefCell<G>> {
    fn is_registered(&self, node: &N) -> bool {
        self.borrow().is_registered(node)
    }

    fn refresh_hit_area(&mut self, node: &N, width: f32, height: f32) {
        self.borrow_mut().refresh_hit_area(node, width, height)
    }

    fn forget(&mut self, node: &N) {
        self.borrow_mut().forget(node)
    }
}

/// Registry of interactive nodes and their hit-area sizes.
#[derive(Debug, Clone)]
pub struct HitAreas<N> {
    areas: HashMap<N, Option<Size>>,
    refreshes: usize,
}

impl<N> Default for HitAreas<N> {
    fn default() -> Self {
        Self {
            areas: HashMap::new(),
            refreshes: 0,
        }
    }
}

impl<N: Eq + Hash + Clone> HitAreas<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node: N) {
        self.areas.entry(node).or_insert(None);
    }

    pub fn unregister(&mut self, node: &N) {
        self.areas.remove(node);
    }

    /// Last refreshed size, `None` until the first refresh.
    pub fn area(&self, node: &N) -> Option<Size> {
        self.areas.get(node).copied().flatten()
    }

    /// Total refreshes received.
    pub fn refreshes(&self) -> usize {
        self.refreshes
    }

    /// Registered nodes whose area, placed at `origin(node)`, contains the point.
    pub fn hit_test(&self, x: f32, y: f32, origin: impl Fn(&N) -> Option<Frame>) -> Vec<N> {
        self.areas
            .iter()
            .filter_map(|(node, size)| {
                let size = (*size)?;
                let frame = origin(node)?;
                let inside = x >= frame.x && y >= frame.y && x < frame.x + size.width && y < frame.y + size.height;
                inside.then(|| node.clone())
            })
            .collect()
    }
}

impl<N: Eq + Hash + Clone> GestureSink<N> for HitAreas<N> {
    fn is_registered(&self, node: &N) -> bool {
        self.areas.contains_key(node)
    }

    fn refresh_hit_area(&mut self, node: &N, width: f32, height: f32) {
        if let Some(area) = self.areas.get_mut(node) {
            *area = Some(Size::new(width, height));
            self.refreshes += 1;
        }
    }

    fn forget(&mut self, node: &N) {
        self.areas.remove(node);
    }
}
