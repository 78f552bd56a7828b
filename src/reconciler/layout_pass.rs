//! Layout application.
//!
//! The engine computes frames for one container at a time. This pass feeds
//! it: box sizes from the parent's content area, natural sizes from the
//! host (`measure`) or from the subtree, and it writes results back through
//! `place`/`clip`. Child containers are laid out again only when the size
//! they were laid out at changed; ancestors are never touched from here.

use tracing::trace;

use super::{MountId, Reconciler};
use crate::host::{HostBridge, NodeCaps};
use crate::layout::{LayoutItem, LayoutRecord, compute_children, intrinsic_size, resolve_box};
use crate::types::{Frame, Size};

impl<H: HostBridge> Reconciler<H> {
    /// Lay out the children of container `id`, cascading into child
    /// containers whose size changed.
    pub(crate) fn relayout(&mut self, id: MountId) {
        let viewport = self.viewport_for(id);
        self.layout_container(id, viewport);
    }

    fn layout_container(&mut self, id: MountId, viewport: Size) {
        let size = self.box_size(id, viewport);
        let Some(state) = self.host_state(id) else {
            return;
        };
        if !state.is_container() {
            return;
        }
        let layout = state.layout;
        let node = state.node.clone();
        let old_clip = state.clip;
        let items = self.layout_children(&state.children);

        let inputs: Vec<LayoutItem> = items
            .iter()
            .map(|&item| LayoutItem::new(self.layout_of(item), self.natural_size(item, viewport)))
            .collect();
        let frames = compute_children(&layout, size, &inputs, viewport);

        let clip = layout.clips().then(|| {
            let content = size.inset(layout.padding);
            Frame::new(layout.padding.left, layout.padding.top, content.width, content.height)
        });
        if clip != old_clip {
            self.host.clip(&node, clip);
        }
        let mut resized = false;
        if let Some(state) = self.host_state_mut(id) {
            resized = state.laid_out != Some(size);
            state.laid_out = Some(size);
            state.clip = clip;
        }

        let mut placed = 0;
        for (&item, frame) in items.iter().zip(frames) {
            let Some(child) = self.host_state_mut(item) else {
                continue;
            };
            let changed = child.frame != Some(frame);
            let cascade = child.is_container() && child.laid_out != Some(frame.size());
            let child_node = child.node.clone();
            if changed {
                child.frame = Some(frame);
                self.host.place(&child_node, frame);
                self.frames.push(item);
                placed += 1;
            }
            if cascade {
                self.layout_container(item, viewport);
            }
        }
        if resized || placed > 0 {
            self.frames.push(id);
        }
        trace!(?id, ?size, children = items.len(), placed, "layout pass");
    }

    /// Outer size of host record `id`: the frame its parent assigned, else
    /// its own record resolved against the parent's content area.
    fn box_size(&self, id: MountId, viewport: Size) -> Size {
        let Some(record) = self.records.get(id) else {
            return Size::ZERO;
        };
        let Some(state) = record.host() else {
            return Size::ZERO;
        };
        if let Some(frame) = state.frame {
            return frame.size();
        }
        if !state.owned {
            return self.config.viewport.or_else(|| self.host.measure(&state.node)).unwrap_or(Size::ZERO);
        }

        let available = match record.parent.and_then(|p| self.nearest_host(p)) {
            Some(parent) => {
                let padding = self.layout_of(parent).padding;
                self.box_size(parent, viewport).inset(padding)
            }
            None => viewport,
        };
        let natural = self.natural_size(id, viewport);
        resolve_box(&state.layout, available, natural, viewport)
    }

    /// Size a node takes on its own: measured by the host, or computed from
    /// its children for containers.
    fn natural_size(&self, id: MountId, viewport: Size) -> Size {
        let Some(state) = self.host_state(id) else {
            return Size::ZERO;
        };
        if state.caps.contains(NodeCaps::LAYOUT_SIZE) {
            if let Some(size) = self.host.measure(&state.node) {
                return size;
            }
        }
        if !state.is_container() {
            return Size::ZERO;
        }
        let items: Vec<LayoutItem> = self
            .layout_children(&state.children)
            .into_iter()
            .map(|child| LayoutItem::new(self.layout_of(child), self.natural_size(child, viewport)))
            .collect();
        intrinsic_size(&state.layout, &items, viewport)
    }

    fn layout_of(&self, id: MountId) -> LayoutRecord {
        self.host_state(id).map(|state| state.layout).unwrap_or_default()
    }

    /// Basis for `vw`/`vh`: the configured viewport, else the size of the
    /// root `id` is mounted under.
    fn viewport_for(&self, id: MountId) -> Size {
        if let Some(viewport) = self.config.viewport {
            return viewport;
        }
        let mut cursor = id;
        while let Some(parent) = self.records.get(cursor).and_then(|r| r.parent) {
            cursor = parent;
        }
        match self.host_state(cursor) {
            Some(root) => root
                .frame
                .map(|f| f.size())
                .or_else(|| self.host.measure(&root.node))
                .unwrap_or(Size::ZERO),
            None => Size::ZERO,
        }
    }
}
