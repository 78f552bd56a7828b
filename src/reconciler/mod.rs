//! Reconciler - keeps a host scene in sync with VNode trees.
//!
//! Every mounted VNode gets a [`MountRecord`] in a generational arena. The
//! record holds what the VNode itself can't: the native node, the hook
//! context, effective props, the last frame layout assigned. VNodes stay
//! immutable, so the same `Rc` can be rendered at several positions.
//!
//! # Passes
//!
//! - **mount** creates native nodes top-down, appends them, and lays out
//!   each container once its children exist.
//! - **patch** walks an old/new pair, patches only changed props, diffs
//!   children by key (when every sibling is keyed) or by position, and
//!   re-runs layout only where layout-relevant input changed.
//! - **unmount** tears down children before parents, detaching refs first
//!   and running hook cleanups before the rendered output goes away.
//!
//! Re-renders requested by state setters are batched in the
//! [`Scheduler`] and applied by [`Reconciler::flush`], shallowest first.

mod diagnostics;
mod layout_pass;
mod mount;
mod patch;
mod record;
mod unmount;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub(crate) use diagnostics::Diagnostics;
pub(crate) use record::{ComponentState, HostState, MountRecord, Mounted};

use crate::arena::{Arena, arena_key};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gesture::{GestureSink, NoGestures};
use crate::hooks::{Ctx, CtxId, FrameQueue, Scheduler};
use crate::host::{HostBridge, NodeCaps};
use crate::layout::LayoutRecord;
use crate::theme::{DefaultTheme, ThemeResolver};
use crate::types::{Frame, Size};
use crate::vdom::{Props, Style, VNode, flatten_children};

arena_key!(
    /// Handle to a mount record.
    MountId
);

/// Tag recorded for mount roots.
pub const ROOT_TAG: &str = "#root";

/// Flush rounds before giving up on a component that keeps scheduling itself.
const MAX_FLUSH_ROUNDS: usize = 100;

pub(crate) struct Reconciler<H: HostBridge> {
    pub(crate) host: H,
    pub(crate) theme: Box<dyn ThemeResolver>,
    pub(crate) gestures: Box<dyn GestureSink<H::Node>>,
    pub(crate) records: Arena<MountId, MountRecord<H::Node>>,
    pub(crate) contexts: Arena<CtxId, Ctx>,
    pub(crate) scheduler: Scheduler,
    pub(crate) frames: FrameQueue,
    roots: HashMap<H::Node, MountId>,
    pub(crate) config: Config,
    pub(crate) diagnostics: Diagnostics,
    /// Records already reported for missing keys.
    warned_keys: HashSet<MountId>,
}

impl<H: HostBridge> Reconciler<H> {
    pub fn new(host: H, config: Config) -> Self {
        Self {
            host,
            theme: Box::new(DefaultTheme::default()),
            gestures: Box::new(NoGestures),
            records: Arena::new(),
            contexts: Arena::new(),
            scheduler: Scheduler::new(),
            frames: FrameQueue::default(),
            roots: HashMap::new(),
            diagnostics: Diagnostics::new(config.diagnostics.clone()),
            config,
            warned_keys: HashSet::new(),
        }
    }

    pub fn set_theme(&mut self, theme: Box<dyn ThemeResolver>) {
        self.theme = theme;
    }

    pub fn set_gestures(&mut self, gestures: Box<dyn GestureSink<H::Node>>) {
        self.gestures = gestures;
    }

    // =========================================================================
    // Roots
    // =========================================================================

    pub fn is_mounted(&self, root: &H::Node) -> bool {
        self.roots.contains_key(root)
    }

    /// Mount `vnode` into `root`, or patch the tree already mounted there.
    pub fn mount_root(&mut self, root: H::Node, vnode: VNode) -> Result<()> {
        let (root_id, created) = match self.roots.get(&root) {
            Some(&id) => (id, false),
            None => (self.create_root(root.clone()), true),
        };
        let resized = self.refresh_root_size(root_id);
        debug!(?root, created, "mount root");

        let old = self.host_state(root_id).map(|s| s.children.clone()).unwrap_or_default();
        let children = flatten_children(std::slice::from_ref(&vnode));
        self.check_keys(root_id, &children);

        let outcome = match self.patch_children(root_id, &root, &old, &children, None) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.set_children(root_id, Vec::new());
                if created {
                    self.roots.remove(&root);
                    self.records.remove(root_id);
                } else {
                    self.sync_native(root_id);
                }
                return Err(err);
            }
        };
        self.set_children(root_id, outcome.ids);
        self.sync_native(root_id);
        if outcome.geometry || resized {
            self.relayout(root_id);
        }
        Ok(())
    }

    pub fn unmount_root(&mut self, root: &H::Node) -> Result<()> {
        let id = self
            .roots
            .remove(root)
            .ok_or_else(|| Error::NotMounted(format!("{root:?}")))?;
        debug!(?root, "unmount root");
        self.unmount(id);
        Ok(())
    }

    /// Re-read the size of `root` and lay the tree out again if it changed.
    pub fn resize_root(&mut self, root: &H::Node) -> Result<bool> {
        let id = *self
            .roots
            .get(root)
            .ok_or_else(|| Error::NotMounted(format!("{root:?}")))?;
        let resized = self.refresh_root_size(id);
        if resized {
            self.relayout(id);
        }
        Ok(resized)
    }

    fn create_root(&mut self, root: H::Node) -> MountId {
        let caps = self.host.caps(&root) | NodeCaps::CONTAINER;
        let id = self.records.insert(MountRecord {
            vnode: VNode::Null,
            parent: None,
            host_parent: root.clone(),
            theme: None,
            depth: 0,
            kind: Mounted::Host(HostState {
                node: root.clone(),
                tag: ROOT_TAG,
                caps,
                props: Props::default(),
                layout: LayoutRecord::root(),
                children: Vec::new(),
                native_children: Vec::new(),
                child_theme: None,
                frame: None,
                laid_out: None,
                clip: None,
                owned: false,
            }),
        });
        self.roots.insert(root, id);
        id
    }

    /// Pick up the root's current size. Returns whether it changed.
    fn refresh_root_size(&mut self, root_id: MountId) -> bool {
        let Some(node) = self.host_state(root_id).map(|s| s.node.clone()) else {
            return false;
        };
        let size = self
            .config
            .viewport
            .or_else(|| self.host.measure(&node))
            .unwrap_or(Size::ZERO);
        let frame = Frame::new(0.0, 0.0, size.width, size.height);
        match self.host_state_mut(root_id) {
            Some(state) if state.frame != Some(frame) => {
                state.frame = Some(frame);
                true
            }
            _ => false,
        }
    }

    // =========================================================================
    // Flush / frame
    // =========================================================================

    /// Apply every scheduled re-render, including ones scheduled while
    /// flushing. Returns the number of component renders performed.
    pub fn flush(&mut self) -> Result<usize> {
        let mut renders = 0;
        for _ in 0..MAX_FLUSH_ROUNDS {
            let mut batch = self.scheduler.take_batch();
            if batch.is_empty() {
                return Ok(renders);
            }
            batch.sort_by_key(|&id| self.contexts.get(id).map_or(usize::MAX, |ctx| ctx.depth));

            for (i, &ctx_id) in batch.iter().enumerate() {
                // An ancestor's re-render in this batch may have rendered it already.
                if !self.scheduler.is_pending(ctx_id) {
                    continue;
                }
                let Some(record) = self.contexts.get(ctx_id).map(|ctx| ctx.record) else {
                    self.scheduler.cancel(ctx_id);
                    continue;
                };
                if !self.records.contains(record) {
                    self.scheduler.cancel(ctx_id);
                    continue;
                }
                match self.rerender(record, ctx_id) {
                    Ok(geometry) => {
                        renders += 1;
                        self.settle(record, geometry);
                    }
                    Err(err) => {
                        self.scheduler.requeue(&batch[i + 1..]);
                        return Err(err);
                    }
                }
            }
        }
        warn!(rounds = MAX_FLUSH_ROUNDS, "flush stopped: components keep scheduling updates");
        Ok(renders)
    }

    /// Bring ancestors up to date after `from` re-rendered on its own.
    fn settle(&mut self, from: MountId, geometry: bool) {
        let Some(mut host) = self.records.get(from).and_then(|r| r.parent).and_then(|p| self.nearest_host(p)) else {
            return;
        };
        self.sync_native(host);
        if !geometry {
            return;
        }
        loop {
            self.relayout(host);
            let content_sized = self
                .host_state(host)
                .is_some_and(|s| s.owned && s.layout.sized_by_content());
            if !content_sized {
                break;
            }
            match self.records.get(host).and_then(|r| r.parent).and_then(|p| self.nearest_host(p)) {
                Some(up) => host = up,
                None => break,
            }
        }
    }

    /// Run deferred work queued by earlier layout passes: refresh hit areas
    /// of registered nodes. Returns the number of refreshes.
    pub fn frame(&mut self) -> usize {
        let mut refreshed = 0;
        for id in self.frames.take() {
            let Some(state) = self.host_state(id) else {
                continue;
            };
            let Some(size) = state.frame.map(|f| f.size()).or(state.laid_out) else {
                continue;
            };
            let node = state.node.clone();
            if self.gestures.is_registered(&node) {
                self.gestures.refresh_hit_area(&node, size.width, size.height);
                refreshed += 1;
            }
        }
        refreshed
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle() && self.frames.is_empty()
    }

    // =========================================================================
    // Record helpers
    // =========================================================================

    pub(crate) fn host_state(&self, id: MountId) -> Option<&HostState<H::Node>> {
        self.records.get(id).and_then(MountRecord::host)
    }

    pub(crate) fn host_state_mut(&mut self, id: MountId) -> Option<&mut HostState<H::Node>> {
        self.records.get_mut(id).and_then(MountRecord::host_mut)
    }

    /// `id` itself if it owns a native node, else its closest such ancestor.
    pub(crate) fn nearest_host(&self, id: MountId) -> Option<MountId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let record = self.records.get(current)?;
            if record.host().is_some() {
                return Some(current);
            }
            cursor = record.parent;
        }
        None
    }

    pub(crate) fn depth_under(&self, parent: MountId) -> usize {
        self.records.get(parent).map_or(0, |r| r.depth + 1)
    }

    pub(crate) fn set_children(&mut self, id: MountId, ids: Vec<MountId>) {
        let Some(record) = self.records.get_mut(id) else {
            return;
        };
        match &mut record.kind {
            Mounted::Host(state) => state.children = ids,
            Mounted::Fragment { children } => *children = ids,
            _ => {}
        }
    }

    /// Native nodes contributed by `ids`, in order. Components and fragments
    /// contribute their rendered nodes; empty-render placeholders nothing.
    pub(crate) fn collect_native(&self, ids: &[MountId]) -> Vec<H::Node> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            self.push_native(id, &mut out);
        }
        out
    }

    fn push_native(&self, id: MountId, out: &mut Vec<H::Node>) {
        let Some(record) = self.records.get(id) else {
            return;
        };
        match &record.kind {
            Mounted::Host(state) => out.push(state.node.clone()),
            Mounted::Placeholder { node } => out.push(node.clone()),
            Mounted::Component(state) => {
                if let Some(rendered) = state.rendered {
                    self.push_native(rendered, out);
                }
            }
            Mounted::Fragment { children } => {
                for &child in children {
                    self.push_native(child, out);
                }
            }
        }
    }

    /// Records whose native nodes take part in the layout of `ids`' parent.
    pub(crate) fn layout_children(&self, ids: &[MountId]) -> Vec<MountId> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            self.push_layout_child(id, &mut out);
        }
        out
    }

    fn push_layout_child(&self, id: MountId, out: &mut Vec<MountId>) {
        let Some(record) = self.records.get(id) else {
            return;
        };
        match &record.kind {
            Mounted::Host(_) => out.push(id),
            Mounted::Placeholder { .. } => {}
            Mounted::Component(state) => {
                if let Some(rendered) = state.rendered {
                    self.push_layout_child(rendered, out);
                }
            }
            Mounted::Fragment { children } => {
                for &child in children {
                    self.push_layout_child(child, out);
                }
            }
        }
    }

    /// Re-append native children of host record `id` so the host order
    /// matches the record order. Survivors keep their relative order and
    /// new nodes land at the end, so only nodes from the first mismatch on
    /// need to move.
    pub(crate) fn sync_native(&mut self, id: MountId) {
        let Some(state) = self.host_state(id) else {
            return;
        };
        let node = state.node.clone();
        let previous = state.native_children.clone();
        let native = self.collect_native(&state.children);
        if native == previous {
            return;
        }

        let first = {
            let present: HashSet<&H::Node> = native.iter().collect();
            let survivors: Vec<&H::Node> = previous.iter().filter(|n| present.contains(n)).collect();
            let kept: HashSet<&H::Node> = survivors.iter().copied().collect();
            let actual: Vec<&H::Node> = survivors
                .into_iter()
                .chain(native.iter().filter(|n| !kept.contains(n)))
                .collect();
            actual
                .iter()
                .zip(&native)
                .position(|(a, b)| *a != b)
                .unwrap_or(native.len())
        };

        for child in &native[first..] {
            self.host.append(&node, child);
        }
        if let Some(state) = self.host_state_mut(id) {
            state.native_children = native;
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Component path of `id`, e.g. `App > List > view[3]`.
    pub(crate) fn path(&self, id: MountId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(record) = self.records.get(current) else {
                break;
            };
            let Some(parent) = record.parent else {
                break;
            };
            let mut segment = record.label().to_string();
            if let Some(index) = self.sibling_index(parent, current) {
                segment.push_str(&format!("[{index}]"));
            }
            segments.push(segment);
            cursor = Some(parent);
        }
        if segments.is_empty() {
            return ROOT_TAG.to_string();
        }
        segments.reverse();
        segments.join(" > ")
    }

    /// Path of a child about to be mounted under `parent`.
    pub(crate) fn child_path(&self, parent: MountId, label: &str) -> String {
        match self.records.get(parent) {
            Some(record) if record.parent.is_some() => format!("{} > {label}", self.path(parent)),
            _ => label.to_string(),
        }
    }

    fn sibling_index(&self, parent: MountId, child: MountId) -> Option<usize> {
        let siblings = match &self.records.get(parent)?.kind {
            Mounted::Host(state) => &state.children,
            Mounted::Fragment { children } => children,
            _ => return None,
        };
        if siblings.len() < 2 {
            return None;
        }
        siblings.iter().position(|&id| id == child)
    }

    pub(crate) fn check_keys(&mut self, id: MountId, children: &[VNode]) {
        if !self.diagnostics.enabled(DiagnosticKind::MissingKeys) || self.warned_keys.contains(&id) {
            return;
        }
        if let Some(message) = self.diagnostics.missing_keys(children) {
            self.warned_keys.insert(id);
            let path = self.path(id);
            self.diagnostics.report(DiagnosticKind::MissingKeys, path, message);
        }
    }

    pub(crate) fn forget_warnings(&mut self, id: MountId) {
        self.warned_keys.remove(&id);
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.entries()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

/// Props for invisible stand-in nodes.
pub(crate) fn placeholder_props() -> Props {
    Props {
        style: Style::new().visible(false),
        ..Props::default()
    }
}

