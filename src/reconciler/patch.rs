//! Patch pass.
//!
//! Patching reports whether the patched subtree's *geometry input* changed,
//! so the enclosing container knows whether it has to lay out again. A
//! patch that changes only visual props never touches layout.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, trace};

use super::{DiagnosticKind, MountId, MountRecord, Mounted, Reconciler, placeholder_props};
use crate::error::{Error, Result};
use crate::hooks::CtxId;
use crate::host::{HostBridge, NodeCaps, PLACEHOLDER_TAG, TEXT_TAG};
use crate::layout::LayoutRecord;
use crate::theme::{ThemeOverride, stable_context};
use crate::vdom::{ComponentNode, Element, ElementNode, FragmentNode, Key, Props, VNode, flatten_children, same_theme};

type Theme = Option<Rc<ThemeOverride>>;

/// Result of patching one record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Patched {
    /// Same record, or its replacement.
    pub id: MountId,
    /// The parent container must lay out again.
    pub geometry: bool,
}

/// Result of diffing a child list.
#[derive(Debug)]
pub(crate) struct ChildrenOutcome {
    pub ids: Vec<MountId>,
    /// Count, order, identity or child geometry changed.
    pub geometry: bool,
}

impl<H: HostBridge> Reconciler<H> {
    pub(crate) fn patch_node(&mut self, id: MountId, next: &VNode, theme: Theme) -> Result<Patched> {
        let Some(record) = self.records.get(id) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let previous = record.vnode.clone();
        let compatible = !matches!(record.kind, Mounted::Placeholder { .. })
            && previous.same_type(next)
            && previous.key() == next.key();

        if !compatible {
            self.report_remount(id, &previous, next);
            return self.replace(id, next, theme);
        }

        match next {
            VNode::Element(element) => self.patch_element(id, element, next, theme),
            VNode::Text(text) => self.patch_text(id, text, next, theme),
            VNode::Fragment(fragment) => self.patch_fragment(id, fragment, next, theme),
            VNode::Component(component) => self.patch_component(id, component, next, theme),
            VNode::List(_) | VNode::Null => self.replace(id, next, theme),
        }
    }

    /// Unmount `id` and mount `next` in its place.
    fn replace(&mut self, id: MountId, next: &VNode, theme: Theme) -> Result<Patched> {
        let Some(record) = self.records.get(id) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let Some(parent) = record.parent else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let host_parent = record.host_parent.clone();
        debug!(?id, from = record.vnode.display_name(), to = next.display_name(), "replace");

        self.unmount(id);
        let id = self.mount_node(parent, &host_parent, next, theme)?;
        Ok(Patched { id, geometry: true })
    }

    fn report_remount(&mut self, id: MountId, previous: &VNode, next: &VNode) {
        let (VNode::Component(a), VNode::Component(b)) = (previous, next) else {
            return;
        };
        if a.component.name() != b.component.name() || a.key != b.key {
            return;
        }
        let path = self.path(id);
        self.diagnostics.report(
            DiagnosticKind::UnnecessaryRemount,
            path,
            format!(
                "`{}` remounted because its component identity changed; define it once instead of per render",
                a.component.name()
            ),
        );
    }

    // =========================================================================
    // Host nodes
    // =========================================================================

    fn patch_element(&mut self, id: MountId, element: &Rc<ElementNode>, next: &VNode, theme: Theme) -> Result<Patched> {
        let resolved = self.theme.resolve(element.tag, theme.as_ref(), &element.props);
        let Some(state) = self.host_state(id) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let node = state.node.clone();
        let caps = state.caps;
        let old_props = state.props.clone();
        let old_layout = state.layout;
        let old_children = state.children.clone();
        let child_theme = stable_context(&state.child_theme, resolved.for_children);

        let ref_changed = old_props.node_ref != resolved.props.node_ref;
        if ref_changed {
            if let Some(old_ref) = &old_props.node_ref {
                old_ref.detach();
            }
        }
        if old_props != resolved.props {
            self.host.patch(element.tag, &node, &old_props, &resolved.props);
        }

        let layout = LayoutRecord::from(&resolved.props.style);
        let new_ref = resolved.props.node_ref.clone();
        if let Some(record) = self.records.get_mut(id) {
            record.vnode = next.clone();
            record.theme = theme;
            if let Some(state) = record.host_mut() {
                state.props = resolved.props;
                state.layout = layout;
                state.child_theme = child_theme.clone();
            }
        }

        let children = flatten_children(&element.children);
        self.check_keys(id, &children);
        let outcome = match self.patch_children(id, &node, &old_children, &children, child_theme) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.set_children(id, Vec::new());
                self.sync_native(id);
                return Err(err);
            }
        };
        self.set_children(id, outcome.ids);
        self.sync_native(id);

        if ref_changed {
            if let Some(new_ref) = &new_ref {
                new_ref.attach(&node);
            }
        }

        let own_changed = layout != old_layout;
        if (own_changed || outcome.geometry) && caps.contains(NodeCaps::CONTAINER) {
            self.relayout(id);
        }
        trace!(?id, own_changed, children_changed = outcome.geometry, "patched element");
        Ok(Patched {
            id,
            geometry: own_changed || (outcome.geometry && layout.sized_by_content()),
        })
    }

    fn patch_text(&mut self, id: MountId, text: &Rc<str>, next: &VNode, theme: Theme) -> Result<Patched> {
        let explicit = Props {
            text: Some(text.clone()),
            ..Props::default()
        };
        let resolved = self.theme.resolve(TEXT_TAG, theme.as_ref(), &explicit);
        let Some(state) = self.host_state(id) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let node = state.node.clone();
        let old_props = state.props.clone();
        let old_layout = state.layout;

        let layout = LayoutRecord::from(&resolved.props.style);
        let geometry = old_props.text != resolved.props.text || old_layout != layout;
        if old_props != resolved.props {
            self.host.patch(TEXT_TAG, &node, &old_props, &resolved.props);
        }
        if let Some(record) = self.records.get_mut(id) {
            record.vnode = next.clone();
            record.theme = theme;
            if let Some(state) = record.host_mut() {
                state.props = resolved.props;
                state.layout = layout;
            }
        }
        Ok(Patched { id, geometry })
    }

    // =========================================================================
    // Fragments
    // =========================================================================

    fn patch_fragment(&mut self, id: MountId, fragment: &Rc<FragmentNode>, next: &VNode, theme: Theme) -> Result<Patched> {
        let Some(record) = self.records.get(id) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let Mounted::Fragment { children: old_children } = &record.kind else {
            return self.replace(id, next, theme);
        };
        let old_children = old_children.clone();
        let host_parent = record.host_parent.clone();

        let children = flatten_children(&fragment.children);
        if children.is_empty() {
            return Err(Error::EmptyFragment { path: self.path(id) });
        }
        if let Some(record) = self.records.get_mut(id) {
            record.vnode = next.clone();
            record.theme = theme.clone();
        }

        self.check_keys(id, &children);
        let outcome = match self.patch_children(id, &host_parent, &old_children, &children, theme) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.set_children(id, Vec::new());
                return Err(err);
            }
        };
        self.set_children(id, outcome.ids);
        Ok(Patched {
            id,
            geometry: outcome.geometry,
        })
    }

    // =========================================================================
    // Components
    // =========================================================================

    fn patch_component(&mut self, id: MountId, component: &Rc<ComponentNode>, next: &VNode, theme: Theme) -> Result<Patched> {
        let Some(record) = self.records.get_mut(id) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        record.vnode = next.clone();
        record.theme = theme.clone();
        let depth = record.depth;
        let Some(ctx) = record.component().map(|state| state.ctx) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };

        let Some(ctx_id) = ctx else {
            // Pure factory: nothing to compare against, render again.
            let (ctx, output) = self.first_render(id, depth, component, theme.clone())?;
            if let Some(state) = self.records.get_mut(id).and_then(MountRecord::component_mut) {
                state.ctx = ctx;
            }
            let geometry = self.patch_rendered(id, output, theme)?;
            if let Some(ctx) = ctx {
                self.run_effects(ctx);
            }
            return Ok(Patched { id, geometry });
        };

        let Some(ctx) = self.contexts.get_mut(ctx_id) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let previous = std::mem::replace(&mut ctx.last, component.clone());
        let theme_unchanged = same_theme(&ctx.theme, &theme);
        ctx.theme = theme;

        if component.memo != Some(false) && theme_unchanged && !self.scheduler.is_pending(ctx_id) {
            if previous.same_inputs(component) {
                trace!(?id, component = component.component.name(), "memo skip");
                return Ok(Patched { id, geometry: false });
            }
            if previous.same_children(component) {
                if let Some(names) = previous.props.callback_only_changes(&component.props) {
                    self.report_unstable_callbacks(id, component, &names);
                }
            }
        }

        let geometry = self.rerender(id, ctx_id)?;
        Ok(Patched { id, geometry })
    }

    fn report_unstable_callbacks(&mut self, id: MountId, component: &ComponentNode, names: &[Rc<str>]) {
        let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
        let path = self.path(id);
        self.diagnostics.report(
            DiagnosticKind::UnstableCallback,
            path,
            format!(
                "`{}` re-rendered only because callback props changed identity ({}); wrap them in use_callback",
                component.component.name(),
                names.join(", ")
            ),
        );
    }

    /// Re-render a component instance with its current node and patch the
    /// new output over the old one. Effects run after the host is updated.
    pub(crate) fn rerender(&mut self, id: MountId, ctx_id: CtxId) -> Result<bool> {
        let output = self.render(ctx_id)?;
        let theme = self.records.get(id).and_then(|record| record.theme.clone());
        let geometry = self.patch_rendered(id, output, theme)?;
        self.run_effects(ctx_id);
        Ok(geometry)
    }

    /// Patch a component's previous output against `output`, moving between
    /// rendered and empty states as needed.
    fn patch_rendered(&mut self, id: MountId, output: Element, theme: Theme) -> Result<bool> {
        let Some(record) = self.records.get(id) else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let Some(state) = record.component() else {
            return Err(Error::NotMounted(format!("{id:?}")));
        };
        let host_parent = record.host_parent.clone();
        let placeholder = state.placeholder.clone();
        let rendered = state.rendered.filter(|&child| self.records.contains(child));

        let (rendered, placeholder, geometry) = match (rendered, VNode::normalize(output)) {
            (Some(child), Some(next)) => {
                let patched = self.patch_node(child, &next, theme);
                let patched = self.keep_rendered(id, patched)?;
                (Some(patched.id), None, patched.geometry)
            }
            (Some(child), None) => {
                self.unmount(child);
                let node = self.host.create(PLACEHOLDER_TAG, &placeholder_props());
                (None, Some(node), true)
            }
            (None, Some(next)) => {
                if let Some(node) = &placeholder {
                    self.host.remove(&host_parent, node);
                }
                let mounted = self.mount_node(id, &host_parent, &next, theme);
                let child = self.keep_rendered(id, mounted)?;
                (Some(child), None, true)
            }
            (None, None) => (None, placeholder, false),
        };

        if let Some(state) = self.records.get_mut(id).and_then(MountRecord::component_mut) {
            state.rendered = rendered;
            state.placeholder = placeholder;
        }
        Ok(geometry)
    }

    /// On failure the component is left with nothing rendered.
    fn keep_rendered<T>(&mut self, id: MountId, result: Result<T>) -> Result<T> {
        if result.is_err() {
            if let Some(state) = self.records.get_mut(id).and_then(MountRecord::component_mut) {
                state.rendered = None;
                state.placeholder = None;
            }
        }
        result
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Diff `old` records against `next` VNodes under `parent`. Matching is by
    /// key when every sibling on both sides has a distinct key, else by index.
    /// On error every child is torn down.
    pub(crate) fn patch_children(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        old: &[MountId],
        next: &[VNode],
        theme: Theme,
    ) -> Result<ChildrenOutcome> {
        let old: Vec<MountId> = old.iter().copied().filter(|&id| self.records.contains(id)).collect();
        let old_keys: Vec<Option<Key>> = old
            .iter()
            .map(|&id| self.records.get(id).and_then(|record| record.vnode.key().cloned()))
            .collect();

        if !old.is_empty() && distinct_keys(old_keys.iter().map(Option::as_ref)) && distinct_keys(next.iter().map(VNode::key)) {
            self.diff_keyed(parent, host_parent, &old, &old_keys, next, theme)
        } else {
            self.diff_positional(parent, host_parent, &old, next, theme)
        }
    }

    fn diff_positional(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        old: &[MountId],
        next: &[VNode],
        theme: Theme,
    ) -> Result<ChildrenOutcome> {
        for &surplus in old.iter().skip(next.len()) {
            self.unmount(surplus);
        }

        let mut geometry = old.len() != next.len();
        let mut ids = Vec::with_capacity(next.len());
        for (index, vnode) in next.iter().enumerate() {
            let step = match old.get(index) {
                Some(&old_id) => self.patch_node(old_id, vnode, theme.clone()).map(|patched| {
                    geometry |= patched.geometry || patched.id != old_id;
                    patched.id
                }),
                None => self.mount_node(parent, host_parent, vnode, theme.clone()),
            };
            match step {
                Ok(id) => ids.push(id),
                Err(err) => {
                    let unvisited = old.get(index..next.len().min(old.len())).unwrap_or_default();
                    ids.extend_from_slice(unvisited);
                    self.teardown(ids);
                    return Err(err);
                }
            }
        }
        Ok(ChildrenOutcome { ids, geometry })
    }

    fn diff_keyed(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        old: &[MountId],
        old_keys: &[Option<Key>],
        next: &[VNode],
        theme: Theme,
    ) -> Result<ChildrenOutcome> {
        let next_keys: HashSet<&Key> = next.iter().filter_map(VNode::key).collect();
        let mut by_key: HashMap<Key, (usize, MountId)> = HashMap::with_capacity(old.len());
        for (index, (&id, key)) in old.iter().zip(old_keys).enumerate() {
            let Some(key) = key else {
                continue;
            };
            if next_keys.contains(key) {
                by_key.insert(key.clone(), (index, id));
            } else {
                self.unmount(id);
            }
        }

        let mut geometry = old.len() != next.len();
        let mut ids = Vec::with_capacity(next.len());
        for (index, vnode) in next.iter().enumerate() {
            let matched = vnode.key().and_then(|key| by_key.remove(key));
            let step = match matched {
                Some((old_index, old_id)) => self.patch_node(old_id, vnode, theme.clone()).map(|patched| {
                    geometry |= patched.geometry || patched.id != old_id || old_index != index;
                    patched.id
                }),
                None => {
                    geometry = true;
                    self.mount_node(parent, host_parent, vnode, theme.clone())
                }
            };
            match step {
                Ok(id) => ids.push(id),
                Err(err) => {
                    ids.extend(by_key.into_values().map(|(_, id)| id));
                    self.teardown(ids);
                    return Err(err);
                }
            }
        }
        Ok(ChildrenOutcome { ids, geometry })
    }
}

fn distinct_keys<'a>(keys: impl Iterator<Item = Option<&'a Key>>) -> bool {
    let mut seen = HashSet::new();
    for key in keys {
        match key {
            Some(key) if seen.insert(key) => {}
            _ => return false,
        }
    }
    true
}
