//! Mount pass.

use std::rc::Rc;

use tracing::debug;

use super::{ComponentState, DiagnosticKind, HostState, MountId, MountRecord, Mounted, Reconciler, placeholder_props};
use crate::error::{Error, Result};
use crate::hooks::{Ctx, CtxId, Scope};
use crate::host::{HostBridge, PLACEHOLDER_TAG, TEXT_TAG};
use crate::layout::LayoutRecord;
use crate::theme::ThemeOverride;
use crate::vdom::{ComponentNode, Element, ElementNode, FragmentNode, Props, VNode, flatten_children};

type Theme = Option<Rc<ThemeOverride>>;

impl<H: HostBridge> Reconciler<H> {
    /// Mount `vnode` under record `parent`, appending its native nodes to
    /// `host_parent`. On error nothing of `vnode` stays mounted.
    pub(crate) fn mount_node(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        vnode: &VNode,
        theme: Theme,
    ) -> Result<MountId> {
        match vnode {
            VNode::Element(element) => self.mount_element(parent, host_parent, element, vnode, theme),
            VNode::Text(text) => Ok(self.mount_text(parent, host_parent, text, vnode, theme)),
            VNode::Fragment(fragment) => self.mount_fragment(parent, host_parent, fragment, vnode, theme),
            VNode::Component(component) => self.mount_component(parent, host_parent, component, vnode, theme),
            VNode::List(_) | VNode::Null => match VNode::normalize(Some(vnode.clone())) {
                Some(normalized) => self.mount_node(parent, host_parent, &normalized, theme),
                None => Ok(self.mount_malformed(parent, host_parent, vnode, theme, "empty node in a child list")),
            },
        }
    }

    /// Mount `children` in order. Already-mounted siblings are torn down if one fails.
    pub(crate) fn mount_children(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        children: &[VNode],
        theme: Theme,
    ) -> Result<Vec<MountId>> {
        let mut ids = Vec::with_capacity(children.len());
        for child in children {
            match self.mount_node(parent, host_parent, child, theme.clone()) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    self.teardown(ids);
                    return Err(err);
                }
            }
        }
        Ok(ids)
    }

    fn mount_element(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        element: &Rc<ElementNode>,
        vnode: &VNode,
        theme: Theme,
    ) -> Result<MountId> {
        if element.tag.trim().is_empty() {
            return Ok(self.mount_malformed(parent, host_parent, vnode, theme, "element has an empty tag"));
        }

        let resolved = self.theme.resolve(element.tag, theme.as_ref(), &element.props);
        let node = self.host.create(element.tag, &resolved.props);
        let caps = self.host.caps(&node);
        let node_ref = resolved.props.node_ref.clone();
        let child_theme = resolved.for_children;
        let depth = self.depth_under(parent);
        let id = self.records.insert(MountRecord {
            vnode: vnode.clone(),
            parent: Some(parent),
            host_parent: host_parent.clone(),
            theme,
            depth,
            kind: Mounted::Host(HostState {
                node: node.clone(),
                tag: element.tag,
                caps,
                layout: LayoutRecord::from(&resolved.props.style),
                props: resolved.props,
                children: Vec::new(),
                native_children: Vec::new(),
                child_theme: child_theme.clone(),
                frame: None,
                laid_out: None,
                clip: None,
                owned: true,
            }),
        });
        if let Some(node_ref) = &node_ref {
            node_ref.attach(&node);
        }
        self.host.append(host_parent, &node);
        debug!(?id, tag = element.tag, ?node, "mount element");

        let children = flatten_children(&element.children);
        self.check_keys(id, &children);
        let ids = match self.mount_children(id, &node, &children, child_theme) {
            Ok(ids) => ids,
            Err(err) => {
                self.unmount(id);
                return Err(err);
            }
        };
        let native = self.collect_native(&ids);
        if let Some(state) = self.host_state_mut(id) {
            state.children = ids;
            state.native_children = native;
        }

        if self.host_state(id).is_some_and(HostState::is_container) {
            self.relayout(id);
        }
        Ok(id)
    }

    fn mount_text(&mut self, parent: MountId, host_parent: &H::Node, text: &Rc<str>, vnode: &VNode, theme: Theme) -> MountId {
        let explicit = Props {
            text: Some(text.clone()),
            ..Props::default()
        };
        let resolved = self.theme.resolve(TEXT_TAG, theme.as_ref(), &explicit);
        let node = self.host.create(TEXT_TAG, &resolved.props);
        let caps = self.host.caps(&node);
        let depth = self.depth_under(parent);
        let id = self.records.insert(MountRecord {
            vnode: vnode.clone(),
            parent: Some(parent),
            host_parent: host_parent.clone(),
            theme,
            depth,
            kind: Mounted::Host(HostState {
                node: node.clone(),
                tag: TEXT_TAG,
                caps,
                layout: LayoutRecord::from(&resolved.props.style),
                props: resolved.props,
                children: Vec::new(),
                native_children: Vec::new(),
                child_theme: None,
                frame: None,
                laid_out: None,
                clip: None,
                owned: true,
            }),
        });
        self.host.append(host_parent, &node);
        id
    }

    /// Mount an invisible stand-in so siblings still mount, and report where.
    fn mount_malformed(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        vnode: &VNode,
        theme: Theme,
        reason: &str,
    ) -> MountId {
        let node = self.host.create(PLACEHOLDER_TAG, &placeholder_props());
        self.host.append(host_parent, &node);
        let path = self.child_path(parent, PLACEHOLDER_TAG);
        self.diagnostics
            .report(DiagnosticKind::MalformedNode, path, format!("{reason}; rendered a placeholder"));
        let depth = self.depth_under(parent);
        self.records.insert(MountRecord {
            vnode: vnode.clone(),
            parent: Some(parent),
            host_parent: host_parent.clone(),
            theme,
            depth,
            kind: Mounted::Placeholder { node },
        })
    }

    fn mount_fragment(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        fragment: &Rc<FragmentNode>,
        vnode: &VNode,
        theme: Theme,
    ) -> Result<MountId> {
        let children = flatten_children(&fragment.children);
        if children.is_empty() {
            return Err(Error::EmptyFragment {
                path: self.child_path(parent, "Fragment"),
            });
        }

        let depth = self.depth_under(parent);
        let id = self.records.insert(MountRecord {
            vnode: vnode.clone(),
            parent: Some(parent),
            host_parent: host_parent.clone(),
            theme: theme.clone(),
            depth,
            kind: Mounted::Fragment { children: Vec::new() },
        });
        self.check_keys(id, &children);
        match self.mount_children(id, host_parent, &children, theme) {
            Ok(ids) => {
                self.set_children(id, ids);
                Ok(id)
            }
            Err(err) => {
                self.records.remove(id);
                self.forget_warnings(id);
                Err(err)
            }
        }
    }

    fn mount_component(
        &mut self,
        parent: MountId,
        host_parent: &H::Node,
        component: &Rc<ComponentNode>,
        vnode: &VNode,
        theme: Theme,
    ) -> Result<MountId> {
        let depth = self.depth_under(parent);
        let id = self.records.insert(MountRecord {
            vnode: vnode.clone(),
            parent: Some(parent),
            host_parent: host_parent.clone(),
            theme: theme.clone(),
            depth,
            kind: Mounted::Component(ComponentState {
                ctx: None,
                rendered: None,
                placeholder: None,
            }),
        });
        debug!(?id, component = component.component.name(), "mount component");

        let (ctx, output) = match self.first_render(id, depth, component, theme.clone()) {
            Ok(rendered) => rendered,
            Err(err) => {
                self.records.remove(id);
                return Err(err);
            }
        };
        if let Some(state) = self.records.get_mut(id).and_then(MountRecord::component_mut) {
            state.ctx = ctx;
        }

        match VNode::normalize(output) {
            Some(output) => match self.mount_node(id, host_parent, &output, theme) {
                Ok(child) => {
                    if let Some(state) = self.records.get_mut(id).and_then(MountRecord::component_mut) {
                        state.rendered = Some(child);
                    }
                }
                Err(err) => {
                    if let Some(ctx) = ctx {
                        self.dispose_ctx(ctx);
                    }
                    self.records.remove(id);
                    return Err(err);
                }
            },
            None => {
                let node = self.host.create(PLACEHOLDER_TAG, &placeholder_props());
                if let Some(state) = self.records.get_mut(id).and_then(MountRecord::component_mut) {
                    state.placeholder = Some(node);
                }
            }
        }

        if let Some(ctx) = ctx {
            self.run_effects(ctx);
        }
        Ok(id)
    }

    /// Render a component instance that has no context yet. The context is
    /// kept when the render used hooks or the node forces memoization;
    /// otherwise the instance is a pure factory and the context is dropped.
    pub(crate) fn first_render(
        &mut self,
        record: MountId,
        depth: usize,
        component: &Rc<ComponentNode>,
        theme: Theme,
    ) -> Result<(Option<CtxId>, Element)> {
        let ctx_id = self.contexts.insert(Ctx::new(record, depth, component.clone(), theme));
        let output = match self.render(ctx_id) {
            Ok(output) => output,
            Err(err) => {
                self.contexts.remove(ctx_id);
                return Err(err);
            }
        };
        let keep = component.memo == Some(true) || self.contexts.get(ctx_id).is_some_and(|ctx| !ctx.slots.is_empty());
        if keep {
            Ok((Some(ctx_id), output))
        } else {
            self.scheduler.cancel(ctx_id);
            self.contexts.remove(ctx_id);
            Ok((None, output))
        }
    }

    /// Run the component behind `ctx_id` with its last node.
    pub(crate) fn render(&mut self, ctx_id: CtxId) -> Result<Element> {
        let Some(ctx) = self.contexts.get_mut(ctx_id) else {
            return Ok(None);
        };
        let node = ctx.last.clone();
        self.scheduler.cancel(ctx_id);

        let mut scope = Scope::new(ctx, ctx_id, &self.scheduler);
        let output = node.component.render(&mut scope, &node.props, &node.children);
        let used = scope.finish();
        ctx.finish_render(used)?;
        Ok(output)
    }

    pub(crate) fn run_effects(&mut self, ctx_id: CtxId) {
        if let Some(ctx) = self.contexts.get_mut(ctx_id) {
            ctx.run_effects();
        }
    }

    pub(crate) fn dispose_ctx(&mut self, ctx_id: CtxId) {
        self.scheduler.cancel(ctx_id);
        if let Some(mut ctx) = self.contexts.remove(ctx_id) {
            ctx.dispose();
        }
    }
}
