//! Mount records - what the reconciler remembers about each mounted VNode.

use std::rc::Rc;

use crate::hooks::CtxId;
use crate::host::NodeCaps;
use crate::layout::LayoutRecord;
use crate::theme::ThemeOverride;
use crate::types::{Frame, Size};
use crate::vdom::{Props, VNode};

use super::MountId;

pub(crate) struct MountRecord<N> {
    /// Node this record was last mounted or patched with.
    pub vnode: VNode,
    pub parent: Option<MountId>,
    /// Native node that this record's native nodes are appended to.
    pub host_parent: N,
    /// Style context inherited from ancestors.
    pub theme: Option<Rc<ThemeOverride>>,
    pub depth: usize,
    pub kind: Mounted<N>,
}

pub(crate) enum Mounted<N> {
    /// Element, text, or mount root: owns one native node.
    Host(HostState<N>),
    Component(ComponentState<N>),
    Fragment { children: Vec<MountId> },
    /// Stand-in for a malformed node.
    Placeholder { node: N },
}

pub(crate) struct HostState<N> {
    pub node: N,
    pub tag: &'static str,
    pub caps: NodeCaps,
    /// Effective (theme-resolved) props.
    pub props: Props,
    pub layout: LayoutRecord,
    pub children: Vec<MountId>,
    /// Native nodes of `children`, in order, as last synced to the host.
    pub native_children: Vec<N>,
    /// Context handed to children.
    pub child_theme: Option<Rc<ThemeOverride>>,
    /// Frame assigned by the parent's last layout pass.
    pub frame: Option<Frame>,
    /// Box size used by this container's last layout pass.
    pub laid_out: Option<Size>,
    pub clip: Option<Frame>,
    /// `false` for mount roots, whose native node belongs to the caller.
    pub owned: bool,
}

impl<N> HostState<N> {
    pub fn is_container(&self) -> bool {
        self.caps.contains(NodeCaps::CONTAINER)
    }
}

pub(crate) struct ComponentState<N> {
    /// `None` for pure factories (no hooks, memo not forced).
    pub ctx: Option<CtxId>,
    pub rendered: Option<MountId>,
    /// Created when the render returned nothing; never appended.
    pub placeholder: Option<N>,
}

impl<N> MountRecord<N> {
    pub fn host(&self) -> Option<&HostState<N>> {
        match &self.kind {
            Mounted::Host(state) => Some(state),
            _ => None,
        }
    }

    pub fn host_mut(&mut self) -> Option<&mut HostState<N>> {
        match &mut self.kind {
            Mounted::Host(state) => Some(state),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&ComponentState<N>> {
        match &self.kind {
            Mounted::Component(state) => Some(state),
            _ => None,
        }
    }

    pub fn component_mut(&mut self) -> Option<&mut ComponentState<N>> {
        match &mut self.kind {
            Mounted::Component(state) => Some(state),
            _ => None,
        }
    }

    /// Name shown in diagnostic paths.
    pub fn label(&self) -> &str {
        match &self.kind {
            Mounted::Host(state) => state.tag,
            Mounted::Placeholder { .. } => "#placeholder",
            _ => self.vnode.display_name(),
        }
    }
}
