//! Unmount pass.

use tracing::debug;

use super::{MountId, Mounted, Reconciler};
use crate::host::HostBridge;

impl<H: HostBridge> Reconciler<H> {
    /// Tear down `id` and everything below it. Unknown ids are ignored.
    ///
    /// Host nodes: ref detached, children torn down, then the native node
    /// removed. Components: hook cleanups run before the rendered output is
    /// torn down.
    pub(crate) fn unmount(&mut self, id: MountId) {
        let Some(record) = self.records.remove(id) else {
            return;
        };
        self.forget_warnings(id);
        let host_parent = record.host_parent;

        match record.kind {
            Mounted::Host(state) => {
                if let Some(node_ref) = &state.props.node_ref {
                    node_ref.detach();
                }
                for child in state.children {
                    self.unmount(child);
                }
                self.gestures.forget(&state.node);
                if state.owned {
                    self.host.remove(&host_parent, &state.node);
                }
                debug!(?id, tag = state.tag, "unmounted");
            }
            Mounted::Component(state) => {
                if let Some(ctx) = state.ctx {
                    self.dispose_ctx(ctx);
                }
                if let Some(rendered) = state.rendered {
                    self.unmount(rendered);
                }
                // Never appended, but the host still owns it.
                if let Some(node) = state.placeholder {
                    self.host.remove(&host_parent, &node);
                }
            }
            Mounted::Fragment { children } => {
                for child in children {
                    self.unmount(child);
                }
            }
            Mounted::Placeholder { node } => {
                self.host.remove(&host_parent, &node);
            }
        }
    }

    /// Unmount a batch of sibling records.
    pub(crate) fn teardown(&mut self, ids: impl IntoIterator<Item = MountId>) {
        for id in ids {
            self.unmount(id);
        }
    }
}
