//! Mount API - runtime lifecycle.
//!
//! # Example
//!
//! ```
//! use spark_scene::config::Config;
//! use spark_scene::host::MemoryHost;
//! use spark_scene::pipeline::Runtime;
//! use spark_scene::types::Size;
//! use spark_scene::vdom::{text, view};
//!
//! let mut host = MemoryHost::new();
//! let root = host.create_root(Size::new(80.0, 24.0));
//! let runtime = Runtime::new(host, Config::default());
//!
//! let handle = runtime.mount(root, view().child(text("hello"))).unwrap();
//!
//! // Each frame: apply state updates, then deferred work.
//! runtime.tick().unwrap();
//!
//! handle.unmount().unwrap();
//! ```

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gesture::GestureSink;
use crate::host::HostBridge;
use crate::reconciler::{Diagnostic, Reconciler};
use crate::theme::ThemeResolver;
use crate::vdom::VNode;

type Shared<H> = Rc<RefCell<Reconciler<H>>>;

fn enter<'a, H: HostBridge>(inner: &'a Shared<H>, op: &'static str) -> Result<RefMut<'a, Reconciler<H>>> {
    inner.try_borrow_mut().map_err(|_| Error::RuntimeBusy(op))
}

// =============================================================================
// Runtime
// =============================================================================

/// Owns the host and every tree mounted on it.
///
/// Cheap to clone; clones share state. Calls made from inside a render,
/// effect, or ref callback fail with [`Error::RuntimeBusy`].
pub struct Runtime<H: HostBridge> {
    inner: Shared<H>,
}

impl<H: HostBridge> Clone for Runtime<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: HostBridge> fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

impl<H: HostBridge + 'static> Runtime<H> {
    pub fn new(host: H, config: Config) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Reconciler::new(host, config))),
        }
    }

    /// Replace the default theme resolver.
    pub fn with_theme(self, theme: impl ThemeResolver + 'static) -> Self {
        self.inner.borrow_mut().set_theme(Box::new(theme));
        self
    }

    /// Notify `gestures` of hit-area changes after layout.
    pub fn with_gestures(self, gestures: impl GestureSink<H::Node> + 'static) -> Self {
        self.inner.borrow_mut().set_gestures(Box::new(gestures));
        self
    }

    /// Mount `tree` into `root`.
    ///
    /// Mounting again into the same root patches the existing tree in
    /// place and returns an equivalent handle.
    pub fn mount(&self, root: H::Node, tree: impl Into<VNode>) -> Result<MountHandle<H>> {
        enter(&self.inner, "mount")?.mount_root(root.clone(), tree.into())?;
        Ok(MountHandle {
            runtime: Rc::downgrade(&self.inner),
            root,
        })
    }

    pub fn unmount(&self, root: &H::Node) -> Result<()> {
        enter(&self.inner, "unmount")?.unmount_root(root)
    }

    /// Re-read the root's size and re-run layout if it changed.
    pub fn resize(&self, root: &H::Node) -> Result<bool> {
        enter(&self.inner, "resize")?.resize_root(root)
    }

    /// Apply every pending state update. Returns the number of component
    /// renders.
    pub fn flush(&self) -> Result<usize> {
        enter(&self.inner, "flush")?.flush()
    }

    /// Run work deferred from earlier layout passes. Returns the number of
    /// hit areas refreshed.
    pub fn frame(&self) -> Result<usize> {
        Ok(enter(&self.inner, "frame")?.frame())
    }

    /// One host frame: [`frame`](Self::frame) for work queued by earlier
    /// ticks, then [`flush`](Self::flush). Hit areas touched by this tick's
    /// layout refresh on the next tick. Returns the number of component
    /// renders.
    pub fn tick(&self) -> Result<usize> {
        let mut reconciler = enter(&self.inner, "tick")?;
        reconciler.frame();
        reconciler.flush()
    }

    pub fn is_mounted(&self, root: &H::Node) -> bool {
        self.inner.try_borrow().is_ok_and(|r| r.is_mounted(root))
    }

    /// No updates scheduled and no deferred work queued.
    pub fn is_idle(&self) -> bool {
        self.inner.try_borrow().is_ok_and(|r| r.is_idle())
    }

    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> Result<R> {
        let reconciler = self.inner.try_borrow().map_err(|_| Error::RuntimeBusy("with_host"))?;
        Ok(f(&reconciler.host))
    }

    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> Result<R> {
        let mut reconciler = enter(&self.inner, "with_host_mut")?;
        Ok(f(&mut reconciler.host))
    }

    /// Retained diagnostics, oldest first.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.try_borrow().map(|r| r.diagnostics()).unwrap_or_default()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.inner
            .try_borrow_mut()
            .map(|mut r| r.take_diagnostics())
            .unwrap_or_default()
    }
}

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`Runtime::mount`].
///
/// Holds the runtime weakly: dropping the handle leaves the tree mounted,
/// and the handle stops working once the runtime is gone.
pub struct MountHandle<H: HostBridge> {
    runtime: Weak<RefCell<Reconciler<H>>>,
    root: H::Node,
}

impl<H: HostBridge> MountHandle<H> {
    pub fn root(&self) -> &H::Node {
        &self.root
    }

    /// Unmount the tree, removing every native node it created.
    pub fn unmount(self) -> Result<()> {
        let inner = self.runtime.upgrade().ok_or(Error::RuntimeDropped)?;
        let mut reconciler = enter(&inner, "unmount")?;
        reconciler.unmount_root(&self.root)
    }

    pub fn is_mounted(&self) -> bool {
        self.runtime
            .upgrade()
            .is_some_and(|inner| inner.try_borrow().is_ok_and(|r| r.is_mounted(&self.root)))
    }
}

impl<H: HostBridge> fmt::Debug for MountHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountHandle").field("root", &self.root).finish()
    }
}
