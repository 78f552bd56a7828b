//! Per-instance hook storage.

use std::any::Any;
use std::rc::Rc;

use crate::arena::arena_key;
use crate::error::{Error, Result};
use crate::reconciler::MountId;
use crate::theme::ThemeOverride;
use crate::vdom::ComponentNode;

arena_key!(
    /// Handle to a component instance's hook context.
    CtxId
);

/// Cleanup returned by an effect.
pub type Cleanup = Box<dyn FnOnce()>;

pub(crate) enum Slot {
    /// `Rc<RefCell<T>>` shared with setters.
    State(Box<dyn Any>),
    /// `Rc<RefCell<T>>` handed out by `use_ref`.
    Ref(Box<dyn Any>),
    Memo {
        deps: Box<dyn Any>,
        value: Box<dyn Any>,
    },
    Effect {
        /// `None` re-runs after every render.
        deps: Option<Box<dyn Any>>,
        cleanup: Option<Cleanup>,
    },
}

impl Slot {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::State(_) => "use_state",
            Self::Ref(_) => "use_ref",
            Self::Memo { .. } => "use_memo",
            Self::Effect { .. } => "use_effect",
        }
    }
}

pub(crate) struct PendingEffect {
    pub slot: usize,
    pub run: Box<dyn FnOnce() -> Option<Cleanup>>,
}

/// Hook context of one mounted component instance.
pub(crate) struct Ctx {
    pub record: MountId,
    pub depth: usize,
    /// Node of the last render (props and children for the memo gate).
    pub last: Rc<ComponentNode>,
    /// Style context inherited at the last render.
    pub theme: Option<Rc<ThemeOverride>>,
    pub slots: Vec<Slot>,
    /// Slot count fixed by the first render.
    pub expected: Option<usize>,
    pub pending: Vec<PendingEffect>,
    pub violation: Option<Error>,
}

impl Ctx {
    pub fn new(
        record: MountId,
        depth: usize,
        node: Rc<ComponentNode>,
        theme: Option<Rc<ThemeOverride>>,
    ) -> Self {
        Self {
            record,
            depth,
            last: node,
            theme,
            slots: Vec::new(),
            expected: None,
            pending: Vec::new(),
            violation: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.last.component.name()
    }

    pub fn record_violation(&mut self, slot: usize, expected: &'static str, found: &'static str) {
        if self.violation.is_none() {
            self.violation = Some(Error::HookOrder {
                component: self.name().to_string(),
                slot,
                expected,
                found,
            });
        }
    }

    /// Close a render that consumed `used` slots.
    pub fn finish_render(&mut self, used: usize) -> Result<()> {
        if let Some(err) = self.violation.take() {
            self.pending.clear();
            return Err(err);
        }
        match self.expected {
            None => self.expected = Some(used),
            Some(expected) if expected != used => {
                self.pending.clear();
                return Err(Error::HookCount {
                    component: self.name().to_string(),
                    expected,
                    found: used,
                });
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Run effects scheduled by the last render, in slot order.
    pub fn run_effects(&mut self) {
        for PendingEffect { slot, run } in std::mem::take(&mut self.pending) {
            if let Some(Slot::Effect { cleanup, .. }) = self.slots.get_mut(slot) {
                if let Some(previous) = cleanup.take() {
                    previous();
                }
                *cleanup = run();
            }
        }
    }

    /// Run every outstanding cleanup, in slot order. Pending effects are dropped.
    pub fn dispose(&mut self) {
        self.pending.clear();
        for slot in &mut self.slots {
            if let Slot::Effect { cleanup, .. } = slot {
                if let Some(cleanup) = cleanup.take() {
                    cleanup();
                }
            }
        }
    }
}
