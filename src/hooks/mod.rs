//! Hooks - per-instance state for component render functions.
//!
//! A render function receives a [`Scope`] bound to its instance's context.
//! Each hook call consumes the next slot of that context, so hooks must be
//! called in the same order and the same number of times on every render.
//! A render that breaks this rule fails with
//! [`Error::HookOrder`](crate::Error::HookOrder) or
//! [`Error::HookCount`](crate::Error::HookCount).
//!
//! Hooks can only be called through a `Scope`, which only exists while the
//! runtime is rendering the component.
//!
//! ```
//! use spark_scene::hooks::Scope;
//! use spark_scene::vdom::{Element, Props, VNode, text};
//!
//! fn counter(cx: &mut Scope<'_>, _props: &Props, _children: &[VNode]) -> Element {
//!     let (count, _set_count) = cx.use_state(|| 0);
//!     Some(text(format!("count: {count}")))
//! }
//! ```

mod ctx;
mod scheduler;

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use ctx::{Cleanup, CtxId};
pub(crate) use ctx::{Ctx, PendingEffect, Slot};
pub(crate) use scheduler::FrameQueue;
pub use scheduler::Scheduler;

use crate::theme::ThemeOverride;
use crate::vdom::{Callback, Value};

// =============================================================================
// Setter
// =============================================================================

/// Updates one `use_state` slot and schedules its component.
pub struct Setter<T> {
    cell: Rc<RefCell<T>>,
    owner: CtxId,
    scheduler: Scheduler,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            owner: self.owner,
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").field("owner", &self.owner).finish()
    }
}

impl<T: PartialEq> Setter<T> {
    /// Store `next` and schedule a re-render, unless it equals the current value.
    pub fn set(&self, next: T) {
        if *self.cell.borrow() == next {
            return;
        }
        *self.cell.borrow_mut() = next;
        self.scheduler.schedule(self.owner);
    }

    /// Functional form: compute the next value from the latest one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.cell.borrow());
        self.set(next);
    }
}

impl<T: Clone> Setter<T> {
    /// Latest stored value, including updates not rendered yet.
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Hook access for one render of one component instance.
pub struct Scope<'r> {
    ctx: &'r mut Ctx,
    id: CtxId,
    scheduler: &'r Scheduler,
    cursor: usize,
}

impl<'r> Scope<'r> {
    pub(crate) fn new(ctx: &'r mut Ctx, id: CtxId, scheduler: &'r Scheduler) -> Self {
        Self {
            ctx,
            id,
            scheduler,
            cursor: 0,
        }
    }

    /// Slots consumed by this render.
    pub(crate) fn finish(self) -> usize {
        self.cursor
    }

    pub fn component_name(&self) -> &'static str {
        self.ctx.name()
    }

    /// Style context inherited from the nearest themed ancestor.
    pub fn theme(&self) -> Option<Rc<ThemeOverride>> {
        self.ctx.theme.clone()
    }

    /// Local state. `init` runs on the first render only.
    pub fn use_state<T>(&mut self, init: impl FnOnce() -> T) -> (T, Setter<T>)
    where
        T: Clone + PartialEq + 'static,
    {
        let cell = self.cell_slot(true, init);
        let value = cell.borrow().clone();
        let setter = Setter {
            cell,
            owner: self.id,
            scheduler: self.scheduler.clone(),
        };
        (value, setter)
    }

    /// A mutable box that survives re-renders. Writing to it never schedules a render.
    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        self.cell_slot(false, init)
    }

    /// Cache `compute()` until `deps` changes.
    pub fn use_memo<D, T>(&mut self, deps: D, compute: impl FnOnce() -> T) -> T
    where
        D: PartialEq + 'static,
        T: Clone + 'static,
    {
        let index = self.claim();
        if let Some(Slot::Memo { deps: old_deps, value }) = self.ctx.slots.get_mut(index) {
            if let (Some(old), Some(cached)) = (old_deps.downcast_ref::<D>(), value.downcast_ref::<T>()) {
                if *old == deps {
                    return cached.clone();
                }
                let fresh = compute();
                *old_deps = Box::new(deps);
                *value = Box::new(fresh.clone());
                return fresh;
            }
        }

        let fresh = compute();
        let slot = Slot::Memo {
            deps: Box::new(deps),
            value: Box::new(fresh.clone()),
        };
        self.replace(index, slot, type_name::<T>());
        fresh
    }

    /// A callback whose identity only changes when `deps` changes.
    pub fn use_callback<D>(&mut self, deps: D, f: impl Fn(&Value) + 'static) -> Callback
    where
        D: PartialEq + 'static,
    {
        self.use_memo(deps, move || Callback::new(f))
    }

    /// Run `effect` after commit when `deps` changed since the last render.
    ///
    /// The previous run's cleanup is called first; the last cleanup runs on unmount.
    pub fn use_effect<D, F>(&mut self, deps: D, effect: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        let index = self.claim();
        let changed = match self.ctx.slots.get_mut(index) {
            Some(Slot::Effect { deps: prev, .. }) => {
                let same = prev
                    .as_ref()
                    .and_then(|p| p.downcast_ref::<D>())
                    .is_some_and(|p| *p == deps);
                if !same {
                    *prev = Some(Box::new(deps));
                }
                !same
            }
            _ => {
                let slot = Slot::Effect {
                    deps: Some(Box::new(deps)),
                    cleanup: None,
                };
                self.replace(index, slot, type_name::<D>());
                true
            }
        };
        if changed {
            self.ctx.pending.push(PendingEffect {
                slot: index,
                run: Box::new(effect),
            });
        }
    }

    /// Run `effect` after every commit.
    pub fn use_effect_always<F>(&mut self, effect: F)
    where
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        let index = self.claim();
        match self.ctx.slots.get_mut(index) {
            Some(Slot::Effect { deps, .. }) => *deps = None,
            _ => {
                let slot = Slot::Effect {
                    deps: None,
                    cleanup: None,
                };
                self.replace(index, slot, "use_effect");
            }
        }
        self.ctx.pending.push(PendingEffect {
            slot: index,
            run: Box::new(effect),
        });
    }

    // =========================================================================
    // Slot bookkeeping
    // =========================================================================

    fn claim(&mut self) -> usize {
        let index = self.cursor;
        self.cursor += 1;
        index
    }

    /// Install `slot` at `index`. Overwriting an existing slot means the
    /// render called a different hook (or type) than last time.
    fn replace(&mut self, index: usize, slot: Slot, type_label: &'static str) {
        let kind = slot.kind();
        if let Some(existing) = self.ctx.slots.get(index) {
            let expected = existing.kind();
            let found = if expected == kind { type_label } else { kind };
            self.ctx.slots[index] = slot;
            self.ctx.record_violation(index, expected, found);
        } else {
            self.ctx.slots.push(slot);
        }
    }

    fn cell_slot<T: 'static>(&mut self, state: bool, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        let index = self.claim();
        if let Some(Slot::State(boxed) | Slot::Ref(boxed)) = self.ctx.slots.get(index) {
            let same_kind = matches!(
                (state, &self.ctx.slots[index]),
                (true, Slot::State(_)) | (false, Slot::Ref(_))
            );
            if let (true, Some(cell)) = (same_kind, boxed.downcast_ref::<Rc<RefCell<T>>>()) {
                return cell.clone();
            }
        }

        let cell = Rc::new(RefCell::new(init()));
        let boxed: Box<dyn Any> = Box::new(cell.clone());
        let slot = if state { Slot::State(boxed) } else { Slot::Ref(boxed) };
        self.replace(index, slot, type_name::<T>());
        cell
    }
}
