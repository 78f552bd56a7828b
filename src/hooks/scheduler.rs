//! Update scheduling.
//!
//! State setters enqueue their owning context; nothing re-renders until the
//! runtime flushes. Enqueueing the same context twice before a flush is a
//! no-op, which is what batches several `set` calls into one render.
//!
//! The [`FrameQueue`] holds work deferred to the next animation frame
//! (hit-area resync after layout).

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::trace;

use super::ctx::CtxId;
use crate::reconciler::MountId;

#[derive(Default)]
struct Queue {
    /// Enqueue order; may hold ids that were cancelled since.
    order: Vec<CtxId>,
    queued: HashSet<CtxId>,
}

/// Shared re-render queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<Queue>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a re-render of `id` on the next flush.
    pub(crate) fn schedule(&self, id: CtxId) {
        let mut queue = self.inner.borrow_mut();
        if queue.queued.insert(id) {
            trace!(?id, "scheduled re-render");
            queue.order.push(id);
        }
    }

    pub(crate) fn is_pending(&self, id: CtxId) -> bool {
        self.inner.borrow().queued.contains(&id)
    }

    /// Drop a pending request (the instance rendered or unmounted).
    pub(crate) fn cancel(&self, id: CtxId) {
        self.inner.borrow_mut().queued.remove(&id);
    }

    /// Pending ids in enqueue order. They stay pending until rendered or cancelled.
    pub(crate) fn take_batch(&self) -> Vec<CtxId> {
        let mut queue = self.inner.borrow_mut();
        let order = std::mem::take(&mut queue.order);
        let mut seen = HashSet::with_capacity(order.len());
        order
            .into_iter()
            .filter(|id| queue.queued.contains(id) && seen.insert(*id))
            .collect()
    }

    /// Put ids from an interrupted batch back in line, ahead of newer requests.
    pub(crate) fn requeue(&self, ids: &[CtxId]) {
        let mut queue = self.inner.borrow_mut();
        let mut order: Vec<CtxId> = ids.iter().copied().filter(|id| queue.queued.contains(id)).collect();
        order.append(&mut queue.order);
        queue.order = order;
    }

    pub fn is_idle(&self) -> bool {
        self.inner.borrow().queued.is_empty()
    }
}

/// Work deferred to the next frame.
///
/// Items pushed while a frame is being processed wait for the following one.
#[derive(Debug, Default)]
pub(crate) struct FrameQueue {
    pending: Vec<MountId>,
    seen: HashSet<MountId>,
}

impl FrameQueue {
    pub fn push(&mut self, id: MountId) {
        if self.seen.insert(id) {
            self.pending.push(id);
        }
    }

    pub fn take(&mut self) -> Vec<MountId> {
        self.seen.clear();
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn ids(n: usize) -> Vec<CtxId> {
        let mut arena: Arena<CtxId, ()> = Arena::new();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn test_schedule_dedupes() {
        let scheduler = Scheduler::new();
        let ids = ids(2);
        scheduler.schedule(ids[0]);
        scheduler.schedule(ids[1]);
        scheduler.schedule(ids[0]);
        assert_eq!(scheduler.take_batch(), vec![ids[0], ids[1]]);
        assert!(!scheduler.is_idle());
    }

    #[test]
    fn test_cancelled_ids_are_skipped() {
        let scheduler = Scheduler::new();
        let ids = ids(2);
        scheduler.schedule(ids[0]);
        scheduler.schedule(ids[1]);
        scheduler.cancel(ids[0]);
        assert_eq!(scheduler.take_batch(), vec![ids[1]]);
        scheduler.cancel(ids[1]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_reschedule_after_cancel() {
        let scheduler = Scheduler::new();
        let id = ids(1)[0];
        scheduler.schedule(id);
        scheduler.cancel(id);
        scheduler.schedule(id);
        assert_eq!(scheduler.take_batch(), vec![id]);
    }

    #[test]
    fn test_requeue_goes_first() {
        let scheduler = Scheduler::new();
        let ids = ids(3);
        scheduler.schedule(ids[0]);
        scheduler.schedule(ids[1]);
        let batch = scheduler.take_batch();
        scheduler.schedule(ids[2]);
        scheduler.cancel(ids[0]);
        scheduler.requeue(&batch);
        assert_eq!(scheduler.take_batch(), vec![ids[1], ids[2]]);
    }

    #[test]
    fn test_frame_queue_dedupes_until_taken() {
        let mut arena: Arena<MountId, ()> = Arena::new();
        let a = arena.insert(());
        let mut frames = FrameQueue::default();
        frames.push(a);
        frames.push(a);
        assert_eq!(frames.take(), vec![a]);
        assert!(frames.is_empty());
        frames.push(a);
        assert_eq!(frames.take(), vec![a]);
    }
}
