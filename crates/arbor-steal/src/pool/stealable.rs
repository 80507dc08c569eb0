// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Stealable Workpool
//!
//! The pool behind the StackStealing strategy. Parents run their DFS
//! to completion; work only moves when an idle worker raises a steal
//! request. Running expansions notice the pending request at their
//! next spawn check and answer it by peeling unexplored children off
//! their stack, handing the resulting task back through a bounded
//! channel so the thief picks it up on its next poll.

use crate::policy::Policy;
use crate::pool::workpool::Workpool;
use crate::task::{Task, WorkHint};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The request/response machinery shared between idle thieves and
/// running victims. At most one request is outstanding at a time;
/// repeated idle polls re-raise it once answered.
pub struct StealHandle {
    requests: AtomicUsize,
    handoff_tx: Sender<Task>,
    handoff_rx: Receiver<Task>,
}

impl StealHandle {
    pub fn new(capacity: usize) -> Self {
        let (handoff_tx, handoff_rx) = bounded(capacity.max(1));
        Self {
            requests: AtomicUsize::new(0),
            handoff_tx,
            handoff_rx,
        }
    }

    /// Raised by an idle worker that found the pool empty.
    #[inline]
    pub fn raise(&self) {
        let _ = self
            .requests
            .compare_exchange(0, 1, Ordering::Relaxed, Ordering::Relaxed);
    }

    /// Checked by running expansions at their spawn decision.
    #[inline]
    pub fn requested(&self) -> bool {
        self.requests.load(Ordering::Relaxed) > 0
    }

    /// Answers the pending request with a peeled task. Returns the
    /// task back if the handoff lane is full; the caller then queues
    /// it through the pool instead.
    pub fn fulfil(&self, task: Task) -> Result<(), Task> {
        self.requests.store(0, Ordering::Relaxed);
        self.handoff_tx.try_send(task).map_err(|e| e.into_inner())
    }

    #[inline]
    fn collect(&self) -> Option<Task> {
        self.handoff_rx.try_recv().ok()
    }

    #[inline]
    fn handed_off(&self) -> usize {
        self.handoff_rx.len()
    }
}

impl std::fmt::Debug for StealHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StealHandle(requested: {}, handed_off: {})",
            self.requested(),
            self.handed_off()
        )
    }
}

/// A deque workpool that converts idle polls into steal requests.
pub struct StealableWorkpool {
    inner: Workpool,
    handle: Arc<StealHandle>,
}

impl StealableWorkpool {
    pub fn new(shards: usize) -> Self {
        Self {
            inner: Workpool::new(shards),
            handle: Arc::new(StealHandle::new(shards)),
        }
    }

    /// The handle victims poll inside their expansion loop.
    #[inline]
    pub fn handle(&self) -> Arc<StealHandle> {
        Arc::clone(&self.handle)
    }
}

impl Policy for StealableWorkpool {
    fn add_work(&self, task: Task, hint: WorkHint) -> bool {
        self.inner.add_work(task, hint)
    }

    fn get_work(&self) -> Option<Task> {
        if let Some(task) = self.inner.get_work() {
            return Some(task);
        }
        if let Some(task) = self.handle.collect() {
            return Some(task);
        }
        self.handle.raise();
        None
    }

    fn pending(&self) -> usize {
        self.inner.pending() + self.handle.handed_off()
    }

    fn stop(&self) {
        self.inner.stop();
    }

    fn discarded(&self) -> u64 {
        self.inner.discarded()
    }

    fn name(&self) -> &'static str {
        "StealableWorkpool"
    }
}

impl std::fmt::Display for StealableWorkpool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StealableWorkpool(pending: {})", self.pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Task {
        Box::new(|| {})
    }

    #[test]
    fn test_idle_poll_raises_a_single_request() {
        let pool = StealableWorkpool::new(2);
        let handle = pool.handle();

        assert!(!handle.requested());
        assert!(pool.get_work().is_none());
        assert!(handle.requested());

        // Further polls do not stack requests.
        assert!(pool.get_work().is_none());
        assert_eq!(handle.requests.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_fulfilled_steal_reaches_the_thief() {
        let pool = StealableWorkpool::new(2);
        let handle = pool.handle();

        assert!(pool.get_work().is_none());
        assert!(handle.requested());

        assert!(handle.fulfil(noop()).is_ok(), "handoff lane has room");
        assert!(!handle.requested());
        assert_eq!(pool.pending(), 1);

        assert!(pool.get_work().is_some());
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn test_full_handoff_lane_returns_the_task() {
        let pool = StealableWorkpool::new(1);
        let handle = pool.handle();

        assert!(handle.fulfil(noop()).is_ok(), "first handoff fits");
        let bounced = handle.fulfil(noop());
        assert!(bounced.is_err(), "second handoff must bounce");

        // The bounced task goes through the ordinary pool path.
        let task = bounced.unwrap_err();
        assert!(pool.add_work(task, WorkHint::None));
        assert_eq!(pool.pending(), 2);
    }

    #[test]
    fn test_pool_work_is_preferred_over_requests() {
        let pool = StealableWorkpool::new(2);
        assert!(pool.add_work(noop(), WorkHint::None));
        assert!(pool.get_work().is_some());
        assert!(!pool.handle().requested());
    }
}
