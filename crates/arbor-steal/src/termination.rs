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

//! # Termination Detection
//!
//! A search is finished when the root task and, transitively, every
//! task it spawned have completed. Each task owns a [`SubtreeLatch`]
//! counting its own expansion plus its live children; completion
//! cascades upwards without ever blocking a worker thread, and the
//! root latch releases the caller blocked in `search`.
//!
//! A separate [`WorkCounter`] tracks tasks outstanding in the pools,
//! distinguishing "pool empty, work still running" from "all done".

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// Completion latch for one task's subtree.
///
/// The count starts at one (the task's own expansion) and grows by one
/// per spawned child. When it reaches zero the parent's latch is
/// decremented in turn; the root latch notifies the waiting caller.
pub struct SubtreeLatch {
    pending: AtomicUsize,
    parent: Option<Arc<SubtreeLatch>>,
    root_signal: Option<Arc<RootSignal>>,
}

struct RootSignal {
    done: Mutex<bool>,
    cv: Condvar,
}

impl SubtreeLatch {
    /// Creates the latch for the root task plus the handle `search`
    /// blocks on.
    pub fn root() -> (Arc<Self>, RootWait) {
        let signal = Arc::new(RootSignal {
            done: Mutex::new(false),
            cv: Condvar::new(),
        });
        let latch = Arc::new(Self {
            pending: AtomicUsize::new(1),
            parent: None,
            root_signal: Some(Arc::clone(&signal)),
        });
        (latch, RootWait { signal })
    }

    /// Registers a child task under `parent` and returns its latch.
    pub fn child(parent: &Arc<Self>) -> Arc<Self> {
        parent.pending.fetch_add(1, Ordering::AcqRel);
        Arc::new(Self {
            pending: AtomicUsize::new(1),
            parent: Some(Arc::clone(parent)),
            root_signal: None,
        })
    }

    /// Marks this task's own expansion complete. Must be called
    /// exactly once per latch; a discarded task counts as completed.
    pub fn complete(self: &Arc<Self>) {
        let mut current = Arc::clone(self);
        loop {
            if current.pending.fetch_sub(1, Ordering::AcqRel) != 1 {
                return;
            }
            // Subtree fully done, release upwards.
            if let Some(signal) = &current.root_signal {
                let mut done = signal.done.lock().unwrap();
                *done = true;
                signal.cv.notify_all();
                return;
            }
            let Some(parent) = current.parent.clone() else {
                return;
            };
            current = parent;
        }
    }

    /// Live entries on this latch. Exposed for diagnostics.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SubtreeLatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SubtreeLatch(pending: {})", self.pending())
    }
}

/// Blocks the caller until the root subtree has fully completed.
pub struct RootWait {
    signal: Arc<RootSignal>,
}

impl RootWait {
    pub fn wait(&self) {
        let mut done = self.signal.done.lock().unwrap();
        while !*done {
            done = self.signal.cv.wait(done).unwrap();
        }
    }

    pub fn is_done(&self) -> bool {
        *self.signal.done.lock().unwrap()
    }
}

/// Counts tasks that exist but have not finished. The scheduler can
/// consult it to tell an empty pool apart from a drained search, and
/// `search` asserts it is zero before returning: no orphan tasks.
#[derive(Debug, Default)]
pub struct WorkCounter {
    outstanding: AtomicUsize,
}

impl WorkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn decrement(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "work counter underflow");
    }

    #[inline]
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.outstanding() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_root_latch_releases_after_complete() {
        let (root, wait) = SubtreeLatch::root();
        assert!(!wait.is_done());
        root.complete();
        wait.wait();
        assert!(wait.is_done());
    }

    #[test]
    fn test_children_hold_the_root_open() {
        let (root, wait) = SubtreeLatch::root();
        let child = SubtreeLatch::child(&root);
        assert_eq!(root.pending(), 2);

        root.complete();
        assert!(!wait.is_done(), "child still live");

        child.complete();
        wait.wait();
        assert!(wait.is_done());
    }

    #[test]
    fn test_completion_cascades_through_grandchildren() {
        let (root, wait) = SubtreeLatch::root();
        let child = SubtreeLatch::child(&root);
        let grandchild = SubtreeLatch::child(&child);

        root.complete();
        child.complete();
        assert!(!wait.is_done(), "grandchild still live");

        grandchild.complete();
        wait.wait();
    }

    #[test]
    fn test_completion_order_does_not_matter() {
        let (root, wait) = SubtreeLatch::root();
        let a = SubtreeLatch::child(&root);
        let b = SubtreeLatch::child(&root);

        a.complete();
        b.complete();
        assert!(!wait.is_done(), "root's own expansion still live");

        root.complete();
        wait.wait();
    }

    #[test]
    fn test_cross_thread_release() {
        let (root, wait) = SubtreeLatch::root();
        let child = SubtreeLatch::child(&root);
        root.complete();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(5));
            child.complete();
        });

        wait.wait();
        handle.join().unwrap();
        assert!(wait.is_done());
    }

    #[test]
    fn test_work_counter_tracks_outstanding_tasks() {
        let counter = WorkCounter::new();
        assert!(counter.is_idle());

        counter.increment();
        counter.increment();
        assert_eq!(counter.outstanding(), 2);
        assert!(!counter.is_idle());

        counter.decrement();
        counter.decrement();
        assert!(counter.is_idle());
    }
}
