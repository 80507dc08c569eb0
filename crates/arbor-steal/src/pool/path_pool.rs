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

//! # Position-Indexed Pool
//!
//! Entries are keyed by the child-index path from the true root to the
//! subtree a task will expand. The task body rebuilds its start node
//! by `nth` replay instead of carrying node state, which keeps entries
//! small and, in a distributed setting, trivially serialisable.
//! Retrieval serves the shortest path first (the shallowest subtree),
//! FIFO among equal lengths.

use crate::policy::{Policy, PoolState};
use crate::task::{Task, WorkHint};
use arbor_search::generator::Path;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

struct PathEntry {
    path: Path,
    seq: u64,
    task: Task,
}

impl PartialEq for PathEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path.len() == other.path.len() && self.seq == other.seq
    }
}

impl Eq for PathEntry {}

impl PartialOrd for PathEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathEntry {
    // Reversed so the max-heap pops the shortest path, FIFO inside a
    // length class.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .path
            .len()
            .cmp(&self.path.len())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
pub struct PathPool {
    heap: Mutex<BinaryHeap<PathEntry>>,
    seq: AtomicU64,
    state: PoolState,
}

impl PathPool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for PathPool {
    /// Files `task` under its position hint.
    ///
    /// # Panics
    ///
    /// Panics when the hint is not `WorkHint::Position`: handing
    /// positionless work to the position index is a programming error.
    fn add_work(&self, task: Task, hint: WorkHint) -> bool {
        if !self.state.accepting() {
            return false;
        }
        let path = match hint {
            WorkHint::Position(path) => path,
            other => panic!(
                "called `PathPool::add_work` with a non-position hint: {}",
                other
            ),
        };
        let entry = PathEntry {
            path,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            task,
        };
        self.heap.lock().unwrap().push(entry);
        true
    }

    fn get_work(&self) -> Option<Task> {
        self.heap.lock().unwrap().pop().map(|entry| entry.task)
    }

    fn pending(&self) -> usize {
        self.heap.lock().unwrap().len()
    }

    fn stop(&self) {
        self.state.stop();
    }

    fn discarded(&self) -> u64 {
        self.state.discarded()
    }

    fn name(&self) -> &'static str {
        "PathPool"
    }
}

impl std::fmt::Display for PathPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PathPool(pending: {})", self.pending())
    }
}
