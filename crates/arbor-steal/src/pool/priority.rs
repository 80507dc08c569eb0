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

//! # Priority-Ordered Pool
//!
//! A single global queue ordered by an explicit priority: lower number
//! runs first. Equal priorities are served FIFO by an insertion
//! sequence number, so the ordering is total and deterministic.

use crate::policy::{Policy, PoolState};
use crate::task::{Task, WorkHint};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

struct PriorityEntry {
    priority: u64,
    seq: u64,
    task: Task,
}

impl PartialEq for PriorityEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for PriorityEntry {}

impl PartialOrd for PriorityEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityEntry {
    // Reversed so the max-heap pops the lowest (priority, seq) pair.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
pub struct PriorityPool {
    heap: Mutex<BinaryHeap<PriorityEntry>>,
    seq: AtomicU64,
    state: PoolState,
}

impl PriorityPool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for PriorityPool {
    fn add_work(&self, task: Task, hint: WorkHint) -> bool {
        if !self.state.accepting() {
            return false;
        }
        let priority = match hint {
            WorkHint::Priority(p) => p,
            WorkHint::Depth(d) => d as u64,
            _ => u64::MAX,
        };
        let entry = PriorityEntry {
            priority,
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
        "PriorityPool"
    }
}

impl std::fmt::Display for PriorityPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PriorityPool(pending: {})", self.pending())
    }
}
