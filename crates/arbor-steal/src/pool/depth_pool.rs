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

//! # Depth-Indexed Pool
//!
//! Tasks are filed under the tree depth of their subtree root.
//! Retrieval always serves the shallowest occupied level first: a
//! shallow subtree root stands for more remaining work, so handing it
//! out keeps thieves busy longest. Within one level the order is FIFO.

use crate::policy::{Policy, PoolState};
use crate::task::{Task, WorkHint};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct DepthPool {
    levels: Mutex<BTreeMap<usize, VecDeque<Task>>>,
    pending: AtomicUsize,
    state: PoolState,
}

impl DepthPool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for DepthPool {
    fn add_work(&self, task: Task, hint: WorkHint) -> bool {
        if !self.state.accepting() {
            return false;
        }
        let depth = match hint {
            WorkHint::Depth(d) => d,
            // Unhinted work files at the root level.
            _ => 0,
        };
        self.levels
            .lock()
            .unwrap()
            .entry(depth)
            .or_default()
            .push_back(task);
        self.pending.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn get_work(&self) -> Option<Task> {
        let mut levels = self.levels.lock().unwrap();
        // Queues are never left empty, so the first key is servable.
        let depth = *levels.keys().next()?;
        let queue = levels.get_mut(&depth)?;
        let task = queue.pop_front();
        if queue.is_empty() {
            levels.remove(&depth);
        }
        if task.is_some() {
            self.pending.fetch_sub(1, Ordering::Relaxed);
        }
        task
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    fn stop(&self) {
        self.state.stop();
    }

    fn discarded(&self) -> u64 {
        self.state.discarded()
    }

    fn name(&self) -> &'static str {
        "DepthPool"
    }
}

impl std::fmt::Display for DepthPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DepthPool(pending: {})", self.pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    fn tagged(order: &Arc<AtomicU32>, tag: u32) -> Task {
        let order = Arc::clone(order);
        Box::new(move || {
            order.store(tag, Ordering::Relaxed);
        })
    }

    #[test]
    fn test_shallowest_level_is_served_first() {
        let pool = DepthPool::new();
        let order = Arc::new(AtomicU32::new(0));

        pool.add_work(tagged(&order, 5), WorkHint::Depth(5));
        pool.add_work(tagged(&order, 2), WorkHint::Depth(2));
        pool.add_work(tagged(&order, 8), WorkHint::Depth(8));

        pool.get_work().unwrap()();
        assert_eq!(order.load(Ordering::Relaxed), 2);
        pool.get_work().unwrap()();
        assert_eq!(order.load(Ordering::Relaxed), 5);
        pool.get_work().unwrap()();
        assert_eq!(order.load(Ordering::Relaxed), 8);
        assert!(pool.get_work().is_none());
    }

    #[test]
    fn test_fifo_within_one_level() {
        let pool = DepthPool::new();
        let order = Arc::new(AtomicU32::new(0));

        pool.add_work(tagged(&order, 1), WorkHint::Depth(3));
        pool.add_work(tagged(&order, 2), WorkHint::Depth(3));

        pool.get_work().unwrap()();
        assert_eq!(order.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unhinted_work_files_at_root_level() {
        let pool = DepthPool::new();
        let order = Arc::new(AtomicU32::new(0));

        pool.add_work(tagged(&order, 9), WorkHint::Depth(1));
        pool.add_work(tagged(&order, 7), WorkHint::None);

        pool.get_work().unwrap()();
        assert_eq!(order.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_stop_discards() {
        let pool = DepthPool::new();
        pool.stop();
        assert!(!pool.add_work(Box::new(|| {}), WorkHint::Depth(1)));
        assert_eq!(pool.discarded(), 1);
    }
}
