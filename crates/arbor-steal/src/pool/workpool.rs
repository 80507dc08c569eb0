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

//! # Deque Workpool
//!
//! The default pool: one mutex-guarded deque per worker shard. A
//! thread pushes and pops at the back of its own shard (LIFO, so local
//! DFS order is preserved), and steals from the front of other shards
//! (FIFO, so thieves take the oldest and therefore shallowest work).
//! Shard choice is by thread identity, keeping the common push/pop
//! path free of cross-thread contention.

use crate::policy::{Policy, PoolState};
use crate::task::{Task, WorkHint};
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct Workpool {
    shards: Vec<Mutex<VecDeque<Task>>>,
    pending: AtomicUsize,
    state: PoolState,
}

impl Workpool {
    /// Creates a pool with one shard per expected worker.
    pub fn new(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| Mutex::new(VecDeque::new())).collect(),
            pending: AtomicUsize::new(0),
            state: PoolState::new(),
        }
    }

    /// The shard owned by the calling thread.
    fn own_shard(&self) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }
}

impl Policy for Workpool {
    fn add_work(&self, task: Task, _hint: WorkHint) -> bool {
        if !self.state.accepting() {
            return false;
        }
        let shard = self.own_shard();
        self.shards[shard].lock().unwrap().push_back(task);
        self.pending.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn get_work(&self) -> Option<Task> {
        let own = self.own_shard();

        if let Some(task) = self.shards[own].lock().unwrap().pop_back() {
            self.pending.fetch_sub(1, Ordering::Relaxed);
            return Some(task);
        }

        for offset in 1..self.shards.len() {
            let victim = (own + offset) % self.shards.len();
            if let Some(task) = self.shards[victim].lock().unwrap().pop_front() {
                self.pending.fetch_sub(1, Ordering::Relaxed);
                return Some(task);
            }
        }
        None
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
        "Workpool"
    }
}

impl std::fmt::Display for Workpool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Workpool(shards: {}, pending: {})",
            self.shards.len(),
            self.pending()
        )
    }
}
