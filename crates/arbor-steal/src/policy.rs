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

use crate::task::{Task, WorkHint};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// How tasks are queued and stolen. One policy instance is shared by
/// every scheduler thread of a search and by the expansions that hand
/// subtrees back as new tasks.
pub trait Policy: Send + Sync + 'static {
    /// Queues a task. Returns `false` if the pool was already stopped;
    /// the task is then discarded and the caller must treat it as
    /// completed. Discards are counted, not fatal.
    fn add_work(&self, task: Task, hint: WorkHint) -> bool;

    /// Takes one task according to the policy's stealing order.
    fn get_work(&self) -> Option<Task>;

    /// The number of queued tasks.
    fn pending(&self) -> usize;

    /// Marks the pool stopped. Subsequent `add_work` calls discard.
    fn stop(&self);

    /// The number of tasks discarded after `stop`.
    fn discarded(&self) -> u64;

    fn name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Policy({}, pending: {})", self.name(), self.pending())
    }
}

/// Stop flag and discard counter shared by every pool implementation.
#[derive(Debug, Default)]
pub struct PoolState {
    stopped: AtomicBool,
    discarded: AtomicU64,
}

impl PoolState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the pool accepts work. Otherwise bumps the
    /// warning counter and returns `false`.
    #[inline]
    pub fn accepting(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            false
        } else {
            true
        }
    }

    #[inline]
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}
