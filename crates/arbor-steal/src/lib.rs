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

//! Arbor-Steal: the work-stealing runtime
//!
//! Task pools, stealing policies, scheduler threads and termination
//! detection. The skeletons hand subtree expansions in as [`task::Task`]
//! closures; a pool variant decides who runs them next.
//!
//! Module map
//! - `task`: the task type and pool ordering hints.
//! - `policy`: the pool interface and shared stop/discard state.
//! - `pool`: the four pool variants plus the stealable wrapper.
//! - `scheduler`: worker threads with bounded idle backoff.
//! - `termination`: subtree completion latches and the outstanding
//!   work counter.

pub mod policy;
pub mod pool;
pub mod scheduler;
pub mod task;
pub mod termination;

pub use policy::{Policy, PoolState};
pub use pool::{DepthPool, PathPool, PriorityPool, StealHandle, StealableWorkpool, Workpool};
pub use scheduler::Scheduler;
pub use task::{Task, WorkHint};
pub use termination::{RootWait, SubtreeLatch, WorkCounter};
