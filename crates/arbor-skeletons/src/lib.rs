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

//! Arbor-Skeletons: parallel tree-search strategies
//!
//! Reusable search skeletons over a user-supplied
//! [`arbor_search::NodeGenerator`]. Pick a strategy, hand it the
//! space, the root and a parameter bundle, and read the outcome:
//!
//! ```ignore
//! let outcome = DepthBounded::<MyGen, i64, MyBound>::search(
//!     space,
//!     root,
//!     SearchParams::new(SearchGoal::Optimise).with_spawn_depth(3),
//! );
//! ```
//!
//! Strategies
//! - [`Sequential`]: single-threaded reference semantics.
//! - [`DepthBounded`]: spawn everything above a depth cutoff
//!   (node-shipping or path-replay transport).
//! - [`StackStealing`]: demand-driven peeling of stack frames.
//! - [`Ordered`]: best-first by depth or discrepancy.
//! - [`Budget`]: spawn after a backtrack budget is exhausted.
//! - [`Random`]: probabilistic spawning under a fixed seed.
//!
//! All parallel strategies return the same result the sequential one
//! does; they differ in how the tree is carved into tasks.

mod budget;
mod depth_bounded;
mod engine;
mod ordered;
mod random;
mod runtime;
mod seq;
mod stack_stealing;

pub use budget::Budget;
pub use depth_bounded::DepthBounded;
pub use ordered::Ordered;
pub use random::Random;
pub use seq::Sequential;
pub use stack_stealing::StackStealing;

pub use arbor_search::enumerator::{CountNodes, Enumerator, NullEnumerator};
pub use arbor_search::generator::{replay_path, NodeGenerator, Path};
pub use arbor_search::monitor::{LogMonitor, NoOpMonitor, SearchMonitor};
pub use arbor_search::num::{
    BoundFunction, Maximising, Minimising, Objective, ObjectiveOrdering, SearchBound, Unbounded,
};
pub use arbor_search::outcome::{SearchOutcome, SearchResult};
pub use arbor_search::params::{SearchGoal, SearchParams};
pub use arbor_search::stats::SearchStatistics;
