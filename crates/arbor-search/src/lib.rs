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

//! Arbor-Search: contracts and shared state for tree search
//!
//! The problem-independent half of the arbor skeletons. A user
//! implements [`generator::NodeGenerator`] (children of a node, in a
//! fixed order) and optionally a [`num::BoundFunction`]; everything
//! else here is shared machinery the skeletons drive.
//!
//! Module map
//! - `generator`: the user contract, paths and path replay.
//! - `stack`: the bounded frame stack of the iterative DFS.
//! - `params`: builder-style search parameters and the search goal.
//! - `registry`: per-search shared state and the bound broadcast seam.
//! - `incumbent`: concurrent best-so-far holder.
//! - `enumerator`: accumulation contract for enumeration searches.
//! - `num`: bound numerics, objective ordering, bound functions.
//! - `monitor`: observation callbacks (no-op and logging).
//! - `outcome`, `stats`: result and telemetry types.

pub mod enumerator;
pub mod generator;
pub mod incumbent;
pub mod monitor;
pub mod num;
pub mod outcome;
pub mod params;
pub mod registry;
pub mod stack;
pub mod stats;

pub use enumerator::{CountNodes, Enumerator, NullEnumerator};
pub use generator::{replay_path, NodeGenerator, Path};
pub use incumbent::Incumbent;
pub use num::{
    BoundFunction, Maximising, Minimising, Objective, ObjectiveOrdering, SearchBound, Unbounded,
};
pub use outcome::{SearchOutcome, SearchResult};
pub use params::{SearchGoal, SearchParams};
pub use registry::{BoundBroadcast, Registry};
pub use stack::{GeneratorStack, StackFrame};
pub use stats::{SearchStatistics, SearchStatisticsBuilder, StatRecorder};
