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

//! # Ordered Skeleton
//!
//! DepthBounded spawning into a global [`PriorityPool`]: nodes above
//! the spawn depth enter the queue and the schedulers always execute
//! the lowest-keyed pending subtree first. The key is the child's
//! depth or, with `discrepancy_order`, its discrepancy: the sum of
//! sibling ranks along the path from the true root, accumulated across
//! task boundaries. Low-discrepancy subtrees are explored first, so
//! early incumbents follow the heuristically best branches.

use crate::engine::{ExpandView, SpawnMode, SpawnPolicy};
use crate::runtime::{run_parallel, SkeletonRuntime, TaskSeed};
use arbor_search::enumerator::{Enumerator, NullEnumerator};
use arbor_search::generator::NodeGenerator;
use arbor_search::monitor::SearchMonitor;
use arbor_search::num::{
    BoundFunction, Maximising, Objective, ObjectiveOrdering, SearchBound, Unbounded,
};
use arbor_search::outcome::SearchOutcome;
use arbor_search::params::SearchParams;
use arbor_steal::pool::PriorityPool;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) struct OrderedPolicy {
    spawn_depth: usize,
    discrepancy: bool,
    /// This task root's own discrepancy from the true root.
    base: u64,
}

impl<G, B, Bnd, C, E> SpawnPolicy<G, B, Bnd, C, E> for OrderedPolicy
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    fn for_task(rt: &Arc<SkeletonRuntime<G, B, Bnd, C, E>>, seed: &TaskSeed) -> Self {
        OrderedPolicy {
            spawn_depth: rt.reg.params.spawn_depth,
            discrepancy: rt.reg.params.discrepancy_order,
            base: seed.base_priority,
        }
    }

    fn poll(&mut self, view: &mut ExpandView<'_, G, B, Bnd, C, E, Self>) {
        if view.depth >= self.spawn_depth {
            return;
        }
        let top = view.top_index();
        if view.stack.frames()[top].has_unseen() {
            let mode = SpawnMode::Priority {
                discrepancy: self.discrepancy,
                base: self.base,
            };
            view.drain_frame(top, usize::MAX, &mode);
        }
    }
}

pub struct Ordered<G, B, Bnd = Unbounded, C = Maximising, E = NullEnumerator> {
    _marker: PhantomData<(G, B, Bnd, C, E)>,
}

impl<G, B, Bnd, C, E> Ordered<G, B, Bnd, C, E>
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    pub fn search(
        space: G::Space,
        root: G::Node,
        params: SearchParams<B>,
    ) -> SearchOutcome<G::Node, B, E::Output> {
        run_parallel::<G, B, Bnd, C, E, OrderedPolicy>(
            "Ordered",
            space,
            root,
            params,
            Arc::new(PriorityPool::new()),
            None,
            None,
            false,
        )
    }

    pub fn search_monitored(
        space: G::Space,
        root: G::Node,
        params: SearchParams<B>,
        monitor: Arc<dyn SearchMonitor<B>>,
    ) -> SearchOutcome<G::Node, B, E::Output> {
        run_parallel::<G, B, Bnd, C, E, OrderedPolicy>(
            "Ordered",
            space,
            root,
            params,
            Arc::new(PriorityPool::new()),
            None,
            Some(monitor),
            false,
        )
    }
}
