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

//! # StackStealing Skeleton
//!
//! Parents always run their own DFS; work moves only on demand. An
//! idle worker raises a steal request through the pool; the next
//! expansion to reach its spawn check answers it by peeling one child
//! off its shallowest open frame (or that frame's entire remaining
//! siblings with `steal_all`) and handing the task to the thief.
//!
//! A level pruned after some siblings were stolen does not cancel the
//! stolen tasks; they run to completion.

use crate::engine::{ExpandView, SpawnPolicy};
use crate::runtime::{run_parallel, SkeletonRuntime, TaskSeed};
use arbor_search::enumerator::{Enumerator, NullEnumerator};
use arbor_search::generator::NodeGenerator;
use arbor_search::monitor::SearchMonitor;
use arbor_search::num::{
    BoundFunction, Maximising, Objective, ObjectiveOrdering, SearchBound, Unbounded,
};
use arbor_search::outcome::SearchOutcome;
use arbor_search::params::SearchParams;
use arbor_steal::pool::{StealHandle, StealableWorkpool};
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) struct StackStealPolicy {
    handle: Arc<StealHandle>,
    steal_all: bool,
}

impl<G, B, Bnd, C, E> SpawnPolicy<G, B, Bnd, C, E> for StackStealPolicy
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    fn for_task(rt: &Arc<SkeletonRuntime<G, B, Bnd, C, E>>, _seed: &TaskSeed) -> Self {
        let handle = rt
            .steal
            .as_ref()
            .expect("stack stealing requires a stealable pool")
            .clone();
        StackStealPolicy {
            handle,
            steal_all: rt.reg.params.steal_all,
        }
    }

    fn poll(&mut self, view: &mut ExpandView<'_, G, B, Bnd, C, E, Self>) {
        if !self.handle.requested() {
            return;
        }
        if let Some(index) = view.stack.shallowest_open_below_top() {
            let limit = if self.steal_all { usize::MAX } else { 1 };
            view.peel_to_thief(index, limit, &self.handle);
        }
    }
}

pub struct StackStealing<G, B, Bnd = Unbounded, C = Maximising, E = NullEnumerator> {
    _marker: PhantomData<(G, B, Bnd, C, E)>,
}

impl<G, B, Bnd, C, E> StackStealing<G, B, Bnd, C, E>
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
        let pool = Arc::new(StealableWorkpool::new(params.worker_count()));
        let handle = pool.handle();
        run_parallel::<G, B, Bnd, C, E, StackStealPolicy>(
            "StackStealing",
            space,
            root,
            params,
            pool,
            Some(handle),
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
        let pool = Arc::new(StealableWorkpool::new(params.worker_count()));
        let handle = pool.handle();
        run_parallel::<G, B, Bnd, C, E, StackStealPolicy>(
            "StackStealing",
            space,
            root,
            params,
            pool,
            Some(handle),
            Some(monitor),
            false,
        )
    }
}
