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

//! # Random Skeleton
//!
//! The simplest diversifier: on each engine iteration, with
//! probability `1 / spawn_probability`, the remaining siblings of the
//! shallowest open frame are spawned as tasks. Each task's RNG is
//! seeded from the search seed and the task's sequence number, so a
//! fixed seed and a single worker reproduce the spawn trace exactly.

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
use arbor_steal::pool::Workpool;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) struct RandomPolicy {
    probability: u32,
    rng: SmallRng,
}

impl<G, B, Bnd, C, E> SpawnPolicy<G, B, Bnd, C, E> for RandomPolicy
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    fn for_task(rt: &Arc<SkeletonRuntime<G, B, Bnd, C, E>>, seed: &TaskSeed) -> Self {
        let stream = rt
            .reg
            .params
            .seed
            .wrapping_add(seed.seq.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        RandomPolicy {
            probability: rt.reg.params.spawn_probability,
            rng: SmallRng::seed_from_u64(stream),
        }
    }

    fn poll(&mut self, view: &mut ExpandView<'_, G, B, Bnd, C, E, Self>) {
        if self.probability == 0 {
            return;
        }
        if self.rng.gen_range(0..self.probability) != 0 {
            return;
        }
        if let Some(index) = view.stack.shallowest_open_below_top() {
            view.drain_frame(index, usize::MAX, &SpawnMode::Depth);
        }
    }
}

pub struct Random<G, B, Bnd = Unbounded, C = Maximising, E = NullEnumerator> {
    _marker: PhantomData<(G, B, Bnd, C, E)>,
}

impl<G, B, Bnd, C, E> Random<G, B, Bnd, C, E>
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
        let shards = params.worker_count();
        run_parallel::<G, B, Bnd, C, E, RandomPolicy>(
            "Random",
            space,
            root,
            params,
            Arc::new(Workpool::new(shards)),
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
        let shards = params.worker_count();
        run_parallel::<G, B, Bnd, C, E, RandomPolicy>(
            "Random",
            space,
            root,
            params,
            Arc::new(Workpool::new(shards)),
            None,
            Some(monitor),
            false,
        )
    }
}
