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

//! # Sequential Skeleton
//!
//! Single-threaded depth-first search with no spawning. The reference
//! semantics every parallel strategy must reproduce.

use crate::engine::{ExpandView, SpawnPolicy};
use crate::runtime::{run_sequential, SkeletonRuntime, TaskSeed};
use arbor_search::enumerator::{Enumerator, NullEnumerator};
use arbor_search::generator::NodeGenerator;
use arbor_search::monitor::SearchMonitor;
use arbor_search::num::{
    BoundFunction, Maximising, Objective, ObjectiveOrdering, SearchBound, Unbounded,
};
use arbor_search::outcome::SearchOutcome;
use arbor_search::params::SearchParams;
use arbor_steal::pool::Workpool;
use std::marker::PhantomData;
use std::sync::Arc;

/// Never spawns.
pub(crate) struct SeqPolicy;

impl<G, B, Bnd, C, E> SpawnPolicy<G, B, Bnd, C, E> for SeqPolicy
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    fn for_task(_rt: &Arc<SkeletonRuntime<G, B, Bnd, C, E>>, _seed: &TaskSeed) -> Self {
        SeqPolicy
    }

    fn poll(&mut self, _view: &mut ExpandView<'_, G, B, Bnd, C, E, Self>) {}
}

pub struct Sequential<G, B, Bnd = Unbounded, C = Maximising, E = NullEnumerator> {
    _marker: PhantomData<(G, B, Bnd, C, E)>,
}

impl<G, B, Bnd, C, E> Sequential<G, B, Bnd, C, E>
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
        run_sequential::<G, B, Bnd, C, E, SeqPolicy>(
            "Sequential",
            space,
            root,
            params,
            Arc::new(Workpool::new(1)),
            None,
        )
    }

    pub fn search_monitored(
        space: G::Space,
        root: G::Node,
        params: SearchParams<B>,
        monitor: Arc<dyn SearchMonitor<B>>,
    ) -> SearchOutcome<G::Node, B, E::Output> {
        run_sequential::<G, B, Bnd, C, E, SeqPolicy>(
            "Sequential",
            space,
            root,
            params,
            Arc::new(Workpool::new(1)),
            Some(monitor),
        )
    }
}
