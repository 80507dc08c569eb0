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

//! # DepthBounded Skeleton
//!
//! Every node shallower than `spawn_depth` has all of its children
//! converted into pool tasks instead of being descended into; below
//! the cutoff the task runs plain DFS. Tasks are filed in a
//! [`DepthPool`] so thieves receive the shallowest (largest) subtrees
//! first.
//!
//! `search_indexed` spawns positions instead of nodes: tasks carry the
//! child-index path from the true root and rebuild their start node by
//! `nth` replay, trading re-expansion cost for trivially serialisable
//! pool entries.

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
use arbor_steal::pool::{DepthPool, PathPool};
use std::marker::PhantomData;
use std::sync::Arc;

/// Spawns all remaining children of the current frame while above the
/// spawn depth. The transport (nodes or paths) follows how this task
/// itself was spawned.
pub(crate) struct DepthBoundedPolicy {
    spawn_depth: usize,
    mode: SpawnMode,
}

impl<G, B, Bnd, C, E> SpawnPolicy<G, B, Bnd, C, E> for DepthBoundedPolicy
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    fn for_task(rt: &Arc<SkeletonRuntime<G, B, Bnd, C, E>>, seed: &TaskSeed) -> Self {
        let mode = match &seed.path {
            Some(prefix) => SpawnMode::Path {
                prefix: prefix.clone(),
            },
            None => SpawnMode::Depth,
        };
        DepthBoundedPolicy {
            spawn_depth: rt.reg.params.spawn_depth,
            mode,
        }
    }

    fn poll(&mut self, view: &mut ExpandView<'_, G, B, Bnd, C, E, Self>) {
        if view.depth >= self.spawn_depth {
            return;
        }
        let top = view.top_index();
        if view.stack.frames()[top].has_unseen() {
            let mode = self.mode.clone();
            view.drain_frame(top, usize::MAX, &mode);
        }
    }
}

pub struct DepthBounded<G, B, Bnd = Unbounded, C = Maximising, E = NullEnumerator> {
    _marker: PhantomData<(G, B, Bnd, C, E)>,
}

impl<G, B, Bnd, C, E> DepthBounded<G, B, Bnd, C, E>
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    /// Node-shipping spawns through a depth-indexed pool.
    pub fn search(
        space: G::Space,
        root: G::Node,
        params: SearchParams<B>,
    ) -> SearchOutcome<G::Node, B, E::Output> {
        run_parallel::<G, B, Bnd, C, E, DepthBoundedPolicy>(
            "DepthBounded",
            space,
            root,
            params,
            Arc::new(DepthPool::new()),
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
        run_parallel::<G, B, Bnd, C, E, DepthBoundedPolicy>(
            "DepthBounded",
            space,
            root,
            params,
            Arc::new(DepthPool::new()),
            None,
            Some(monitor),
            false,
        )
    }

    /// Path-replay spawns through the position index: pool entries
    /// carry paths, and each task replays its path from the true root.
    pub fn search_indexed(
        space: G::Space,
        root: G::Node,
        params: SearchParams<B>,
    ) -> SearchOutcome<G::Node, B, E::Output> {
        run_parallel::<G, B, Bnd, C, E, DepthBoundedPolicy>(
            "DepthBounded(indexed)",
            space,
            root,
            params,
            Arc::new(PathPool::new()),
            None,
            None,
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_search::enumerator::CountNodes;
    use arbor_search::params::SearchGoal;

    #[derive(Clone)]
    struct FanSpace {
        branching: usize,
        depth: usize,
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct FanNode {
        depth: usize,
        rank: usize,
    }

    impl Objective<i64> for FanNode {
        fn objective(&self) -> i64 {
            (self.depth * 10 + self.rank) as i64
        }
    }

    struct FanGen {
        child_depth: usize,
        produced: usize,
        count: usize,
    }

    impl NodeGenerator for FanGen {
        type Space = FanSpace;
        type Node = FanNode;

        fn new(space: &FanSpace, parent: &FanNode) -> Self {
            let count = if parent.depth < space.depth {
                space.branching
            } else {
                0
            };
            FanGen {
                child_depth: parent.depth + 1,
                produced: 0,
                count,
            }
        }

        fn num_children(&self) -> usize {
            self.count
        }

        fn next(&mut self) -> FanNode {
            let rank = self.produced;
            self.produced += 1;
            FanNode {
                depth: self.child_depth,
                rank,
            }
        }
    }

    fn tree_size(branching: usize, depth: usize) -> u64 {
        (0..=depth).map(|d| (branching as u64).pow(d as u32)).sum()
    }

    #[test]
    fn test_enumeration_matches_the_tree_size() {
        let outcome = DepthBounded::<FanGen, i64, Unbounded, Maximising, CountNodes>::search(
            FanSpace {
                branching: 3,
                depth: 5,
            },
            FanNode { depth: 0, rank: 0 },
            SearchParams::new(SearchGoal::Enumerate)
                .with_spawn_depth(3)
                .with_workers(4),
        );
        assert_eq!(*outcome.enumeration(), tree_size(3, 5));
        assert!(outcome.statistics().tasks_spawned > 0);
    }

    #[test]
    fn test_indexed_replay_visits_every_node_once() {
        let outcome =
            DepthBounded::<FanGen, i64, Unbounded, Maximising, CountNodes>::search_indexed(
                FanSpace {
                    branching: 3,
                    depth: 5,
                },
                FanNode { depth: 0, rank: 0 },
                SearchParams::new(SearchGoal::Enumerate)
                    .with_spawn_depth(3)
                    .with_workers(4),
            );
        assert_eq!(*outcome.enumeration(), tree_size(3, 5));
        assert!(outcome.statistics().tasks_spawned > 0);
    }

    #[test]
    fn test_optimise_agrees_with_sequential() {
        let space = FanSpace {
            branching: 3,
            depth: 4,
        };
        let root = FanNode { depth: 0, rank: 0 };

        let seq = crate::seq::Sequential::<FanGen, i64>::search(
            space.clone(),
            root.clone(),
            SearchParams::new(SearchGoal::Optimise),
        );
        let par = DepthBounded::<FanGen, i64>::search(
            space,
            root,
            SearchParams::new(SearchGoal::Optimise)
                .with_spawn_depth(2)
                .with_workers(4),
        );
        assert_eq!(par.objective_value(), seq.objective_value());
    }

    #[test]
    fn test_spawn_depth_zero_degenerates_to_one_task() {
        let outcome = DepthBounded::<FanGen, i64, Unbounded, Maximising, CountNodes>::search(
            FanSpace {
                branching: 2,
                depth: 4,
            },
            FanNode { depth: 0, rank: 0 },
            SearchParams::new(SearchGoal::Enumerate).with_workers(2),
        );
        assert_eq!(*outcome.enumeration(), tree_size(2, 4));
        assert_eq!(outcome.statistics().tasks_spawned, 0);
    }
}
