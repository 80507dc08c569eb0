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

use crate::num::SearchBound;

/// What the search is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchGoal {
    /// Visit every node, folding each into the enumerator.
    Enumerate,
    /// Track the best objective seen; return the incumbent.
    Optimise,
    /// Stop at the first node reaching the expected objective.
    Decide,
}

impl std::fmt::Display for SearchGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchGoal::Enumerate => write!(f, "Enumerate"),
            SearchGoal::Optimise => write!(f, "Optimise"),
            SearchGoal::Decide => write!(f, "Decide"),
        }
    }
}

/// The default frame limit of the expansion stack.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 5000;

/// Runtime parameters of one search invocation.
///
/// Built with `with_*` methods; fields irrelevant to the selected
/// skeleton are simply unused. `workers` defaults to one less than the
/// available parallelism, reserving a core for the blocking caller.
#[derive(Debug, Clone)]
pub struct SearchParams<B> {
    pub goal: SearchGoal,
    /// DepthBounded/Ordered: depths below this spawn their children as tasks.
    pub spawn_depth: usize,
    /// Budget: number of backtracks before remaining work is spawned.
    pub backtrack_budget: u64,
    /// Random: reciprocal spawn probability. Zero disables spawning.
    pub spawn_probability: u32,
    /// Depth-limited truncation of the tree, if any.
    pub max_depth: Option<usize>,
    /// Decision threshold. Required when `goal` is `Decide`.
    pub expected_objective: Option<B>,
    /// Seed value for the incumbent bound.
    pub initial_bound: B,
    /// StackStealing: peel all remaining siblings instead of one child.
    pub steal_all: bool,
    /// On a failed bound check, abandon the whole level instead of the
    /// single child.
    pub prune_level: bool,
    /// Ordered: key the priority queue by discrepancy instead of depth.
    pub discrepancy_order: bool,
    pub max_stack_depth: usize,
    /// Worker thread count override.
    pub workers: Option<usize>,
    /// Seed for the Random skeleton's spawn decisions.
    pub seed: u64,
}

impl<B: SearchBound> SearchParams<B> {
    #[inline]
    pub fn new(goal: SearchGoal) -> Self {
        Self {
            goal,
            spawn_depth: 0,
            backtrack_budget: 0,
            spawn_probability: 0,
            max_depth: None,
            expected_objective: None,
            initial_bound: B::zero(),
            steal_all: false,
            prune_level: false,
            discrepancy_order: false,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            workers: None,
            seed: 0,
        }
    }

    #[inline]
    pub fn with_spawn_depth(mut self, depth: usize) -> Self {
        self.spawn_depth = depth;
        self
    }

    #[inline]
    pub fn with_backtrack_budget(mut self, budget: u64) -> Self {
        self.backtrack_budget = budget;
        self
    }

    #[inline]
    pub fn with_spawn_probability(mut self, reciprocal: u32) -> Self {
        self.spawn_probability = reciprocal;
        self
    }

    #[inline]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    #[inline]
    pub fn with_expected_objective(mut self, objective: B) -> Self {
        self.expected_objective = Some(objective);
        self
    }

    #[inline]
    pub fn with_initial_bound(mut self, bound: B) -> Self {
        self.initial_bound = bound;
        self
    }

    #[inline]
    pub fn with_steal_all(mut self, steal_all: bool) -> Self {
        self.steal_all = steal_all;
        self
    }

    #[inline]
    pub fn with_prune_level(mut self, prune_level: bool) -> Self {
        self.prune_level = prune_level;
        self
    }

    #[inline]
    pub fn with_discrepancy_order(mut self, discrepancy: bool) -> Self {
        self.discrepancy_order = discrepancy;
        self
    }

    #[inline]
    pub fn with_max_stack_depth(mut self, limit: usize) -> Self {
        self.max_stack_depth = limit;
        self
    }

    #[inline]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The number of scheduler threads a parallel skeleton starts.
    #[inline]
    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.max(1),
            None => {
                let available = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                (available.saturating_sub(1)).max(1)
            }
        }
    }
}

impl<B: SearchBound> std::fmt::Display for SearchParams<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchParams(goal: {}, spawn_depth: {}, budget: {}, workers: {})",
            self.goal,
            self.spawn_depth,
            self.backtrack_budget,
            self.worker_count()
        )
    }
}
