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

//! Cross-strategy properties: every parallel skeleton must reproduce
//! the sequential results on the same problem, terminate, and honour
//! its spawn rule. The fixture is a small maximum-clique instance; the
//! search space is the tree of cliques extended in ascending vertex
//! order.

use arbor_skeletons::{
    Budget, CountNodes, DepthBounded, Enumerator, Maximising, NodeGenerator, Objective, Ordered,
    Random, SearchGoal, SearchOutcome, SearchParams, Sequential, StackStealing, Unbounded,
};
use arbor_search::num::BoundFunction;
use fixedbitset::FixedBitSet;

// ---------------------------------------------------------------------
// Fixture: maximum clique
// ---------------------------------------------------------------------

#[derive(Clone)]
struct CliqueSpace {
    adjacency: Vec<FixedBitSet>,
}

impl CliqueSpace {
    /// The 5-vertex graph with edges (0,1), (1,2), (2,0), (2,3), (3,4).
    /// Its maximum clique is {0, 1, 2}.
    fn pentane() -> Self {
        Self::from_edges(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4)])
    }

    fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut adjacency = vec![FixedBitSet::with_capacity(n); n];
        for &(a, b) in edges {
            adjacency[a].insert(b);
            adjacency[b].insert(a);
        }
        Self { adjacency }
    }

    fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct CliqueNode {
    members: Vec<u32>,
    candidates: FixedBitSet,
}

impl CliqueNode {
    fn root(space: &CliqueSpace) -> Self {
        let mut candidates = FixedBitSet::with_capacity(space.num_vertices());
        candidates.insert_range(..);
        Self {
            members: Vec::new(),
            candidates,
        }
    }

    fn size(&self) -> usize {
        self.members.len()
    }
}

impl Objective<i64> for CliqueNode {
    fn objective(&self) -> i64 {
        self.members.len() as i64
    }
}

/// Children extend the clique by one candidate vertex, in ascending
/// vertex order; a child's candidate set keeps only later neighbours,
/// so every clique is generated exactly once.
struct CliqueGen {
    children: Vec<CliqueNode>,
    produced: usize,
}

impl NodeGenerator for CliqueGen {
    type Space = CliqueSpace;
    type Node = CliqueNode;

    fn new(space: &CliqueSpace, parent: &CliqueNode) -> Self {
        let mut children = Vec::with_capacity(parent.candidates.count_ones(..));
        for v in parent.candidates.ones() {
            let mut members = parent.members.clone();
            members.push(v as u32);

            let mut candidates = parent.candidates.clone();
            candidates.intersect_with(&space.adjacency[v]);
            candidates.set_range(..v + 1, false);

            children.push(CliqueNode {
                members,
                candidates,
            });
        }
        Self {
            children,
            produced: 0,
        }
    }

    fn num_children(&self) -> usize {
        self.children.len()
    }

    fn next(&mut self) -> CliqueNode {
        let child = self.children[self.produced].clone();
        self.produced += 1;
        child
    }
}

/// Clique size plus remaining candidates: an admissible upper bound on
/// any clique reachable in the subtree.
#[derive(Default)]
struct CliqueBound;

impl BoundFunction<CliqueSpace, CliqueNode, i64> for CliqueBound {
    const ENABLED: bool = true;

    fn bound(&self, _space: &CliqueSpace, node: &CliqueNode) -> i64 {
        (node.size() + node.candidates.count_ones(..)) as i64
    }
}

/// Counts cliques by size, the way a depth-profile enumerator counts
/// nodes per level.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
struct SizeProfile {
    counts: Vec<u64>,
}

impl Enumerator<CliqueNode> for SizeProfile {
    type Output = Vec<u64>;

    fn accumulate(&mut self, node: &CliqueNode) {
        let size = node.size();
        if self.counts.len() <= size {
            self.counts.resize(size + 1, 0);
        }
        self.counts[size] += 1;
    }

    fn combine(&mut self, other: Self) {
        if self.counts.len() < other.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (i, c) in other.counts.iter().enumerate() {
            self.counts[i] += c;
        }
    }

    fn finish(self) -> Self::Output {
        self.counts
    }
}

/// The pentane graph has 12 cliques: the empty one, 5 singletons,
/// 5 edges and one triangle.
const PENTANE_CLIQUE_COUNT: u64 = 12;
const PENTANE_SIZE_PROFILE: [u64; 4] = [1, 5, 5, 1];
const PENTANE_MAX_CLIQUE: i64 = 3;

fn enumerate_params() -> SearchParams<i64> {
    SearchParams::new(SearchGoal::Enumerate)
        .with_spawn_depth(2)
        .with_backtrack_budget(2)
        .with_spawn_probability(2)
        .with_seed(11)
        .with_workers(4)
}

fn optimise_params() -> SearchParams<i64> {
    SearchParams::new(SearchGoal::Optimise)
        .with_spawn_depth(2)
        .with_backtrack_budget(2)
        .with_spawn_probability(2)
        .with_seed(11)
        .with_workers(4)
}

fn decide_params(expected: i64) -> SearchParams<i64> {
    SearchParams::new(SearchGoal::Decide)
        .with_spawn_depth(2)
        .with_backtrack_budget(2)
        .with_spawn_probability(2)
        .with_seed(11)
        .with_workers(4)
        .with_expected_objective(expected)
}

// ---------------------------------------------------------------------
// P1 / P5: completeness and strategy equivalence, enumeration
// ---------------------------------------------------------------------

fn assert_complete(outcome: &SearchOutcome<CliqueNode, i64, u64>, name: &str) {
    assert_eq!(
        *outcome.enumeration(),
        PENTANE_CLIQUE_COUNT,
        "{} must visit every clique exactly once",
        name
    );
}

#[test]
fn test_every_strategy_counts_every_clique_exactly_once() {
    let space = CliqueSpace::pentane();
    let root = CliqueNode::root(&space);

    let seq = Sequential::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_complete(&seq, "Sequential");

    let db = DepthBounded::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_complete(&db, "DepthBounded");

    let indexed = DepthBounded::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search_indexed(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_complete(&indexed, "DepthBounded(indexed)");

    let ordered = Ordered::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_complete(&ordered, "Ordered");

    let budget = Budget::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_complete(&budget, "Budget");

    let random = Random::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_complete(&random, "Random");

    let stealing = StackStealing::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space,
        root,
        enumerate_params(),
    );
    assert_complete(&stealing, "StackStealing");
}

#[test]
fn test_size_profiles_are_identical_across_strategies() {
    let space = CliqueSpace::pentane();
    let root = CliqueNode::root(&space);

    let seq = Sequential::<CliqueGen, i64, Unbounded, Maximising, SizeProfile>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_eq!(seq.enumeration().as_slice(), PENTANE_SIZE_PROFILE);

    let db = DepthBounded::<CliqueGen, i64, Unbounded, Maximising, SizeProfile>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_eq!(db.enumeration(), seq.enumeration());

    let ordered = Ordered::<CliqueGen, i64, Unbounded, Maximising, SizeProfile>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_eq!(ordered.enumeration(), seq.enumeration());

    let budget = Budget::<CliqueGen, i64, Unbounded, Maximising, SizeProfile>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_eq!(budget.enumeration(), seq.enumeration());

    let random = Random::<CliqueGen, i64, Unbounded, Maximising, SizeProfile>::search(
        space.clone(),
        root.clone(),
        enumerate_params(),
    );
    assert_eq!(random.enumeration(), seq.enumeration());

    let stealing = StackStealing::<CliqueGen, i64, Unbounded, Maximising, SizeProfile>::search(
        space,
        root,
        enumerate_params(),
    );
    assert_eq!(stealing.enumeration(), seq.enumeration());
}

// ---------------------------------------------------------------------
// P3 / P5: bounded optimisation agrees with the sequential reference
// ---------------------------------------------------------------------

#[test]
fn test_every_strategy_finds_the_maximum_clique_with_bounding() {
    let space = CliqueSpace::pentane();
    let root = CliqueNode::root(&space);

    let outcomes = [
        (
            "Sequential",
            Sequential::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                optimise_params(),
            ),
        ),
        (
            "DepthBounded",
            DepthBounded::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                optimise_params(),
            ),
        ),
        (
            "Ordered",
            Ordered::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                optimise_params().with_discrepancy_order(true),
            ),
        ),
        (
            "Budget",
            Budget::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                optimise_params(),
            ),
        ),
        (
            "Random",
            Random::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                optimise_params(),
            ),
        ),
        (
            "StackStealing",
            StackStealing::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                optimise_params(),
            ),
        ),
    ];

    for (name, outcome) in &outcomes {
        assert_eq!(
            outcome.objective_value(),
            Some(PENTANE_MAX_CLIQUE),
            "{} must find the maximum clique",
            name
        );
        let (node, _) = outcome.best().expect("optimisation returns an incumbent");
        assert_eq!(node.size() as i64, PENTANE_MAX_CLIQUE);
    }
}

#[test]
fn test_prune_soundness_bounding_never_changes_the_optimum() {
    let space = CliqueSpace::pentane();
    let root = CliqueNode::root(&space);

    let unbounded = Sequential::<CliqueGen, i64>::search(
        space.clone(),
        root.clone(),
        SearchParams::new(SearchGoal::Optimise),
    );
    let bounded = Sequential::<CliqueGen, i64, CliqueBound>::search(
        space.clone(),
        root.clone(),
        SearchParams::new(SearchGoal::Optimise),
    );
    let prune_level = Sequential::<CliqueGen, i64, CliqueBound>::search(
        space,
        root,
        SearchParams::new(SearchGoal::Optimise).with_prune_level(true),
    );

    assert_eq!(unbounded.objective_value(), Some(PENTANE_MAX_CLIQUE));
    assert_eq!(bounded.objective_value(), Some(PENTANE_MAX_CLIQUE));
    assert_eq!(prune_level.objective_value(), Some(PENTANE_MAX_CLIQUE));

    assert!(
        bounded.statistics().nodes_explored <= unbounded.statistics().nodes_explored,
        "bounding may only shrink the explored tree"
    );
}

// ---------------------------------------------------------------------
// Scenario 2: trivial decision stops early everywhere
// ---------------------------------------------------------------------

#[test]
fn test_decision_threshold_two_is_satisfied_by_every_strategy() {
    let space = CliqueSpace::pentane();
    let root = CliqueNode::root(&space);

    let outcomes = [
        (
            "Sequential",
            Sequential::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                decide_params(2),
            ),
        ),
        (
            "DepthBounded",
            DepthBounded::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                decide_params(2),
            ),
        ),
        (
            "Ordered",
            Ordered::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                decide_params(2),
            ),
        ),
        (
            "Budget",
            Budget::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                decide_params(2),
            ),
        ),
        (
            "Random",
            Random::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                decide_params(2),
            ),
        ),
        (
            "StackStealing",
            StackStealing::<CliqueGen, i64, CliqueBound>::search(
                space.clone(),
                root.clone(),
                decide_params(2),
            ),
        ),
    ];

    for (name, outcome) in &outcomes {
        assert!(outcome.is_satisfied(), "{} must find a 2-clique", name);
        let (node, bound) = outcome.best().expect("satisfied outcome carries a witness");
        assert!(*bound >= 2, "{} witness bound below threshold", name);
        assert!(node.size() >= 2, "{} witness clique too small", name);
    }
}

#[test]
fn test_unreachable_decision_threshold_is_unsatisfied() {
    let space = CliqueSpace::pentane();
    let root = CliqueNode::root(&space);

    let outcome = DepthBounded::<CliqueGen, i64, CliqueBound>::search(space, root, decide_params(4));
    assert!(!outcome.is_satisfied());
    assert!(outcome.best().is_none());
}

// ---------------------------------------------------------------------
// Scenario 4 / 6: spawn accounting under a single worker
// ---------------------------------------------------------------------

#[test]
fn test_budget_spawning_is_deterministic_with_one_worker() {
    let space = CliqueSpace::pentane();
    let root = CliqueNode::root(&space);
    let params = || {
        SearchParams::new(SearchGoal::Enumerate)
            .with_backtrack_budget(4)
            .with_workers(1)
    };

    let first = Budget::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        params(),
    );
    let second = Budget::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space,
        root,
        params(),
    );

    assert_eq!(*first.enumeration(), PENTANE_CLIQUE_COUNT);
    assert_eq!(
        first.statistics().tasks_spawned,
        second.statistics().tasks_spawned,
        "budget spawn trace must be a pure function of the tree"
    );
}

// ---------------------------------------------------------------------
// P6: termination on a larger tree, all strategies
// ---------------------------------------------------------------------

#[test]
fn test_termination_on_a_denser_graph() {
    // Complete graph on 9 vertices: 2^9 cliques, maximum clique 9.
    let edges: Vec<(usize, usize)> = (0..9)
        .flat_map(|a| ((a + 1)..9).map(move |b| (a, b)))
        .collect();
    let space = CliqueSpace::from_edges(9, &edges);
    let root = CliqueNode::root(&space);

    let seq = Sequential::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        SearchParams::new(SearchGoal::Enumerate),
    );
    assert_eq!(*seq.enumeration(), 512);

    let par = DepthBounded::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        SearchParams::new(SearchGoal::Enumerate)
            .with_spawn_depth(3)
            .with_workers(4),
    );
    assert_eq!(*par.enumeration(), 512);

    let stealing = StackStealing::<CliqueGen, i64, Unbounded, Maximising, CountNodes>::search(
        space.clone(),
        root.clone(),
        SearchParams::new(SearchGoal::Enumerate).with_workers(4),
    );
    assert_eq!(*stealing.enumeration(), 512);

    let optimum = DepthBounded::<CliqueGen, i64, CliqueBound>::search(
        space,
        root,
        SearchParams::new(SearchGoal::Optimise)
            .with_spawn_depth(3)
            .with_workers(4),
    );
    assert_eq!(optimum.objective_value(), Some(9));
}
