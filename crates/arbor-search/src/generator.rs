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

//! # Node Generator Contract
//!
//! The single trait a user implements per problem. A generator is
//! constructed from `(space, parent)` and hands out the children of
//! `parent` in a fixed, deterministic order. The search engine owns the
//! iteration; the generator owns the problem semantics.
//!
//! ## Requirements
//!
//! - Construction must be side-effect-free on both the space and the
//!   parent node.
//! - `num_children` is known at construction time and never changes.
//! - `next` is called at most `num_children` times.
//! - `nth` must produce exactly the child the k-th `next` call would
//!   produce. The provided default replays `next` on a fresh generator;
//!   override it when a direct construction is cheaper.
//!
//! Violations are programming errors and surface as panics, not as
//! recoverable results.

use smallvec::SmallVec;

/// A sequence of child indices leading from the true root of the search
/// tree to a node. Replaying a path with [`replay_path`] reconstructs
/// the node without shipping node state between tasks.
pub type Path = SmallVec<[u32; 16]>;

/// Produces the children of one search node in a fixed order.
pub trait NodeGenerator: Sized {
    /// The problem instance. Shared immutably by every task.
    type Space: Send + Sync + 'static;

    /// A state in the search tree. Value semantics; tasks may move
    /// nodes across threads.
    type Node: Clone + Send + Sync + 'static;

    /// Builds a generator for the children of `parent`.
    fn new(space: &Self::Space, parent: &Self::Node) -> Self;

    /// The number of children `parent` has. Known at construction.
    fn num_children(&self) -> usize;

    /// Produces the next child. Callers guarantee at most
    /// `num_children` calls.
    fn next(&mut self) -> Self::Node;

    /// Produces the `index`-th child of `parent` without producing the
    /// preceding ones. Must agree with the `next` sequence.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below `num_children`.
    fn nth(space: &Self::Space, parent: &Self::Node, index: usize) -> Self::Node {
        let mut gen = Self::new(space, parent);
        let count = gen.num_children();
        assert!(
            index < count,
            "called `NodeGenerator::nth` with index out of range: the node has {} children but the index is {}",
            count,
            index
        );

        let mut child = gen.next();
        for _ in 0..index {
            child = gen.next();
        }
        child
    }
}

/// Reconstructs the node a path points at by walking `nth` down from
/// the true root. An empty path yields the root itself.
pub fn replay_path<G: NodeGenerator>(space: &G::Space, root: &G::Node, path: &[u32]) -> G::Node {
    let mut node = root.clone();
    for &rank in path {
        node = G::nth(space, &node, rank as usize);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Children of `n` are `10 * n + 1 ..= 10 * n + 3`, three levels deep.
    struct Decimal {
        parent: u64,
        produced: usize,
        count: usize,
    }

    impl NodeGenerator for Decimal {
        type Space = ();
        type Node = u64;

        fn new(_space: &(), parent: &u64) -> Self {
            let count = if *parent < 1000 { 3 } else { 0 };
            Decimal {
                parent: *parent,
                produced: 0,
                count,
            }
        }

        fn num_children(&self) -> usize {
            self.count
        }

        fn next(&mut self) -> u64 {
            self.produced += 1;
            self.parent * 10 + self.produced as u64
        }
    }

    #[test]
    fn test_default_nth_matches_next_sequence() {
        let mut gen = Decimal::new(&(), &1);
        let by_next: Vec<u64> = (0..gen.num_children()).map(|_| gen.next()).collect();
        for (k, expected) in by_next.iter().enumerate() {
            assert_eq!(Decimal::nth(&(), &1, k), *expected);
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_nth_out_of_range_panics() {
        Decimal::nth(&(), &1, 3);
    }

    #[test]
    fn test_replay_path_walks_ranks_from_root() {
        // Root 0 -> child 2 is node 3, its child 0 is node 31.
        let path: Path = SmallVec::from_slice(&[2, 0]);
        assert_eq!(replay_path::<Decimal>(&(), &0, &path), 31);
    }

    #[test]
    fn test_replay_empty_path_is_root() {
        let path = Path::new();
        assert_eq!(replay_path::<Decimal>(&(), &7, &path), 7);
    }
}
