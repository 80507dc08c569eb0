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

//! # Expansion Engine
//!
//! The iterative depth-first loop every skeleton runs. The engine owns
//! the generator stack and the node processing (bounding, incumbent
//! update, decision short-circuit, enumeration); a [`SpawnPolicy`]
//! hook, invoked at the top of every iteration, decides when parts of
//! the stack are converted into pool tasks. The engine itself never
//! blocks: it runs to the next spawn decision or to completion.

use crate::runtime::{SkeletonRuntime, TaskPayload};
use arbor_search::enumerator::Enumerator;
use arbor_search::generator::{NodeGenerator, Path};
use arbor_search::num::{BoundFunction, Objective, ObjectiveOrdering, SearchBound};
use arbor_search::params::SearchGoal;
use arbor_search::registry::Registry;
use arbor_search::stack::{GeneratorStack, StackFrame};
use arbor_steal::pool::StealHandle;
use arbor_steal::task::WorkHint;
use arbor_steal::termination::SubtreeLatch;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::runtime::TaskSeed;

/// The verdict on one freshly generated child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeAction {
    /// Push the child and keep descending.
    Descend,
    /// Discard the child, stay on this level.
    Prune,
    /// Abandon the whole level (prune-level bounding).
    Break,
    /// A decision search found its witness; unwind immediately.
    Exit,
}

/// The strategy-specific part of a skeleton: when local DFS becomes
/// remotely executable tasks.
///
/// One value exists per running task. `for_task` rebuilds the strategy
/// state (budget counters, RNG, path prefix) from the task seed, so a
/// stolen subtree continues spawning the way its strategy prescribes.
pub(crate) trait SpawnPolicy<G, B, Bnd, C, E>: Sized + Send + 'static
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    fn for_task(rt: &Arc<SkeletonRuntime<G, B, Bnd, C, E>>, seed: &TaskSeed) -> Self;

    /// Called at the top of every engine iteration.
    fn poll(&mut self, view: &mut ExpandView<'_, G, B, Bnd, C, E, Self>);

    /// Called after a level was popped.
    fn on_backtrack(&mut self, _view: &mut ExpandView<'_, G, B, Bnd, C, E, Self>) {}
}

/// How peeled children are packaged for the pool.
#[derive(Debug, Clone)]
pub(crate) enum SpawnMode {
    /// Ship the node, hint its depth.
    Depth,
    /// Ship the node, hint an explicit priority: the child's depth, or
    /// its discrepancy accumulated from `base`.
    Priority { discrepancy: bool, base: u64 },
    /// Ship the child-index path below `prefix`; the task replays it.
    Path { prefix: Path },
}

/// The engine state a [`SpawnPolicy`] may inspect and spawn from.
pub(crate) struct ExpandView<'a, G, B, Bnd, C, E, S>
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    pub stack: &'a mut GeneratorStack<G>,
    /// Absolute depth of the node in the top frame.
    pub depth: usize,
    /// Absolute depth this task's root entered at.
    pub entry_depth: usize,
    rt: &'a Arc<SkeletonRuntime<G, B, Bnd, C, E>>,
    latch: &'a Arc<SubtreeLatch>,
    _strategy: PhantomData<S>,
}

impl<'a, G, B, Bnd, C, E, S> ExpandView<'a, G, B, Bnd, C, E, S>
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
    S: SpawnPolicy<G, B, Bnd, C, E>,
{
    /// The index of the top frame.
    #[inline]
    pub fn top_index(&self) -> usize {
        self.stack.depth() - 1
    }

    /// Converts up to `limit` unexplored children of frame `index`
    /// into pool tasks. Returns the number spawned.
    pub fn drain_frame(&mut self, index: usize, limit: usize, mode: &SpawnMode) -> usize {
        let child_depth = self.entry_depth + index + 1;

        // Sibling ranks of the chosen children below `index`. Every
        // frame below the top has delivered at least one child.
        let prefix_ranks: Vec<u32> = match mode {
            SpawnMode::Depth => Vec::new(),
            SpawnMode::Priority { discrepancy, .. } if !*discrepancy => Vec::new(),
            _ => self.stack.frames()[..index]
                .iter()
                .map(|frame| (frame.seen - 1) as u32)
                .collect(),
        };
        let prefix_discrepancy: u64 = prefix_ranks.iter().map(|&r| r as u64).sum();

        let mut spawned = 0;
        while spawned < limit && self.stack.frames()[index].has_unseen() {
            let frame = &mut self.stack.frames_mut()[index];
            let rank = frame.seen as u32;
            let node = frame.take_next();

            match mode {
                SpawnMode::Depth => {
                    self.rt.spawn::<S>(
                        self.latch,
                        TaskPayload::Node { node, child_depth },
                        WorkHint::Depth(child_depth),
                        0,
                    );
                }
                SpawnMode::Priority { discrepancy, base } => {
                    let priority = if *discrepancy {
                        base + prefix_discrepancy + rank as u64
                    } else {
                        child_depth as u64
                    };
                    self.rt.spawn::<S>(
                        self.latch,
                        TaskPayload::Node { node, child_depth },
                        WorkHint::Priority(priority),
                        priority,
                    );
                }
                SpawnMode::Path { prefix } => {
                    let mut path = prefix.clone();
                    path.extend_from_slice(&prefix_ranks);
                    path.push(rank);
                    self.rt.spawn::<S>(
                        self.latch,
                        TaskPayload::Path { path: path.clone() },
                        WorkHint::Position(path),
                        0,
                    );
                }
            }
            spawned += 1;
        }

        if spawned > 0 {
            self.rt.reg.monitor().on_spawn(spawned);
        }
        spawned
    }

    /// Answers a steal request by peeling children of frame `index`
    /// straight to the thief; overflow falls back to the pool.
    pub fn peel_to_thief(
        &mut self,
        index: usize,
        limit: usize,
        handle: &StealHandle,
    ) -> usize {
        let child_depth = self.entry_depth + index + 1;

        let mut peeled = 0;
        while peeled < limit && self.stack.frames()[index].has_unseen() {
            let node = self.stack.frames_mut()[index].take_next();
            self.rt.spawn_to_thief::<S>(
                self.latch,
                TaskPayload::Node { node, child_depth },
                WorkHint::Depth(child_depth),
                handle,
            );
            peeled += 1;
        }

        if peeled > 0 {
            self.rt.reg.monitor().on_spawn(peeled);
        }
        peeled
    }
}

/// Runs the bounded depth-first expansion of one subtree.
///
/// `entry_depth` is the absolute tree depth of `root` (the true root
/// enters at depth 1). `acc` collects this task's enumeration results;
/// the caller merges it into the registry afterwards.
pub(crate) fn expand<G, B, Bnd, C, E, S>(
    rt: &Arc<SkeletonRuntime<G, B, Bnd, C, E>>,
    latch: &Arc<SubtreeLatch>,
    strategy: &mut S,
    root: G::Node,
    entry_depth: usize,
    acc: &mut E,
) where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
    S: SpawnPolicy<G, B, Bnd, C, E>,
{
    let reg = &rt.reg;
    let goal = reg.params.goal;

    // The task root is processed here: spawning hands children over
    // without running them through `process_node`, so each node is
    // seen exactly once, as the root of the task that expands it.
    reg.stats.on_node();
    reg.stats.on_depth(entry_depth);
    if let NodeAction::Exit = process_root::<G, B, C, E>(reg, &root, acc) {
        return;
    }

    let mut stack = GeneratorStack::<G>::with_limit(reg.params.max_stack_depth);
    stack.push(StackFrame::open(&reg.space, root));
    let mut depth = entry_depth;

    loop {
        if goal == SearchGoal::Decide && reg.stop_requested() {
            return;
        }

        {
            let mut view = ExpandView {
                stack: &mut stack,
                depth,
                entry_depth,
                rt,
                latch,
                _strategy: PhantomData::<S>,
            };
            strategy.poll(&mut view);
        }

        let top = stack
            .top_mut()
            .expect("the expansion stack holds the task root while the loop runs");

        if top.has_unseen() {
            let child = top.take_next();
            match process_node::<G, B, Bnd, C, E>(reg, &rt.bounder, &child, acc) {
                NodeAction::Exit => return,
                NodeAction::Prune => continue,
                NodeAction::Break => {
                    stack.pop();
                    reg.stats.on_backtrack();
                    if stack.is_empty() {
                        return;
                    }
                    depth -= 1;
                    let mut view = ExpandView {
                        stack: &mut stack,
                        depth,
                        entry_depth,
                        rt,
                        latch,
                        _strategy: PhantomData::<S>,
                    };
                    strategy.on_backtrack(&mut view);
                }
                NodeAction::Descend => {
                    depth += 1;
                    reg.stats.on_depth(depth);
                    if reg.params.max_depth == Some(depth) {
                        // Depth-limited: the child is counted, not entered.
                        depth -= 1;
                        continue;
                    }
                    stack.push(StackFrame::open(&reg.space, child));
                }
            }
        } else {
            stack.pop();
            reg.stats.on_backtrack();
            if stack.is_empty() {
                return;
            }
            depth -= 1;
            let mut view = ExpandView {
                stack: &mut stack,
                depth,
                entry_depth,
                rt,
                latch,
                _strategy: PhantomData::<S>,
            };
            strategy.on_backtrack(&mut view);
        }
    }
}

/// Goal handling for a task root, which skipped `process_node` when it
/// was handed to the pool. No bound pruning here: a subtree already
/// handed over runs even if its level is pruned at the victim
/// afterwards, and its own children still go through the bound check.
fn process_root<G, B, C, E>(
    reg: &Registry<G, B, C, E>,
    node: &G::Node,
    acc: &mut E,
) -> NodeAction
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    match reg.params.goal {
        SearchGoal::Enumerate => {
            acc.accumulate(node);
            NodeAction::Descend
        }
        SearchGoal::Optimise => {
            let objective = node.objective();
            if reg.try_improve_bound(objective) {
                reg.incumbent().try_install::<C>(node, objective);
                reg.stats.on_improvement();
                reg.monitor().on_improvement(objective);
            }
            NodeAction::Descend
        }
        SearchGoal::Decide => {
            let expected = reg
                .params
                .expected_objective
                .expect("decision search requires an expected objective");
            let objective = node.objective();
            if C::satisfies(objective, expected) {
                reg.incumbent().try_install::<C>(node, objective);
                reg.request_stop();
                return NodeAction::Exit;
            }
            NodeAction::Descend
        }
    }
}

/// Bounding, incumbent update, decision test and enumeration for one
/// freshly generated child.
fn process_node<G, B, Bnd, C, E>(
    reg: &Registry<G, B, C, E>,
    bounder: &Bnd,
    child: &G::Node,
    acc: &mut E,
) -> NodeAction
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    reg.stats.on_node();

    if Bnd::ENABLED {
        let bound = bounder.bound(&reg.space, child);
        if !C::improves(bound, reg.local_bound()) {
            reg.stats.on_prune();
            return if reg.params.prune_level {
                NodeAction::Break
            } else {
                NodeAction::Prune
            };
        }
    }

    match reg.params.goal {
        SearchGoal::Enumerate => {
            acc.accumulate(child);
            NodeAction::Descend
        }
        SearchGoal::Optimise => {
            let objective = child.objective();
            if reg.try_improve_bound(objective) {
                reg.incumbent().try_install::<C>(child, objective);
                reg.stats.on_improvement();
                reg.monitor().on_improvement(objective);
            }
            NodeAction::Descend
        }
        SearchGoal::Decide => {
            let expected = reg
                .params
                .expected_objective
                .expect("decision search requires an expected objective");
            let objective = child.objective();
            if C::satisfies(objective, expected) {
                reg.incumbent().try_install::<C>(child, objective);
                reg.request_stop();
                return NodeAction::Exit;
            }
            NodeAction::Descend
        }
    }
}
