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

//! # Skeleton Runtime
//!
//! The shared plumbing of one parallel search: the registry, the task
//! pool, the outstanding-work counter and the task factory. `search`
//! seeds a single root task, blocks on the root completion latch,
//! stops the schedulers and harvests the outcome.

use crate::engine::{expand, SpawnPolicy};
use arbor_search::enumerator::Enumerator;
use arbor_search::generator::{replay_path, NodeGenerator, Path};
use arbor_search::monitor::SearchMonitor;
use arbor_search::num::{BoundFunction, Objective, ObjectiveOrdering, SearchBound};
use arbor_search::outcome::{SearchOutcome, SearchResult};
use arbor_search::params::{SearchGoal, SearchParams};
use arbor_search::registry::Registry;
use arbor_steal::policy::Policy;
use arbor_steal::pool::StealHandle;
use arbor_steal::scheduler::Scheduler;
use arbor_steal::task::{Task, WorkHint};
use arbor_steal::termination::{SubtreeLatch, WorkCounter};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What a spawned task carries: the subtree root itself, or the path
/// to replay it from the true root.
pub(crate) enum TaskPayload<N> {
    Node { node: N, child_depth: usize },
    Path { path: Path },
}

/// Deterministic per-task inputs a [`SpawnPolicy`] rebuilds its state
/// from.
pub(crate) struct TaskSeed {
    /// Monotone task number; mixed into the RNG seed.
    pub seq: u64,
    /// The task's root path, when spawned through the position index.
    pub path: Option<Path>,
    /// The task root's priority, for discrepancy accumulation.
    pub base_priority: u64,
}

pub(crate) struct SkeletonRuntime<G, B, Bnd, C, E>
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    pub reg: Arc<Registry<G, B, C, E>>,
    pub pool: Arc<dyn Policy>,
    pub counter: Arc<WorkCounter>,
    pub bounder: Bnd,
    pub steal: Option<Arc<StealHandle>>,
    task_seq: AtomicU64,
}

impl<G, B, Bnd, C, E> SkeletonRuntime<G, B, Bnd, C, E>
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    pub fn new(
        reg: Arc<Registry<G, B, C, E>>,
        pool: Arc<dyn Policy>,
        steal: Option<Arc<StealHandle>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            reg,
            pool,
            counter: Arc::new(WorkCounter::new()),
            bounder: Bnd::default(),
            steal,
            task_seq: AtomicU64::new(0),
        })
    }

    /// Packages a subtree as a task under `parent`. The task counts as
    /// outstanding from this moment; whoever fails to queue it must
    /// call `discard_task`.
    fn make_task<S>(
        self: &Arc<Self>,
        parent: &Arc<SubtreeLatch>,
        payload: TaskPayload<G::Node>,
        base_priority: u64,
    ) -> (Task, Arc<SubtreeLatch>)
    where
        S: SpawnPolicy<G, B, Bnd, C, E>,
    {
        let latch = SubtreeLatch::child(parent);
        self.counter.increment();

        let seed = TaskSeed {
            seq: self.task_seq.fetch_add(1, Ordering::Relaxed),
            path: match &payload {
                TaskPayload::Path { path } => Some(path.clone()),
                TaskPayload::Node { .. } => None,
            },
            base_priority,
        };

        let rt = Arc::clone(self);
        let task_latch = Arc::clone(&latch);
        let task: Task = Box::new(move || {
            run_task::<G, B, Bnd, C, E, S>(&rt, &task_latch, payload, seed);
        });

        (task, latch)
    }

    /// A task the pool refused (or a full handoff lane dropped) counts
    /// as completed.
    fn discard_task(&self, latch: &Arc<SubtreeLatch>) {
        self.counter.decrement();
        latch.complete();
    }

    /// Spawns a subtree into the pool.
    pub fn spawn<S>(
        self: &Arc<Self>,
        parent: &Arc<SubtreeLatch>,
        payload: TaskPayload<G::Node>,
        hint: WorkHint,
        base_priority: u64,
    ) where
        S: SpawnPolicy<G, B, Bnd, C, E>,
    {
        let (task, latch) = self.make_task::<S>(parent, payload, base_priority);
        self.reg.stats.on_spawn();
        if !self.pool.add_work(task, hint) {
            self.discard_task(&latch);
        }
    }

    /// Hands a peeled subtree straight to a waiting thief; falls back
    /// to the pool when the handoff lane is full.
    pub fn spawn_to_thief<S>(
        self: &Arc<Self>,
        parent: &Arc<SubtreeLatch>,
        payload: TaskPayload<G::Node>,
        hint: WorkHint,
        handle: &StealHandle,
    ) where
        S: SpawnPolicy<G, B, Bnd, C, E>,
    {
        let (task, latch) = self.make_task::<S>(parent, payload, 0);
        self.reg.stats.on_spawn();
        match handle.fulfil(task) {
            Ok(()) => {}
            Err(task) => {
                if !self.pool.add_work(task, hint) {
                    self.discard_task(&latch);
                }
            }
        }
    }

    /// Queues the root task against the root latch itself.
    fn submit_root<S>(self: &Arc<Self>, root_latch: &Arc<SubtreeLatch>, payload: TaskPayload<G::Node>, hint: WorkHint)
    where
        S: SpawnPolicy<G, B, Bnd, C, E>,
    {
        self.counter.increment();
        let seed = TaskSeed {
            seq: self.task_seq.fetch_add(1, Ordering::Relaxed),
            path: match &payload {
                TaskPayload::Path { path } => Some(path.clone()),
                TaskPayload::Node { .. } => None,
            },
            base_priority: 0,
        };
        let rt = Arc::clone(self);
        let task_latch = Arc::clone(root_latch);
        let task: Task = Box::new(move || {
            run_task::<G, B, Bnd, C, E, S>(&rt, &task_latch, payload, seed);
        });
        if !self.pool.add_work(task, hint) {
            self.discard_task(root_latch);
        }
    }
}

/// The body of every task: resolve the payload, rebuild the strategy,
/// expand, merge the accumulator, release the latch. A panicking user
/// callback is recorded as a completed task; the search result is then
/// undefined, but the search still terminates.
fn run_task<G, B, Bnd, C, E, S>(
    rt: &Arc<SkeletonRuntime<G, B, Bnd, C, E>>,
    latch: &Arc<SubtreeLatch>,
    payload: TaskPayload<G::Node>,
    seed: TaskSeed,
) where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
    S: SpawnPolicy<G, B, Bnd, C, E>,
{
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let (root, entry_depth) = match &payload {
            TaskPayload::Node { node, child_depth } => (node.clone(), *child_depth),
            TaskPayload::Path { path } => (
                replay_path::<G>(&rt.reg.space, &rt.reg.root, path),
                path.len() + 1,
            ),
        };

        let mut strategy = S::for_task(rt, &seed);
        let mut acc = E::default();
        expand(rt, latch, &mut strategy, root, entry_depth, &mut acc);
        rt.reg.merge_accumulator(acc);
    }));

    // Unwinds out of user callbacks are translated into ordinary task
    // completion; partial results are undefined.
    drop(result);

    rt.counter.decrement();
    latch.complete();
}

/// Drives a parallel skeleton: seed the root task, start schedulers,
/// block on the root latch, stop, harvest.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run_parallel<G, B, Bnd, C, E, S>(
    strategy_name: &'static str,
    space: G::Space,
    root: G::Node,
    params: SearchParams<B>,
    pool: Arc<dyn Policy>,
    steal: Option<Arc<StealHandle>>,
    monitor: Option<Arc<dyn SearchMonitor<B>>>,
    indexed: bool,
) -> SearchOutcome<G::Node, B, E::Output>
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
    S: SpawnPolicy<G, B, Bnd, C, E>,
{
    validate_params(&params);
    let start = std::time::Instant::now();

    let mut reg = Registry::<G, B, C, E>::new(space, root, params);
    if let Some(monitor) = monitor {
        reg = reg.with_monitor(monitor);
    }
    let reg = Arc::new(reg);
    reg.monitor().on_enter_search(strategy_name, reg.params.goal);

    let workers = reg.params.worker_count();
    let rt = SkeletonRuntime::<G, B, Bnd, C, E>::new(Arc::clone(&reg), pool, steal);

    // Seed the root before the workers start polling, so the first
    // poll finds work instead of raising a steal request.
    let (root_latch, wait) = SubtreeLatch::root();
    if indexed {
        rt.submit_root::<S>(
            &root_latch,
            TaskPayload::Path { path: Path::new() },
            WorkHint::Position(Path::new()),
        );
    } else {
        rt.submit_root::<S>(
            &root_latch,
            TaskPayload::Node {
                node: reg.root.clone(),
                child_depth: 1,
            },
            WorkHint::Depth(0),
        );
    }

    let scheduler = Scheduler::start(Arc::clone(&rt.pool), workers);
    wait.wait();
    rt.pool.stop();
    scheduler.stop();

    debug_assert!(rt.counter.is_idle(), "orphan tasks outlived the search");
    debug_assert_eq!(rt.pool.pending(), 0, "tasks left in a drained pool");

    let stats = reg.stats.snapshot(workers, start.elapsed());
    reg.monitor().on_exit_search(&stats);
    harvest(&reg, stats)
}

/// Drives the sequential skeleton on the calling thread. No pool, no
/// schedulers; the engine runs to completion in one call.
pub(crate) fn run_sequential<G, B, Bnd, C, E, S>(
    strategy_name: &'static str,
    space: G::Space,
    root: G::Node,
    params: SearchParams<B>,
    pool: Arc<dyn Policy>,
    monitor: Option<Arc<dyn SearchMonitor<B>>>,
) -> SearchOutcome<G::Node, B, E::Output>
where
    G: NodeGenerator + 'static,
    G::Node: Objective<B>,
    B: SearchBound,
    Bnd: BoundFunction<G::Space, G::Node, B>,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
    S: SpawnPolicy<G, B, Bnd, C, E>,
{
    validate_params(&params);
    let start = std::time::Instant::now();

    let mut reg = Registry::<G, B, C, E>::new(space, root, params);
    if let Some(monitor) = monitor {
        reg = reg.with_monitor(monitor);
    }
    let reg = Arc::new(reg);
    reg.monitor().on_enter_search(strategy_name, reg.params.goal);

    let rt = SkeletonRuntime::<G, B, Bnd, C, E>::new(Arc::clone(&reg), pool, None);
    let (root_latch, wait) = SubtreeLatch::root();

    rt.counter.increment();
    run_task::<G, B, Bnd, C, E, S>(
        &rt,
        &root_latch,
        TaskPayload::Node {
            node: reg.root.clone(),
            child_depth: 1,
        },
        TaskSeed {
            seq: 0,
            path: None,
            base_priority: 0,
        },
    );
    wait.wait();

    let stats = reg.stats.snapshot(1, start.elapsed());
    reg.monitor().on_exit_search(&stats);
    harvest(&reg, stats)
}

fn validate_params<B: SearchBound>(params: &SearchParams<B>) {
    if params.goal == SearchGoal::Decide {
        assert!(
            params.expected_objective.is_some(),
            "called `search` with goal `Decide` but no expected objective"
        );
    }
}

fn harvest<G, B, C, E>(
    reg: &Arc<Registry<G, B, C, E>>,
    stats: arbor_search::stats::SearchStatistics,
) -> SearchOutcome<G::Node, B, E::Output>
where
    G: NodeGenerator + 'static,
    B: SearchBound,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    let enumeration = reg.take_accumulator().finish();

    let result = match reg.params.goal {
        SearchGoal::Enumerate => SearchResult::Enumerated,
        SearchGoal::Optimise => {
            let (node, bound) = reg
                .incumbent()
                .snapshot()
                .expect("the incumbent is seeded with the root");
            SearchResult::Optimum(node, bound)
        }
        SearchGoal::Decide => {
            if reg.stop_requested() {
                let (node, bound) = reg
                    .incumbent()
                    .snapshot()
                    .expect("the incumbent is seeded with the root");
                SearchResult::Satisfied(node, bound)
            } else {
                SearchResult::Unsatisfied(reg.root.clone())
            }
        }
    };

    SearchOutcome::new(result, enumeration, stats)
}
