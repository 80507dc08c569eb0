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

//! # Search Registry
//!
//! The process-scoped state of one `search` invocation: the space, the
//! true root, the parameters, the local bound, the incumbent, the
//! merged enumeration accumulator, the cooperative stop flag, and the
//! statistics counters. Every task carries an `Arc` to the registry;
//! the lifetime of the registry is the lifetime of the search. Nothing
//! here is a true global.

use crate::enumerator::Enumerator;
use crate::generator::NodeGenerator;
use crate::incumbent::Incumbent;
use crate::monitor::{NoOpMonitor, SearchMonitor};
use crate::num::{bound_from_atomic, ObjectiveOrdering, SearchBound};
use crate::params::SearchParams;
use crate::stats::StatRecorder;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// The seam through which bound improvements leave the local process.
///
/// In a single process this collapses to an atomic store in the
/// registry. A distributed backend implements the same trait to fan
/// the improvement out to every locality's registry.
pub trait BoundBroadcast<B>: Send + Sync {
    /// Publishes a candidate bound. Returns `true` if it strictly
    /// improved the locally visible bound.
    fn publish_bound(&self, bound: B) -> bool;
}

pub struct Registry<G, B, C, E>
where
    G: NodeGenerator,
    B: SearchBound,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    pub space: G::Space,
    pub root: G::Node,
    pub params: SearchParams<B>,
    pub stats: StatRecorder,
    local_bound: AtomicI64,
    stop_search: AtomicBool,
    incumbent: Incumbent<G::Node, B>,
    accumulator: Mutex<E>,
    monitor: Arc<dyn SearchMonitor<B>>,
    _ordering: PhantomData<C>,
}

impl<G, B, C, E> Registry<G, B, C, E>
where
    G: NodeGenerator,
    B: SearchBound,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    pub fn new(space: G::Space, root: G::Node, params: SearchParams<B>) -> Self {
        let initial = params.initial_bound;
        let incumbent = Incumbent::new(initial);
        incumbent.seed(root.clone(), initial);

        Self {
            space,
            root,
            params,
            stats: StatRecorder::new(),
            local_bound: AtomicI64::new(initial.into()),
            stop_search: AtomicBool::new(false),
            incumbent,
            accumulator: Mutex::new(E::default()),
            monitor: Arc::new(NoOpMonitor),
            _ordering: PhantomData,
        }
    }

    pub fn with_monitor(mut self, monitor: Arc<dyn SearchMonitor<B>>) -> Self {
        self.monitor = monitor;
        self
    }

    #[inline]
    pub fn monitor(&self) -> &dyn SearchMonitor<B> {
        self.monitor.as_ref()
    }

    /// The bound candidates must strictly improve on.
    #[inline]
    pub fn local_bound(&self) -> B {
        bound_from_atomic(self.local_bound.load(Ordering::Relaxed))
    }

    /// Installs `candidate` as the local bound if it strictly improves
    /// on the current one under the ordering. The bound never regresses.
    pub fn try_improve_bound(&self, candidate: B) -> bool {
        let raw: i64 = candidate.into();
        let mut current = self.local_bound.load(Ordering::Relaxed);
        loop {
            if !C::improves(candidate, bound_from_atomic(current)) {
                return false;
            }
            match self.local_bound.compare_exchange_weak(
                current,
                raw,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    #[inline]
    pub fn incumbent(&self) -> &Incumbent<G::Node, B> {
        &self.incumbent
    }

    /// Cooperative cancellation: decision searches observe this at the
    /// top of every expansion step. Also usable by external watchdogs.
    #[inline]
    pub fn request_stop(&self) {
        self.stop_search.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.stop_search.load(Ordering::Relaxed)
    }

    /// Merges a finished task's accumulator into the process-wide one.
    pub fn merge_accumulator(&self, acc: E) {
        self.accumulator.lock().unwrap().combine(acc);
    }

    /// Takes the merged accumulator. Called once after the schedulers
    /// have stopped.
    pub fn take_accumulator(&self) -> E {
        std::mem::take(&mut *self.accumulator.lock().unwrap())
    }
}

impl<G, B, C, E> BoundBroadcast<B> for Registry<G, B, C, E>
where
    G: NodeGenerator,
    B: SearchBound,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    #[inline]
    fn publish_bound(&self, bound: B) -> bool {
        self.try_improve_bound(bound)
    }
}

impl<G, B, C, E> std::fmt::Display for Registry<G, B, C, E>
where
    G: NodeGenerator,
    B: SearchBound,
    C: ObjectiveOrdering<B>,
    E: Enumerator<G::Node>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Registry(bound: {}, stopped: {})",
            self.local_bound(),
            self.stop_requested()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::CountNodes;
    use crate::num::Maximising;
    use crate::params::SearchGoal;
    use std::sync::Arc;
    use std::thread;

    struct Singleton;

    impl NodeGenerator for Singleton {
        type Space = ();
        type Node = u32;

        fn new(_space: &(), _parent: &u32) -> Self {
            Singleton
        }

        fn num_children(&self) -> usize {
            0
        }

        fn next(&mut self) -> u32 {
            unreachable!("no children")
        }
    }

    type TestRegistry = Registry<Singleton, i64, Maximising, CountNodes>;

    fn registry() -> TestRegistry {
        Registry::new((), 0, SearchParams::new(SearchGoal::Optimise))
    }

    #[test]
    fn test_new_seeds_incumbent_with_root() {
        let reg = registry();
        assert_eq!(reg.local_bound(), 0);
        assert_eq!(reg.incumbent().snapshot(), Some((0, 0)));
        assert!(!reg.stop_requested());
    }

    #[test]
    fn test_bound_improvement_is_monotone() {
        let reg = registry();
        assert!(reg.try_improve_bound(4));
        assert!(!reg.try_improve_bound(4));
        assert!(!reg.try_improve_bound(2));
        assert!(reg.try_improve_bound(9));
        assert_eq!(reg.local_bound(), 9);
    }

    #[test]
    fn test_publish_bound_goes_through_the_broadcast_seam() {
        let reg = registry();
        let broadcast: &dyn BoundBroadcast<i64> = &reg;
        assert!(broadcast.publish_bound(5));
        assert_eq!(reg.local_bound(), 5);
    }

    #[test]
    fn test_concurrent_bound_races_keep_the_maximum() {
        let reg = Arc::new(registry());
        let candidates = [5i64, 12, 3, 8, 12, 1, 10];

        let handles: Vec<_> = candidates
            .iter()
            .map(|&b| {
                let reg = Arc::clone(&reg);
                thread::spawn(move || reg.try_improve_bound(b))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(reg.local_bound(), 12);
    }

    #[test]
    fn test_accumulator_merge_and_take() {
        let reg = registry();

        let mut a = CountNodes::default();
        Enumerator::accumulate(&mut a, &1u32);
        Enumerator::accumulate(&mut a, &2u32);
        reg.merge_accumulator(a);

        let mut b = CountNodes::default();
        Enumerator::accumulate(&mut b, &3u32);
        reg.merge_accumulator(b);

        let total = reg.take_accumulator();
        assert_eq!(Enumerator::<u32>::finish(total), 3);
    }

    #[test]
    fn test_stop_flag() {
        let reg = registry();
        assert!(!reg.stop_requested());
        reg.request_stop();
        assert!(reg.stop_requested());
    }
}
