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

//! # Incumbent (Best Solution Holder)
//!
//! A concurrent container for the best node discovered so far. It
//! exposes a fast, lock-free bound via an atomic and stores the actual
//! node behind a `Mutex` as the source of truth. Multiple worker
//! threads propose improvements; the bound only ever moves in the
//! improving direction of the injected [`ObjectiveOrdering`].
//!
//! Concurrency and memory ordering: the atomic bound is read and
//! written with `Ordering::Relaxed`. It serves as a heuristic to
//! short-circuit installs that are obviously not improvements; all
//! correctness-sensitive state (the node and its bound) is synchronised
//! through the mutex, where the comparison is repeated against the
//! authoritative value.

use crate::num::{bound_from_atomic, ObjectiveOrdering, SearchBound};
use std::sync::{atomic::AtomicI64, atomic::Ordering, Mutex};

/// The best-so-far node together with its objective value.
///
/// Generic atomics are not yet available in stable Rust, so the typed
/// bound is mirrored into an `AtomicI64`; `SearchBound` guarantees the
/// conversion is lossless.
#[derive(Debug)]
pub struct Incumbent<N, B> {
    bound: AtomicI64,
    best: Mutex<Option<(N, B)>>,
}

impl<N, B> Incumbent<N, B>
where
    N: Clone,
    B: SearchBound,
{
    /// Creates an incumbent seeded with `initial` as the bound to beat.
    #[inline]
    pub fn new(initial: B) -> Self {
        Self {
            bound: AtomicI64::new(initial.into()),
            best: Mutex::new(None),
        }
    }

    /// The current bound. Candidates must strictly improve on this.
    #[inline]
    pub fn bound(&self) -> B {
        bound_from_atomic(self.bound.load(Ordering::Relaxed))
    }

    /// Returns `true` once a node has been installed.
    #[inline]
    pub fn has_solution(&self) -> bool {
        self.best.lock().unwrap().is_some()
    }

    /// A cloned snapshot of the current best node, if any.
    #[inline]
    pub fn snapshot(&self) -> Option<(N, B)> {
        self.best.lock().unwrap().clone()
    }

    /// Installs `node` unconditionally without touching the bound.
    /// Searches seed the root here so a result exists even when no
    /// candidate ever improves on the initial bound.
    #[inline]
    pub fn seed(&self, node: N, bound: B) {
        let mut guard = self.best.lock().unwrap();
        if guard.is_none() {
            *guard = Some((node, bound));
        }
    }

    /// Attempts to install `node` as the new incumbent.
    ///
    /// The fast path compares against the atomic bound without locking;
    /// the comparison is repeated under the mutex because another
    /// thread may have installed a better node in between. Applying the
    /// same improvement twice leaves the incumbent unchanged.
    pub fn try_install<C: ObjectiveOrdering<B>>(&self, node: &N, bound: B) -> bool {
        if !C::improves(bound, self.bound()) {
            return false;
        }

        let mut guard = self.best.lock().unwrap();
        if let Some((_, current)) = guard.as_ref() {
            if !C::improves(bound, *current) {
                return false;
            }
        }

        *guard = Some((node.clone(), bound));
        self.bound.store(bound.into(), Ordering::Relaxed);
        true
    }
}

impl<N, B> std::fmt::Display for Incumbent<N, B>
where
    N: Clone,
    B: SearchBound,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Incumbent(bound: {})", self.bound())
    }
}
