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

use num_traits::{FromPrimitive, PrimInt, Signed};

/// A trait alias for the numeric types usable as search bounds and
/// objectives. These are the signed integer types `i8`, `i16`, `i32`
/// and `i64`.
///
/// # Note
///
/// Wider and platform-sized types are intentionally excluded: bounds
/// are mirrored into an `AtomicI64` for lock-free reads, so the typed
/// value must convert losslessly into `i64`.
pub trait SearchBound:
    PrimInt
    + Signed
    + FromPrimitive
    + Into<i64>
    + std::fmt::Debug
    + std::fmt::Display
    + Send
    + Sync
    + 'static
{
}

impl<T> SearchBound for T where
    T: PrimInt
        + Signed
        + FromPrimitive
        + Into<i64>
        + std::fmt::Debug
        + std::fmt::Display
        + Send
        + Sync
        + 'static
{
}

/// Converts a raw atomic bound value back into the typed representation.
///
/// # Panics
///
/// Panics if the stored value does not fit into `B`. This cannot happen
/// for values that were previously stored through `Into<i64>` of the
/// same type.
#[inline]
pub fn bound_from_atomic<B: SearchBound>(raw: i64) -> B {
    B::from_i64(raw).expect("atomic bound value does not fit the typed bound representation")
}

/// A node that exposes the objective value of the solution it carries.
///
/// Optimisation and decision searches read this to drive incumbent
/// updates; enumeration-only nodes may return any constant.
pub trait Objective<B> {
    fn objective(&self) -> B;
}

/// Comparison strategy injected into bound checks and incumbent updates.
///
/// `improves` must be a strict ordering: a candidate equal to the
/// current value does not improve it. The default used throughout the
/// skeletons is [`Maximising`].
pub trait ObjectiveOrdering<B: SearchBound>: Default + Send + Sync + 'static {
    /// Returns `true` if `candidate` is strictly better than `current`.
    fn improves(candidate: B, current: B) -> bool;

    /// Returns `true` if `candidate` is at least as good as `threshold`.
    /// Decision searches use this against the expected objective.
    #[inline]
    fn satisfies(candidate: B, threshold: B) -> bool {
        candidate == threshold || Self::improves(candidate, threshold)
    }

    fn name() -> &'static str;
}

/// Bigger is better. The default ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Maximising;

impl<B: SearchBound> ObjectiveOrdering<B> for Maximising {
    #[inline(always)]
    fn improves(candidate: B, current: B) -> bool {
        candidate > current
    }

    fn name() -> &'static str {
        "Maximising"
    }
}

/// Smaller is better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Minimising;

impl<B: SearchBound> ObjectiveOrdering<B> for Minimising {
    #[inline(always)]
    fn improves(candidate: B, current: B) -> bool {
        candidate < current
    }

    fn name() -> &'static str {
        "Minimising"
    }
}

/// An upper (for maximisation) or lower (for minimisation) estimate of
/// the best objective achievable inside the subtree rooted at a node.
///
/// Implementations must be admissible under the chosen
/// [`ObjectiveOrdering`]: the estimate may never be beaten by a real
/// solution in the subtree, otherwise pruning discards optima.
pub trait BoundFunction<Sp, N, B>: Default + Send + Sync + 'static {
    /// Whether the engine performs bound-based pruning at all.
    /// Monomorphisation folds the check away when disabled.
    const ENABLED: bool;

    fn bound(&self, space: &Sp, node: &N) -> B;
}

/// Disables bounding. `bound` is unreachable when this is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unbounded;

impl<Sp, N, B: SearchBound> BoundFunction<Sp, N, B> for Unbounded {
    const ENABLED: bool = false;

    fn bound(&self, _space: &Sp, _node: &N) -> B {
        panic!("called `BoundFunction::bound` on `Unbounded`")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximising_is_strict() {
        assert!(<Maximising as ObjectiveOrdering<i64>>::improves(3, 2));
        assert!(!<Maximising as ObjectiveOrdering<i64>>::improves(2, 2));
        assert!(!<Maximising as ObjectiveOrdering<i64>>::improves(1, 2));
    }

    #[test]
    fn test_minimising_is_strict() {
        assert!(<Minimising as ObjectiveOrdering<i64>>::improves(1, 2));
        assert!(!<Minimising as ObjectiveOrdering<i64>>::improves(2, 2));
        assert!(!<Minimising as ObjectiveOrdering<i64>>::improves(3, 2));
    }

    #[test]
    fn test_satisfies_includes_equality() {
        assert!(<Maximising as ObjectiveOrdering<i64>>::satisfies(2, 2));
        assert!(<Maximising as ObjectiveOrdering<i64>>::satisfies(3, 2));
        assert!(!<Maximising as ObjectiveOrdering<i64>>::satisfies(1, 2));
    }

    #[test]
    fn test_bound_round_trips_through_atomic_representation() {
        let raw: i64 = 42i32.into();
        assert_eq!(bound_from_atomic::<i32>(raw), 42i32);
        let raw: i64 = (-7i16).into();
        assert_eq!(bound_from_atomic::<i16>(raw), -7i16);
    }

    #[test]
    #[should_panic(expected = "Unbounded")]
    fn test_unbounded_bound_is_a_precondition_fault() {
        let b = Unbounded;
        let _: i64 = b.bound(&(), &());
    }
}
