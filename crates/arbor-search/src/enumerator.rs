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

/// Accumulates enumeration results over visited nodes.
///
/// Each task folds into a private accumulator; accumulators are merged
/// into the process-wide one with `combine` when the task finishes, so
/// the hot path never synchronises. `finish` produces the user-visible
/// value after the search has drained.
pub trait Enumerator<N>: Default + Send + 'static {
    type Output;

    /// Folds one visited node into the accumulator.
    fn accumulate(&mut self, node: &N);

    /// Merges another task's accumulator into this one.
    fn combine(&mut self, other: Self);

    fn finish(self) -> Self::Output;
}

/// The enumerator used by optimisation and decision searches, which
/// accumulate nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullEnumerator;

impl<N> Enumerator<N> for NullEnumerator {
    type Output = ();

    #[inline(always)]
    fn accumulate(&mut self, _node: &N) {}

    #[inline(always)]
    fn combine(&mut self, _other: Self) {}

    #[inline(always)]
    fn finish(self) -> Self::Output {}
}

/// Counts visited nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountNodes {
    count: u64,
}

impl<N> Enumerator<N> for CountNodes {
    type Output = u64;

    #[inline(always)]
    fn accumulate(&mut self, _node: &N) {
        self.count += 1;
    }

    #[inline]
    fn combine(&mut self, other: Self) {
        self.count += other.count;
    }

    #[inline]
    fn finish(self) -> Self::Output {
        self.count
    }
}
