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

use crate::stats::SearchStatistics;

/// What a finished search produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult<N, B> {
    /// Optimisation: the incumbent at exhaustion.
    Optimum(N, B),
    /// Decision: a node reaching the expected objective.
    Satisfied(N, B),
    /// Decision: the tree was exhausted without reaching the expected
    /// objective. Carries the root back to the caller.
    Unsatisfied(N),
    /// Enumeration: the accumulated value is in
    /// [`SearchOutcome::enumeration`].
    Enumerated,
}

impl<N, B: std::fmt::Display> std::fmt::Display for SearchResult<N, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchResult::Optimum(_, bound) => write!(f, "Optimum(objective: {})", bound),
            SearchResult::Satisfied(_, bound) => write!(f, "Satisfied(objective: {})", bound),
            SearchResult::Unsatisfied(_) => write!(f, "Unsatisfied"),
            SearchResult::Enumerated => write!(f, "Enumerated"),
        }
    }
}

/// The complete outcome of one search: the result, the enumeration
/// value (unit unless enumerating) and the run statistics.
#[derive(Debug, Clone)]
pub struct SearchOutcome<N, B, O> {
    result: SearchResult<N, B>,
    enumeration: O,
    statistics: SearchStatistics,
}

impl<N, B, O> SearchOutcome<N, B, O> {
    #[inline]
    pub fn new(result: SearchResult<N, B>, enumeration: O, statistics: SearchStatistics) -> Self {
        Self {
            result,
            enumeration,
            statistics,
        }
    }

    #[inline]
    pub fn result(&self) -> &SearchResult<N, B> {
        &self.result
    }

    #[inline]
    pub fn enumeration(&self) -> &O {
        &self.enumeration
    }

    #[inline]
    pub fn into_enumeration(self) -> O {
        self.enumeration
    }

    #[inline]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Returns `true` for a decision search that met its threshold.
    #[inline]
    pub fn is_satisfied(&self) -> bool {
        matches!(self.result, SearchResult::Satisfied(_, _))
    }

    /// The best node and its objective, for optimisation and satisfied
    /// decision outcomes.
    #[inline]
    pub fn best(&self) -> Option<(&N, &B)> {
        match &self.result {
            SearchResult::Optimum(node, bound) | SearchResult::Satisfied(node, bound) => {
                Some((node, bound))
            }
            _ => None,
        }
    }

    /// The best objective value found, if any.
    #[inline]
    pub fn objective_value(&self) -> Option<B>
    where
        B: Copy,
    {
        self.best().map(|(_, b)| *b)
    }
}

impl<N, B: std::fmt::Display, O> std::fmt::Display for SearchOutcome<N, B, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        write!(f, "{}", self.statistics)
    }
}
