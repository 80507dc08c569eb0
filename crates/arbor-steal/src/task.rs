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

use arbor_search::generator::Path;

/// A unit of schedulable work: a whole subtree expansion packaged as a
/// closure. The closure owns everything it needs (registry handle,
/// completion latch, the subtree root or its path), so the pool can
/// move it to any worker thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Ordering information a task hands to the pool. Which variants a
/// pool honours depends on the pool; a pool given a hint it does not
/// understand files the task as unordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkHint {
    None,
    /// Tree depth of the subtree root. Shallow entries root bigger
    /// subtrees and are preferred by stealers.
    Depth(usize),
    /// Explicit priority; lower runs first.
    Priority(u64),
    /// Child-index path from the true root to the subtree root.
    Position(Path),
}

impl std::fmt::Display for WorkHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkHint::None => write!(f, "None"),
            WorkHint::Depth(d) => write!(f, "Depth({})", d),
            WorkHint::Priority(p) => write!(f, "Priority({})", p),
            WorkHint::Position(path) => write!(f, "Position(len: {})", path.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_hint_display() {
        assert_eq!(format!("{}", WorkHint::None), "None");
        assert_eq!(format!("{}", WorkHint::Depth(3)), "Depth(3)");
        assert_eq!(format!("{}", WorkHint::Priority(9)), "Priority(9)");
        let path: Path = smallvec![0, 2, 1];
        assert_eq!(format!("{}", WorkHint::Position(path)), "Position(len: 3)");
    }
}
