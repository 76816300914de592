//! Spans in host-source coordinates
//!
//! Every position the parser reports is an offset into the *host* source text the pattern was
//! decoded from, never an index into the pattern itself. A pattern written as `@"a\d"` at
//! offset 8 of a file reports its `\` at 11, not at 1.
//!
//! ## Types
//!
//! - [`TextSpan`] - A half-open `[start..end)` byte range
//!
//! Spans are plain values: `Copy`, ordered, hashable, and serializable so diagnostics built on
//! them can be de-duplicated and emitted as JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range of host-source offsets
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Self { start, end }
    }

    /// A zero-width span positioned at `at`
    pub fn empty_at(at: usize) -> Self {
        Self::new(at, at)
    }

    /// The smallest span covering both `first` and `last`
    pub fn covering(first: TextSpan, last: TextSpan) -> Self {
        Self::new(first.start.min(last.start), first.end.max(last.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}
