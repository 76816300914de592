//! Virtual characters: the parser's only unit of input
//!
//!     A regex inside a host string literal is not the literal's source text. `"\\d"` in a
//!     regular literal is the two-character pattern `\d`, but it came from three characters of
//!     source. A virtual char pairs each decoded character with the span of source it came from,
//!     so every diagnostic and capture span lands on the host text the user actually wrote.
//!
//!     [`VirtualCharSequence`] is an immutable, cheaply cloned window over a shared backing
//!     slice. Tokens hold sub-windows of the pattern's sequence; merging two adjacent tokens is a
//!     matter of widening the window with [`VirtualCharSequence::from_bounds`].
//!
//!     Producing a sequence from a host literal is the job of [`literal::decode`]; plain text can
//!     be wrapped directly with [`VirtualCharSequence::from_text`].

pub mod literal;

use crate::rex::ast::TextSpan;
use std::fmt;
use std::ops::{Index, Range};
use std::sync::Arc;

/// One decoded character and the host-source span it was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualChar {
    pub ch: char,
    pub span: TextSpan,
}

impl VirtualChar {
    pub fn new(ch: char, span: TextSpan) -> Self {
        Self { ch, span }
    }
}

impl PartialEq<char> for VirtualChar {
    fn eq(&self, other: &char) -> bool {
        self.ch == *other
    }
}

#[derive(Clone)]
pub struct VirtualCharSequence {
    chars: Arc<[VirtualChar]>,
    start: usize,
    end: usize,
}

impl VirtualCharSequence {
    pub fn new(chars: Vec<VirtualChar>) -> Self {
        let end = chars.len();
        Self {
            chars: chars.into(),
            start: 0,
            end,
        }
    }

    /// Wrap plain text: each char spans its own UTF-8 bytes, shifted by `base`
    pub fn from_text(text: &str, base: usize) -> Self {
        Self::new(
            text.char_indices()
                .map(|(offset, ch)| {
                    let start = base + offset;
                    VirtualChar::new(ch, TextSpan::new(start, start + ch.len_utf8()))
                })
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn get(&self, index: usize) -> Option<&VirtualChar> {
        self.as_slice().get(index)
    }

    pub fn first(&self) -> Option<&VirtualChar> {
        self.as_slice().first()
    }

    pub fn last(&self) -> Option<&VirtualChar> {
        self.as_slice().last()
    }

    pub fn as_slice(&self) -> &[VirtualChar] {
        &self.chars[self.start..self.end]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VirtualChar> {
        self.as_slice().iter()
    }

    /// A window relative to this one, sharing the backing slice
    pub fn sub_sequence(&self, range: Range<usize>) -> Self {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "sub-sequence {range:?} out of bounds for length {}",
            self.len()
        );
        Self {
            chars: Arc::clone(&self.chars),
            start: self.start + range.start,
            end: self.start + range.end,
        }
    }

    /// The window running from the start of `first` to the end of `last`
    ///
    /// Both must be windows over the same backing slice with `first` not after `last`; that
    /// holds for any two tokens produced by one lexer.
    pub fn from_bounds(first: &Self, last: &Self) -> Self {
        debug_assert!(Arc::ptr_eq(&first.chars, &last.chars));
        debug_assert!(first.start <= last.end);
        Self {
            chars: Arc::clone(&first.chars),
            start: first.start,
            end: last.end,
        }
    }

    /// Span from the first char's start to the last char's end; `None` when empty
    pub fn span(&self) -> Option<TextSpan> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(TextSpan::new(first.span.start, last.span.end)),
            _ => None,
        }
    }

    pub fn is_at(&self, index: usize, text: &str) -> bool {
        let mut position = index;
        for expected in text.chars() {
            match self.get(position) {
                Some(vc) if vc.ch == expected => position += 1,
                _ => return false,
            }
        }
        true
    }
}

impl Index<usize> for VirtualCharSequence {
    type Output = VirtualChar;

    fn index(&self, index: usize) -> &VirtualChar {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a VirtualCharSequence {
    type Item = &'a VirtualChar;
    type IntoIter = std::slice::Iter<'a, VirtualChar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for VirtualCharSequence {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for VirtualCharSequence {}

impl Default for VirtualCharSequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for VirtualCharSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for vc in self.iter() {
            write!(f, "{}", vc.ch)?;
        }
        Ok(())
    }
}

impl fmt::Debug for VirtualCharSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span() {
            Some(span) => write!(f, "{:?}@{}", self.to_string(), span),
            None => write!(f, "\"\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_uses_byte_spans() {
        let text = VirtualCharSequence::from_text("aé", 10);
        assert_eq!(text.len(), 2);
        assert_eq!(text[0].span, TextSpan::new(10, 11));
        assert_eq!(text[1].span, TextSpan::new(11, 13));
        assert_eq!(text.span(), Some(TextSpan::new(10, 13)));
    }

    #[test]
    fn sub_sequences_are_relative() {
        let text = VirtualCharSequence::from_text("abcdef", 0);
        let middle = text.sub_sequence(1..5);
        let inner = middle.sub_sequence(1..3);
        assert_eq!(inner.to_string(), "cd");
        assert_eq!(inner.span(), Some(TextSpan::new(2, 4)));
    }

    #[test]
    fn from_bounds_widens() {
        let text = VirtualCharSequence::from_text("abcdef", 0);
        let first = text.sub_sequence(1..2);
        let last = text.sub_sequence(3..4);
        assert_eq!(VirtualCharSequence::from_bounds(&first, &last).to_string(), "bcd");
    }

    #[test]
    fn is_at_checks_each_char() {
        let text = VirtualCharSequence::from_text("(?#x)", 0);
        assert!(text.is_at(0, "(?#"));
        assert!(!text.is_at(1, "(?#"));
        assert!(!text.is_at(4, ")?"));
    }

    #[test]
    fn empty_sequence_has_no_span() {
        assert_eq!(VirtualCharSequence::empty().span(), None);
        assert!(VirtualCharSequence::default().is_empty());
    }
}
