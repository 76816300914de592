//! Character classification
//!
//!     Two questions the lexer needs answered about characters, both matching the reference
//!     engine rather than a generic notion of "letter":
//!
//!     Word characters:
//!         What `\w` matches and what capture names are made of: letters (`L`), non-spacing marks
//!         (`Mn`), decimal digits (`Nd`), connector punctuation (`Pc`), plus the two zero-width
//!         joiners U+200C and U+200D. The range table is built once from regex-syntax's Unicode
//!         data and searched with a binary search.
//!
//!     Escape categories:
//!         The names `\p{...}` accepts: general categories and their one-letter groups, the
//!         engine's `Is<Block>` names, and its internal `_xml` classes. See [categories].

pub mod categories;

use once_cell::sync::Lazy;
use regex_syntax::hir::{Class, HirKind};

pub use categories::is_escape_category;

const WORD_CLASS: &str = r"[\p{L}\p{Mn}\p{Nd}\p{Pc}\u{200C}\u{200D}]";

/// Sorted, non-overlapping inclusive ranges of word characters
static WORD_RANGES: Lazy<Vec<(char, char)>> = Lazy::new(|| {
    let hir = regex_syntax::parse(WORD_CLASS).expect("static word class");
    match hir.kind() {
        HirKind::Class(Class::Unicode(class)) => class
            .ranges()
            .iter()
            .map(|range| (range.start(), range.end()))
            .collect(),
        other => panic!("static word class parsed to {other:?}"),
    }
});

pub fn is_word_char(ch: char) -> bool {
    // fast path for the common case
    if ch.is_ascii() {
        return ch.is_ascii_alphanumeric() || ch == '_';
    }

    WORD_RANGES
        .binary_search_by(|&(start, end)| {
            if end < ch {
                std::cmp::Ordering::Less
            } else if start > ch {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_word_chars() {
        for ch in ['a', 'Z', '0', '9', '_'] {
            assert!(is_word_char(ch), "{ch:?}");
        }
        for ch in [' ', '-', '$', '(', '\n'] {
            assert!(!is_word_char(ch), "{ch:?}");
        }
    }

    #[test]
    fn unicode_word_chars() {
        assert!(is_word_char('é'));
        assert!(is_word_char('λ'));
        assert!(is_word_char('٣')); // Arabic-Indic digit three
        assert!(is_word_char('\u{0301}')); // combining acute accent (Mn)
        assert!(is_word_char('\u{203F}')); // undertie (Pc)
        assert!(is_word_char('\u{200C}'));
        assert!(is_word_char('\u{200D}'));
        assert!(!is_word_char('\u{200B}'));
        assert!(!is_word_char('€'));
        assert!(!is_word_char('Ⅷ')); // letter number (Nl)
    }

    #[test]
    fn ascii_fast_path_agrees_with_table() {
        for byte in 0u8..128 {
            let ch = byte as char;
            let in_table = WORD_RANGES
                .iter()
                .any(|&(start, end)| start <= ch && ch <= end);
            assert_eq!(is_word_char(ch), in_table, "{ch:?}");
        }
    }
}
