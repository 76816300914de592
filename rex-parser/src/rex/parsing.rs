//! Parsing module for regex patterns
//!
//! This module turns a pattern's virtual chars into a [`RegexTree`]:
//! 1. **Discovery**: a first parse with no captures known
//! 2. **Inventory**: capture names and numbers collected from that tree (see [captures])
//! 3. **Resolution**: a second parse in which backreferences and conditions can tell real
//!    groups from undefined ones
//!
//! Parsing is total: any input yields a tree, with problems recorded as diagnostics on the
//! tokens where they were found. The one exception is nesting deeper than
//! [`ParserSettings::max_depth`], which aborts with [`ParseError::DepthExceeded`] rather than
//! risk the stack.
//!
//! ## Submodules
//!
//! - [parser]: the recursive-descent core, sequences, alternation and quantifiers
//! - [grouping]: everything that starts with `(`
//! - [character_class]: `[...]`, ranges and subtractions
//! - [escapes]: everything that starts with `\`
//!
//! [captures]: crate::rex::captures

mod character_class;
mod escapes;
mod grouping;
mod parser;

use crate::rex::captures::{self, CaptureMaps};
use crate::rex::options::RegexOptions;
use crate::rex::tree::RegexTree;
use crate::rex::virtual_chars::VirtualCharSequence;
use parser::Parser;
use thiserror::Error;

pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserSettings {
    pub options: RegexOptions,
    /// Nesting levels of groups and nested character classes allowed before giving up
    pub max_depth: usize,
}

impl ParserSettings {
    pub fn new(options: RegexOptions) -> Self {
        Self {
            options,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self::new(RegexOptions::empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("pattern nests deeper than {limit} levels")]
    DepthExceeded { limit: usize },
}

/// Parse `text` into a tree
///
/// Malformed patterns still produce a tree; inspect [`RegexTree::diagnostics`]. The only
/// error is excessive nesting.
pub fn parse(text: &VirtualCharSequence, settings: &ParserSettings) -> Result<RegexTree, ParseError> {
    tracing::trace!(len = text.len(), options = ?settings.options, "discovering captures");
    let discovery = Parser::new(text.clone(), settings, CaptureMaps::default()).parse_tree()?;
    let captures = captures::analyze(text, &discovery, settings.options);

    tracing::trace!(
        names = captures.names.len(),
        numbers = captures.numbers.len(),
        "resolving against captures"
    );
    let root = Parser::new(text.clone(), settings, captures.clone()).parse_tree()?;

    let tree = RegexTree::new(text.clone(), root, captures);
    tracing::debug!(
        len = text.len(),
        diagnostics = tree.diagnostics().len(),
        "parsed pattern"
    );
    Ok(tree)
}

/// Parse with default settings, giving `None` for no text or a pattern nested too deeply
pub fn try_parse<'a>(
    text: impl Into<Option<&'a VirtualCharSequence>>,
    options: RegexOptions,
) -> Option<RegexTree> {
    let text = text.into()?;
    match parse(text, &ParserSettings::new(options)) {
        Ok(tree) => Some(tree),
        Err(error) => {
            tracing::warn!(%error, "pattern not analyzed");
            None
        }
    }
}

/// Convenience for plain strings: each char is its own virtual char at its byte offset
pub fn parse_str(pattern: &str, options: RegexOptions) -> Option<RegexTree> {
    try_parse(&VirtualCharSequence::from_text(pattern, 0), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rex::ast::{messages, TextSpan};

    #[test]
    fn test_no_text_gives_no_tree() {
        assert!(try_parse(None, RegexOptions::empty()).is_none());
    }

    #[test]
    fn test_depth_limit() {
        let deep = "(".repeat(600) + &")".repeat(600);
        let text = VirtualCharSequence::from_text(&deep, 0);

        let error = parse(&text, &ParserSettings::default()).unwrap_err();
        assert_eq!(error, ParseError::DepthExceeded { limit: 512 });
        assert!(try_parse(&text, RegexOptions::empty()).is_none());

        let relaxed = ParserSettings::default().with_max_depth(1000);
        let tree = parse(&text, &relaxed).unwrap();
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_nested_classes_count_towards_depth() {
        let deep = "[a-".repeat(600) + &"]".repeat(600);
        let text = VirtualCharSequence::from_text(&deep, 0);
        assert!(parse(&text, &ParserSettings::default()).is_err());
    }

    #[test]
    fn test_shallow_nesting_is_fine() {
        for depth in [70, 300, 500] {
            let pattern = "(".repeat(depth) + &")".repeat(depth);
            let tree = parse_str(&pattern, RegexOptions::empty()).unwrap();
            assert!(tree.diagnostics().is_empty());
            assert_eq!(tree.captures().numbers.len(), depth + 1);
        }
    }

    #[test]
    fn test_deep_nesting_on_a_small_thread_stack() {
        let pattern = "(".repeat(500) + &")".repeat(500);
        let handle = std::thread::Builder::new()
            .stack_size(1024 * 1024)
            .spawn(move || parse_str(&pattern, RegexOptions::empty()).map(|tree| tree.diagnostics().len()))
            .unwrap();
        assert_eq!(handle.join().unwrap(), Some(0));
    }

    #[test]
    fn test_second_pass_resolves_forward_references() {
        let tree = parse_str(r"\1(a)", RegexOptions::empty()).unwrap();
        assert!(tree.diagnostics().is_empty());

        let tree = parse_str(r"\2(a)", RegexOptions::empty()).unwrap();
        assert_eq!(tree.diagnostics().len(), 1);
        assert_eq!(tree.diagnostics()[0].message, messages::undefined_group_number(2));
        assert_eq!(tree.diagnostics()[0].span, TextSpan::new(1, 2));
    }

    #[test]
    fn test_offsets_follow_virtual_chars() {
        let text = VirtualCharSequence::from_text("(a", 10);
        let tree = try_parse(&text, RegexOptions::empty()).unwrap();
        assert_eq!(tree.diagnostics()[0].span, TextSpan::empty_at(12));
    }
}
