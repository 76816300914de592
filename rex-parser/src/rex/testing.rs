//! Testing utilities for tree assertions
//!
//! Parser tests check diagnostics by message and span far more often than anything else, so
//! [`assert_tree`] gives them a fluent form that reports the whole diagnostic list on failure:
//!
//! ```rust,ignore
//! use crate::rex::testing::assert_tree;
//!
//! let tree = parse_str("a{2,1}", RegexOptions::empty()).unwrap();
//! assert_tree(&tree)
//!     .diagnostic_count(1)
//!     .diagnostic(0, messages::ILLEGAL_REVERSED_QUANTIFIER, TextSpan::new(4, 5))
//!     .top_level(&["ClosedRangeNumericQuantifier"]);
//! ```

use crate::rex::ast::{walk, Diagnostic, Node, TextSpan, Visitor};
use crate::rex::token::{Token, Trivia};
use crate::rex::tree::RegexTree;
use crate::rex::virtual_chars::VirtualChar;

pub fn assert_tree(tree: &RegexTree) -> TreeAssertion<'_> {
    TreeAssertion { tree }
}

/// Every char held by the tree's tokens and trivia, in tree order
///
/// For any parse this equals the input sequence, spans included.
pub fn all_chars(tree: &RegexTree) -> Vec<VirtualChar> {
    #[derive(Default)]
    struct Chars(Vec<VirtualChar>);

    impl Visitor for Chars {
        fn visit_token(&mut self, token: &Token) {
            self.0.extend(token.chars.iter().copied());
        }

        fn visit_trivia(&mut self, trivia: &Trivia) {
            self.0.extend(trivia.chars.iter().copied());
        }
    }

    let mut chars = Chars::default();
    walk(&mut chars, tree.root());
    chars.0
}

pub struct TreeAssertion<'a> {
    tree: &'a RegexTree,
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl<'a> TreeAssertion<'a> {
    pub fn no_diagnostics(self) -> Self {
        assert!(
            self.tree.diagnostics().is_empty(),
            "Expected no diagnostics for {:?}, found: [{}]",
            self.tree.text().to_string(),
            summarize(self.tree.diagnostics())
        );
        self
    }

    pub fn diagnostic_count(self, expected: usize) -> Self {
        let actual = self.tree.diagnostics().len();
        assert_eq!(
            actual,
            expected,
            "Expected {} diagnostics for {:?}, found {}: [{}]",
            expected,
            self.tree.text().to_string(),
            actual,
            summarize(self.tree.diagnostics())
        );
        self
    }

    /// Assert the diagnostic at `index` has exactly this message and span
    pub fn diagnostic(self, index: usize, message: impl AsRef<str>, span: TextSpan) -> Self {
        let diagnostics = self.tree.diagnostics();
        assert!(
            index < diagnostics.len(),
            "Diagnostic index {} out of bounds for {:?}: [{}]",
            index,
            self.tree.text().to_string(),
            summarize(diagnostics)
        );

        let expected = Diagnostic::new(message.as_ref(), span);
        assert_eq!(
            diagnostics[index],
            expected,
            "diagnostics[{}] for {:?}",
            index,
            self.tree.text().to_string()
        );
        self
    }

    /// Assert the names of the root sequence's children
    pub fn top_level(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = match &self.tree.root().expression {
            Node::Sequence(sequence) => sequence.children.iter().map(Node::name).collect(),
            other => vec![other.name()],
        };
        assert_eq!(
            actual,
            expected,
            "Top-level nodes for {:?}",
            self.tree.text().to_string()
        );
        self
    }

    pub fn capture_number(self, number: i32, span: TextSpan) -> Self {
        assert_eq!(
            self.tree.captures().number_span(number),
            Some(span),
            "Capture {} for {:?}, captures: {:?}",
            number,
            self.tree.text().to_string(),
            self.tree.captures()
        );
        self
    }

    pub fn capture_name(self, name: &str, span: TextSpan) -> Self {
        assert_eq!(
            self.tree.captures().name_span(name),
            Some(span),
            "Capture '{}' for {:?}, captures: {:?}",
            name,
            self.tree.text().to_string(),
            self.tree.captures()
        );
        self
    }
}
