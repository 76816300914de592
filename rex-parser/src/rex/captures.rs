//! Capture inventory
//!
//! Finds every capture group of a parsed pattern and assigns numbers the way the reference
//! engine does: unnamed groups are numbered left to right starting at 1, explicitly numbered
//! groups keep their number, and named groups then take the next free numbers in the order
//! their names first appear. Number 0 always denotes the whole pattern.
//!
//! The parser runs twice. The first pass sees empty maps; this module then inventories the
//! first tree, and the second pass resolves backreferences and conditions against the result.

use crate::rex::ast::traits::grow_stack;
use crate::rex::ast::{AstNode, CompilationUnit, Node, NodeOrToken, TextSpan};
use crate::rex::options::RegexOptions;
use crate::rex::token::{Token, TokenValue};
use crate::rex::virtual_chars::VirtualCharSequence;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Capture names and numbers mapped to the span of the group that defines them
///
/// When several groups share a name or number, the first one in the pattern wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureMaps {
    pub names: Arc<BTreeMap<String, TextSpan>>,
    pub numbers: Arc<BTreeMap<i32, TextSpan>>,
}

impl CaptureMaps {
    pub fn has_number(&self, number: i32) -> bool {
        self.numbers.contains_key(&number)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn number_span(&self, number: i32) -> Option<TextSpan> {
        self.numbers.get(&number).copied()
    }

    pub fn name_span(&self, name: &str) -> Option<TextSpan> {
        self.names.get(name).copied()
    }
}

pub fn analyze(
    text: &VirtualCharSequence,
    root: &CompilationUnit,
    options: RegexOptions,
) -> CaptureMaps {
    let mut analyzer = CaptureAnalyzer::default();
    analyzer
        .numbers
        .insert(0, text.span().unwrap_or(TextSpan::empty_at(0)));

    analyzer.collect(&root.expression, options);
    analyzer.assign_name_numbers();

    CaptureMaps {
        names: Arc::new(analyzer.names),
        numbers: Arc::new(analyzer.numbers),
    }
}

#[derive(Default)]
struct CaptureAnalyzer {
    names: BTreeMap<String, TextSpan>,
    numbers: BTreeMap<i32, TextSpan>,
    // BTreeMap forgets insertion order, which decides the numbers names get
    name_order: Vec<String>,
    auto_number: i32,
}

impl CaptureAnalyzer {
    /// Walk `node` under `options` and return the options in force right after it
    ///
    /// Only an inline `(?imnsx)` changes what follows, and the change lasts until the end of
    /// the enclosing group, across any later `|`.
    fn collect(&mut self, node: &Node, options: RegexOptions) -> RegexOptions {
        grow_stack(|| self.collect_node(node, options))
    }

    fn collect_node(&mut self, node: &Node, options: RegexOptions) -> RegexOptions {
        match node {
            Node::Sequence(sequence) => {
                return sequence
                    .children
                    .iter()
                    .fold(options, |options, child| self.collect(child, options));
            }
            Node::Alternation(alternation) => {
                let after_left = self.collect(&alternation.left, options);
                return self.collect(&alternation.right, after_left);
            }
            Node::SimpleOptionsGrouping(group) => {
                return options.apply_inline(group.options.chars.iter().map(|vc| vc.ch));
            }
            Node::SimpleGrouping(group) => {
                if captures_by_number(&group.expression, options) {
                    self.auto_number += 1;
                    let span = grouping_span(&group.open_paren, node);
                    self.numbers.entry(self.auto_number).or_insert(span);
                }
            }
            Node::NestedOptionsGrouping(group) => {
                let nested = options.apply_inline(group.options.chars.iter().map(|vc| vc.ch));
                self.collect(&group.expression, nested);
                return options;
            }
            Node::CaptureGrouping(group) => {
                self.record(&group.capture, grouping_span(&group.open_paren, node));
            }
            Node::BalancingGrouping(group) => {
                self.record(&group.first_capture, grouping_span(&group.open_paren, node));
            }
            Node::ConditionalExpressionGrouping(group) => {
                // the condition is an assertion, not a group of its own
                self.collect_children(&group.grouping, options);
                self.collect(&group.result, options);
                return options;
            }
            _ => {}
        }

        self.collect_children(node, options);
        options
    }

    /// Child expressions of a group or quantifier; whatever options they set end with it
    fn collect_children(&mut self, node: &Node, options: RegexOptions) {
        for child in node.children() {
            if let NodeOrToken::Node(child) = child {
                self.collect(child, options);
            }
        }
    }

    fn record(&mut self, capture: &Token, span: TextSpan) {
        match &capture.value {
            Some(TokenValue::Number(number)) => {
                self.numbers.entry(*number).or_insert(span);
            }
            Some(TokenValue::Name(name)) => {
                if !self.names.contains_key(name) {
                    self.names.insert(name.clone(), span);
                    self.name_order.push(name.clone());
                }
            }
            None => {}
        }
    }

    fn assign_name_numbers(&mut self) {
        let mut next = self.auto_number + 1;
        for name in &self.name_order {
            while self.numbers.contains_key(&next) {
                next += 1;
            }
            self.numbers.insert(next, self.names[name]);
            next += 1;
        }
    }
}

fn captures_by_number(expression: &Node, options: RegexOptions) -> bool {
    !options.contains(RegexOptions::EXPLICIT_CAPTURE) && !starts_with_question(expression)
}

/// `(?...)` that failed to parse as a construct is kept as a simple group whose body starts
/// with a lone `?` text; it does not capture
fn starts_with_question(expression: &Node) -> bool {
    let mut expression = expression;
    while let Node::Alternation(alternation) = expression {
        expression = &alternation.left;
    }

    match expression {
        Node::Sequence(sequence) => matches!(
            sequence.children.first(),
            Some(Node::Text(text)) if text.text.is_char('?')
        ),
        _ => false,
    }
}

/// From the open paren to the end of the group, leading trivia excluded
fn grouping_span(open_paren: &Token, node: &Node) -> TextSpan {
    match (open_paren.span(), node.span()) {
        (Some(open), Some(whole)) => TextSpan::new(open.start, whole.end),
        (Some(open), None) => open,
        (None, whole) => whole.unwrap_or(TextSpan::empty_at(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rex::parsing::parse_str;
    use rstest::rstest;

    fn captures(pattern: &str, options: RegexOptions) -> CaptureMaps {
        parse_str(pattern, options).unwrap().captures().clone()
    }

    fn numbers(maps: &CaptureMaps) -> Vec<(i32, TextSpan)> {
        maps.numbers.iter().map(|(n, s)| (*n, *s)).collect()
    }

    #[test]
    fn test_zero_is_whole_pattern() {
        let maps = captures("abc", RegexOptions::empty());
        assert_eq!(numbers(&maps), vec![(0, TextSpan::new(0, 3))]);
        assert!(maps.names.is_empty());
    }

    #[test]
    fn test_empty_pattern_zero_is_empty_span() {
        let maps = captures("", RegexOptions::empty());
        assert_eq!(numbers(&maps), vec![(0, TextSpan::empty_at(0))]);
    }

    #[test]
    fn test_unnamed_then_named_numbering() {
        let maps = captures("(?<x>a)(b)(?<y>c)(d)", RegexOptions::empty());
        assert_eq!(maps.number_span(1), Some(TextSpan::new(7, 10)));
        assert_eq!(maps.number_span(2), Some(TextSpan::new(17, 20)));
        assert_eq!(maps.number_span(3), Some(TextSpan::new(0, 7)));
        assert_eq!(maps.number_span(4), Some(TextSpan::new(10, 17)));
        assert_eq!(maps.name_span("x"), Some(TextSpan::new(0, 7)));
        assert_eq!(maps.name_span("y"), Some(TextSpan::new(10, 17)));
    }

    #[test]
    fn test_named_skip_explicit_numbers() {
        let maps = captures("(a)(?<2>b)(?<n>c)", RegexOptions::empty());
        assert!(maps.has_number(1));
        assert!(maps.has_number(2));
        assert_eq!(maps.number_span(3), maps.name_span("n"));
    }

    #[test]
    fn test_first_definition_wins() {
        let maps = captures("(?<n>a)(?<n>bb)", RegexOptions::empty());
        assert_eq!(maps.name_span("n"), Some(TextSpan::new(0, 7)));
        assert_eq!(maps.numbers.len(), 2);
    }

    #[test]
    fn test_explicit_capture_option() {
        let maps = captures("(a)(?<n>b)", RegexOptions::EXPLICIT_CAPTURE);
        assert!(!maps.has_number(2));
        assert!(maps.has_name("n"));
        assert_eq!(maps.number_span(1), maps.name_span("n"));
    }

    #[test]
    fn test_inline_options_apply_to_following_siblings() {
        let maps = captures("(a)(?n)(b)", RegexOptions::empty());
        assert!(maps.has_number(1));
        assert!(!maps.has_number(2));

        let maps = captures("(?n:(a))(b)", RegexOptions::empty());
        assert_eq!(maps.number_span(1), Some(TextSpan::new(8, 11)));
    }

    #[rstest]
    #[case::after_first_alternative("a(?n)|(b)", &[0])]
    #[case::before_bar("(?n)a|(b)", &[0])]
    #[case::middle_alternative("(a)|(?n)(b)|(c)", &[0, 1])]
    #[case::turned_back_off("(?n)(a)|(?-n)(b)", &[0, 1])]
    #[case::ends_with_enclosing_group("((?n)a|(b))(c)", &[0, 1, 2])]
    #[case::scoped_group("(?n:a|(b))(c)", &[0, 1])]
    #[case::inside_quantified_group("((?n)(a))*(b)", &[0, 1, 2])]
    fn test_explicit_capture_scope(#[case] pattern: &str, #[case] expected: &[i32]) {
        let maps = captures(pattern, RegexOptions::empty());
        let found: Vec<i32> = maps.numbers.keys().copied().collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_explicit_capture_scope_spans() {
        let maps = captures("((?n)a|(b))(c)", RegexOptions::empty());
        assert_eq!(maps.number_span(1), Some(TextSpan::new(0, 11)));
        assert_eq!(maps.number_span(2), Some(TextSpan::new(11, 14)));
    }

    #[test]
    fn test_balancing_group_records_first_name() {
        let maps = captures("(?<open>a)(?<close-open>b)", RegexOptions::empty());
        assert!(maps.has_name("open"));
        assert!(maps.has_name("close"));
    }

    #[test]
    fn test_conditional_expression_is_not_a_group() {
        let maps = captures("(?(a)b|c)", RegexOptions::empty());
        assert_eq!(maps.numbers.len(), 1);

        let maps = captures("(?((x))y)", RegexOptions::empty());
        assert!(maps.has_number(1));
        assert!(!maps.has_number(2));
    }

    #[test]
    fn test_bogus_question_group_does_not_capture() {
        let maps = captures("(?", RegexOptions::empty());
        assert_eq!(maps.numbers.len(), 1);
    }

    #[test]
    fn test_unclosed_group_span_runs_to_end() {
        let maps = captures("x (a", RegexOptions::IGNORE_PATTERN_WHITESPACE);
        assert_eq!(maps.number_span(1), Some(TextSpan::new(2, 4)));
    }
}
