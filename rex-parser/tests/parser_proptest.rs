//! Property-based tests for the parser
//!
//! Any pattern text must parse: malformed input only produces diagnostics. On top of that the
//! tree keeps every char of the pattern exactly once, and text runs are as merged as they can be.

use rex_parser::rex::ast::{walk, Node, Visitor};
use rex_parser::rex::formats::detokenize;
use rex_parser::rex::testing::all_chars;
use rex_parser::rex::{parse_str, RegexOptions};
use proptest::prelude::*;

/// Short patterns drawn mostly from syntax characters
fn pattern_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        r"[abc()\[\]{}|*+?.^$\\:<>'=!,019#kpPux -]{0,40}",
        r"[a-z]{0,10}",
        r"(\(\?[<'=!:>#]?[a-z]{0,3}[)>']?){0,6}",
        r"(\[\^?[a-z\\-]{0,4}\]?){0,6}",
    ]
}

fn options_strategy() -> impl Strategy<Value = RegexOptions> {
    prop_oneof![
        Just(RegexOptions::empty()),
        Just(RegexOptions::IGNORE_PATTERN_WHITESPACE),
        Just(RegexOptions::EXPLICIT_CAPTURE),
        Just(RegexOptions::ECMASCRIPT),
        Just(RegexOptions::IGNORE_CASE | RegexOptions::IGNORE_PATTERN_WHITESPACE),
    ]
}

/// Counts adjacent text nodes the parser should have merged
#[derive(Default)]
struct UnmergedText(usize);

impl Visitor for UnmergedText {
    fn visit_node(&mut self, node: &Node) {
        let Node::Sequence(sequence) = node else {
            return;
        };
        for pair in sequence.children.windows(2) {
            if let [Node::Text(first), Node::Text(second)] = pair {
                if first.text.diagnostic.is_none()
                    && second.text.diagnostic.is_none()
                    && second.text.leading_trivia.is_empty()
                {
                    self.0 += 1;
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn every_pattern_parses(pattern in pattern_strategy(), options in options_strategy()) {
        prop_assert!(parse_str(&pattern, options).is_some());
    }

    #[test]
    fn tree_reproduces_pattern(pattern in pattern_strategy(), options in options_strategy()) {
        let tree = parse_str(&pattern, options).unwrap();
        prop_assert_eq!(detokenize(tree.root()), pattern);
        prop_assert_eq!(all_chars(&tree), tree.text().as_slice());
    }

    #[test]
    fn diagnostics_stay_inside_pattern(pattern in pattern_strategy(), options in options_strategy()) {
        let tree = parse_str(&pattern, options).unwrap();
        let len = pattern.chars().count();
        for diagnostic in tree.diagnostics() {
            prop_assert!(diagnostic.span.start <= diagnostic.span.end);
            prop_assert!(diagnostic.span.end <= len, "{} outside {:?}", diagnostic, pattern);
        }
    }

    #[test]
    fn diagnostics_are_unique(pattern in pattern_strategy(), options in options_strategy()) {
        let tree = parse_str(&pattern, options).unwrap();
        let diagnostics = tree.diagnostics();
        for (i, diagnostic) in diagnostics.iter().enumerate() {
            prop_assert!(!diagnostics[i + 1..].contains(diagnostic));
        }
    }

    #[test]
    fn text_runs_are_merged(pattern in pattern_strategy(), options in options_strategy()) {
        let tree = parse_str(&pattern, options).unwrap();
        let mut unmerged = UnmergedText::default();
        walk(&mut unmerged, tree.root());
        prop_assert_eq!(unmerged.0, 0, "unmerged text in {:?}", pattern);
    }

    #[test]
    fn whole_pattern_is_capture_zero(pattern in pattern_strategy(), options in options_strategy()) {
        let tree = parse_str(&pattern, options).unwrap();
        let zero = tree.captures().number_span(0);
        prop_assert!(zero.is_some());
        prop_assert_eq!(zero.map(|span| span.len()), Some(pattern.chars().count()));
    }

    #[test]
    fn letters_are_one_text(pattern in "[a-z]{1,20}") {
        let tree = parse_str(&pattern, RegexOptions::empty()).unwrap();
        let Node::Sequence(sequence) = &tree.root().expression else {
            panic!("expected a sequence");
        };
        prop_assert_eq!(sequence.children.len(), 1);
        let Node::Text(text) = &sequence.children[0] else {
            panic!("expected text");
        };
        prop_assert_eq!(text.text.chars.to_string(), pattern);
    }
}
