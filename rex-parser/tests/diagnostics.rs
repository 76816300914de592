//! Diagnostics reported for whole patterns, checked by message and span

use rex_parser::rex::ast::messages;
use rex_parser::rex::testing::assert_tree;
use rex_parser::rex::{parse_str, RegexOptions, TextSpan};
use rstest::rstest;

#[rstest]
#[case("((", messages::NOT_ENOUGH_CLOSE_PARENS, TextSpan::empty_at(2))]
#[case("a)", messages::TOO_MANY_CLOSE_PARENS, TextSpan::new(1, 2))]
#[case("[b-a]", messages::REVERSED_RANGE, TextSpan::new(2, 3))]
#[case(r"\p{Xyz}", "Unknown property 'Xyz'", TextSpan::new(3, 6))]
#[case("a{2,1}", messages::ILLEGAL_REVERSED_QUANTIFIER, TextSpan::new(4, 5))]
#[case("*", messages::QUANTIFIER_FOLLOWING_NOTHING, TextSpan::new(0, 1))]
#[case(r"\", messages::ILLEGAL_BACKSLASH_AT_END, TextSpan::new(0, 1))]
#[case("[a", messages::UNTERMINATED_SET, TextSpan::empty_at(2))]
#[case(r"\2", "Reference to undefined group number 2", TextSpan::new(1, 2))]
#[case(r"\k<b>", "Reference to undefined group name b", TextSpan::new(3, 4))]
#[case("(?(a)b|c|d)", messages::TOO_MANY_BARS, TextSpan::new(8, 9))]
#[case(r"a(?n)|(b)\1", "Reference to undefined group number 1", TextSpan::new(10, 11))]
#[case(r"(?n)a|(b)\1", "Reference to undefined group number 1", TextSpan::new(10, 11))]
#[case(r"(?n:(a))\1", "Reference to undefined group number 1", TextSpan::new(9, 10))]
#[case(r"((?n)a|(b))\2", "Reference to undefined group number 2", TextSpan::new(12, 13))]
fn single_diagnostic(#[case] pattern: &str, #[case] message: &str, #[case] span: TextSpan) {
    let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
    assert_tree(&tree).diagnostic_count(1).diagnostic(0, message, span);
}

#[rstest]
#[case("")]
#[case("abc")]
#[case(r"(?<a>x)\k<a>")]
#[case(r"[a-\-b]")]
#[case(r"^\d{3}-\d{4}$")]
#[case(r"(?i:hello)|(?-i)WORLD")]
#[case(r"(?<year>\d{4})-(?<month>\d\d)")]
#[case(r"[\p{L}-[aeiou]]+")]
#[case(r"(?(year)\k<year>|none)(?<year>y)")]
#[case(r"a*?b+?c??d{1,}?")]
#[case(r"(?n:(a))(b)\1")]
#[case(r"((?n)a|(b))(c)\2")]
#[case(r"(?n)(a)|(?-n)(b)\1")]
fn clean_patterns(#[case] pattern: &str) {
    let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
    assert_tree(&tree).no_diagnostics();
}

#[test]
fn text_run_is_one_node() {
    let tree = parse_str("abc", RegexOptions::empty()).unwrap();
    assert_tree(&tree).no_diagnostics().top_level(&["Text"]);
}

#[test]
fn diagnostics_are_in_tree_order() {
    let tree = parse_str(r"a{2,1}[z-a]\q", RegexOptions::empty()).unwrap();
    assert_tree(&tree)
        .diagnostic_count(3)
        .diagnostic(0, messages::ILLEGAL_REVERSED_QUANTIFIER, TextSpan::new(4, 5))
        .diagnostic(1, messages::REVERSED_RANGE, TextSpan::new(8, 9))
        .diagnostic(2, r"Unrecognized escape sequence \q", TextSpan::new(12, 13));
}

#[test]
fn whitespace_mode_skips_trivia() {
    let tree = parse_str("a b # tail", RegexOptions::IGNORE_PATTERN_WHITESPACE).unwrap();
    assert_tree(&tree).no_diagnostics().top_level(&["Text", "Text"]);
}

#[test]
fn captures_for_mixed_groups() {
    let tree = parse_str("(?<x>a)(b)(?<y>c)(d)", RegexOptions::empty()).unwrap();
    assert_tree(&tree)
        .no_diagnostics()
        .capture_number(0, TextSpan::new(0, 20))
        .capture_number(1, TextSpan::new(7, 10))
        .capture_number(2, TextSpan::new(17, 20))
        .capture_number(3, TextSpan::new(0, 7))
        .capture_number(4, TextSpan::new(10, 17))
        .capture_name("x", TextSpan::new(0, 7))
        .capture_name("y", TextSpan::new(10, 17));
}
