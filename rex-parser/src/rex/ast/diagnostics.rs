//! Diagnostics attached to tokens and trivia
//!
//! A diagnostic is pure data: a message worded exactly like the reference engine's exception
//! text, plus the host-source span it points at. Parsing never fails because of one; it is
//! attached to the offending token (at most one per token) and gathered into the tree's flat
//! list once parsing is done.
//!
//! Diagnostics compare by value, which is what lets the collector drop exact duplicates such as
//! the two identical "Not enough )'s" reported for `((`.

use super::span::TextSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub span: TextSpan,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: TextSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// Message texts, verbatim from the reference engine
pub mod messages {
    pub const NOT_ENOUGH_CLOSE_PARENS: &str = "Not enough )'s";
    pub const TOO_MANY_CLOSE_PARENS: &str = "Too many )'s";
    pub const QUANTIFIER_FOLLOWING_NOTHING: &str = "Quantifier {x,y} following nothing";
    pub const ILLEGAL_REVERSED_QUANTIFIER: &str = "Illegal {x,y} with x > y";
    pub const REVERSED_RANGE: &str = "[x-y] range in reverse order";
    pub const UNRECOGNIZED_GROUPING: &str = "Unrecognized grouping construct";
    pub const UNTERMINATED_SET: &str = "Unterminated [] set";
    pub const INVALID_GROUP_NAME: &str =
        "Invalid group name: Group names must begin with a word character";
    pub const CAPTURE_NUMBER_ZERO: &str = "Capture number cannot be zero";
    pub const UNDEFINED_GROUP: &str = "Reference to undefined group";
    pub const MALFORMED: &str = "Malformed";
    pub const CONDITION_IS_COMMENT: &str = "Alternation conditions cannot be comments";
    pub const CONDITION_IS_NAMED: &str =
        "Alternation conditions do not capture and cannot be named";
    pub const TOO_MANY_BARS: &str = "Too many | in (?()|)";
    pub const SUBTRACTION_NOT_LAST: &str =
        "A subtraction must be the last element in a character class";
    pub const ILLEGAL_BACKSLASH_AT_END: &str = "Illegal \\ at end of pattern";
    pub const MALFORMED_NAMED_BACKREFERENCE: &str = "Malformed \\k<...> named back reference";
    pub const MISSING_CONTROL_CHARACTER: &str = "Missing control character";
    pub const UNRECOGNIZED_CONTROL_CHARACTER: &str = "Unrecognized control character";
    pub const INCOMPLETE_CATEGORY_ESCAPE: &str = "Incomplete \\p{X} character escape";
    pub const MALFORMED_CATEGORY_ESCAPE: &str = "Malformed \\p{X} character escape";
    pub const UNKNOWN_PROPERTY: &str = "Unknown property";
    pub const UNTERMINATED_COMMENT: &str = "Unterminated (?#...) comment";
    pub const INSUFFICIENT_HEX_DIGITS: &str = "Insufficient hexadecimal digits";
    pub const CAPTURE_NUMBER_TOO_LARGE: &str =
        "Capture group numbers must be less than or equal to Int32.MaxValue";

    pub fn nested_quantifier(quantifier: char) -> String {
        format!("Nested quantifier {quantifier}")
    }

    pub fn undefined_group_number(number: i32) -> String {
        format!("Reference to undefined group number {number}")
    }

    pub fn undefined_group_name(name: &str) -> String {
        format!("Reference to undefined group name {name}")
    }

    pub fn class_in_range(class: char) -> String {
        format!("Cannot include class \\{class} in character range")
    }

    pub fn unrecognized_escape(ch: char) -> String {
        format!("Unrecognized escape sequence \\{ch}")
    }

    pub fn unknown_property_named(name: &str) -> String {
        format!("Unknown property '{name}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn display_includes_span() {
        let diagnostic = Diagnostic::new(messages::TOO_MANY_CLOSE_PARENS, TextSpan::new(3, 4));
        assert_eq!(diagnostic.to_string(), "Too many )'s at [3..4)");
    }

    #[test]
    fn equal_diagnostics_hash_together() {
        let mut seen = HashSet::new();
        assert!(seen.insert(Diagnostic::new("x", TextSpan::empty_at(2))));
        assert!(!seen.insert(Diagnostic::new("x", TextSpan::empty_at(2))));
        assert!(seen.insert(Diagnostic::new("x", TextSpan::empty_at(3))));
    }

    #[test]
    fn formatted_messages() {
        assert_eq!(messages::nested_quantifier('*'), "Nested quantifier *");
        assert_eq!(
            messages::class_in_range('d'),
            "Cannot include class \\d in character range"
        );
        assert_eq!(messages::unknown_property_named("cat"), "Unknown property 'cat'");
    }
}
