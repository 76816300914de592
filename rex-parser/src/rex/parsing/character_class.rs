//! Character classes: `[...]`, `[^...]`, ranges, subtractions and `[:name:]`
//!
//! Inside a class almost everything is literal, so tokens are scanned without trivia even
//! under `x` mode. A `]` that would leave the class empty is taken as a literal.

use super::parser::{merge_text_nodes, ParseResult, Parser};
use crate::rex::ast::nodes::*;
use crate::rex::ast::{messages, Diagnostic, Node, NodeOrToken};
use crate::rex::token::{Token, TokenKind};

impl Parser {
    pub(super) fn parse_character_class(&mut self) -> ParseResult<Node> {
        self.descend(Self::parse_character_class_worker)
    }

    fn parse_character_class_worker(&mut self) -> ParseResult<Node> {
        let open_bracket = self.consume(false);

        let mut caret = Token::missing(TokenKind::Caret);
        if self.current.kind == TokenKind::Caret {
            caret = self.current.clone();
        } else {
            self.move_back_before_previous_scan();
        }
        self.consume(false);

        let mut components: Vec<Node> = Vec::new();
        let mut close_bracket = Token::missing(TokenKind::CloseBracket);
        while self.current.kind != TokenKind::EndOfFile {
            if self.current.kind == TokenKind::CloseBracket && !components.is_empty() {
                close_bracket = self.consume(true);
                break;
            }
            self.parse_character_class_components(&mut components)?;
        }

        if close_bracket.is_missing() {
            let span = self.token_start_position_span(&self.current);
            close_bracket.add_diagnostic_if_none(Diagnostic::new(messages::UNTERMINATED_SET, span));
        }

        let components = Node::sequence(merge_text_nodes(components));
        Ok(if caret.is_missing() {
            Node::CharacterClass(Box::new(CharacterClassNode {
                open_bracket,
                components,
                close_bracket,
            }))
        } else {
            Node::NegatedCharacterClass(Box::new(NegatedCharacterClassNode {
                open_bracket,
                caret,
                components,
                close_bracket,
            }))
        })
    }

    fn parse_character_class_components(&mut self, components: &mut Vec<Node>) -> ParseResult<()> {
        let left = self.parse_single_character_class_component(components.is_empty(), false)?;

        // a class escape can't start a range, so its `-` is literal
        if matches!(left, Node::CharacterClassEscape(_) | Node::CategoryEscape(_)) || left.is_escaped_minus() {
            components.push(left);
            return Ok(());
        }

        if self.current.kind != TokenKind::Minus || self.lexer.is_at("]") {
            components.push(left);
            return Ok(());
        }

        let mut minus = self.consume(false);
        if self.current.kind == TokenKind::OpenBracket {
            components.push(left);
            components.push(self.parse_character_class_subtraction(minus)?);
            return Ok(());
        }

        let right = self.parse_right_side_of_character_class_range()?;
        if let (Some(low), Some(high)) = (range_value(&left), range_value(&right)) {
            if low > high {
                let span = self.token_span(&minus);
                minus.add_diagnostic_if_none(Diagnostic::new(messages::REVERSED_RANGE, span));
            }
        }

        components.push(Node::CharacterClassRange(Box::new(CharacterClassRangeNode {
            left,
            minus,
            right,
        })));
        Ok(())
    }

    /// After `x-`: one component, or a run of `\-` escapes together with what follows them
    fn parse_right_side_of_character_class_range(&mut self) -> ParseResult<Node> {
        let first = self.parse_single_character_class_component(false, true)?;
        if !first.is_escaped_minus() {
            return Ok(first);
        }

        let mut children = vec![first];
        while children.last().is_some_and(Node::is_escaped_minus)
            && self.current.kind != TokenKind::CloseBracket
        {
            children.push(self.parse_single_character_class_component(false, true)?);
        }
        Ok(Node::sequence(children))
    }

    fn parse_single_character_class_component(&mut self, is_first: bool, after_range_minus: bool) -> ParseResult<Node> {
        if self.current.kind == TokenKind::Backslash && !self.lexer.at_end() {
            let mut backslash = self.current.clone();
            self.consume(false);

            return Ok(match self.current.first_char() {
                Some(class @ ('d' | 'D' | 's' | 'S' | 'w' | 'W' | 'p' | 'P')) => {
                    if after_range_minus {
                        let span = self.span_between(&backslash, &self.current);
                        backslash.add_diagnostic_if_none(Diagnostic::new(messages::class_in_range(class), span));
                    }
                    self.lexer.position -= 1;
                    self.parse_escape(backslash, false)
                }
                Some('-') => {
                    let minus = self.consume(false).with_kind(TokenKind::Text);
                    Node::simple_escape(backslash, minus)
                }
                _ => {
                    self.lexer.position -= 1;
                    self.parse_char_escape(backslash, false)
                }
            });
        }

        if !after_range_minus && !is_first && self.current.kind == TokenKind::Minus && self.lexer.is_at("[") {
            let minus = self.consume(false);
            return self.parse_character_class_subtraction(minus);
        }

        if !after_range_minus && self.current.kind == TokenKind::OpenBracket && self.lexer.is_at(":") {
            if let Some(property) = self.try_parse_posix_property() {
                return Ok(property);
            }
        }

        Ok(Node::text(self.consume(false).with_kind(TokenKind::Text)))
    }

    /// `[:name:]`; on failure the `[` is left as the current token
    fn try_parse_posix_property(&mut self) -> Option<Node> {
        let before_bracket = self.lexer.position - 1;
        self.consume(false);

        let name = self.lexer.try_scan_capture_name();
        if name.is_some() && self.lexer.is_at(":]") {
            self.lexer.position += 2;
            let text = Token::new(
                TokenKind::Text,
                Vec::new(),
                self.lexer.sub_pattern(before_bracket, self.lexer.position),
            );
            self.consume(false);
            return Some(Node::PosixProperty(Box::new(PosixPropertyNode { text })));
        }

        self.reset_to_position_and_consume(before_bracket, false);
        None
    }

    /// `-[...]`; nothing may follow it inside the enclosing class
    fn parse_character_class_subtraction(&mut self, mut minus: Token) -> ParseResult<Node> {
        let class = self.parse_character_class()?;
        if !matches!(self.current.kind, TokenKind::CloseBracket | TokenKind::EndOfFile) {
            let span = self.token_start_position_span(&minus);
            minus.add_diagnostic_if_none(Diagnostic::new(messages::SUBTRACTION_NOT_LAST, span));
        }

        Ok(Node::CharacterClassSubtraction(Box::new(CharacterClassSubtractionNode {
            minus,
            class,
        })))
    }
}

/// The code point a range endpoint stands for; `None` when it has none or is broken
fn range_value(node: &Node) -> Option<u32> {
    if has_problem(node) {
        return None;
    }
    range_value_worker(node)
}

fn range_value_worker(node: &Node) -> Option<u32> {
    match node {
        Node::SimpleEscape(escape) => escape.type_token.first_char().map(|ch| escaped_char(ch) as u32),
        Node::ControlEscape(escape) => {
            let ch = escape.control.first_char()?.to_ascii_uppercase();
            (ch as u32 + 1).checked_sub('A' as u32)
        }
        Node::OctalEscape(escape) => digits_value(&escape.octal_text, 8),
        Node::HexEscape(escape) | Node::UnicodeEscape(escape) => digits_value(&escape.hex_text, 16),
        Node::PosixProperty(_) => Some('[' as u32),
        Node::Text(text) => text.text.first_char().map(|ch| ch as u32),
        Node::Sequence(sequence) => {
            // the run after `x-\-...`; its last component is the real endpoint
            let last = sequence.children.last()?;
            if last.is_escaped_minus() {
                None
            } else {
                range_value_worker(last)
            }
        }
        _ => None,
    }
}

fn escaped_char(ch: char) -> char {
    match ch {
        'a' => '\u{7}',
        'b' => '\u{8}',
        'e' => '\u{1b}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        other => other,
    }
}

fn digits_value(token: &Token, radix: u32) -> Option<u32> {
    token.chars.iter().try_fold(0u32, |total, vc| {
        let digit = vc.ch.to_digit(radix)?;
        total.checked_mul(radix)?.checked_add(digit)
    })
}

/// True when anything under `node` is missing or carries a diagnostic
fn has_problem(node: &Node) -> bool {
    node.children().into_iter().any(|child| match child {
        NodeOrToken::Node(node) => has_problem(node),
        NodeOrToken::Token(token) => {
            token.is_missing()
                || token.diagnostic.is_some()
                || token.leading_trivia.iter().any(|trivia| trivia.diagnostic.is_some())
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::rex::ast::{messages, Node, TextSpan};
    use crate::rex::parsing::parse_str;
    use crate::rex::testing::assert_tree;
    use crate::rex::RegexOptions;
    use rstest::rstest;

    fn class_components(pattern: &str) -> Vec<&'static str> {
        let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
        let Node::Sequence(sequence) = &tree.root().expression else {
            panic!("expected a sequence");
        };
        let components = match &sequence.children[0] {
            Node::CharacterClass(class) => &class.components,
            Node::NegatedCharacterClass(class) => &class.components,
            other => panic!("expected a class, found {}", other.name()),
        };
        components.children().iter().filter_map(|c| c.as_node()).map(Node::name).collect()
    }

    #[rstest]
    #[case("[abc]", &["Text"])]
    #[case("[^abc]", &["Text"])]
    #[case("[]a]", &["Text"])]
    #[case("[a-z]", &["CharacterClassRange"])]
    #[case("[a-]", &["Text"])]
    #[case("[\\d-z]", &["CharacterClassEscape", "Text"])]
    #[case("[a-z-[aeiou]]", &["CharacterClassRange", "CharacterClassSubtraction"])]
    #[case("[a-[b]]", &["Text", "CharacterClassSubtraction"])]
    #[case("[[:alpha:]]", &["PosixProperty"])]
    #[case("[[:alpha]", &["Text"])]
    #[case("[\\x41-\\x5A]", &["CharacterClassRange"])]
    #[case("[\\--a]", &["SimpleEscape", "Text"])]
    fn test_components(#[case] pattern: &str, #[case] expected: &[&str]) {
        assert_eq!(class_components(pattern), expected);
    }

    #[rstest]
    #[case("[abc")]
    #[case("[")]
    #[case("[^")]
    fn test_unterminated(#[case] pattern: &str) {
        let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
        let end = pattern.len();
        assert_tree(&tree).diagnostic(0, messages::UNTERMINATED_SET, TextSpan::empty_at(end));
    }

    #[rstest]
    #[case("[b-a]", TextSpan::new(2, 3))]
    #[case("[\\n-\\a]", TextSpan::new(3, 4))]
    #[case("[\\x42-\\x41]", TextSpan::new(5, 6))]
    #[case("[\\cB-\\cA]", TextSpan::new(4, 5))]
    #[case("[\\102-\\101]", TextSpan::new(5, 6))]
    #[case("[[:a:]-A]", TextSpan::new(6, 7))]
    fn test_reversed_ranges(#[case] pattern: &str, #[case] span: TextSpan) {
        let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
        assert_tree(&tree).diagnostic_count(1).diagnostic(0, messages::REVERSED_RANGE, span);
    }

    #[test]
    fn test_broken_endpoint_is_not_compared() {
        // the short hex escape is diagnosed once, the range is not
        let tree = parse_str(r"[\x4-\x01]", RegexOptions::empty()).unwrap();
        assert_tree(&tree)
            .diagnostic_count(1)
            .diagnostic(0, messages::INSUFFICIENT_HEX_DIGITS, TextSpan::new(1, 4));
    }

    #[test]
    fn test_escaped_minus_run_compares_last_component() {
        let tree = parse_str(r"[a-\-b]", RegexOptions::empty()).unwrap();
        assert_tree(&tree).no_diagnostics();

        let tree = parse_str(r"[c-\-b]", RegexOptions::empty()).unwrap();
        assert_tree(&tree).diagnostic(0, messages::REVERSED_RANGE, TextSpan::new(2, 3));
    }

    #[test]
    fn test_class_escape_in_range() {
        let tree = parse_str(r"[a-\d]", RegexOptions::empty()).unwrap();
        assert_tree(&tree).diagnostic(0, "Cannot include class \\d in character range", TextSpan::new(3, 5));
    }

    #[test]
    fn test_subtraction_must_be_last() {
        let tree = parse_str("[a-[b]c]", RegexOptions::empty()).unwrap();
        assert_tree(&tree).diagnostic(0, messages::SUBTRACTION_NOT_LAST, TextSpan::empty_at(2));
    }

    #[test]
    fn test_whitespace_is_literal_inside_class() {
        let tree = parse_str("[ a ]", RegexOptions::IGNORE_PATTERN_WHITESPACE).unwrap();
        assert_tree(&tree).no_diagnostics();
        assert_eq!(class_components_x("[ a ]"), " a ");
    }

    fn class_components_x(pattern: &str) -> String {
        let tree = parse_str(pattern, RegexOptions::IGNORE_PATTERN_WHITESPACE).unwrap();
        let Node::Sequence(sequence) = &tree.root().expression else {
            panic!("expected a sequence");
        };
        let Node::CharacterClass(class) = &sequence.children[0] else {
            panic!("expected a class");
        };
        let Node::Sequence(components) = &class.components else {
            panic!("expected components");
        };
        let Node::Text(text) = &components.children[0] else {
            panic!("expected text");
        };
        text.text.chars.to_string()
    }
}
