//! Recursive-descent core
//!
//! The parser holds exactly one token of lookahead in `current`; the lexer's position sits
//! right after it. Constructs that need more context rewind the lexer position and rescan,
//! which is cheap because scanning is on demand and depends on the options in force at the
//! moment of the scan.

use super::{ParseError, ParserSettings};
use crate::rex::ast::nodes::*;
use crate::rex::ast::traits::grow_stack;
use crate::rex::ast::{messages, CompilationUnit, Diagnostic, Node, TextSpan};
use crate::rex::captures::CaptureMaps;
use crate::rex::lexing::Lexer;
use crate::rex::options::RegexOptions;
use crate::rex::token::{Token, TokenKind};
use crate::rex::virtual_chars::VirtualCharSequence;

pub(super) type ParseResult<T> = Result<T, ParseError>;

pub(crate) struct Parser {
    pub(super) lexer: Lexer,
    pub(super) options: RegexOptions,
    pub(super) current: Token,
    pub(super) captures: CaptureMaps,
    depth: usize,
    max_depth: usize,
}

struct NumericQuantifierParts {
    first_number: Token,
    comma: Option<Token>,
    second_number: Option<Token>,
    close_brace: Token,
}

impl Parser {
    pub fn new(text: VirtualCharSequence, settings: &ParserSettings, captures: CaptureMaps) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(text),
            options: settings.options,
            current: Token::missing(TokenKind::EndOfFile),
            captures,
            depth: 0,
            max_depth: settings.max_depth,
        };
        parser.consume(true);
        parser
    }

    pub fn parse_tree(mut self) -> ParseResult<CompilationUnit> {
        let expression = self.parse_alternating_sequences(true)?;
        debug_assert_eq!(self.current.kind, TokenKind::EndOfFile);

        Ok(CompilationUnit {
            expression,
            end_of_file: self.current,
        })
    }

    /// Hand back the current token and scan the next one under the current options
    pub(super) fn consume(&mut self, allow_trivia: bool) -> Token {
        let next = self.lexer.scan_next_token(allow_trivia, self.options);
        std::mem::replace(&mut self.current, next)
    }

    pub(super) fn reset_to_position_and_consume(&mut self, position: usize, allow_trivia: bool) {
        self.lexer.position = position;
        self.consume(allow_trivia);
    }

    /// Step back over the char just scanned so the next scan sees it again
    pub(super) fn move_back_before_previous_scan(&mut self) {
        if self.current.kind != TokenKind::EndOfFile {
            self.lexer.position -= 1;
        }
    }

    /// Run `parse` one nesting level deeper, on a fresh stack segment when this one runs low
    pub(super) fn descend<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            return Err(ParseError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        self.depth += 1;
        let result = grow_stack(|| parse(self));
        self.depth -= 1;
        result
    }

    pub(super) fn parse_alternating_sequences(&mut self, consume_close_paren: bool) -> ParseResult<Node> {
        self.descend(|parser| {
            let mut current = parser.parse_sequence(consume_close_paren)?;
            while parser.current.kind == TokenKind::Bar {
                let bar = parser.consume(true);
                let right = parser.parse_sequence(consume_close_paren)?;
                current = Node::Alternation(Box::new(AlternationNode {
                    left: current,
                    bar,
                    right,
                }));
            }
            Ok(current)
        })
    }

    fn parse_sequence(&mut self, consume_close_paren: bool) -> ParseResult<Node> {
        let mut children: Vec<Node> = Vec::new();
        while self.should_continue_sequence(consume_close_paren) {
            let node = self.parse_primary_expression_and_quantifiers(children.last())?;
            children.push(node);
        }
        Ok(Node::sequence(merge_text_nodes(children)))
    }

    fn should_continue_sequence(&self, consume_close_paren: bool) -> bool {
        match self.current.kind {
            TokenKind::EndOfFile | TokenKind::Bar => false,
            TokenKind::CloseParen => consume_close_paren,
            _ => true,
        }
    }

    fn parse_primary_expression_and_quantifiers(&mut self, previous: Option<&Node>) -> ParseResult<Node> {
        let current = self.parse_primary_expression(previous)?;
        if matches!(current, Node::SimpleOptionsGrouping(_)) {
            // (?i)* quantifies nothing; leave the quantifier for the next round to diagnose
            return Ok(current);
        }

        Ok(match self.current.kind {
            TokenKind::Asterisk => {
                let asterisk = self.consume(true);
                let quantifier = Node::ZeroOrMoreQuantifier(Box::new(ZeroOrMoreQuantifierNode {
                    expression: current,
                    asterisk,
                }));
                self.try_parse_lazy_quantifier(quantifier)
            }
            TokenKind::Plus => {
                let plus = self.consume(true);
                let quantifier = Node::OneOrMoreQuantifier(Box::new(OneOrMoreQuantifierNode {
                    expression: current,
                    plus,
                }));
                self.try_parse_lazy_quantifier(quantifier)
            }
            TokenKind::Question => {
                let question = self.consume(true);
                let quantifier = Node::ZeroOrOneQuantifier(Box::new(ZeroOrOneQuantifierNode {
                    expression: current,
                    question,
                }));
                self.try_parse_lazy_quantifier(quantifier)
            }
            TokenKind::OpenBrace => self.try_parse_numeric_quantifier(current),
            _ => current,
        })
    }

    fn try_parse_lazy_quantifier(&mut self, quantifier: Node) -> Node {
        if self.current.kind != TokenKind::Question {
            return quantifier;
        }

        let question = self.consume(true);
        Node::LazyQuantifier(Box::new(LazyQuantifierNode {
            quantifier,
            question,
        }))
    }

    /// `{n}`, `{n,}` or `{n,m}` after `expression`; anything else leaves the brace as text
    fn try_parse_numeric_quantifier(&mut self, expression: Node) -> Node {
        let open_brace = self.current.clone();
        let start = self.lexer.position;

        let Some(parts) = self.try_parse_numeric_quantifier_parts() else {
            self.current = open_brace;
            self.lexer.position = start;
            return expression;
        };

        let quantifier = match (parts.comma, parts.second_number) {
            (None, _) => Node::ExactNumericQuantifier(Box::new(ExactNumericQuantifierNode {
                expression,
                open_brace,
                first_number: parts.first_number,
                close_brace: parts.close_brace,
            })),
            (Some(comma), None) => {
                Node::OpenRangeNumericQuantifier(Box::new(OpenRangeNumericQuantifierNode {
                    expression,
                    open_brace,
                    first_number: parts.first_number,
                    comma,
                    close_brace: parts.close_brace,
                }))
            }
            (Some(comma), Some(second_number)) => {
                Node::ClosedRangeNumericQuantifier(Box::new(ClosedRangeNumericQuantifierNode {
                    expression,
                    open_brace,
                    first_number: parts.first_number,
                    comma,
                    second_number,
                    close_brace: parts.close_brace,
                }))
            }
        };
        self.try_parse_lazy_quantifier(quantifier)
    }

    fn try_parse_numeric_quantifier_parts(&mut self) -> Option<NumericQuantifierParts> {
        let first_number = self.lexer.try_scan_number()?;
        self.consume(false);

        let mut comma = None;
        let mut second_number = None;
        if self.current.kind == TokenKind::Comma {
            let start = self.lexer.position;
            match self.lexer.try_scan_number() {
                None => {
                    self.lexer.position = start;
                    comma = Some(self.consume(false));
                }
                Some(mut second) => {
                    comma = Some(self.consume(false));
                    if let (Some(min), Some(max)) = (first_number.number(), second.number()) {
                        if max < min {
                            let span = self.token_span(&second);
                            second.add_diagnostic_if_none(Diagnostic::new(
                                messages::ILLEGAL_REVERSED_QUANTIFIER,
                                span,
                            ));
                        }
                    }
                    second_number = Some(second);
                }
            }
        }

        if self.current.kind != TokenKind::CloseBrace {
            return None;
        }

        let close_brace = self.consume(true);
        Some(NumericQuantifierParts {
            first_number,
            comma,
            second_number,
            close_brace,
        })
    }

    fn parse_primary_expression(&mut self, previous: Option<&Node>) -> ParseResult<Node> {
        Ok(match self.current.kind {
            TokenKind::Dot => Node::Wildcard(Box::new(WildcardNode {
                dot: self.consume(true),
            })),
            TokenKind::Caret => Node::StartAnchor(Box::new(AnchorNode {
                anchor: self.consume(true),
            })),
            TokenKind::Dollar => Node::EndAnchor(Box::new(AnchorNode {
                anchor: self.consume(true),
            })),
            TokenKind::Backslash => {
                let backslash = self.current.clone();
                self.parse_escape(backslash, true)
            }
            TokenKind::OpenBracket => self.parse_character_class()?,
            TokenKind::OpenParen => self.parse_grouping()?,
            TokenKind::CloseParen => self.parse_unexpected_close_paren(),
            TokenKind::OpenBrace => self.parse_possible_unexpected_numeric_quantifier(previous),
            TokenKind::Asterisk | TokenKind::Plus | TokenKind::Question => {
                self.parse_unexpected_quantifier(previous)
            }
            _ => Node::text(self.consume(true).with_kind(TokenKind::Text)),
        })
    }

    /// Only reachable at top level, where the sequence also takes `)`
    fn parse_unexpected_close_paren(&mut self) -> Node {
        let mut token = self.consume(true).with_kind(TokenKind::Text);
        let span = self.token_span(&token);
        token.add_diagnostic_if_none(Diagnostic::new(messages::TOO_MANY_CLOSE_PARENS, span));
        Node::text(token)
    }

    /// A brace with nothing to quantify is text; if it reads as a quantifier, say so
    fn parse_possible_unexpected_numeric_quantifier(&mut self, previous: Option<&Node>) -> Node {
        let mut open_brace = self.current.clone().with_kind(TokenKind::Text);
        let start = self.lexer.position;

        if self.try_parse_numeric_quantifier_parts().is_some() {
            self.check_quantifier_expression(previous, &mut open_brace);
        }

        // rescan everything after the brace as plain pattern
        self.reset_to_position_and_consume(start, true);
        Node::text(open_brace)
    }

    fn parse_unexpected_quantifier(&mut self, previous: Option<&Node>) -> Node {
        let mut quantifier = self.consume(true);
        self.check_quantifier_expression(previous, &mut quantifier);
        Node::text(quantifier.with_kind(TokenKind::Text))
    }

    fn check_quantifier_expression(&self, previous: Option<&Node>, quantifier: &mut Token) {
        let message = match previous {
            None | Some(Node::SimpleOptionsGrouping(_)) => {
                messages::QUANTIFIER_FOLLOWING_NOTHING.to_string()
            }
            Some(node) if node.is_quantifier() || matches!(node, Node::LazyQuantifier(_)) => {
                messages::nested_quantifier(quantifier.first_char().unwrap_or('?'))
            }
            Some(_) => return,
        };

        let span = self.token_span(quantifier);
        quantifier.add_diagnostic_if_none(Diagnostic::new(message, span));
    }

    /// Empty span where `token` starts; for end-of-file, right after the last char
    pub(super) fn token_start_position_span(&self, token: &Token) -> TextSpan {
        match token.chars.first() {
            Some(first) if token.kind != TokenKind::EndOfFile => TextSpan::empty_at(first.span.start),
            _ => TextSpan::empty_at(self.end_of_text()),
        }
    }

    /// The token's own span; missing tokens, end-of-file included, get an empty one where they
    /// would have been
    pub(super) fn token_span(&self, token: &Token) -> TextSpan {
        token
            .span()
            .unwrap_or_else(|| self.token_start_position_span(token))
    }

    pub(super) fn span_between(&self, first: &Token, last: &Token) -> TextSpan {
        TextSpan::covering(self.token_span(first), self.token_span(last))
    }

    fn end_of_text(&self) -> usize {
        self.lexer.text().last().map_or(0, |vc| vc.span.end)
    }

    pub(super) fn check_capture(&self, capture: &mut Token) {
        let message = if let Some(number) = capture.number() {
            if self.captures.has_number(number) {
                return;
            }
            messages::undefined_group_number(number)
        } else if let Some(name) = capture.name() {
            if self.captures.has_name(name) {
                return;
            }
            messages::undefined_group_name(name)
        } else {
            return;
        };

        let span = self.token_span(capture);
        capture.add_diagnostic_if_none(Diagnostic::new(message, span));
    }
}

/// Fold runs of plain adjacent text into single text tokens
///
/// A run continues while neither side carries a diagnostic or value and the next token has no
/// leading trivia; the merged token keeps the first token's trivia.
pub(super) fn merge_text_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(Node::Text(last)), Node::Text(next)) = (merged.last_mut(), &node) {
            if can_merge(&last.text, &next.text) {
                let chars = VirtualCharSequence::from_bounds(&last.text.chars, &next.text.chars);
                let trivia = std::mem::take(&mut last.text.leading_trivia);
                last.text = Token::new(TokenKind::Text, trivia, chars);
                continue;
            }
        }
        merged.push(node);
    }
    merged
}

fn can_merge(last: &Token, next: &Token) -> bool {
    last.diagnostic.is_none()
        && last.value.is_none()
        && next.diagnostic.is_none()
        && next.value.is_none()
        && next.leading_trivia.is_empty()
}

#[cfg(test)]
mod tests {
    use crate::rex::ast::{messages, Node, TextSpan};
    use crate::rex::parsing::parse_str;
    use crate::rex::testing::assert_tree;
    use crate::rex::RegexOptions;
    use rstest::rstest;

    fn top_level(pattern: &str) -> Vec<&'static str> {
        let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
        let Node::Sequence(sequence) = &tree.root().expression else {
            panic!("expected a sequence");
        };
        sequence.children.iter().map(Node::name).collect()
    }

    #[test]
    fn test_text_runs_merge() {
        let tree = parse_str("abc", RegexOptions::empty()).unwrap();
        let Node::Sequence(sequence) = &tree.root().expression else {
            panic!("expected a sequence");
        };
        let [Node::Text(text)] = sequence.children.as_slice() else {
            panic!("expected a single text node");
        };
        assert_eq!(text.text.chars.to_string(), "abc");
        assert_eq!(text.text.span(), Some(TextSpan::new(0, 3)));
    }

    #[test]
    fn test_quantifier_takes_only_last_char() {
        assert_eq!(top_level("ab*"), ["Text", "ZeroOrMoreQuantifier"]);
        assert_eq!(top_level("ab*?c"), ["Text", "LazyQuantifier", "Text"]);
    }

    #[test]
    fn test_trivia_breaks_text_runs() {
        let tree = parse_str("ab c", RegexOptions::IGNORE_PATTERN_WHITESPACE).unwrap();
        let Node::Sequence(sequence) = &tree.root().expression else {
            panic!("expected a sequence");
        };
        assert_eq!(sequence.children.len(), 2);
    }

    #[rstest]
    #[case("a{2}", "ExactNumericQuantifier")]
    #[case("a{2,}", "OpenRangeNumericQuantifier")]
    #[case("a{2,5}", "ClosedRangeNumericQuantifier")]
    #[case("a{2,5}?", "LazyQuantifier")]
    fn test_numeric_quantifiers(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(top_level(pattern), [expected]);
    }

    #[rstest]
    #[case("a{")]
    #[case("a{x}")]
    #[case("a{2")]
    #[case("a{2,x}")]
    #[case("a{,2}")]
    fn test_brace_without_quantifier_is_text(#[case] pattern: &str) {
        let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
        assert_tree(&tree).no_diagnostics();
        assert_eq!(top_level(pattern), ["Text"]);
    }

    #[test]
    fn test_reversed_numeric_quantifier() {
        let tree = parse_str("a{2,1}", RegexOptions::empty()).unwrap();
        assert_tree(&tree).diagnostic(0, messages::ILLEGAL_REVERSED_QUANTIFIER, TextSpan::new(4, 5));
    }

    #[rstest]
    #[case("*", messages::QUANTIFIER_FOLLOWING_NOTHING, TextSpan::new(0, 1))]
    #[case("a|+", messages::QUANTIFIER_FOLLOWING_NOTHING, TextSpan::new(2, 3))]
    #[case("(?i)?", messages::QUANTIFIER_FOLLOWING_NOTHING, TextSpan::new(4, 5))]
    #[case("{1}", messages::QUANTIFIER_FOLLOWING_NOTHING, TextSpan::new(0, 1))]
    #[case("a**", "Nested quantifier *", TextSpan::new(2, 3))]
    #[case("a*?+", "Nested quantifier +", TextSpan::new(3, 4))]
    #[case("a{1}{2}", "Nested quantifier {", TextSpan::new(4, 5))]
    #[case("a)", messages::TOO_MANY_CLOSE_PARENS, TextSpan::new(1, 2))]
    fn test_misplaced_quantifiers(#[case] pattern: &str, #[case] message: &str, #[case] span: TextSpan) {
        let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
        assert_tree(&tree).diagnostic_count(1).diagnostic(0, message, span);
    }

    #[test]
    fn test_alternation_nests_left() {
        let tree = parse_str("a|b|c", RegexOptions::empty()).unwrap();
        let Node::Alternation(top) = &tree.root().expression else {
            panic!("expected an alternation");
        };
        assert!(matches!(top.left, Node::Alternation(_)));
        assert!(matches!(top.right, Node::Sequence(_)));
    }

    #[test]
    fn test_empty_alternatives() {
        let tree = parse_str("|", RegexOptions::empty()).unwrap();
        assert_tree(&tree).no_diagnostics();
        let Node::Alternation(alternation) = &tree.root().expression else {
            panic!("expected an alternation");
        };
        assert_eq!(alternation.left, Node::sequence(Vec::new()));
        assert_eq!(alternation.right, Node::sequence(Vec::new()));
    }

    #[test]
    fn test_anchors_and_wildcard() {
        assert_eq!(top_level("^.$"), ["StartAnchor", "Wildcard", "EndAnchor"]);
    }
}
