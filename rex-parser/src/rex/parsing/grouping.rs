//! Groupings: everything that starts with `(`
//!
//! On entry the current token is the `(`. What follows a `?` decides the construct; when no
//! construct fits, the parser falls back to a simple group whose body starts with the `?`, so
//! the question mark is diagnosed as a quantifier following nothing.

use super::parser::{ParseResult, Parser};
use crate::rex::ast::nodes::*;
use crate::rex::ast::{messages, Diagnostic, Node};
use crate::rex::options::RegexOptions;
use crate::rex::token::{Token, TokenKind};

impl Parser {
    pub(super) fn parse_grouping(&mut self) -> ParseResult<Node> {
        let start = self.lexer.position;
        let open_paren = self.consume(false);

        if self.current.kind == TokenKind::Question {
            let question = self.current.clone();
            return self.parse_grouping_question(open_paren, question);
        }

        self.lexer.position = start;
        self.parse_simple_grouping(open_paren)
    }

    fn parse_simple_grouping(&mut self, open_paren: Token) -> ParseResult<Node> {
        let expression = self.parse_grouping_embedded_expression(self.options)?;
        let close_paren = self.parse_grouping_close_paren();
        Ok(Node::SimpleGrouping(Box::new(SimpleGroupingNode {
            open_paren,
            expression,
            close_paren,
        })))
    }

    /// The body of a group, parsed under `options`; the caller's options come back afterwards
    fn parse_grouping_embedded_expression(&mut self, options: RegexOptions) -> ParseResult<Node> {
        let saved = self.options;
        self.options = options;
        self.consume(true);
        let expression = self.parse_alternating_sequences(false);
        self.options = saved;
        expression
    }

    fn parse_grouping_close_paren(&mut self) -> Token {
        if self.current.kind == TokenKind::CloseParen {
            return self.consume(true);
        }

        let span = self.token_start_position_span(&self.current);
        Token::missing(TokenKind::CloseParen)
            .with_diagnostic(Diagnostic::new(messages::NOT_ENOUGH_CLOSE_PARENS, span))
    }

    fn parse_grouping_question(&mut self, mut open_paren: Token, question: Token) -> ParseResult<Node> {
        if let Some(options) = self.lexer.try_scan_options() {
            return self.parse_options_grouping(open_paren, question, options);
        }

        let after_question = self.lexer.position;
        self.consume(false);

        match self.current.kind {
            TokenKind::LessThan => {
                return self.parse_lookbehind_or_named_capture_grouping(open_paren, question);
            }
            TokenKind::Quote => {
                let open = self.current.clone();
                return self.parse_named_capture_or_balancing_grouping(open_paren, question, open);
            }
            TokenKind::OpenParen => return self.parse_conditional_grouping(open_paren, question),
            TokenKind::Colon => {
                return self.parse_prefixed_grouping(open_paren, question, self.options, Node::NonCapturingGrouping);
            }
            TokenKind::Equals => {
                let options = self.options - RegexOptions::RIGHT_TO_LEFT;
                return self.parse_prefixed_grouping(open_paren, question, options, Node::PositiveLookaheadGrouping);
            }
            TokenKind::Exclamation => {
                let options = self.options - RegexOptions::RIGHT_TO_LEFT;
                return self.parse_prefixed_grouping(open_paren, question, options, Node::NegativeLookaheadGrouping);
            }
            TokenKind::GreaterThan => {
                return self.parse_prefixed_grouping(open_paren, question, self.options, Node::NonBacktrackingGrouping);
            }
            TokenKind::CloseParen => {}
            _ => {
                let span = self.token_span(&open_paren);
                open_paren.add_diagnostic_if_none(Diagnostic::new(messages::UNRECOGNIZED_GROUPING, span));
            }
        }

        // reparse from the `?` as an ordinary group
        self.lexer.position = after_question - 1;
        self.parse_simple_grouping(open_paren)
    }

    /// `(?:`, `(?=`, `(?!` and `(?>`; the current token is the marker
    fn parse_prefixed_grouping(
        &mut self,
        open_paren: Token,
        question: Token,
        options: RegexOptions,
        variant: fn(Box<PrefixedGroupingNode>) -> Node,
    ) -> ParseResult<Node> {
        let marker = self.current.clone();
        let expression = self.parse_grouping_embedded_expression(options)?;
        let close_paren = self.parse_grouping_close_paren();
        Ok(variant(Box::new(PrefixedGroupingNode {
            open_paren,
            question,
            marker,
            expression,
            close_paren,
        })))
    }

    /// `(?imnsx-imnsx)` or `(?imnsx-imnsx:...)`
    fn parse_options_grouping(&mut self, open_paren: Token, question: Token, options: Token) -> ParseResult<Node> {
        self.consume(false);

        match self.current.kind {
            TokenKind::CloseParen => {
                // applies from here to the end of the enclosing group
                self.options = self.options.apply_inline(options.chars.iter().map(|vc| vc.ch));
                let close_paren = self.consume(true);
                Ok(Node::SimpleOptionsGrouping(Box::new(SimpleOptionsGroupingNode {
                    open_paren,
                    question,
                    options,
                    close_paren,
                })))
            }
            TokenKind::Colon => {
                let colon = self.current.clone();
                let nested = self.options.apply_inline(options.chars.iter().map(|vc| vc.ch));
                let expression = self.parse_grouping_embedded_expression(nested)?;
                let close_paren = self.parse_grouping_close_paren();
                Ok(Node::NestedOptionsGrouping(Box::new(NestedOptionsGroupingNode {
                    open_paren,
                    question,
                    options,
                    colon,
                    expression,
                    close_paren,
                })))
            }
            _ => {
                let span = self.token_span(&open_paren);
                let close_paren = Token::missing(TokenKind::CloseParen)
                    .with_diagnostic(Diagnostic::new(messages::UNRECOGNIZED_GROUPING, span));
                Ok(Node::SimpleOptionsGrouping(Box::new(SimpleOptionsGroupingNode {
                    open_paren,
                    question,
                    options,
                    close_paren,
                })))
            }
        }
    }

    /// `(?(`: a capture reference when the inner name or number is a known capture, an
    /// expression otherwise
    fn parse_conditional_grouping(&mut self, open_paren: Token, question: Token) -> ParseResult<Node> {
        let inner_open_paren = self.current.clone();
        let after_inner_open_paren = self.lexer.position;

        let Some(mut capture) = self.lexer.try_scan_number_or_capture_name() else {
            return self.parse_conditional_expression_grouping(open_paren, question);
        };

        let inner_close_paren = if capture.kind == TokenKind::Number {
            self.consume(false);
            if self.current.kind == TokenKind::CloseParen {
                if !capture.number().is_some_and(|n| self.captures.has_number(n)) {
                    let span = self.token_span(&capture);
                    capture.add_diagnostic_if_none(Diagnostic::new(messages::UNDEFINED_GROUP, span));
                }
                self.current.clone()
            } else {
                let span = self.token_span(&capture);
                capture.add_diagnostic_if_none(Diagnostic::new(messages::MALFORMED, span));
                self.move_back_before_previous_scan();
                Token::missing(TokenKind::CloseParen)
            }
        } else {
            if !capture.name().is_some_and(|name| self.captures.has_name(name)) {
                self.lexer.position = after_inner_open_paren;
                return self.parse_conditional_expression_grouping(open_paren, question);
            }

            self.consume(false);
            if self.current.kind != TokenKind::CloseParen {
                self.lexer.position = after_inner_open_paren;
                return self.parse_conditional_expression_grouping(open_paren, question);
            }
            self.current.clone()
        };

        self.consume(true);
        let result = self.parse_conditional_grouping_result()?;
        let close_paren = self.parse_grouping_close_paren();

        Ok(Node::ConditionalCaptureGrouping(Box::new(ConditionalCaptureGroupingNode {
            open_paren,
            question,
            inner_open_paren,
            capture,
            inner_close_paren,
            result,
            close_paren,
        })))
    }

    fn parse_conditional_expression_grouping(&mut self, mut open_paren: Token, question: Token) -> ParseResult<Node> {
        // back onto the inner `(`
        self.lexer.position -= 1;

        if self.lexer.is_at("(?#") {
            let position = self.lexer.position;
            let comment = self.lexer.scan_comment(RegexOptions::empty());
            self.lexer.position = position;

            let diagnostic = match comment.and_then(|trivia| trivia.diagnostic) {
                Some(diagnostic) => diagnostic,
                None => Diagnostic::new(messages::CONDITION_IS_COMMENT, self.token_span(&open_paren)),
            };
            open_paren.add_diagnostic_if_none(diagnostic);
        } else if self.lexer.is_at("(?'")
            || (self.lexer.is_at("(?<") && !self.lexer.is_at("(?<!") && !self.lexer.is_at("(?<="))
        {
            let span = self.token_span(&open_paren);
            open_paren.add_diagnostic_if_none(Diagnostic::new(messages::CONDITION_IS_NAMED, span));
        }

        self.consume(false);
        let grouping = self.parse_grouping()?;
        let result = self.parse_conditional_grouping_result()?;
        let close_paren = self.parse_grouping_close_paren();

        Ok(Node::ConditionalExpressionGrouping(Box::new(ConditionalExpressionGroupingNode {
            open_paren,
            question,
            grouping,
            result,
            close_paren,
        })))
    }

    /// The yes and no branches; a third branch is diagnosed on the bar that starts it
    fn parse_conditional_grouping_result(&mut self) -> ParseResult<Node> {
        let saved = self.options;
        let result = self.parse_alternating_sequences(false);
        self.options = saved;

        let mut result = result?;
        if let Node::Alternation(top) = &mut result {
            if matches!(top.left, Node::Alternation(_)) {
                let span = self.token_span(&top.bar);
                top.bar.add_diagnostic_if_none(Diagnostic::new(messages::TOO_MANY_BARS, span));
            }
        }
        Ok(result)
    }

    fn parse_lookbehind_or_named_capture_grouping(&mut self, open_paren: Token, question: Token) -> ParseResult<Node> {
        let start = self.lexer.position;
        let less_than = self.consume(false);

        let variant: fn(Box<LookbehindGroupingNode>) -> Node = match self.current.kind {
            TokenKind::Equals => Node::PositiveLookbehindGrouping,
            TokenKind::Exclamation => Node::NegativeLookbehindGrouping,
            _ => {
                self.lexer.position = start;
                return self.parse_named_capture_or_balancing_grouping(open_paren, question, less_than);
            }
        };

        let marker = self.current.clone();
        let expression = self.parse_grouping_embedded_expression(self.options | RegexOptions::RIGHT_TO_LEFT)?;
        let close_paren = self.parse_grouping_close_paren();

        Ok(variant(Box::new(LookbehindGroupingNode {
            open_paren,
            question,
            less_than,
            marker,
            expression,
            close_paren,
        })))
    }

    /// `(?<name>`, `(?'name'`, and their balancing forms `(?<a-b>`
    fn parse_named_capture_or_balancing_grouping(
        &mut self,
        mut open_paren: Token,
        question: Token,
        open: Token,
    ) -> ParseResult<Node> {
        if self.lexer.at_end() {
            let span = self.span_between(&open_paren, &open);
            open_paren.add_diagnostic_if_none(Diagnostic::new(messages::UNRECOGNIZED_GROUPING, span));
        }

        let mut capture = match self.lexer.try_scan_number_or_capture_name() {
            Some(capture) => capture,
            None => {
                // (?<-name>...) balances without capturing
                self.consume(false);
                if self.current.kind == TokenKind::Minus {
                    let capture = Token::missing(TokenKind::CaptureName);
                    return self.parse_balancing_grouping(open_paren, question, open, capture);
                }

                let span = self.token_span(&self.current);
                open_paren.add_diagnostic_if_none(Diagnostic::new(messages::INVALID_GROUP_NAME, span));
                self.move_back_before_previous_scan();
                Token::missing(TokenKind::CaptureName)
            }
        };

        if capture.number() == Some(0) {
            let span = self.token_span(&capture);
            capture.add_diagnostic_if_none(Diagnostic::new(messages::CAPTURE_NUMBER_ZERO, span));
        }

        self.consume(false);
        if self.current.kind == TokenKind::Minus {
            return self.parse_balancing_grouping(open_paren, question, open, capture);
        }

        let close = self.parse_capture_grouping_close_token(&mut open_paren, &open);
        let expression = self.parse_grouping_embedded_expression(self.options)?;
        let close_paren = self.parse_grouping_close_paren();

        Ok(Node::CaptureGrouping(Box::new(CaptureGroupingNode {
            open_paren,
            question,
            open,
            capture,
            close,
            expression,
            close_paren,
        })))
    }

    /// The `>` or `'` matching `open`, left as the current token for the body to skip over
    fn parse_capture_grouping_close_token(&mut self, open_paren: &mut Token, open: &Token) -> Token {
        let matched = match open.kind {
            TokenKind::LessThan => self.current.kind == TokenKind::GreaterThan,
            _ => self.current.kind == TokenKind::Quote,
        };
        if matched {
            return self.current.clone();
        }

        if self.current.kind == TokenKind::EndOfFile {
            let span = self.span_between(open_paren, open);
            open_paren.add_diagnostic_if_none(Diagnostic::new(messages::UNRECOGNIZED_GROUPING, span));
        } else {
            let span = self.token_span(&self.current);
            open_paren.add_diagnostic_if_none(Diagnostic::new(messages::INVALID_GROUP_NAME, span));
            // the offending char starts the body
            self.lexer.position -= 1;
        }

        Token::missing(match open.kind {
            TokenKind::LessThan => TokenKind::GreaterThan,
            _ => TokenKind::Quote,
        })
    }

    fn parse_balancing_grouping(
        &mut self,
        mut open_paren: Token,
        question: Token,
        open: Token,
        first_capture: Token,
    ) -> ParseResult<Node> {
        let minus = self.current.clone();

        let mut second_capture = match self.lexer.try_scan_number_or_capture_name() {
            Some(capture) => capture,
            None => {
                self.consume(false);
                let span = self.token_span(&self.current);
                open_paren.add_diagnostic_if_none(Diagnostic::new(messages::INVALID_GROUP_NAME, span));
                self.move_back_before_previous_scan();
                Token::missing(TokenKind::CaptureName)
            }
        };

        self.check_capture(&mut second_capture);
        self.consume(false);

        let close = self.parse_capture_grouping_close_token(&mut open_paren, &open);
        let expression = self.parse_grouping_embedded_expression(self.options)?;
        let close_paren = self.parse_grouping_close_paren();

        Ok(Node::BalancingGrouping(Box::new(BalancingGroupingNode {
            open_paren,
            question,
            open,
            first_capture,
            minus,
            second_capture,
            close,
            expression,
            close_paren,
        })))
    }
}
