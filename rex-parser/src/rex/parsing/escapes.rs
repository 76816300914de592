//! Escapes: everything that starts with `\`
//!
//! `allow_trivia` says whether the token after the escape may carry trivia; it is false inside
//! character classes. Several escapes are ambiguous until the captures are known: `\10` is a
//! backreference only if group 10 exists, and `\k<x>` only if it names a real group.
//!
//! On entry to each function here the lexer sits right after the backslash.

use super::parser::Parser;
use crate::rex::ast::nodes::*;
use crate::rex::ast::{messages, Diagnostic, Node};
use crate::rex::classifier;
use crate::rex::options::RegexOptions;
use crate::rex::token::{Token, TokenKind, TokenValue};

struct CategoryParts {
    open_brace: Token,
    category: Token,
    close_brace: Token,
}

struct CaptureParts {
    open: Token,
    capture: Token,
    close: Token,
}

impl CaptureParts {
    fn is_complete(&self) -> bool {
        !self.open.is_missing() && !self.capture.is_missing() && !self.close.is_missing()
    }
}

impl Parser {
    /// Entry for escapes outside a class, and for class escapes inside one
    pub(super) fn parse_escape(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        self.consume(false);
        if self.current.kind == TokenKind::EndOfFile {
            return self.illegal_backslash_at_end(backslash);
        }

        match self.current.first_char() {
            Some('b' | 'B' | 'A' | 'G' | 'Z' | 'z') => Node::AnchorEscape(Box::new(EscapeNode {
                backslash,
                type_token: self.consume(allow_trivia),
            })),
            Some('w' | 'W' | 's' | 'S' | 'd' | 'D') => {
                Node::CharacterClassEscape(Box::new(EscapeNode {
                    backslash,
                    type_token: self.consume(allow_trivia),
                }))
            }
            Some('p' | 'P') => self.parse_category_escape(backslash, allow_trivia),
            _ => {
                self.lexer.position -= 1;
                self.parse_basic_backslash(backslash, allow_trivia)
            }
        }
    }

    fn illegal_backslash_at_end(&self, mut backslash: Token) -> Node {
        let span = self.token_span(&backslash);
        backslash.add_diagnostic_if_none(Diagnostic::new(messages::ILLEGAL_BACKSLASH_AT_END, span));
        Node::simple_escape(backslash, Token::missing(TokenKind::Text))
    }

    fn parse_basic_backslash(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        self.consume(false);
        if self.current.kind == TokenKind::EndOfFile {
            return self.illegal_backslash_at_end(backslash);
        }

        match self.current.first_char() {
            Some('k') => self.parse_possible_k_capture_escape(backslash, allow_trivia),
            Some('<' | '\'') => {
                self.lexer.position -= 1;
                self.parse_possible_capture_escape(backslash, allow_trivia)
            }
            Some('1'..='9') => {
                self.lexer.position -= 1;
                self.parse_possible_backreference_escape(backslash, allow_trivia)
            }
            _ => {
                self.lexer.position -= 1;
                self.parse_char_escape(backslash, allow_trivia)
            }
        }
    }

    fn parse_possible_backreference_escape(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        if self.options.contains(RegexOptions::ECMASCRIPT) {
            self.parse_possible_ecmascript_backreference_escape(backslash, allow_trivia)
        } else {
            self.parse_possible_regular_backreference_escape(backslash, allow_trivia)
        }
    }

    /// ECMAScript takes the longest digit prefix naming a group defined before the escape;
    /// the remaining digits are literal
    fn parse_possible_ecmascript_backreference_escape(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        let start = self.lexer.position;
        let backslash_start = self.token_span(&backslash).start;

        let mut value: i32 = 0;
        let mut best: Option<(usize, i32)> = None;
        while let Some(digit) = self.lexer.current_char().and_then(|ch| ch.to_digit(10)) {
            let Some(next) = value.checked_mul(10).and_then(|v| v.checked_add(digit as i32)) else {
                break;
            };
            value = next;
            self.lexer.position += 1;

            let defined_before = self
                .captures
                .number_span(value)
                .is_some_and(|span| span.start < backslash_start);
            if defined_before {
                best = Some((self.lexer.position, value));
            }
        }

        let Some((end, number)) = best else {
            self.lexer.position = start;
            return self.parse_char_escape(backslash, allow_trivia);
        };

        let number = Token::new(TokenKind::Number, Vec::new(), self.lexer.sub_pattern(start, end))
            .with_value(TokenValue::Number(number));
        self.reset_to_position_and_consume(end, allow_trivia);
        Node::BackreferenceEscape(Box::new(BackreferenceEscapeNode { backslash, number }))
    }

    /// Single digits are always backreferences, undefined or not; longer numbers only when
    /// the group exists, else they read as octal
    fn parse_possible_regular_backreference_escape(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        let start = self.lexer.position;
        let Some(mut number) = self.lexer.try_scan_number() else {
            return self.parse_char_escape(backslash, allow_trivia);
        };

        let value = number.number().unwrap_or(i32::MAX);
        if self.captures.has_number(value) || value <= 9 {
            self.check_capture(&mut number);
            self.consume(allow_trivia);
            return Node::BackreferenceEscape(Box::new(BackreferenceEscapeNode { backslash, number }));
        }

        self.lexer.position = start;
        self.parse_char_escape(backslash, allow_trivia)
    }

    /// `\<name>` or `\'name'`; anything incomplete is just an escaped `<` or `'`
    fn parse_possible_capture_escape(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        let after_backslash = self.lexer.position;
        let parts = self.scan_capture_parts(allow_trivia);
        if !parts.is_complete() {
            self.lexer.position = after_backslash;
            return self.parse_char_escape(backslash, allow_trivia);
        }

        Node::CaptureEscape(Box::new(CaptureEscapeNode {
            backslash,
            open: parts.open,
            capture: parts.capture,
            close: parts.close,
        }))
    }

    /// `\k<name>`; the current token is the `k`
    fn parse_possible_k_capture_escape(&mut self, mut backslash: Token, allow_trivia: bool) -> Node {
        let type_token = self.current.clone();
        let after_backslash = self.lexer.position - 1;

        let parts = self.scan_capture_parts(allow_trivia);
        if parts.open.is_missing() {
            let span = self.span_between(&backslash, &type_token);
            backslash.add_diagnostic_if_none(Diagnostic::new(messages::MALFORMED_NAMED_BACKREFERENCE, span));
            return Node::simple_escape(backslash, type_token.with_kind(TokenKind::Text));
        }

        if !parts.is_complete() {
            // `\k` then literal text
            self.lexer.position = after_backslash;
            return self.parse_char_escape(backslash, allow_trivia);
        }

        Node::KCaptureEscape(Box::new(KCaptureEscapeNode {
            backslash,
            type_token,
            open: parts.open,
            capture: parts.capture,
            close: parts.close,
        }))
    }

    fn scan_capture_parts(&mut self, allow_trivia: bool) -> CaptureParts {
        let mut parts = CaptureParts {
            open: Token::missing(TokenKind::LessThan),
            capture: Token::missing(TokenKind::CaptureName),
            close: Token::missing(TokenKind::GreaterThan),
        };

        self.consume(false);
        let opens = matches!(self.current.kind, TokenKind::LessThan | TokenKind::Quote);
        if self.lexer.at_end() || !opens {
            return parts;
        }

        parts.open = self.current.clone();
        if let Some(capture) = self.lexer.try_scan_number_or_capture_name() {
            parts.capture = capture;
        }

        self.consume(false);
        let closes = match parts.open.kind {
            TokenKind::LessThan => self.current.kind == TokenKind::GreaterThan,
            _ => self.current.kind == TokenKind::Quote,
        };
        if !parts.capture.is_missing() && closes {
            self.check_capture(&mut parts.capture);
            parts.close = self.consume(allow_trivia);
        }
        parts
    }

    /// Escapes that stand for a single char: octal, hex, unicode, control, or a literal
    pub(super) fn parse_char_escape(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        self.consume(false);
        let Some(ch) = self.current.first_char() else {
            return self.illegal_backslash_at_end(backslash);
        };

        match ch {
            '0'..='7' => {
                self.lexer.position -= 1;
                let octal_text = self.lexer.scan_octal_characters(self.options);
                self.consume(allow_trivia);
                Node::OctalEscape(Box::new(OctalEscapeNode {
                    backslash,
                    octal_text,
                }))
            }
            'a' | 'b' | 'e' | 'f' | 'n' | 'r' | 't' | 'v' => {
                Node::simple_escape(backslash, self.consume(allow_trivia))
            }
            'x' | 'u' => {
                let type_token = self.current.clone();
                let hex_text = self.lexer.scan_hex_characters(if ch == 'x' { 2 } else { 4 });
                self.consume(allow_trivia);
                let escape = Box::new(HexEscapeNode {
                    backslash,
                    type_token,
                    hex_text,
                });
                if ch == 'x' {
                    Node::HexEscape(escape)
                } else {
                    Node::UnicodeEscape(escape)
                }
            }
            'c' => self.parse_control_escape(backslash, allow_trivia),
            _ => {
                let mut type_token = self.consume(allow_trivia).with_kind(TokenKind::Text);
                if !self.options.contains(RegexOptions::ECMASCRIPT) && classifier::is_word_char(ch) {
                    let span = self.token_span(&type_token);
                    type_token.add_diagnostic_if_none(Diagnostic::new(messages::unrecognized_escape(ch), span));
                }
                Node::simple_escape(backslash, type_token)
            }
        }
    }

    /// `\cX` with X in `@`..`_`, letters in either case
    fn parse_control_escape(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        let mut type_token = self.consume(false);

        let control = match self.current.first_char() {
            None => {
                let span = self.token_span(&type_token);
                type_token.add_diagnostic_if_none(Diagnostic::new(messages::MISSING_CONTROL_CHARACTER, span));
                Token::missing(TokenKind::Text)
            }
            Some(ch) if ('@'..='_').contains(&ch.to_ascii_uppercase()) => {
                self.consume(allow_trivia).with_kind(TokenKind::Text)
            }
            Some(_) => {
                let span = self.token_span(&self.current);
                type_token.add_diagnostic_if_none(Diagnostic::new(
                    messages::UNRECOGNIZED_CONTROL_CHARACTER,
                    span,
                ));
                Token::missing(TokenKind::Text)
            }
        };

        Node::ControlEscape(Box::new(ControlEscapeNode {
            backslash,
            type_token,
            control,
        }))
    }

    /// `\p{Name}`; a malformed one degrades to a simple escape whose `p` carries the problem
    fn parse_category_escape(&mut self, backslash: Token, allow_trivia: bool) -> Node {
        let type_token = self.current.clone();
        let start = self.lexer.position;

        match self.try_parse_category_escape_parts(allow_trivia) {
            Ok(parts) => Node::CategoryEscape(Box::new(CategoryEscapeNode {
                backslash,
                type_token,
                open_brace: parts.open_brace,
                category: parts.category,
                close_brace: parts.close_brace,
            })),
            Err(message) => {
                self.reset_to_position_and_consume(start, allow_trivia);
                let span = self.span_between(&backslash, &type_token);
                let type_token = type_token
                    .with_kind(TokenKind::Text)
                    .with_diagnostic(Diagnostic::new(message, span));
                Node::simple_escape(backslash, type_token)
            }
        }
    }

    fn try_parse_category_escape_parts(&mut self, allow_trivia: bool) -> Result<CategoryParts, &'static str> {
        if self.lexer.len() - self.lexer.position < 3 {
            return Err(messages::INCOMPLETE_CATEGORY_ESCAPE);
        }

        self.consume(false);
        if self.current.kind != TokenKind::OpenBrace {
            return Err(messages::MALFORMED_CATEGORY_ESCAPE);
        }

        let open_brace = self.current.clone();
        let category = self.lexer.try_scan_escape_category();

        self.consume(false);
        if self.current.kind != TokenKind::CloseBrace {
            return Err(messages::INCOMPLETE_CATEGORY_ESCAPE);
        }
        let Some(category) = category else {
            return Err(messages::UNKNOWN_PROPERTY);
        };

        let close_brace = self.consume(allow_trivia);
        Ok(CategoryParts {
            open_brace,
            category,
            close_brace,
        })
    }
}
