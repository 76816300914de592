//! On-demand lexer
//!
//!     The dialect's grammar is too context-sensitive for up-front tokenization: `1` is text in
//!     `a1`, a number in `a{1}`, part of a backreference in `\1` and a capture name in `(?<1>)`.
//!     So the lexer is a cursor over the virtual chars that produces one token when asked.
//!
//!     [`Lexer::scan_next_token`] gives the default single-character token, optionally preceded
//!     by leading trivia. The `try_scan_*` methods are the contextual scans the parser reaches
//!     for once it knows what should come next; each returns `None` without moving when the
//!     cursor is not on a run it accepts.
//!
//!     The cursor is a plain public position the parser saves and restores freely. Every
//!     "try one reading, fall back to another" in the parser is a position reset.

use crate::rex::ast::{messages, Diagnostic, TextSpan};
use crate::rex::classifier;
use crate::rex::options::RegexOptions;
use crate::rex::token::{Token, TokenKind, TokenValue, Trivia, TriviaKind};
use crate::rex::virtual_chars::VirtualCharSequence;

pub struct Lexer {
    text: VirtualCharSequence,
    pub position: usize,
}

impl Lexer {
    pub fn new(text: VirtualCharSequence) -> Self {
        Self { text, position: 0 }
    }

    pub fn text(&self) -> &VirtualCharSequence {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.text.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.text.get(self.position).map(|vc| vc.ch)
    }

    pub fn is_at(&self, text: &str) -> bool {
        self.text.is_at(self.position, text)
    }

    /// The chars in `[start, end)`
    pub fn sub_pattern(&self, start: usize, end: usize) -> VirtualCharSequence {
        self.text.sub_sequence(start..end)
    }

    /// Host span from the start of char `start` to the end of char `end - 1`
    pub fn text_span(&self, start: usize, end: usize) -> TextSpan {
        debug_assert!(start < end);
        TextSpan::new(self.text[start].span.start, self.text[end - 1].span.end)
    }

    pub fn scan_next_token(&mut self, allow_trivia: bool, options: RegexOptions) -> Token {
        let trivia = if allow_trivia {
            self.scan_leading_trivia(options)
        } else {
            Vec::new()
        };

        let Some(ch) = self.current_char() else {
            return Token::new(TokenKind::EndOfFile, trivia, VirtualCharSequence::empty());
        };

        let start = self.position;
        self.position += 1;
        Token::new(
            TokenKind::for_char(ch),
            trivia,
            self.sub_pattern(start, self.position),
        )
    }

    fn scan_leading_trivia(&mut self, options: RegexOptions) -> Vec<Trivia> {
        let mut result = Vec::new();
        loop {
            if let Some(comment) = self.scan_comment(options) {
                result.push(comment);
            } else if let Some(whitespace) = self.scan_whitespace(options) {
                result.push(whitespace);
            } else {
                break;
            }
        }
        result
    }

    /// A `(?#...)` comment, or a `#` line comment under `x` mode
    pub fn scan_comment(&mut self, options: RegexOptions) -> Option<Trivia> {
        if self.at_end() {
            return None;
        }

        let start = self.position;
        if options.contains(RegexOptions::IGNORE_PATTERN_WHITESPACE) && self.is_at("#") {
            // the terminating newline is left for whitespace trivia
            while self.current_char().is_some_and(|ch| ch != '\n') {
                self.position += 1;
            }
            return Some(Trivia::new(
                TriviaKind::Comment,
                self.sub_pattern(start, self.position),
            ));
        }

        if self.is_at("(?#") {
            while self.current_char().is_some_and(|ch| ch != ')') {
                self.position += 1;
            }

            if self.at_end() {
                let diagnostic =
                    Diagnostic::new(messages::UNTERMINATED_COMMENT, self.text_span(start, self.position));
                return Some(
                    Trivia::new(TriviaKind::Comment, self.sub_pattern(start, self.position))
                        .with_diagnostic(diagnostic),
                );
            }

            self.position += 1;
            return Some(Trivia::new(
                TriviaKind::Comment,
                self.sub_pattern(start, self.position),
            ));
        }

        None
    }

    fn scan_whitespace(&mut self, options: RegexOptions) -> Option<Trivia> {
        if !options.contains(RegexOptions::IGNORE_PATTERN_WHITESPACE) {
            return None;
        }

        let start = self.position;
        while self.current_char().is_some_and(is_blank) {
            self.position += 1;
        }

        (self.position > start).then(|| {
            Trivia::new(
                TriviaKind::Whitespace,
                self.sub_pattern(start, self.position),
            )
        })
    }

    /// Decimal digits, saturating at `i32::MAX` with a diagnostic
    pub fn try_scan_number(&mut self) -> Option<Token> {
        let start = self.position;
        let mut value: i32 = 0;
        let mut overflowed = false;

        while let Some(digit) = self.current_char().and_then(|ch| ch.to_digit(10)) {
            self.position += 1;
            match value.checked_mul(10).and_then(|v| v.checked_add(digit as i32)) {
                Some(next) => value = next,
                None => overflowed = true,
            }
        }

        if self.position == start {
            return None;
        }

        let value = if overflowed { i32::MAX } else { value };
        let mut token = Token::new(
            TokenKind::Number,
            Vec::new(),
            self.sub_pattern(start, self.position),
        )
        .with_value(TokenValue::Number(value));

        if overflowed {
            let span = self.text_span(start, self.position);
            token.add_diagnostic_if_none(Diagnostic::new(messages::CAPTURE_NUMBER_TOO_LARGE, span));
        }
        Some(token)
    }

    pub fn try_scan_capture_name(&mut self) -> Option<Token> {
        let start = self.position;
        while self.current_char().is_some_and(classifier::is_word_char) {
            self.position += 1;
        }

        if self.position == start {
            return None;
        }

        let chars = self.sub_pattern(start, self.position);
        let name = chars.to_string();
        Some(Token::new(TokenKind::CaptureName, Vec::new(), chars).with_value(TokenValue::Name(name)))
    }

    pub fn try_scan_number_or_capture_name(&mut self) -> Option<Token> {
        self.try_scan_number()
            .or_else(|| self.try_scan_capture_name())
    }

    /// A run of inline option characters: `+ - i m n s x`, either case
    pub fn try_scan_options(&mut self) -> Option<Token> {
        let start = self.position;
        while self.current_char().is_some_and(is_option_char) {
            self.position += 1;
        }

        (self.position > start).then(|| {
            Token::new(
                TokenKind::Options,
                Vec::new(),
                self.sub_pattern(start, self.position),
            )
        })
    }

    /// The name inside `\p{...}`; an unrecognized name is diagnosed on the token itself
    pub fn try_scan_escape_category(&mut self) -> Option<Token> {
        let start = self.position;
        while self.current_char().is_some_and(is_escape_category_char) {
            self.position += 1;
        }

        if self.position == start {
            return None;
        }

        let chars = self.sub_pattern(start, self.position);
        let category = chars.to_string();
        let mut token = Token::new(TokenKind::EscapeCategory, Vec::new(), chars);
        if !classifier::is_escape_category(&category) {
            let span = self.text_span(start, self.position);
            token.add_diagnostic_if_none(Diagnostic::new(
                messages::unknown_property_named(&category),
                span,
            ));
        }
        Some(token)
    }

    /// Up to `count` hex digits following a `\x` or `\u`
    ///
    /// Always returns a text token, possibly empty. Fewer than `count` digits is diagnosed
    /// over the whole escape scanned so far.
    pub fn scan_hex_characters(&mut self, count: usize) -> Token {
        let start = self.position;
        let before_backslash = start.saturating_sub(2);

        for _ in 0..count {
            if !self.current_char().is_some_and(|ch| ch.is_ascii_hexdigit()) {
                break;
            }
            self.position += 1;
        }

        let mut token = Token::new(
            TokenKind::Text,
            Vec::new(),
            self.sub_pattern(start, self.position),
        );
        if self.position - start != count {
            let span = self.text_span(before_backslash, self.position);
            token.add_diagnostic_if_none(Diagnostic::new(messages::INSUFFICIENT_HEX_DIGITS, span));
        }
        token
    }

    /// Up to three octal digits; under ECMAScript scanning stops once the value reaches 0x20
    pub fn scan_octal_characters(&mut self, options: RegexOptions) -> Token {
        const MAX_CHARS: usize = 3;

        let start = self.position;
        let mut value = 0u32;
        for _ in 0..MAX_CHARS {
            let Some(digit) = self.current_char().and_then(|ch| ch.to_digit(8)) else {
                break;
            };
            value = value * 8 + digit;
            self.position += 1;

            if options.contains(RegexOptions::ECMASCRIPT) && value >= 0x20 {
                break;
            }
        }

        Token::new(
            TokenKind::Text,
            Vec::new(),
            self.sub_pattern(start, self.position),
        )
    }
}

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{c}')
}

fn is_option_char(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-' | 'i' | 'I' | 'm' | 'M' | 'n' | 'N' | 's' | 'S' | 'x' | 'X'
    )
}

fn is_escape_category_char(ch: char) -> bool {
    ch == '-' || ch.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lexer_over(pattern: &str) -> Lexer {
        Lexer::new(VirtualCharSequence::from_text(pattern, 0))
    }

    fn kinds(pattern: &str, options: RegexOptions) -> Vec<TokenKind> {
        let mut lexer = lexer_over(pattern);
        let mut result = Vec::new();
        loop {
            let token = lexer.scan_next_token(true, options);
            let kind = token.kind;
            result.push(kind);
            if kind == TokenKind::EndOfFile {
                return result;
            }
        }
    }

    #[test]
    fn single_character_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("a|(b)*", RegexOptions::empty()),
            vec![Text, Bar, OpenParen, Text, CloseParen, Asterisk, EndOfFile]
        );
    }

    #[test]
    fn whitespace_is_text_without_x_mode() {
        use TokenKind::*;
        assert_eq!(kinds("a b", RegexOptions::empty()), vec![Text, Text, Text, EndOfFile]);
        assert_eq!(
            kinds("a b", RegexOptions::IGNORE_PATTERN_WHITESPACE),
            vec![Text, Text, EndOfFile]
        );
    }

    #[test]
    fn trivia_only_when_allowed() {
        let mut lexer = lexer_over("(?#c)a");
        let token = lexer.scan_next_token(false, RegexOptions::empty());
        assert_eq!(token.kind, TokenKind::OpenParen);

        lexer.position = 0;
        let token = lexer.scan_next_token(true, RegexOptions::empty());
        assert_eq!(token.kind, TokenKind::Text);
        assert_eq!(token.leading_trivia.len(), 1);
        assert_eq!(token.leading_trivia[0].chars.to_string(), "(?#c)");
    }

    #[test]
    fn line_comment_stops_before_newline() {
        let mut lexer = lexer_over("#x\ny");
        let token = lexer.scan_next_token(true, RegexOptions::IGNORE_PATTERN_WHITESPACE);
        let trivia: Vec<_> = token
            .leading_trivia
            .iter()
            .map(|t| (t.kind, t.chars.to_string()))
            .collect();
        assert_eq!(
            trivia,
            vec![
                (TriviaKind::Comment, "#x".to_string()),
                (TriviaKind::Whitespace, "\n".to_string())
            ]
        );
        assert_eq!(token.chars.to_string(), "y");
    }

    #[test]
    fn unterminated_comment() {
        let mut lexer = lexer_over("a(?#b");
        lexer.position = 1;
        let trivia = lexer.scan_comment(RegexOptions::empty()).unwrap();
        assert_eq!(
            trivia.diagnostic,
            Some(Diagnostic::new(messages::UNTERMINATED_COMMENT, TextSpan::new(1, 5)))
        );
        assert!(lexer.at_end());
    }

    #[test]
    fn comment_probe_does_not_move() {
        let mut lexer = lexer_over("(?:");
        assert!(lexer.scan_comment(RegexOptions::IGNORE_PATTERN_WHITESPACE).is_none());
        assert_eq!(lexer.position, 0);
    }

    #[rstest]
    #[case("123}", Some(123), 3)]
    #[case("0", Some(0), 1)]
    #[case("x", None, 0)]
    #[case("2147483647", Some(i32::MAX), 10)]
    fn numbers(#[case] input: &str, #[case] expected: Option<i32>, #[case] end: usize) {
        let mut lexer = lexer_over(input);
        let token = lexer.try_scan_number();
        assert_eq!(token.as_ref().and_then(Token::number), expected);
        assert!(token.map_or(true, |t| t.diagnostic.is_none()));
        assert_eq!(lexer.position, end);
    }

    #[test]
    fn number_overflow_saturates() {
        let mut lexer = lexer_over("99999999999");
        let token = lexer.try_scan_number().unwrap();
        assert_eq!(token.number(), Some(i32::MAX));
        assert_eq!(
            token.diagnostic,
            Some(Diagnostic::new(messages::CAPTURE_NUMBER_TOO_LARGE, TextSpan::new(0, 11)))
        );
    }

    #[test]
    fn capture_names() {
        let mut lexer = lexer_over("name_1>");
        let token = lexer.try_scan_number_or_capture_name().unwrap();
        assert_eq!(token.kind, TokenKind::CaptureName);
        assert_eq!(token.name(), Some("name_1"));

        let mut lexer = lexer_over("12a");
        let token = lexer.try_scan_number_or_capture_name().unwrap();
        assert_eq!(token.kind, TokenKind::Number);
        assert_eq!(lexer.position, 2);

        assert!(lexer_over(">").try_scan_number_or_capture_name().is_none());
    }

    #[test]
    fn options_run() {
        let mut lexer = lexer_over("i-Sx:");
        let token = lexer.try_scan_options().unwrap();
        assert_eq!(token.chars.to_string(), "i-Sx");
        assert!(lexer_over("q").try_scan_options().is_none());
    }

    #[test]
    fn escape_categories() {
        let mut lexer = lexer_over("IsLatin-1Supplement}");
        let token = lexer.try_scan_escape_category().unwrap();
        assert!(token.diagnostic.is_none());

        let mut lexer = lexer_over("Xyz}");
        let token = lexer.try_scan_escape_category().unwrap();
        assert_eq!(
            token.diagnostic,
            Some(Diagnostic::new("Unknown property 'Xyz'", TextSpan::new(0, 3)))
        );

        assert!(lexer_over("}").try_scan_escape_category().is_none());
    }

    #[test]
    fn hex_digits() {
        let mut lexer = lexer_over(r"\x4G");
        lexer.position = 2;
        let token = lexer.scan_hex_characters(2);
        assert_eq!(token.chars.to_string(), "4");
        assert_eq!(
            token.diagnostic,
            Some(Diagnostic::new(messages::INSUFFICIENT_HEX_DIGITS, TextSpan::new(0, 3)))
        );

        let mut lexer = lexer_over(r"\u00e9z");
        lexer.position = 2;
        let token = lexer.scan_hex_characters(4);
        assert_eq!(token.chars.to_string(), "00e9");
        assert!(token.diagnostic.is_none());
    }

    #[test]
    fn octal_digits() {
        let mut lexer = lexer_over("1234");
        assert_eq!(lexer.scan_octal_characters(RegexOptions::empty()).chars.to_string(), "123");

        let mut lexer = lexer_over("40");
        assert_eq!(
            lexer.scan_octal_characters(RegexOptions::ECMASCRIPT).chars.to_string(),
            "40"
        );

        let mut lexer = lexer_over("404");
        let token = lexer.scan_octal_characters(RegexOptions::ECMASCRIPT);
        assert_eq!(token.chars.to_string(), "40");

        let mut lexer = lexer_over("18");
        assert_eq!(lexer.scan_octal_characters(RegexOptions::empty()).chars.to_string(), "1");
    }
}
