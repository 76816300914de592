//! Tokens and trivia produced by the lexer
//!
//!     The grammar is single-character at heart: every punctuation character the dialect gives
//!     meaning to is its own token kind, and everything else is `Text`. The lexer never looks
//!     ahead to build multi-character tokens on its own; the parser asks for the longer runs it
//!     needs (numbers, capture names, option letters, category names, hex and octal digits)
//!     with on-demand scans, which produce the value-carrying kinds at the bottom of
//!     [`TokenKind`].
//!
//! Missing Tokens
//!
//!     A token with no characters is *missing*. The parser synthesizes one wherever the grammar
//!     requires a token the input lacks (an unclosed `(`, an unterminated `[`), which keeps every
//!     node's shape complete. A missing token normally carries the diagnostic explaining what
//!     was expected.
//!
//! Trivia
//!
//!     Comments and, under `x` mode, whitespace runs are trivia. They only ever lead a token;
//!     nothing in this dialect produces trailing trivia, so tokens don't store any.

use crate::rex::ast::{Diagnostic, TextSpan};
use crate::rex::virtual_chars::VirtualCharSequence;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndOfFile,
    Bar,
    Asterisk,
    Plus,
    Question,
    OpenBrace,
    CloseBrace,
    Backslash,
    OpenBracket,
    CloseBracket,
    Dot,
    Caret,
    Dollar,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Equals,
    Exclamation,
    LessThan,
    GreaterThan,
    Minus,
    Quote,
    Text,
    Number,
    CaptureName,
    EscapeCategory,
    Options,
}

impl TokenKind {
    /// The kind a single pattern character lexes to
    pub fn for_char(ch: char) -> TokenKind {
        match ch {
            '|' => TokenKind::Bar,
            '*' => TokenKind::Asterisk,
            '+' => TokenKind::Plus,
            '?' => TokenKind::Question,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '\\' => TokenKind::Backslash,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '.' => TokenKind::Dot,
            '^' => TokenKind::Caret,
            '$' => TokenKind::Dollar,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Equals,
            '!' => TokenKind::Exclamation,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            '-' => TokenKind::Minus,
            '\'' => TokenKind::Quote,
            _ => TokenKind::Text,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::EndOfFile => "EndOfFile",
            TokenKind::Bar => "BarToken",
            TokenKind::Asterisk => "AsteriskToken",
            TokenKind::Plus => "PlusToken",
            TokenKind::Question => "QuestionToken",
            TokenKind::OpenBrace => "OpenBraceToken",
            TokenKind::CloseBrace => "CloseBraceToken",
            TokenKind::Backslash => "BackslashToken",
            TokenKind::OpenBracket => "OpenBracketToken",
            TokenKind::CloseBracket => "CloseBracketToken",
            TokenKind::Dot => "DotToken",
            TokenKind::Caret => "CaretToken",
            TokenKind::Dollar => "DollarToken",
            TokenKind::OpenParen => "OpenParenToken",
            TokenKind::CloseParen => "CloseParenToken",
            TokenKind::Comma => "CommaToken",
            TokenKind::Colon => "ColonToken",
            TokenKind::Equals => "EqualsToken",
            TokenKind::Exclamation => "ExclamationToken",
            TokenKind::LessThan => "LessThanToken",
            TokenKind::GreaterThan => "GreaterThanToken",
            TokenKind::Minus => "MinusToken",
            TokenKind::Quote => "QuoteToken",
            TokenKind::Text => "TextToken",
            TokenKind::Number => "NumberToken",
            TokenKind::CaptureName => "CaptureNameToken",
            TokenKind::EscapeCategory => "EscapeCategoryToken",
            TokenKind::Options => "OptionsToken",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value carried by number and capture-name tokens
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenValue {
    Number(i32),
    Name(String),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(number) => write!(f, "{number}"),
            TokenValue::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Comment,
    Whitespace,
}

impl TriviaKind {
    pub fn name(&self) -> &'static str {
        match self {
            TriviaKind::Comment => "CommentTrivia",
            TriviaKind::Whitespace => "WhitespaceTrivia",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub chars: VirtualCharSequence,
    pub diagnostic: Option<Diagnostic>,
}

impl Trivia {
    pub fn new(kind: TriviaKind, chars: VirtualCharSequence) -> Self {
        Self {
            kind,
            chars,
            diagnostic: None,
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub leading_trivia: Vec<Trivia>,
    pub chars: VirtualCharSequence,
    pub diagnostic: Option<Diagnostic>,
    pub value: Option<TokenValue>,
}

impl Token {
    pub fn new(kind: TokenKind, leading_trivia: Vec<Trivia>, chars: VirtualCharSequence) -> Self {
        Self {
            kind,
            leading_trivia,
            chars,
            diagnostic: None,
            value: None,
        }
    }

    /// A synthesized token with no characters
    pub fn missing(kind: TokenKind) -> Self {
        Self::new(kind, Vec::new(), VirtualCharSequence::empty())
    }

    pub fn is_missing(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn with_kind(mut self, kind: TokenKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.add_diagnostic_if_none(diagnostic);
        self
    }

    /// Attach `diagnostic` unless the token already has one; the first diagnostic wins
    pub fn add_diagnostic_if_none(&mut self, diagnostic: Diagnostic) {
        if self.diagnostic.is_none() {
            self.diagnostic = Some(diagnostic);
        }
    }

    pub fn span(&self) -> Option<TextSpan> {
        self.chars.span()
    }

    /// Span of the token including its leading trivia
    pub fn full_span(&self) -> Option<TextSpan> {
        let first = self
            .leading_trivia
            .iter()
            .find_map(|trivia| trivia.chars.span())
            .or_else(|| self.span())?;
        let last = self.span().or_else(|| {
            self.leading_trivia
                .iter()
                .rev()
                .find_map(|trivia| trivia.chars.span())
        })?;
        Some(TextSpan::covering(first, last))
    }

    pub fn number(&self) -> Option<i32> {
        match self.value {
            Some(TokenValue::Number(number)) => Some(number),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.value {
            Some(TokenValue::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn first_char(&self) -> Option<char> {
        self.chars.first().map(|vc| vc.ch)
    }

    /// True when the token is exactly the single character `ch`
    pub fn is_char(&self, ch: char) -> bool {
        self.chars.len() == 1 && self.chars[0].ch == ch
    }
}
