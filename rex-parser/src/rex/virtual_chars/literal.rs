//! Host string-literal decoding
//!
//! Turns the source text of a host string literal into the virtual chars the parser consumes.
//! Three shapes are understood:
//!
//!     "…"     regular literal; escapes \' \" \\ \0 \a \b \f \n \r \t \v \xH..HHHH \uHHHH \UHHHHHHHH
//!     @"…"    verbatim literal; only "" is special and stands for one quote
//!     other   raw pattern text, taken char for char
//!
//! Each decoded char keeps the span of the source characters that produced it (the whole
//! escape for escapes), offset by the position of the literal in its file.
//!
//! The literal bodies are tokenized with logos; anything the tokens don't cover (a lone `\`,
//! an unknown escape, a raw newline in a regular literal) is a decoding error.

use super::{VirtualChar, VirtualCharSequence};
use crate::rex::ast::TextSpan;
use logos::Logos;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("unterminated string literal")]
    Unterminated,
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },
    #[error("escape at offset {offset} does not encode a character")]
    InvalidCodePoint { offset: usize },
    #[error("unexpected text after the closing quote at offset {offset}")]
    TrailingText { offset: usize },
}

/// Pieces of a regular literal body
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
enum RegularPiece {
    #[regex(r#"\\['"\\0abfnrtv]"#)]
    SimpleEscape,

    #[regex(r"\\x[0-9a-fA-F]{1,4}")]
    HexEscape,

    #[regex(r"\\u[0-9a-fA-F]{4}")]
    Utf16Escape,

    #[regex(r"\\U[0-9a-fA-F]{8}")]
    Utf32Escape,

    #[token("\"")]
    Quote,

    #[regex(r#"[^\\"\r\n]"#)]
    Char,
}

/// Pieces of a verbatim literal body
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
enum VerbatimPiece {
    #[token("\"\"")]
    DoubledQuote,

    #[token("\"")]
    Quote,

    #[regex(r#"[^"]"#)]
    Char,
}

/// Decode `source`, which starts at offset `base` of its host file
pub fn decode(source: &str, base: usize) -> Result<VirtualCharSequence, LiteralError> {
    if let Some(body) = source.strip_prefix("@\"") {
        decode_verbatim(body, base + 2)
    } else if let Some(body) = source.strip_prefix('"') {
        decode_regular(body, base + 1)
    } else {
        Ok(VirtualCharSequence::from_text(source, base))
    }
}

fn decode_regular(body: &str, base: usize) -> Result<VirtualCharSequence, LiteralError> {
    let mut chars = Vec::with_capacity(body.len());
    let mut lexer = RegularPiece::lexer(body);

    while let Some(piece) = lexer.next() {
        let range = lexer.span();
        let slice = lexer.slice();
        let span = TextSpan::new(base + range.start, base + range.end);
        let offset = base + range.start;

        let ch = match piece {
            Ok(RegularPiece::Char) => slice.chars().next().ok_or(LiteralError::Unterminated)?,
            Ok(RegularPiece::SimpleEscape) => {
                simple_escape(&slice[1..]).ok_or(LiteralError::InvalidEscape { offset })?
            }
            Ok(RegularPiece::HexEscape)
            | Ok(RegularPiece::Utf16Escape)
            | Ok(RegularPiece::Utf32Escape) => code_point(&slice[2..], offset)?,
            Ok(RegularPiece::Quote) => {
                return if range.end == body.len() {
                    Ok(VirtualCharSequence::new(chars))
                } else {
                    Err(LiteralError::TrailingText {
                        offset: base + range.end,
                    })
                };
            }
            Err(()) => return Err(LiteralError::InvalidEscape { offset }),
        };
        chars.push(VirtualChar::new(ch, span));
    }

    Err(LiteralError::Unterminated)
}

fn decode_verbatim(body: &str, base: usize) -> Result<VirtualCharSequence, LiteralError> {
    let mut chars = Vec::with_capacity(body.len());
    let mut lexer = VerbatimPiece::lexer(body);

    while let Some(piece) = lexer.next() {
        let range = lexer.span();
        let span = TextSpan::new(base + range.start, base + range.end);

        match piece {
            Ok(VerbatimPiece::DoubledQuote) => chars.push(VirtualChar::new('"', span)),
            Ok(VerbatimPiece::Char) => {
                let ch = lexer.slice().chars().next().ok_or(LiteralError::Unterminated)?;
                chars.push(VirtualChar::new(ch, span));
            }
            Ok(VerbatimPiece::Quote) => {
                return if range.end == body.len() {
                    Ok(VirtualCharSequence::new(chars))
                } else {
                    Err(LiteralError::TrailingText {
                        offset: base + range.end,
                    })
                };
            }
            Err(()) => return Err(LiteralError::InvalidEscape { offset: span.start }),
        }
    }

    Err(LiteralError::Unterminated)
}

fn simple_escape(escape: &str) -> Option<char> {
    let ch = match escape.chars().next()? {
        '\'' => '\'',
        '"' => '"',
        '\\' => '\\',
        '0' => '\0',
        'a' => '\u{7}',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        _ => return None,
    };
    Some(ch)
}

fn code_point(hex: &str, offset: usize) -> Result<char, LiteralError> {
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or(LiteralError::InvalidCodePoint { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(source: &str) -> String {
        decode(source, 0).expect("literal to decode").to_string()
    }

    #[test]
    fn raw_text_is_taken_as_is() {
        let text = decode(r"a\d", 5).unwrap();
        assert_eq!(text.to_string(), r"a\d");
        assert_eq!(text[1].span, TextSpan::new(6, 7));
    }

    #[test]
    fn verbatim_spans_skip_prefix() {
        let text = decode(r#"@"\p{cat}""#, 8).unwrap();
        assert_eq!(text.to_string(), r"\p{cat}");
        assert_eq!(text[0].span, TextSpan::new(10, 11));
        assert_eq!(text.span(), Some(TextSpan::new(10, 17)));
    }

    #[test]
    fn verbatim_doubled_quote() {
        let text = decode(r#"@"a""b""#, 0).unwrap();
        assert_eq!(text.to_string(), "a\"b");
        assert_eq!(text[1].span, TextSpan::new(3, 5));
    }

    #[test]
    fn regular_escapes_decode_with_their_source_span() {
        let text = decode(r#""\\d\t""#, 0).unwrap();
        assert_eq!(text.to_string(), "\\d\t");
        assert_eq!(text[0].span, TextSpan::new(1, 3));
        assert_eq!(text[1].span, TextSpan::new(3, 4));
        assert_eq!(text[2].span, TextSpan::new(4, 6));
    }

    #[test]
    fn regular_hex_and_unicode() {
        assert_eq!(decoded(r#""\x41\u0042\U00000043""#), "ABC");
    }

    #[test]
    fn errors() {
        assert_eq!(decode("\"abc", 0), Err(LiteralError::Unterminated));
        assert_eq!(
            decode(r#""\q""#, 0),
            Err(LiteralError::InvalidEscape { offset: 1 })
        );
        assert_eq!(
            decode(r#""\uD800""#, 0),
            Err(LiteralError::InvalidCodePoint { offset: 1 })
        );
        assert_eq!(
            decode(r#""a"b"#, 0),
            Err(LiteralError::TrailingText { offset: 3 })
        );
        assert_eq!(decode("@\"abc", 0), Err(LiteralError::Unterminated));
    }
}
