//! Main module for rex library functionality

pub mod ast;
pub mod captures;
pub mod classifier;
pub mod formats;
pub mod lexing;
pub mod options;
pub mod parsing;
pub mod testing;
pub mod token;
pub mod tree;
pub mod virtual_chars;

pub use ast::{Diagnostic, Node, TextSpan};
pub use options::RegexOptions;
pub use parsing::{parse, parse_str, try_parse, ParseError, ParserSettings};
pub use tree::RegexTree;
pub use virtual_chars::{VirtualChar, VirtualCharSequence};
