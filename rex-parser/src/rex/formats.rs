//! Output format implementations for tree serialization
//!
//! This module contains different format implementations for serializing:
//! - Regex trees to various output formats (tag, treeviz, json)
//! - Token streams back to pattern text (detokenizer)

pub mod detokenizer;
pub mod json;
pub mod registry;
pub mod tag;
pub mod treeviz;

pub use detokenizer::detokenize;
pub use json::JsonFormatter;
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use tag::{serialize_tree as serialize_tree_tag, TagFormatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};
