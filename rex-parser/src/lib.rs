//! # rex
//!
//! A syntax parser for .NET-dialect regular expressions, as they appear inside host
//! string literals.
//!
//! The parser never runs a pattern. It produces a full-fidelity tree (every input
//! character lands in exactly one token or trivia), diagnostics worded like the
//! reference engine's exceptions, and the capture inventory of the pattern.
//!
//! File Layout
//!
//!     src/rex
//!       ├── virtual_chars   Input model: chars with host-source spans, literal decoding
//!       ├── classifier      Word chars and \p{...} category names
//!       ├── lexing          On-demand scanner driven by the parser
//!       ├── parsing         Two-pass recursive descent
//!       ├── captures        Capture inventory between the passes
//!       ├── ast             Nodes, tokens, trivia, spans, diagnostics
//!       ├── tree            The immutable parse result
//!       ├── formats         tag / treeviz / json renderings
//!       └── testing         Fluent assertions for tests
//!
//! For testing guidelines, see the [testing module](rex::testing).

#![allow(rustdoc::invalid_html_tags)]

pub mod rex;
