//! AST definitions for regex patterns
//!
//!     The tree is a concrete syntax tree: every character of the pattern belongs to exactly one
//!     token or one piece of trivia, and concatenating them in order gives the pattern back.
//!     Nothing is normalized away, so a formatter or highlighter can work straight off it.
//!
//! Nodes and Tokens
//!
//!     [`Node`] is a closed enum with one variant per construct (see [nodes]). Its children are
//!     tokens and other nodes, reachable uniformly through [`NodeOrToken`]. The root is a
//!     [`CompilationUnit`]: the pattern's expression plus the end-of-file token, which is where
//!     trailing trivia of the whole pattern ends up.
//!
//! Diagnostics
//!
//!     Problems are attached where they are found, on a token or on a piece of trivia, never more
//!     than one per element. See [diagnostics].
//!
//! Positions
//!
//!     All spans are host-source offsets carried by the virtual chars; see [span].

pub mod diagnostics;
pub mod nodes;
pub mod snapshot;
pub mod span;
pub mod traits;

pub use diagnostics::{messages, Diagnostic};
pub use nodes::{CompilationUnit, Node, NodeOrToken};
pub use snapshot::{snapshot_from_root, snapshot_node, AstSnapshot};
pub use span::TextSpan;
pub use traits::{walk, AstNode, Visitor};
