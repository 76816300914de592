//! AST traits - uniform access to nodes and tokens
//!
//! [`AstNode`] gives every tree element a name, its children and a span. [`Visitor`] is the
//! walking interface: implement the callbacks you care about and hand the visitor to [`walk`].

use super::nodes::{CompilationUnit, Node, NodeOrToken};
use super::span::TextSpan;
use crate::rex::token::{Token, Trivia};

/// Visitor over a regex tree
///
/// Default implementations are empty, so you only need to override the methods you care about.
/// Tokens are visited after their leading trivia, in source order.
///
/// # Example
///
/// ```ignore
/// struct CountEscapes(usize);
///
/// impl Visitor for CountEscapes {
///     fn visit_node(&mut self, node: &Node) {
///         if node.name().ends_with("Escape") {
///             self.0 += 1;
///         }
///     }
/// }
///
/// let mut visitor = CountEscapes(0);
/// walk(&mut visitor, tree.root());
/// ```
pub trait Visitor {
    fn visit_node(&mut self, _node: &Node) {}
    fn leave_node(&mut self, _node: &Node) {}
    fn visit_token(&mut self, _token: &Token) {}
    fn visit_trivia(&mut self, _trivia: &Trivia) {}
}

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if this one is nearly used up
///
/// Every recursion that follows pattern nesting goes through here.
pub(crate) fn grow_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, f)
}

/// Walk `root` and everything under it
pub fn walk(visitor: &mut dyn Visitor, root: &CompilationUnit) {
    for child in root.children() {
        walk_element(visitor, child);
    }
}

pub fn walk_element(visitor: &mut dyn Visitor, element: NodeOrToken<'_>) {
    match element {
        NodeOrToken::Node(node) => grow_stack(|| {
            visitor.visit_node(node);
            for child in node.children() {
                walk_element(visitor, child);
            }
            visitor.leave_node(node);
        }),
        NodeOrToken::Token(token) => {
            for trivia in &token.leading_trivia {
                visitor.visit_trivia(trivia);
            }
            visitor.visit_token(token);
        }
    }
}

/// Common interface for tree elements
pub trait AstNode {
    fn node_type(&self) -> &'static str;
    fn children(&self) -> Vec<NodeOrToken<'_>>;

    /// From the first character to the last one under this element, trivia included; `None`
    /// when everything under it is missing
    fn span(&self) -> Option<TextSpan> {
        let mut spans = SpanCollector::default();
        for child in self.children() {
            walk_element(&mut spans, child);
        }
        spans.span
    }
}

impl AstNode for Node {
    fn node_type(&self) -> &'static str {
        self.name()
    }

    fn children(&self) -> Vec<NodeOrToken<'_>> {
        Node::children(self)
    }
}

impl AstNode for CompilationUnit {
    fn node_type(&self) -> &'static str {
        "CompilationUnit"
    }

    fn children(&self) -> Vec<NodeOrToken<'_>> {
        CompilationUnit::children(self)
    }
}

#[derive(Default)]
struct SpanCollector {
    span: Option<TextSpan>,
}

impl SpanCollector {
    fn extend(&mut self, next: Option<TextSpan>) {
        if let Some(next) = next {
            self.span = Some(match self.span {
                Some(span) => TextSpan::covering(span, next),
                None => next,
            });
        }
    }
}

impl Visitor for SpanCollector {
    fn visit_token(&mut self, token: &Token) {
        self.extend(token.span());
    }

    fn visit_trivia(&mut self, trivia: &Trivia) {
        self.extend(trivia.chars.span());
    }
}
