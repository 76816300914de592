//! AST Snapshot - a normalized intermediate representation of the tree
//!
//! This module provides a canonical, format-agnostic representation of a regex tree suitable
//! for serialization to any output format (JSON, treeviz, ...).
//!
//! Nodes become snapshots labelled with their construct name, tokens become leaf snapshots
//! labelled with their text, and a token's leading trivia appear as the token's children.
//! Values, diagnostics and missing-ness are carried as attributes.

use super::nodes::{CompilationUnit, Node, NodeOrToken};
use super::span::TextSpan;
use super::traits::{grow_stack, AstNode};
use crate::rex::token::{Token, Trivia};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A snapshot of a tree element in a normalized, serializable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstSnapshot {
    /// The element name (e.g. "Sequence", "TextToken", "CommentTrivia")
    pub node_type: String,

    /// The element's source text for tokens and trivia, its name for nodes
    pub label: String,

    pub span: Option<TextSpan>,

    /// Additional attributes specific to the element
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<AstSnapshot>,
}

impl AstSnapshot {
    pub fn new(node_type: String, label: String, span: Option<TextSpan>) -> Self {
        Self {
            node_type,
            label,
            span,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: String) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn with_child(mut self, child: AstSnapshot) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<AstSnapshot>) -> Self {
        self.children.extend(children);
        self
    }
}

pub fn snapshot_from_root(root: &CompilationUnit) -> AstSnapshot {
    AstSnapshot::new("CompilationUnit".to_string(), "CompilationUnit".to_string(), root.span())
        .with_children(root.children().into_iter().map(snapshot_element).collect())
}

pub fn snapshot_element(element: NodeOrToken<'_>) -> AstSnapshot {
    match element {
        NodeOrToken::Node(node) => snapshot_node(node),
        NodeOrToken::Token(token) => snapshot_token(token),
    }
}

pub fn snapshot_node(node: &Node) -> AstSnapshot {
    grow_stack(|| {
        AstSnapshot::new(node.name().to_string(), node.name().to_string(), node.span())
            .with_children(node.children().into_iter().map(snapshot_element).collect())
    })
}

pub fn snapshot_token(token: &Token) -> AstSnapshot {
    let mut snapshot = AstSnapshot::new(
        token.kind.name().to_string(),
        token.chars.to_string(),
        token.span(),
    )
    .with_children(token.leading_trivia.iter().map(snapshot_trivia).collect());

    if token.is_missing() {
        snapshot = snapshot.with_attribute("missing", "true".to_string());
    }
    if let Some(value) = &token.value {
        snapshot = snapshot.with_attribute("value", value.to_string());
    }
    if let Some(diagnostic) = &token.diagnostic {
        snapshot = snapshot.with_attribute("diagnostic", diagnostic.to_string());
    }
    snapshot
}

fn snapshot_trivia(trivia: &Trivia) -> AstSnapshot {
    let snapshot = AstSnapshot::new(
        trivia.kind.name().to_string(),
        trivia.chars.to_string(),
        trivia.chars.span(),
    );
    match &trivia.diagnostic {
        Some(diagnostic) => snapshot.with_attribute("diagnostic", diagnostic.to_string()),
        None => snapshot,
    }
}
