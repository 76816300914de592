//! The parse result
//!
//! A [`RegexTree`] is immutable once built and safe to share across threads. Besides the root
//! it carries the diagnostics gathered from every token and trivia, in tree order without
//! duplicates, and the capture maps the second parsing pass resolved against.

use crate::rex::ast::{snapshot_from_root, walk, AstSnapshot, CompilationUnit, Diagnostic, Visitor};
use crate::rex::captures::CaptureMaps;
use crate::rex::formats::{tag, treeviz};
use crate::rex::token::{Token, Trivia};
use crate::rex::virtual_chars::VirtualCharSequence;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
pub struct RegexTree {
    text: VirtualCharSequence,
    root: CompilationUnit,
    diagnostics: Vec<Diagnostic>,
    captures: CaptureMaps,
}

impl RegexTree {
    pub fn new(text: VirtualCharSequence, root: CompilationUnit, captures: CaptureMaps) -> Self {
        let diagnostics = collect_diagnostics(&root);
        Self {
            text,
            root,
            diagnostics,
            captures,
        }
    }

    pub fn text(&self) -> &VirtualCharSequence {
        &self.text
    }

    pub fn root(&self) -> &CompilationUnit {
        &self.root
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn captures(&self) -> &CaptureMaps {
        &self.captures
    }

    pub fn to_tag(&self) -> String {
        tag::serialize_tree(self)
    }

    pub fn to_treeviz(&self) -> String {
        treeviz::to_treeviz_str(self)
    }

    pub fn to_snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            root: snapshot_from_root(&self.root),
            diagnostics: self.diagnostics.clone(),
            capture_names: self
                .captures
                .names
                .iter()
                .map(|(name, span)| (name.clone(), span.to_string()))
                .collect(),
            capture_numbers: self
                .captures
                .numbers
                .iter()
                .map(|(number, span)| (number.to_string(), span.to_string()))
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
    }
}

/// Everything about a tree in serializable form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSnapshot {
    pub root: AstSnapshot,
    pub diagnostics: Vec<Diagnostic>,
    pub capture_names: BTreeMap<String, String>,
    pub capture_numbers: BTreeMap<String, String>,
}

fn collect_diagnostics(root: &CompilationUnit) -> Vec<Diagnostic> {
    #[derive(Default)]
    struct Collector {
        seen: HashSet<Diagnostic>,
        diagnostics: Vec<Diagnostic>,
    }

    impl Collector {
        fn add(&mut self, diagnostic: &Option<Diagnostic>) {
            if let Some(diagnostic) = diagnostic {
                if self.seen.insert(diagnostic.clone()) {
                    self.diagnostics.push(diagnostic.clone());
                }
            }
        }
    }

    impl Visitor for Collector {
        fn visit_token(&mut self, token: &Token) {
            self.add(&token.diagnostic);
        }

        fn visit_trivia(&mut self, trivia: &Trivia) {
            self.add(&trivia.diagnostic);
        }
    }

    let mut collector = Collector::default();
    walk(&mut collector, root);
    collector.diagnostics
}

#[cfg(test)]
mod tests {
    use crate::rex::ast::{messages, TextSpan};
    use crate::rex::parsing::parse_str;
    use crate::rex::RegexOptions;

    #[test]
    fn test_duplicate_diagnostics_collapse() {
        let tree = parse_str("((", RegexOptions::empty()).unwrap();
        assert_eq!(tree.diagnostics().len(), 1);
        assert_eq!(tree.diagnostics()[0].message, messages::NOT_ENOUGH_CLOSE_PARENS);
        assert_eq!(tree.diagnostics()[0].span, TextSpan::empty_at(2));
    }

    #[test]
    fn test_trivia_diagnostics_come_before_their_token() {
        let tree = parse_str("a(?#x", RegexOptions::empty()).unwrap();
        assert_eq!(tree.diagnostics()[0].message, messages::UNTERMINATED_COMMENT);
    }

    #[test]
    fn test_diagnostics_follow_tree_order() {
        let tree = parse_str(r"*\q", RegexOptions::empty()).unwrap();
        let messages: Vec<_> = tree.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            [messages::QUANTIFIER_FOLLOWING_NOTHING, r"Unrecognized escape sequence \q"]
        );
    }

    #[test]
    fn test_snapshot_carries_captures() {
        let tree = parse_str("(?<n>a)", RegexOptions::empty()).unwrap();
        let snapshot = tree.to_snapshot();
        assert_eq!(snapshot.capture_names.get("n").map(String::as_str), Some("[0..7)"));
        assert_eq!(snapshot.capture_numbers.len(), 2);
        assert!(tree.to_json().unwrap().contains("\"capture_names\""));
    }

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<super::RegexTree>();
    }
}
