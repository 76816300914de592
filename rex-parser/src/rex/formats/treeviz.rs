//! Treeviz formatter for regex trees
//!
//! Treeviz is a visual representation of the tree: one line per node, token or trivia, with
//! the nesting drawn by box connectors. Node lines carry the construct name, token and trivia
//! lines add their text (quoted, truncated to 30 characters). Diagnostics follow the tree.
//!
//! Example, for `a*`:
//!
//! ```text
//! ⧉ CompilationUnit
//! ├─ ☰ Sequence
//! │ └─ ✱ ZeroOrMoreQuantifier
//! │   ├─ ◦ Text
//! │   │ └─ · TextToken "a"
//! │   └─ · AsteriskToken "*"
//! └─ · EndOfFile (missing)
//! ```
//!
//! Icons
//!     CompilationUnit: ⧉
//!     Sequence: ☰
//!     Alternation: ⑂
//!     Text: ◦
//!     Wildcard, anchors: ⚓
//!     Quantifiers: ✱
//!     Character classes and their parts: ▤
//!     Groupings: ⊂
//!     Escapes: ⧹
//!     Tokens: ·
//!     Trivia: #

use crate::rex::ast::traits::grow_stack;
use crate::rex::ast::AstSnapshot;
use crate::rex::formats::registry::{FormatError, Formatter};
use crate::rex::tree::RegexTree;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn is_token(node_type: &str) -> bool {
    node_type.ends_with("Token") || node_type == "EndOfFile"
}

fn is_trivia(node_type: &str) -> bool {
    node_type.ends_with("Trivia")
}

/// Get the icon for an element type
fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "CompilationUnit" => "⧉",
        "Sequence" => "☰",
        "Alternation" => "⑂",
        "Text" => "◦",
        "Wildcard" | "StartAnchor" | "EndAnchor" => "⚓",
        "CharacterClassRange" | "CharacterClassSubtraction" | "PosixProperty" => "▤",
        t if t.ends_with("CharacterClass") => "▤",
        t if t.ends_with("Quantifier") => "✱",
        t if t.ends_with("Grouping") => "⊂",
        t if t.ends_with("Escape") => "⧹",
        t if is_trivia(t) => "#",
        t if is_token(t) => "·",
        _ => "○",
    }
}

fn display_label(snapshot: &AstSnapshot) -> String {
    if !is_token(&snapshot.node_type) && !is_trivia(&snapshot.node_type) {
        return snapshot.label.clone();
    }
    if snapshot.attributes.contains_key("missing") {
        return format!("{} (missing)", snapshot.node_type);
    }
    format!("{} {:?}", snapshot.node_type, truncate(&snapshot.label, 30))
}

/// Build treeviz output from an AstSnapshot
fn format_snapshot(snapshot: &AstSnapshot, prefix: &str, child_index: usize, child_count: usize) -> String {
    let mut output = String::new();

    let is_last = child_index == child_count - 1;
    let connector = if is_last { "└─" } else { "├─" };
    let icon = get_icon(&snapshot.node_type);

    output.push_str(&format!(
        "{}{} {} {}\n",
        prefix,
        connector,
        icon,
        display_label(snapshot)
    ));

    if !snapshot.children.is_empty() {
        let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        let child_count = snapshot.children.len();

        for (i, child) in snapshot.children.iter().enumerate() {
            output.push_str(&grow_stack(|| format_snapshot(child, &child_prefix, i, child_count)));
        }
    }

    output
}

fn format_root_snapshot(snapshot: &AstSnapshot) -> String {
    let icon = get_icon(&snapshot.node_type);
    let mut output = format!("{} {}\n", icon, snapshot.label);

    let child_count = snapshot.children.len();
    for (i, child) in snapshot.children.iter().enumerate() {
        output.push_str(&format_snapshot(child, "", i, child_count));
    }

    output
}

pub fn to_treeviz_str(tree: &RegexTree) -> String {
    let snapshot = tree.to_snapshot();
    let mut output = format_root_snapshot(&snapshot.root);

    if !tree.diagnostics().is_empty() {
        output.push_str("Diagnostics:\n");
        for diagnostic in tree.diagnostics() {
            output.push_str(&format!("  {diagnostic}\n"));
        }
    }

    output
}

/// Formatter implementation for treeviz format
pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, tree: &RegexTree) -> Result<String, FormatError> {
        Ok(to_treeviz_str(tree))
    }

    fn description(&self) -> &str {
        "Visual tree representation with connectors and Unicode icons"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rex::parsing::parse_str;
    use crate::rex::RegexOptions;

    #[test]
    fn test_simple_pattern() {
        let tree = parse_str("a*", RegexOptions::empty()).unwrap();
        let expected = "\
⧉ CompilationUnit
├─ ☰ Sequence
│ └─ ✱ ZeroOrMoreQuantifier
│   ├─ ◦ Text
│   │ └─ · TextToken \"a\"
│   └─ · AsteriskToken \"*\"
└─ · EndOfFile (missing)
";
        assert_eq!(to_treeviz_str(&tree), expected);
    }

    #[test]
    fn test_icons() {
        assert_eq!(get_icon("NegatedCharacterClass"), "▤");
        assert_eq!(get_icon("LazyQuantifier"), "✱");
        assert_eq!(get_icon("BalancingGrouping"), "⊂");
        assert_eq!(get_icon("KCaptureEscape"), "⧹");
        assert_eq!(get_icon("CommentTrivia"), "#");
        assert_eq!(get_icon("OpenParenToken"), "·");
    }

    #[test]
    fn test_long_text_is_truncated() {
        let pattern = "a".repeat(40);
        let tree = parse_str(&pattern, RegexOptions::empty()).unwrap();
        let output = to_treeviz_str(&tree);
        assert!(output.contains(&format!("TextToken \"{}...\"", "a".repeat(30))));
    }

    #[test]
    fn test_diagnostics_follow_tree() {
        let tree = parse_str("(a", RegexOptions::empty()).unwrap();
        let output = to_treeviz_str(&tree);
        assert!(output.ends_with("Diagnostics:\n  Not enough )'s at [2..2)\n"));
        assert!(output.contains("CloseParenToken (missing)"));
    }

    #[test]
    fn test_trivia_lines() {
        let tree = parse_str("a(?#note)", RegexOptions::empty()).unwrap();
        let output = to_treeviz_str(&tree);
        assert!(output.contains("└─ # CommentTrivia \"(?#note)\""));
    }
}
