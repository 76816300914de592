//! XML-like tag serialization
//!
//! The tag format is what the tree tests compare against: one element per node, tokens as
//! leaf elements holding their text, and the tree's diagnostics and captures appended after
//! the root.
//!
//! ## Format
//!
//! - Node name → element name (`Sequence`, `CaptureGrouping`, ...)
//! - Token kind → `KindToken` element holding the token text, with `value="..."` for numbers
//!   and capture names; a missing token is an empty element
//! - Leading trivia → a `<Trivia>` element inside the token, before its text
//! - Two spaces of indentation per level; a token and its trivia stay on one line
//!
//! ## Example
//!
//! ```text
//! <Tree>
//!   <CompilationUnit>
//!     <Sequence>
//!       <ZeroOrMoreQuantifier>
//!         <Text>
//!           <TextToken>a</TextToken>
//!         </Text>
//!         <AsteriskToken>*</AsteriskToken>
//!       </ZeroOrMoreQuantifier>
//!     </Sequence>
//!     <EndOfFile />
//!   </CompilationUnit>
//!   <Captures>
//!     <Capture Name="0" Span="[0..2)" />
//!   </Captures>
//! </Tree>
//! ```

use crate::rex::ast::traits::grow_stack;
use crate::rex::ast::{Node, NodeOrToken};
use crate::rex::formats::registry::{FormatError, Formatter};
use crate::rex::token::Token;
use crate::rex::tree::RegexTree;

struct TagSerializer {
    output: String,
    indent_level: usize,
}

impl TagSerializer {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
        }
    }

    fn line(&mut self, text: &str) {
        self.output.push_str(&"  ".repeat(self.indent_level));
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn serialize_element(&mut self, element: NodeOrToken<'_>) {
        match element {
            NodeOrToken::Node(node) => self.serialize_node(node),
            NodeOrToken::Token(token) => {
                let text = token_element(token);
                self.line(&text);
            }
        }
    }

    fn serialize_node(&mut self, node: &Node) {
        grow_stack(|| self.serialize_node_at_depth(node));
    }

    fn serialize_node_at_depth(&mut self, node: &Node) {
        let name = node.name();
        let children = node.children();
        if children.is_empty() {
            self.line(&format!("<{name} />"));
            return;
        }

        self.line(&format!("<{name}>"));
        self.indent_level += 1;
        for child in children {
            self.serialize_element(child);
        }
        self.indent_level -= 1;
        self.line(&format!("</{name}>"));
    }

    fn serialize_tree(&mut self, tree: &RegexTree) {
        self.line("<Tree>");
        self.indent_level += 1;

        self.line("<CompilationUnit>");
        self.indent_level += 1;
        for child in tree.root().children() {
            self.serialize_element(child);
        }
        self.indent_level -= 1;
        self.line("</CompilationUnit>");

        if !tree.diagnostics().is_empty() {
            self.line("<Diagnostics>");
            self.indent_level += 1;
            for diagnostic in tree.diagnostics() {
                self.line(&format!(
                    "<Diagnostic Message=\"{}\" Start=\"{}\" Length=\"{}\" />",
                    escape_xml(&diagnostic.message),
                    diagnostic.span.start,
                    diagnostic.span.len()
                ));
            }
            self.indent_level -= 1;
            self.line("</Diagnostics>");
        }

        self.line("<Captures>");
        self.indent_level += 1;
        let captures = tree.captures();
        for (number, span) in captures.numbers.iter() {
            self.line(&format!("<Capture Name=\"{number}\" Span=\"{span}\" />"));
        }
        for (name, span) in captures.names.iter() {
            self.line(&format!("<Capture Name=\"{}\" Span=\"{span}\" />", escape_xml(name)));
        }
        self.indent_level -= 1;
        self.line("</Captures>");

        self.indent_level -= 1;
        self.line("</Tree>");
    }
}

fn token_element(token: &Token) -> String {
    let name = token.kind.name();
    if token.is_missing() && token.leading_trivia.is_empty() {
        return format!("<{name} />");
    }

    let mut element = match &token.value {
        Some(value) => format!("<{name} value=\"{}\">", escape_xml(&value.to_string())),
        None => format!("<{name}>"),
    };

    if !token.leading_trivia.is_empty() {
        element.push_str("<Trivia>");
        for trivia in &token.leading_trivia {
            let kind = trivia.kind.name();
            element.push_str(&format!("<{kind}>{}</{kind}>", escape_xml(&trivia.chars.to_string())));
        }
        element.push_str("</Trivia>");
    }

    element.push_str(&escape_xml(&token.chars.to_string()));
    element.push_str(&format!("</{name}>"));
    element
}

/// Serialize a tree to the tag format, with a trailing newline
pub fn serialize_tree(tree: &RegexTree) -> String {
    let mut serializer = TagSerializer::new();
    serializer.serialize_tree(tree);
    serializer.output
}

/// Escape XML special characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
}

/// Formatter implementation for the tag format
pub struct TagFormatter;

impl Formatter for TagFormatter {
    fn name(&self) -> &str {
        "tag"
    }

    fn serialize(&self, tree: &RegexTree) -> Result<String, FormatError> {
        Ok(serialize_tree(tree))
    }

    fn description(&self) -> &str {
        "XML-like tags, one element per node and token"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rex::parsing::parse_str;
    use crate::rex::RegexOptions;

    #[test]
    fn test_serialize_simple_pattern() {
        let tree = parse_str("a*", RegexOptions::empty()).unwrap();
        let expected = "\
<Tree>
  <CompilationUnit>
    <Sequence>
      <ZeroOrMoreQuantifier>
        <Text>
          <TextToken>a</TextToken>
        </Text>
        <AsteriskToken>*</AsteriskToken>
      </ZeroOrMoreQuantifier>
    </Sequence>
    <EndOfFile />
  </CompilationUnit>
  <Captures>
    <Capture Name=\"0\" Span=\"[0..2)\" />
  </Captures>
</Tree>
";
        assert_eq!(serialize_tree(&tree), expected);
    }

    #[test]
    fn test_empty_sequence_and_missing_tokens() {
        let tree = parse_str("(", RegexOptions::empty()).unwrap();
        let output = serialize_tree(&tree);
        assert!(output.contains("<Sequence />"));
        assert!(output.contains("<CloseParenToken />"));
        assert!(output.contains("<Diagnostic Message=\"Not enough )'s\" Start=\"1\" Length=\"0\" />"));
    }

    #[test]
    fn test_values_and_trivia() {
        let tree = parse_str("(?<n>a)(?#c)\\k<n>", RegexOptions::empty()).unwrap();
        let output = serialize_tree(&tree);
        assert!(output.contains("<CaptureNameToken value=\"n\">n</CaptureNameToken>"));
        assert!(output.contains(
            "<BackslashToken><Trivia><CommentTrivia>(?#c)</CommentTrivia></Trivia>\\</BackslashToken>"
        ));
        assert!(output.contains("<Capture Name=\"n\" Span=\"[0..7)\" />"));
    }

    #[test]
    fn test_escaping() {
        let tree = parse_str("<&\">", RegexOptions::empty()).unwrap();
        let output = serialize_tree(&tree);
        assert!(output.contains("<TextToken>&lt;&amp;&quot;&gt;</TextToken>"));
    }

    #[test]
    fn test_end_of_file_keeps_trivia() {
        let tree = parse_str("a # done", RegexOptions::IGNORE_PATTERN_WHITESPACE).unwrap();
        let output = serialize_tree(&tree);
        assert!(output.contains(
            "<EndOfFile><Trivia><WhitespaceTrivia> </WhitespaceTrivia><CommentTrivia># done</CommentTrivia></Trivia></EndOfFile>"
        ));
    }
}
