//! Node kinds
//!
//!     One variant per construct of the dialect. Every variant boxes a struct whose fields are
//!     its children in source order, tokens and nodes alike; [`Node::children`] yields them in
//!     that order, which is what tree walks, formats and the round-trip property rely on.
//!
//!     Absent children never appear as `Option`: a construct the input leaves incomplete holds a
//!     missing token (see [`Token::missing`](crate::rex::token::Token::missing)) instead.
//!
//!     Several constructs share a shape and therefore a struct: the four `(?X...)` groupings
//!     with a single marker character share [`PrefixedGroupingNode`], the two lookbehinds share
//!     [`LookbehindGroupingNode`], and so on. The variant is what tells them apart.

use crate::rex::token::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Sequence(Box<SequenceNode>),
    Alternation(Box<AlternationNode>),
    Text(Box<TextNode>),
    Wildcard(Box<WildcardNode>),
    StartAnchor(Box<AnchorNode>),
    EndAnchor(Box<AnchorNode>),

    ZeroOrMoreQuantifier(Box<ZeroOrMoreQuantifierNode>),
    OneOrMoreQuantifier(Box<OneOrMoreQuantifierNode>),
    ZeroOrOneQuantifier(Box<ZeroOrOneQuantifierNode>),
    LazyQuantifier(Box<LazyQuantifierNode>),
    ExactNumericQuantifier(Box<ExactNumericQuantifierNode>),
    OpenRangeNumericQuantifier(Box<OpenRangeNumericQuantifierNode>),
    ClosedRangeNumericQuantifier(Box<ClosedRangeNumericQuantifierNode>),

    CharacterClass(Box<CharacterClassNode>),
    NegatedCharacterClass(Box<NegatedCharacterClassNode>),
    CharacterClassRange(Box<CharacterClassRangeNode>),
    CharacterClassSubtraction(Box<CharacterClassSubtractionNode>),
    PosixProperty(Box<PosixPropertyNode>),

    SimpleGrouping(Box<SimpleGroupingNode>),
    SimpleOptionsGrouping(Box<SimpleOptionsGroupingNode>),
    NestedOptionsGrouping(Box<NestedOptionsGroupingNode>),
    NonCapturingGrouping(Box<PrefixedGroupingNode>),
    PositiveLookaheadGrouping(Box<PrefixedGroupingNode>),
    NegativeLookaheadGrouping(Box<PrefixedGroupingNode>),
    PositiveLookbehindGrouping(Box<LookbehindGroupingNode>),
    NegativeLookbehindGrouping(Box<LookbehindGroupingNode>),
    NonBacktrackingGrouping(Box<PrefixedGroupingNode>),
    CaptureGrouping(Box<CaptureGroupingNode>),
    BalancingGrouping(Box<BalancingGroupingNode>),
    ConditionalCaptureGrouping(Box<ConditionalCaptureGroupingNode>),
    ConditionalExpressionGrouping(Box<ConditionalExpressionGroupingNode>),

    SimpleEscape(Box<EscapeNode>),
    AnchorEscape(Box<EscapeNode>),
    CharacterClassEscape(Box<EscapeNode>),
    ControlEscape(Box<ControlEscapeNode>),
    HexEscape(Box<HexEscapeNode>),
    UnicodeEscape(Box<HexEscapeNode>),
    OctalEscape(Box<OctalEscapeNode>),
    CaptureEscape(Box<CaptureEscapeNode>),
    KCaptureEscape(Box<KCaptureEscapeNode>),
    BackreferenceEscape(Box<BackreferenceEscapeNode>),
    CategoryEscape(Box<CategoryEscapeNode>),
}

/// The root: the whole pattern followed by the end-of-file token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub expression: Node,
    pub end_of_file: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceNode {
    pub children: Vec<Node>,
}

/// `left | right`; chains nest to the left
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternationNode {
    pub left: Node,
    pub bar: Token,
    pub right: Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub text: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardNode {
    pub dot: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorNode {
    pub anchor: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroOrMoreQuantifierNode {
    pub expression: Node,
    pub asterisk: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOrMoreQuantifierNode {
    pub expression: Node,
    pub plus: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroOrOneQuantifierNode {
    pub expression: Node,
    pub question: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyQuantifierNode {
    pub quantifier: Node,
    pub question: Token,
}

/// `{n}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactNumericQuantifierNode {
    pub expression: Node,
    pub open_brace: Token,
    pub first_number: Token,
    pub close_brace: Token,
}

/// `{n,}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRangeNumericQuantifierNode {
    pub expression: Node,
    pub open_brace: Token,
    pub first_number: Token,
    pub comma: Token,
    pub close_brace: Token,
}

/// `{n,m}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedRangeNumericQuantifierNode {
    pub expression: Node,
    pub open_brace: Token,
    pub first_number: Token,
    pub comma: Token,
    pub second_number: Token,
    pub close_brace: Token,
}

/// `[...]`; `components` is always a [`Node::Sequence`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterClassNode {
    pub open_bracket: Token,
    pub components: Node,
    pub close_bracket: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegatedCharacterClassNode {
    pub open_bracket: Token,
    pub caret: Token,
    pub components: Node,
    pub close_bracket: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterClassRangeNode {
    pub left: Node,
    pub minus: Token,
    pub right: Node,
}

/// `-[...]` at the end of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterClassSubtractionNode {
    pub minus: Token,
    pub class: Node,
}

/// `[:name:]` inside a class, kept as one opaque text token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosixPropertyNode {
    pub text: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleGroupingNode {
    pub open_paren: Token,
    pub expression: Node,
    pub close_paren: Token,
}

/// `(?imnsx-imnsx)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleOptionsGroupingNode {
    pub open_paren: Token,
    pub question: Token,
    pub options: Token,
    pub close_paren: Token,
}

/// `(?imnsx-imnsx:...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedOptionsGroupingNode {
    pub open_paren: Token,
    pub question: Token,
    pub options: Token,
    pub colon: Token,
    pub expression: Node,
    pub close_paren: Token,
}

/// `(?:...)`, `(?=...)`, `(?!...)` and `(?>...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedGroupingNode {
    pub open_paren: Token,
    pub question: Token,
    pub marker: Token,
    pub expression: Node,
    pub close_paren: Token,
}

/// `(?<=...)` and `(?<!...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookbehindGroupingNode {
    pub open_paren: Token,
    pub question: Token,
    pub less_than: Token,
    pub marker: Token,
    pub expression: Node,
    pub close_paren: Token,
}

/// `(?<name>...)` or `(?'name'...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureGroupingNode {
    pub open_paren: Token,
    pub question: Token,
    pub open: Token,
    pub capture: Token,
    pub close: Token,
    pub expression: Node,
    pub close_paren: Token,
}

/// `(?<first-second>...)`; the first capture may be missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancingGroupingNode {
    pub open_paren: Token,
    pub question: Token,
    pub open: Token,
    pub first_capture: Token,
    pub minus: Token,
    pub second_capture: Token,
    pub close: Token,
    pub expression: Node,
    pub close_paren: Token,
}

/// `(?(capture)yes|no)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalCaptureGroupingNode {
    pub open_paren: Token,
    pub question: Token,
    pub inner_open_paren: Token,
    pub capture: Token,
    pub inner_close_paren: Token,
    pub result: Node,
    pub close_paren: Token,
}

/// `(?(expression)yes|no)`; `grouping` is the parenthesized condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalExpressionGroupingNode {
    pub open_paren: Token,
    pub question: Token,
    pub grouping: Node,
    pub result: Node,
    pub close_paren: Token,
}

/// `\X` where the escape is one character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeNode {
    pub backslash: Token,
    pub type_token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEscapeNode {
    pub backslash: Token,
    pub type_token: Token,
    pub control: Token,
}

/// `\xHH` and `\uHHHH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexEscapeNode {
    pub backslash: Token,
    pub type_token: Token,
    pub hex_text: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctalEscapeNode {
    pub backslash: Token,
    pub octal_text: Token,
}

/// `\<name>` or `\'name'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEscapeNode {
    pub backslash: Token,
    pub open: Token,
    pub capture: Token,
    pub close: Token,
}

/// `\k<name>` or `\k'name'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KCaptureEscapeNode {
    pub backslash: Token,
    pub type_token: Token,
    pub open: Token,
    pub capture: Token,
    pub close: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackreferenceEscapeNode {
    pub backslash: Token,
    pub number: Token,
}

/// `\p{Name}` or `\P{Name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEscapeNode {
    pub backslash: Token,
    pub type_token: Token,
    pub open_brace: Token,
    pub category: Token,
    pub close_brace: Token,
}

/// A child of a node: either another node or a token
#[derive(Debug, Clone, Copy)]
pub enum NodeOrToken<'a> {
    Node(&'a Node),
    Token(&'a Token),
}

impl<'a> NodeOrToken<'a> {
    pub fn as_node(&self) -> Option<&'a Node> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&'a Token> {
        match self {
            NodeOrToken::Token(token) => Some(token),
            NodeOrToken::Node(_) => None,
        }
    }
}

impl Node {
    pub fn sequence(children: Vec<Node>) -> Node {
        Node::Sequence(Box::new(SequenceNode { children }))
    }

    pub fn text(text: Token) -> Node {
        Node::Text(Box::new(TextNode { text }))
    }

    pub fn simple_escape(backslash: Token, type_token: Token) -> Node {
        Node::SimpleEscape(Box::new(EscapeNode {
            backslash,
            type_token,
        }))
    }

    /// The construct name, as used by the tag format
    pub fn name(&self) -> &'static str {
        match self {
            Node::Sequence(_) => "Sequence",
            Node::Alternation(_) => "Alternation",
            Node::Text(_) => "Text",
            Node::Wildcard(_) => "Wildcard",
            Node::StartAnchor(_) => "StartAnchor",
            Node::EndAnchor(_) => "EndAnchor",
            Node::ZeroOrMoreQuantifier(_) => "ZeroOrMoreQuantifier",
            Node::OneOrMoreQuantifier(_) => "OneOrMoreQuantifier",
            Node::ZeroOrOneQuantifier(_) => "ZeroOrOneQuantifier",
            Node::LazyQuantifier(_) => "LazyQuantifier",
            Node::ExactNumericQuantifier(_) => "ExactNumericQuantifier",
            Node::OpenRangeNumericQuantifier(_) => "OpenRangeNumericQuantifier",
            Node::ClosedRangeNumericQuantifier(_) => "ClosedRangeNumericQuantifier",
            Node::CharacterClass(_) => "CharacterClass",
            Node::NegatedCharacterClass(_) => "NegatedCharacterClass",
            Node::CharacterClassRange(_) => "CharacterClassRange",
            Node::CharacterClassSubtraction(_) => "CharacterClassSubtraction",
            Node::PosixProperty(_) => "PosixProperty",
            Node::SimpleGrouping(_) => "SimpleGrouping",
            Node::SimpleOptionsGrouping(_) => "SimpleOptionsGrouping",
            Node::NestedOptionsGrouping(_) => "NestedOptionsGrouping",
            Node::NonCapturingGrouping(_) => "NonCapturingGrouping",
            Node::PositiveLookaheadGrouping(_) => "PositiveLookaheadGrouping",
            Node::NegativeLookaheadGrouping(_) => "NegativeLookaheadGrouping",
            Node::PositiveLookbehindGrouping(_) => "PositiveLookbehindGrouping",
            Node::NegativeLookbehindGrouping(_) => "NegativeLookbehindGrouping",
            Node::NonBacktrackingGrouping(_) => "NonBacktrackingGrouping",
            Node::CaptureGrouping(_) => "CaptureGrouping",
            Node::BalancingGrouping(_) => "BalancingGrouping",
            Node::ConditionalCaptureGrouping(_) => "ConditionalCaptureGrouping",
            Node::ConditionalExpressionGrouping(_) => "ConditionalExpressionGrouping",
            Node::SimpleEscape(_) => "SimpleEscape",
            Node::AnchorEscape(_) => "AnchorEscape",
            Node::CharacterClassEscape(_) => "CharacterClassEscape",
            Node::ControlEscape(_) => "ControlEscape",
            Node::HexEscape(_) => "HexEscape",
            Node::UnicodeEscape(_) => "UnicodeEscape",
            Node::OctalEscape(_) => "OctalEscape",
            Node::CaptureEscape(_) => "CaptureEscape",
            Node::KCaptureEscape(_) => "KCaptureEscape",
            Node::BackreferenceEscape(_) => "BackreferenceEscape",
            Node::CategoryEscape(_) => "CategoryEscape",
        }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeOrToken<'_>> {
        use NodeOrToken::{Node as N, Token as T};

        match self {
            Node::Sequence(n) => n.children.iter().map(N).collect(),
            Node::Alternation(n) => vec![N(&n.left), T(&n.bar), N(&n.right)],
            Node::Text(n) => vec![T(&n.text)],
            Node::Wildcard(n) => vec![T(&n.dot)],
            Node::StartAnchor(n) | Node::EndAnchor(n) => vec![T(&n.anchor)],
            Node::ZeroOrMoreQuantifier(n) => vec![N(&n.expression), T(&n.asterisk)],
            Node::OneOrMoreQuantifier(n) => vec![N(&n.expression), T(&n.plus)],
            Node::ZeroOrOneQuantifier(n) => vec![N(&n.expression), T(&n.question)],
            Node::LazyQuantifier(n) => vec![N(&n.quantifier), T(&n.question)],
            Node::ExactNumericQuantifier(n) => vec![
                N(&n.expression),
                T(&n.open_brace),
                T(&n.first_number),
                T(&n.close_brace),
            ],
            Node::OpenRangeNumericQuantifier(n) => vec![
                N(&n.expression),
                T(&n.open_brace),
                T(&n.first_number),
                T(&n.comma),
                T(&n.close_brace),
            ],
            Node::ClosedRangeNumericQuantifier(n) => vec![
                N(&n.expression),
                T(&n.open_brace),
                T(&n.first_number),
                T(&n.comma),
                T(&n.second_number),
                T(&n.close_brace),
            ],
            Node::CharacterClass(n) => {
                vec![T(&n.open_bracket), N(&n.components), T(&n.close_bracket)]
            }
            Node::NegatedCharacterClass(n) => vec![
                T(&n.open_bracket),
                T(&n.caret),
                N(&n.components),
                T(&n.close_bracket),
            ],
            Node::CharacterClassRange(n) => vec![N(&n.left), T(&n.minus), N(&n.right)],
            Node::CharacterClassSubtraction(n) => vec![T(&n.minus), N(&n.class)],
            Node::PosixProperty(n) => vec![T(&n.text)],
            Node::SimpleGrouping(n) => {
                vec![T(&n.open_paren), N(&n.expression), T(&n.close_paren)]
            }
            Node::SimpleOptionsGrouping(n) => vec![
                T(&n.open_paren),
                T(&n.question),
                T(&n.options),
                T(&n.close_paren),
            ],
            Node::NestedOptionsGrouping(n) => vec![
                T(&n.open_paren),
                T(&n.question),
                T(&n.options),
                T(&n.colon),
                N(&n.expression),
                T(&n.close_paren),
            ],
            Node::NonCapturingGrouping(n)
            | Node::PositiveLookaheadGrouping(n)
            | Node::NegativeLookaheadGrouping(n)
            | Node::NonBacktrackingGrouping(n) => vec![
                T(&n.open_paren),
                T(&n.question),
                T(&n.marker),
                N(&n.expression),
                T(&n.close_paren),
            ],
            Node::PositiveLookbehindGrouping(n) | Node::NegativeLookbehindGrouping(n) => vec![
                T(&n.open_paren),
                T(&n.question),
                T(&n.less_than),
                T(&n.marker),
                N(&n.expression),
                T(&n.close_paren),
            ],
            Node::CaptureGrouping(n) => vec![
                T(&n.open_paren),
                T(&n.question),
                T(&n.open),
                T(&n.capture),
                T(&n.close),
                N(&n.expression),
                T(&n.close_paren),
            ],
            Node::BalancingGrouping(n) => vec![
                T(&n.open_paren),
                T(&n.question),
                T(&n.open),
                T(&n.first_capture),
                T(&n.minus),
                T(&n.second_capture),
                T(&n.close),
                N(&n.expression),
                T(&n.close_paren),
            ],
            Node::ConditionalCaptureGrouping(n) => vec![
                T(&n.open_paren),
                T(&n.question),
                T(&n.inner_open_paren),
                T(&n.capture),
                T(&n.inner_close_paren),
                N(&n.result),
                T(&n.close_paren),
            ],
            Node::ConditionalExpressionGrouping(n) => vec![
                T(&n.open_paren),
                T(&n.question),
                N(&n.grouping),
                N(&n.result),
                T(&n.close_paren),
            ],
            Node::SimpleEscape(n) | Node::AnchorEscape(n) | Node::CharacterClassEscape(n) => {
                vec![T(&n.backslash), T(&n.type_token)]
            }
            Node::ControlEscape(n) => vec![T(&n.backslash), T(&n.type_token), T(&n.control)],
            Node::HexEscape(n) | Node::UnicodeEscape(n) => {
                vec![T(&n.backslash), T(&n.type_token), T(&n.hex_text)]
            }
            Node::OctalEscape(n) => vec![T(&n.backslash), T(&n.octal_text)],
            Node::CaptureEscape(n) => vec![
                T(&n.backslash),
                T(&n.open),
                T(&n.capture),
                T(&n.close),
            ],
            Node::KCaptureEscape(n) => vec![
                T(&n.backslash),
                T(&n.type_token),
                T(&n.open),
                T(&n.capture),
                T(&n.close),
            ],
            Node::BackreferenceEscape(n) => vec![T(&n.backslash), T(&n.number)],
            Node::CategoryEscape(n) => vec![
                T(&n.backslash),
                T(&n.type_token),
                T(&n.open_brace),
                T(&n.category),
                T(&n.close_brace),
            ],
        }
    }

    pub fn is_quantifier(&self) -> bool {
        matches!(
            self,
            Node::ZeroOrMoreQuantifier(_)
                | Node::OneOrMoreQuantifier(_)
                | Node::ZeroOrOneQuantifier(_)
                | Node::ExactNumericQuantifier(_)
                | Node::OpenRangeNumericQuantifier(_)
                | Node::ClosedRangeNumericQuantifier(_)
        )
    }

    /// `\-` inside a character class
    pub fn is_escaped_minus(&self) -> bool {
        match self {
            Node::SimpleEscape(escape) => {
                escape.type_token.kind == crate::rex::token::TokenKind::Text
                    && escape.type_token.is_char('-')
            }
            _ => false,
        }
    }
}

impl CompilationUnit {
    pub fn children(&self) -> Vec<NodeOrToken<'_>> {
        vec![
            NodeOrToken::Node(&self.expression),
            NodeOrToken::Token(&self.end_of_file),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rex::token::TokenKind;
    use crate::rex::virtual_chars::VirtualCharSequence;

    fn token(kind: TokenKind, text: &VirtualCharSequence, at: usize) -> Token {
        Token::new(kind, Vec::new(), text.sub_sequence(at..at + 1))
    }

    #[test]
    fn children_follow_source_order() {
        let text = VirtualCharSequence::from_text("a*", 0);
        let node = Node::ZeroOrMoreQuantifier(Box::new(ZeroOrMoreQuantifierNode {
            expression: Node::text(token(TokenKind::Text, &text, 0)),
            asterisk: token(TokenKind::Asterisk, &text, 1),
        }));

        let children = node.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].as_node().map(Node::name), Some("Text"));
        assert_eq!(
            children[1].as_token().map(|t| t.kind),
            Some(TokenKind::Asterisk)
        );
        assert!(node.is_quantifier());
    }

    #[test]
    fn escaped_minus() {
        let text = VirtualCharSequence::from_text(r"\-\d", 0);
        let minus = Node::simple_escape(
            token(TokenKind::Backslash, &text, 0),
            token(TokenKind::Minus, &text, 1).with_kind(TokenKind::Text),
        );
        let class = Node::CharacterClassEscape(Box::new(EscapeNode {
            backslash: token(TokenKind::Backslash, &text, 2),
            type_token: token(TokenKind::Text, &text, 3),
        }));
        assert!(minus.is_escaped_minus());
        assert!(!class.is_escaped_minus());
    }
}
