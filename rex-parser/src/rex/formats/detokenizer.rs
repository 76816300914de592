//! Detokenizer: rebuild the pattern text from a tree
//!
//! Unlike the other formatters this works at the token level. Every char of the pattern is
//! held by exactly one token or trivia, so concatenating trivia and token text in tree order
//! reproduces the pattern.

use crate::rex::ast::{walk, CompilationUnit, Visitor};
use crate::rex::token::{Token, Trivia};

#[derive(Default)]
struct Detokenizer {
    output: String,
}

impl Visitor for Detokenizer {
    fn visit_token(&mut self, token: &Token) {
        self.output.push_str(&token.chars.to_string());
    }

    fn visit_trivia(&mut self, trivia: &Trivia) {
        self.output.push_str(&trivia.chars.to_string());
    }
}

pub fn detokenize(root: &CompilationUnit) -> String {
    let mut detokenizer = Detokenizer::default();
    walk(&mut detokenizer, root);
    detokenizer.output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rex::parsing::parse_str;
    use crate::rex::RegexOptions;
    use rstest::rstest;

    #[rstest]
    #[case("abc")]
    #[case(r"(?<n>a|b)\k<n>[^a-z-[q]]{2,}?")]
    #[case("(?x: a # note\n b )")]
    #[case("((")]
    #[case(r"\p{L")]
    #[case("(?(a)b|c|d)")]
    fn test_detokenize_reproduces_pattern(#[case] pattern: &str) {
        let tree = parse_str(pattern, RegexOptions::empty()).unwrap();
        assert_eq!(detokenize(tree.root()), pattern);
    }
}
