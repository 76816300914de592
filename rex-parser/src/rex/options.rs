//! Dialect option flags
//!
//! Options reach the parser from the caller and change inside a pattern through `(?imnsx-imnsx)`
//! and `(?imnsx-imnsx:...)` groups. The parser never keeps a stack of them: it copies the
//! current set into a local before descending into a group and puts it back on return.

use bitflags::bitflags;
use std::str::FromStr;
use thiserror::Error;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RegexOptions: u16 {
        /// `i`: case-insensitive matching
        const IGNORE_CASE = 0b0000_0001;
        /// `m`: `^` and `$` match at line boundaries
        const MULTILINE = 0b0000_0010;
        /// `n`: only named or numbered groups capture
        const EXPLICIT_CAPTURE = 0b0000_0100;
        /// `s`: `.` matches `\n`
        const SINGLELINE = 0b0000_1000;
        /// `x`: unescaped whitespace is ignored and `#` starts a line comment
        const IGNORE_PATTERN_WHITESPACE = 0b0001_0000;
        /// Matching runs from right to left; set implicitly inside lookbehinds
        const RIGHT_TO_LEFT = 0b0010_0000;
        /// ECMAScript-compatible backreference and octal rules
        const ECMASCRIPT = 0b0100_0000;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown regex option '{0}'")]
pub struct UnknownOption(pub String);

impl RegexOptions {
    /// The flag an inline option letter toggles; case-insensitive
    pub fn from_letter(letter: char) -> Option<RegexOptions> {
        match letter.to_ascii_lowercase() {
            'i' => Some(RegexOptions::IGNORE_CASE),
            'm' => Some(RegexOptions::MULTILINE),
            'n' => Some(RegexOptions::EXPLICIT_CAPTURE),
            's' => Some(RegexOptions::SINGLELINE),
            'x' => Some(RegexOptions::IGNORE_PATTERN_WHITESPACE),
            _ => None,
        }
    }

    /// Apply an inline option run such as `i-sx` on top of `self`
    ///
    /// `+` switches following letters on, `-` switches them off; letters start out switching on.
    pub fn apply_inline<I: IntoIterator<Item = char>>(self, letters: I) -> RegexOptions {
        let mut options = self;
        let mut on = true;
        for letter in letters {
            match letter {
                '+' => on = true,
                '-' => on = false,
                _ => {
                    if let Some(flag) = RegexOptions::from_letter(letter) {
                        options.set(flag, on);
                    }
                }
            }
        }
        options
    }

    /// Parse a comma- or whitespace-separated list of option names or letters
    ///
    /// Accepts `ignore-case`, `multiline`, `explicit-capture`, `singleline`,
    /// `ignore-pattern-whitespace`, `right-to-left`, `ecmascript` (also `ecma`), and the inline
    /// letters `i m n s x`.
    pub fn parse_list(list: &str) -> Result<RegexOptions, UnknownOption> {
        list.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|name| !name.is_empty())
            .try_fold(RegexOptions::empty(), |options, name| {
                Ok(options | name.parse::<RegexOptions>()?)
            })
    }
}

impl FromStr for RegexOptions {
    type Err = UnknownOption;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let flag = match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "i" | "ignore-case" => RegexOptions::IGNORE_CASE,
            "m" | "multiline" => RegexOptions::MULTILINE,
            "n" | "explicit-capture" => RegexOptions::EXPLICIT_CAPTURE,
            "s" | "singleline" => RegexOptions::SINGLELINE,
            "x" | "ignore-pattern-whitespace" => RegexOptions::IGNORE_PATTERN_WHITESPACE,
            "right-to-left" | "rtl" => RegexOptions::RIGHT_TO_LEFT,
            "ecmascript" | "ecma" => RegexOptions::ECMASCRIPT,
            "" | "none" => RegexOptions::empty(),
            _ => return Err(UnknownOption(name.to_string())),
        };
        Ok(flag)
    }
}
