//! Names accepted inside `\p{...}` and `\P{...}`
//!
//! Matching is exact and case-sensitive, as in the reference engine: `\p{Lu}` is valid,
//! `\p{lu}` is an unknown property.

use once_cell::sync::Lazy;
use std::collections::HashSet;

const GENERAL_CATEGORIES: &[&str] = &[
    "Cc", "Cf", "Cn", "Co", "Cs", "C", //
    "Ll", "Lm", "Lo", "Lt", "Lu", "L", //
    "Mc", "Me", "Mn", "M", //
    "Nd", "Nl", "No", "N", //
    "Pc", "Pd", "Pe", "Po", "Ps", "Pf", "Pi", "P", //
    "Sc", "Sk", "Sm", "So", "S", //
    "Zl", "Zp", "Zs", "Z",
];

const BLOCKS: &[&str] = &[
    "IsAlphabeticPresentationForms",
    "IsArabic",
    "IsArabicPresentationForms-A",
    "IsArabicPresentationForms-B",
    "IsArmenian",
    "IsArrows",
    "IsBasicLatin",
    "IsBengali",
    "IsBlockElements",
    "IsBopomofo",
    "IsBopomofoExtended",
    "IsBoxDrawing",
    "IsBraillePatterns",
    "IsBuhid",
    "IsCJKCompatibility",
    "IsCJKCompatibilityForms",
    "IsCJKCompatibilityIdeographs",
    "IsCJKRadicalsSupplement",
    "IsCJKSymbolsandPunctuation",
    "IsCJKUnifiedIdeographs",
    "IsCJKUnifiedIdeographsExtensionA",
    "IsCherokee",
    "IsCombiningDiacriticalMarks",
    "IsCombiningDiacriticalMarksforSymbols",
    "IsCombiningHalfMarks",
    "IsCombiningMarksforSymbols",
    "IsControlPictures",
    "IsCurrencySymbols",
    "IsCyrillic",
    "IsCyrillicSupplement",
    "IsDevanagari",
    "IsDingbats",
    "IsEnclosedAlphanumerics",
    "IsEnclosedCJKLettersandMonths",
    "IsEthiopic",
    "IsGeneralPunctuation",
    "IsGeometricShapes",
    "IsGeorgian",
    "IsGreek",
    "IsGreekExtended",
    "IsGreekandCoptic",
    "IsGujarati",
    "IsGurmukhi",
    "IsHalfwidthandFullwidthForms",
    "IsHangulCompatibilityJamo",
    "IsHangulJamo",
    "IsHangulSyllables",
    "IsHanunoo",
    "IsHebrew",
    "IsHighPrivateUseSurrogates",
    "IsHighSurrogates",
    "IsHiragana",
    "IsIPAExtensions",
    "IsIdeographicDescriptionCharacters",
    "IsKanbun",
    "IsKangxiRadicals",
    "IsKannada",
    "IsKatakana",
    "IsKatakanaPhoneticExtensions",
    "IsKhmer",
    "IsKhmerSymbols",
    "IsLao",
    "IsLatin-1Supplement",
    "IsLatinExtended-A",
    "IsLatinExtended-B",
    "IsLatinExtendedAdditional",
    "IsLetterlikeSymbols",
    "IsLimbu",
    "IsLowSurrogates",
    "IsMalayalam",
    "IsMathematicalOperators",
    "IsMiscellaneousMathematicalSymbols-A",
    "IsMiscellaneousMathematicalSymbols-B",
    "IsMiscellaneousSymbols",
    "IsMiscellaneousSymbolsandArrows",
    "IsMiscellaneousTechnical",
    "IsMongolian",
    "IsMyanmar",
    "IsNumberForms",
    "IsOgham",
    "IsOpticalCharacterRecognition",
    "IsOriya",
    "IsPhoneticExtensions",
    "IsPrivateUse",
    "IsPrivateUseArea",
    "IsRunic",
    "IsSinhala",
    "IsSmallFormVariants",
    "IsSpacingModifierLetters",
    "IsSpecials",
    "IsSuperscriptsandSubscripts",
    "IsSupplementalArrows-A",
    "IsSupplementalArrows-B",
    "IsSupplementalMathematicalOperators",
    "IsSyriac",
    "IsTagalog",
    "IsTagbanwa",
    "IsTaiLe",
    "IsTamil",
    "IsTelugu",
    "IsThaana",
    "IsThai",
    "IsTibetan",
    "IsUnifiedCanadianAboriginalSyllabics",
    "IsVariationSelectors",
    "IsYiRadicals",
    "IsYiSyllables",
    "IsYijingHexagramSymbols",
];

const INTERNAL_CLASSES: &[&str] = &["_xmlC", "_xmlD", "_xmlI", "_xmlW"];

static ESCAPE_CATEGORIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    GENERAL_CATEGORIES
        .iter()
        .chain(BLOCKS)
        .chain(INTERNAL_CLASSES)
        .copied()
        .collect()
});

pub fn is_escape_category(name: &str) -> bool {
    ESCAPE_CATEGORIES.contains(name)
}

/// Every accepted name, general categories first
pub fn all() -> impl Iterator<Item = &'static str> {
    GENERAL_CATEGORIES
        .iter()
        .chain(BLOCKS)
        .chain(INTERNAL_CLASSES)
        .copied()
}
