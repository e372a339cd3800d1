//! String normalization utilities
//!
//! Descriptors and catalog entries go through the same normalization
//! before any comparison: lower-case, trimmed, and optionally
//! width-folded for OCR output that mixes full-width and ASCII forms.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Normalization mode for descriptor and catalog text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Lower-case and trim
    #[default]
    Standard,
    /// NFKC compatibility folding (`ＣＨＭ２` -> `CHM2`), then lower-case and trim
    FoldWidth,
}

/// Characters that separate words besides whitespace.
const WORD_SEPARATORS: &[char] = &[
    ',', ';', '/', '|', '(', ')', '[', ']', '{', '}', '"', '\'', '，', '、', '；', '（', '）',
    '【', '】', '“', '”', '「', '」', '《', '》',
];

/// Normalize a string according to the specified mode
#[must_use]
pub fn normalize_text(s: &str, mode: NormalizationMode) -> String {
    match mode {
        NormalizationMode::Standard => s.trim().to_lowercase(),
        NormalizationMode::FoldWidth => s.nfkc().collect::<String>().trim().to_lowercase(),
    }
}

/// Join normalized name and specifications with a single space,
/// leaving out whichever part is blank.
#[must_use]
pub fn combine(name: &str, specifications: &str) -> String {
    match (name.is_empty(), specifications.is_empty()) {
        (false, false) => format!("{name} {specifications}"),
        (false, true) => name.to_string(),
        (true, false) => specifications.to_string(),
        (true, true) => String::new(),
    }
}

/// Remove hyphens and whitespace, used to compare model numbers
/// written as `CHM2-2ZE` vs `CHM2 2ZE` vs `CHM22ZE`.
#[must_use]
pub fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

/// Split normalized text into words.
pub fn split_words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c.is_whitespace() || WORD_SEPARATORS.contains(&c))
        .filter(|w| !w.is_empty())
}

/// Length in Unicode scalar values.
#[inline]
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard() {
        assert_eq!(
            normalize_text("  iPhone 14 Pro  ", NormalizationMode::Standard),
            "iphone 14 pro"
        );
    }

    #[test]
    fn test_fold_width() {
        assert_eq!(
            normalize_text("ＣＨＭ２－２ＺＥ", NormalizationMode::FoldWidth),
            "chm2-2ze"
        );
        // Standard leaves full-width forms alone
        assert_ne!(
            normalize_text("ＣＨＭ２", NormalizationMode::Standard),
            "chm2"
        );
    }

    #[test]
    fn test_combine() {
        assert_eq!(combine("iphone 14", "128gb"), "iphone 14 128gb");
        assert_eq!(combine("iphone 14", ""), "iphone 14");
        assert_eq!(combine("", "128gb"), "128gb");
        assert_eq!(combine("", ""), "");
    }

    #[test]
    fn test_strip_separators() {
        assert_eq!(strip_separators("CHM2-2 ZE"), "CHM22ZE");
    }

    #[test]
    fn test_split_words() {
        let words: Vec<&str> = split_words("智能 控制器(chm2-2ze)，白色").collect();
        assert_eq!(words, vec!["智能", "控制器", "chm2-2ze", "白色"]);
    }
}
