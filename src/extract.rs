//! Model number extraction
//!
//! Pulls structured product codes (`CHM2-2ZE`, `iPhone 14`, `小米13`) out
//! of free text with an ordered pattern library. Patterns run from most to
//! least specific; once a span of text has been claimed by a pattern, later
//! patterns cannot match inside it, so `CHM2-2ZE` yields one model rather
//! than `CHM2-2ZE`, `CHM2-2`, `CHM2` and `2-2`.
//!
//! Claiming also shadows some later patterns. Anything the trailing
//! letter-plus-digits pattern could match (`K1000F`) is taken first, with
//! the same text, by the letters/digits patterns. A CJK brand followed by a
//! letter-led code (`华为P60`) yields only the code (`P60`), so the CJK
//! brand pattern only ever contributes digit suffixes (`荣耀90`).

use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use crate::algorithms::{char_len, strip_separators};

/// Pattern library in priority order.
static MODEL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // letters+digits-digits+letters: CHM2-2ZE
        r"[A-Za-z]+[0-9]+-[0-9]+[A-Za-z]+",
        // letters+digits-digits: RT5-100
        r"[A-Za-z]+[0-9]+-[0-9]+",
        // letters-digits+letters: SM-900X
        r"[A-Za-z]+-[0-9]+[A-Za-z]+",
        // letters-digits: GT-100
        r"[A-Za-z]+-[0-9]+",
        // letters+digits+letters: A52S
        r"[A-Za-z]+[0-9]+[A-Za-z]+",
        // letters+digits: X100
        r"[A-Za-z]+[0-9]+",
        // digits-digits: 3020-12
        r"[0-9]+-[0-9]+",
        // brand + series number: iPhone 14
        r"(?i)(?:iphone|ipad|ipod|macbook|airpods|galaxy|pixel|xperia|redmi|xiaomi|huawei|mate|nova|honor|oppo|vivo|oneplus|realme|thinkpad|surface|kindle)\s*[0-9]+",
        // CJK brand + suffix: 小米13
        r"(?:华为|小米|苹果|三星|联想|荣耀|魅族|海尔|美的|格力|索尼|戴尔|惠普|佳能|尼康|飞利浦|松下|西门子|罗技|大疆)\s*[A-Za-z0-9]+",
        // letter + 3-4 digits + optional letters: K1000F
        r"[A-Za-z][0-9]{3,4}[A-Za-z]*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("model pattern must compile"))
    .collect()
});

/// Bracketed or quoted content: `(X100)`, `[X100]`, `（X100）`, `"X100"`.
static ENCLOSED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\(([^()]*)\)",
        r"\[([^\[\]]*)\]",
        r"（([^（）]*)）",
        r"【([^【】]*)】",
        r#""([^"]*)""#,
        r"'([^']*)'",
        r"“([^“”]*)”",
        r"「([^「」]*)」",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("enclosure pattern must compile"))
    .collect()
});

/// What enclosed content must look like to count as a model.
static ENCLOSED_MODEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9-]{3,15}$").expect("enclosed model pattern must compile"));

/// Minimum length of a separator-stripped model for loose equality.
const MIN_STRIPPED_LEN: usize = 3;

/// Minimum length of both models for containment matching.
const MIN_CONTAINMENT_LEN: usize = 4;

fn overlaps(claimed: &[Range<usize>], span: &Range<usize>) -> bool {
    claimed
        .iter()
        .any(|c| c.start < span.end && span.start < c.end)
}

/// Extract model-like substrings, upper-cased, unique, in first-seen order.
///
/// ```
/// use skumatch::extract_models;
///
/// assert_eq!(extract_models("CHM2-2ZE控制器"), vec!["CHM2-2ZE"]);
/// assert_eq!(extract_models("iPhone 14 Pro"), vec!["IPHONE 14"]);
/// assert!(extract_models("普通产品").is_empty());
/// ```
#[must_use]
pub fn extract_models(text: &str) -> Vec<String> {
    let mut models = Vec::new();
    let mut seen = AHashSet::new();
    let mut claimed: Vec<Range<usize>> = Vec::new();

    for pattern in MODEL_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let span = m.range();
            if overlaps(&claimed, &span) {
                continue;
            }
            claimed.push(span);
            let model = m.as_str().to_uppercase();
            if seen.insert(model.clone()) {
                models.push(model);
            }
        }
    }

    for pattern in ENCLOSED_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(inner) = caps.get(1) else { continue };
            let candidate = inner.as_str().trim().to_uppercase();
            if ENCLOSED_MODEL.is_match(&candidate) && seen.insert(candidate.clone()) {
                models.push(candidate);
            }
        }
    }

    models
}

/// Find a model number shared by two texts.
///
/// Rules are tried in order across all model pairs before falling back to
/// the next rule: exact equality, equality ignoring hyphens and spaces
/// (at least 3 chars left), then containment (both at least 4 chars).
/// The returned model is the one extracted from `a`.
///
/// ```
/// use skumatch::find_matching_model;
///
/// assert_eq!(
///     find_matching_model("智能控制器CHM2-2ZE", "CHM2-2ZE控制器说明").as_deref(),
///     Some("CHM2-2ZE")
/// );
/// assert_eq!(find_matching_model("CHM2-3ZE", "CHM2-2ZE"), None);
/// ```
#[must_use]
pub fn find_matching_model(a: &str, b: &str) -> Option<String> {
    let models_a = extract_models(a);
    if models_a.is_empty() {
        return None;
    }
    let models_b = extract_models(b);
    if models_b.is_empty() {
        return None;
    }

    let pairs = || {
        models_a
            .iter()
            .flat_map(|ma| models_b.iter().map(move |mb| (ma, mb)))
    };

    // Both sides are already upper-cased, so plain equality is case-insensitive
    if let Some((ma, _)) = pairs().find(|(ma, mb)| ma == mb) {
        return Some(ma.clone());
    }

    if let Some((ma, _)) = pairs().find(|(ma, mb)| {
        let stripped = strip_separators(ma);
        char_len(&stripped) >= MIN_STRIPPED_LEN && stripped == strip_separators(mb)
    }) {
        return Some(ma.clone());
    }

    pairs()
        .find(|(ma, mb)| {
            char_len(ma) >= MIN_CONTAINMENT_LEN
                && char_len(mb) >= MIN_CONTAINMENT_LEN
                && (ma.contains(mb.as_str()) || mb.contains(ma.as_str()))
        })
        .map(|(ma, _)| ma.clone())
}
