//! Catalog data model as seen by the matcher.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::algorithms::{combine, normalize_text, NormalizationMode};

/// One inventory item. Only the fields that matter to matching are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique, stable identifier
    pub id: String,
    pub name: String,
    /// Free-form specification line, may be empty
    #[serde(default)]
    pub specifications: String,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specifications: String::new(),
            barcode: None,
        }
    }

    #[must_use]
    pub fn with_specifications(mut self, specifications: impl Into<String>) -> Self {
        self.specifications = specifications.into();
        self
    }

    #[must_use]
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    /// An entry with neither name nor specifications can never match.
    pub fn is_matchable(&self) -> bool {
        !self.name.trim().is_empty() || !self.specifications.trim().is_empty()
    }

    /// The descriptor this entry would produce if it were the query.
    pub fn descriptor(&self) -> Descriptor {
        Descriptor::new(self.name.clone(), self.specifications.clone())
    }
}

/// The query side: a name plus optional specifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    #[serde(default)]
    pub specifications: String,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, specifications: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specifications: specifications.into(),
        }
    }

    pub fn normalized(&self, mode: NormalizationMode) -> NormalizedText {
        NormalizedText::new(&self.name, &self.specifications, mode)
    }
}

/// Normalized name, specifications and their combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub name: String,
    pub specifications: String,
    pub combined: String,
}

impl NormalizedText {
    pub fn new(name: &str, specifications: &str, mode: NormalizationMode) -> Self {
        let name = normalize_text(name, mode);
        let specifications = normalize_text(specifications, mode);
        let combined = combine(&name, &specifications);
        Self {
            name,
            specifications,
            combined,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.combined.is_empty()
    }
}

/// Order-sensitive content hash of a catalog snapshot.
///
/// Two snapshots with the same entries in the same order hash equal;
/// any edit, insertion, removal or reordering changes the hash.
pub fn structural_hash(catalog: &[CatalogEntry]) -> u64 {
    let mut hasher = ahash::AHasher::default();
    catalog.len().hash(&mut hasher);
    for entry in catalog {
        entry.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("1", "智能控制器CHM2-2ZE"),
            CatalogEntry::new("2", "iPhone 14")
                .with_specifications("128GB")
                .with_barcode("6901234567890"),
        ]
    }

    #[test]
    fn test_structural_hash_stable() {
        assert_eq!(structural_hash(&sample()), structural_hash(&sample()));
    }

    #[test]
    fn test_structural_hash_detects_changes() {
        let base = structural_hash(&sample());

        let mut edited = sample();
        edited[1].specifications = "256GB".into();
        assert_ne!(structural_hash(&edited), base);

        let mut reordered = sample();
        reordered.reverse();
        assert_ne!(structural_hash(&reordered), base);

        let mut grown = sample();
        grown.push(CatalogEntry::new("3", "数据线"));
        assert_ne!(structural_hash(&grown), base);
    }

    #[test]
    fn test_is_matchable() {
        assert!(CatalogEntry::new("1", "x").is_matchable());
        assert!(CatalogEntry::new("1", " ").with_specifications("5v").is_matchable());
        assert!(!CatalogEntry::new("1", "  ").with_barcode("123").is_matchable());
    }

    #[test]
    fn test_normalized_text() {
        let text = Descriptor::new(" iPhone 14 ", "  ").normalized(NormalizationMode::Standard);
        assert_eq!(text.name, "iphone 14");
        assert_eq!(text.specifications, "");
        assert_eq!(text.combined, "iphone 14");
        assert!(Descriptor::new(" ", "\t").normalized(NormalizationMode::Standard).is_blank());
    }

    #[test]
    fn test_entry_deserializes_with_missing_optionals() {
        let entry: CatalogEntry = serde_json::from_str(r#"{"id":"9","name":"USB线"}"#).unwrap();
        assert_eq!(entry.specifications, "");
        assert_eq!(entry.barcode, None);
    }
}
