//! skumatch - product identity resolution against an inventory catalog
//!
//! Takes a loosely written product descriptor (a name plus an optional
//! specification line, often from OCR or manual entry) and finds the
//! catalog entry it most likely refers to.
//!
//! # Features
//! - Model number extraction (`CHM2-2ZE`, `iPhone 14`, `小米13`)
//! - Five ordered scoring strategies with a confidence score per match
//! - Inverted token index for candidate pruning on large catalogs
//! - Versioned LRU result cache, safe to share across threads
//! - Catalog duplicate detection and resolution quality metrics
//!
//! ```
//! use skumatch::{CatalogEntry, CatalogMatcher, Descriptor};
//!
//! let catalog = vec![
//!     CatalogEntry::new("1", "智能控制器CHM2-2ZE"),
//!     CatalogEntry::new("2", "另一个产品"),
//! ];
//! let matcher = CatalogMatcher::new();
//! let result = matcher.resolve(&Descriptor::new("CHM2-2ZE控制器", ""), &catalog);
//! assert_eq!(result.map(|r| r.entry_id).as_deref(), Some("1"));
//! ```

pub mod algorithms;
pub mod catalog;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod indexing;
pub mod matcher;
pub mod metrics;
pub mod scoring;

pub use algorithms::{EditDistance, NormalizationMode, Similarity};
pub use catalog::{CatalogEntry, Descriptor, NormalizedText};
pub use config::{MatcherConfig, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_INDEX_TOKENS, DEFAULT_THRESHOLD};
pub use dedup::{find_duplicate_entries, DedupMethod, DuplicateReport};
pub use error::{MatcherError, Result};
pub use extract::{extract_models, find_matching_model};
pub use indexing::CatalogIndex;
pub use matcher::{CacheStats, CatalogMatcher};
pub use metrics::{ConfusionMatrix, ResolutionOutcome};
pub use scoring::{find_best_match, MatchResult, MatchType, Scorer, StrategyScore};
