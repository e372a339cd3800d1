//! Indexed, cached catalog matching shared across threads.
//!
//! `CatalogMatcher` owns one index generation and one result cache at a
//! time, both derived from the same catalog snapshot. Callers pass the
//! current catalog on every lookup; the matcher hashes it and rebuilds
//! only when the content changed.
//!
//! # Concurrency
//!
//! - The index is replaced copy-on-write: a rebuild constructs the new
//!   generation off to the side and swaps the `Arc` under a brief write
//!   lock, so readers never see a partially built index.
//! - Rebuilds are serialized; a second thread arriving with the same
//!   catalog finds it already indexed.
//! - The LRU cache sits behind a mutex since every read reorders it.
//!   The swap and the cache reset happen while the cache lock is held, so
//!   no lookup observes a new index next to old cached results.
//!
//! ```
//! use skumatch::{CatalogEntry, CatalogMatcher, MatchType};
//!
//! let matcher = CatalogMatcher::new();
//! let catalog = vec![CatalogEntry::new("4", "iPhone 14").with_specifications("128GB")];
//!
//! let result = matcher
//!     .find_best_match_with_cache("iPhone 14 Pro", "", &catalog, 0.5)
//!     .unwrap();
//! assert_eq!(result.entry_id, "4");
//! assert_eq!(result.match_type, MatchType::ModelMatch);
//! ```

use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;

use crate::catalog::{structural_hash, CatalogEntry, Descriptor};
use crate::config::MatcherConfig;
use crate::dedup::{find_duplicate_entries, DedupMethod, DuplicateReport};
use crate::error::Result;
use crate::indexing::{CacheKey, CatalogIndex, ResultCache};
use crate::scoring::{MatchResult, Scorer};

/// Point-in-time view of the matcher's index and cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub cache_size: usize,
    pub cache_capacity: usize,
    pub token_count: usize,
    pub catalog_size: usize,
    /// Incremented on every rebuild and reset
    pub version: u64,
    pub hits: u64,
    pub misses: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cache: {}/{}, index tokens: {}, catalog size: {}, version: {}, hits: {}, misses: {}",
            self.cache_size,
            self.cache_capacity,
            self.token_count,
            self.catalog_size,
            self.version,
            self.hits,
            self.misses
        )
    }
}

struct Shared {
    config: MatcherConfig,
    scorer: Scorer,
    index: RwLock<Arc<CatalogIndex>>,
    cache: Mutex<ResultCache>,
    rebuild: Mutex<()>,
}

/// Thread-safe catalog matcher. Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct CatalogMatcher {
    inner: Arc<Shared>,
}

impl CatalogMatcher {
    /// Create a matcher with the default configuration.
    pub fn new() -> Self {
        Self::from_config(MatcherConfig::default())
    }

    /// Create a matcher with a validated configuration.
    pub fn with_config(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: MatcherConfig) -> Self {
        Self {
            inner: Arc::new(Shared {
                scorer: Scorer::new(config.normalization),
                index: RwLock::new(Arc::new(CatalogIndex::empty(0))),
                cache: Mutex::new(ResultCache::new(config.cache_capacity)),
                rebuild: Mutex::new(()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.inner.config
    }

    /// Current index generation.
    ///
    /// Acquires a shared read lock.
    pub fn snapshot(&self) -> Arc<CatalogIndex> {
        self.inner.index.read().clone()
    }

    /// Make sure the index reflects `catalog`. Returns true if it was rebuilt.
    ///
    /// Idempotent and cheap for an unchanged catalog (one hash pass).
    pub fn build_index(&self, catalog: &[CatalogEntry]) -> bool {
        let before = self.snapshot().version();
        self.ensure_index(catalog).version() != before
    }

    /// Index generation for `catalog`, rebuilding if its hash changed.
    fn ensure_index(&self, catalog: &[CatalogEntry]) -> Arc<CatalogIndex> {
        let hash = structural_hash(catalog);

        let current = self.snapshot();
        if current.is_built() && current.catalog_hash() == hash {
            return current;
        }

        let _guard = self.inner.rebuild.lock();

        // Another thread may have indexed this catalog while we waited
        let current = self.snapshot();
        if current.is_built() && current.catalog_hash() == hash {
            return current;
        }

        let version = current.version() + 1;
        let index = Arc::new(CatalogIndex::build(
            catalog,
            hash,
            version,
            self.inner.config.normalization,
            self.inner.config.max_index_tokens,
        ));

        tracing::debug!(
            version,
            entries = index.len(),
            tokens = index.token_count(),
            dropped_tokens = index.dropped_tokens(),
            "rebuilt catalog index"
        );

        let mut cache = self.inner.cache.lock();
        *self.inner.index.write() = Arc::clone(&index);
        cache.reset(version);
        index
    }

    /// Indexed and cached lookup.
    ///
    /// Rebuilds the index first if `catalog` differs from the last one seen.
    /// Cached outcomes, including "no match", are returned without scoring.
    /// A non-finite threshold matches nothing and is not cached.
    pub fn find_best_match_with_cache(
        &self,
        name: &str,
        specifications: &str,
        catalog: &[CatalogEntry],
        threshold: f64,
    ) -> Option<MatchResult> {
        let index = self.ensure_index(catalog);

        let scorer = &self.inner.scorer;
        let query = Descriptor::new(name, specifications).normalized(scorer.mode());
        if query.is_blank() || !threshold.is_finite() {
            return None;
        }

        let key = CacheKey::new(&query, threshold);
        if let Some(cached) = self.inner.cache.lock().get(index.version(), &key) {
            tracing::trace!(name, specifications, "match cache hit");
            return cached;
        }

        let candidates = index.candidates(&query);
        tracing::trace!(
            name,
            specifications,
            candidates = candidates.len(),
            catalog_size = index.len(),
            "match cache miss"
        );
        let result = scorer.best_match_among(&query, &candidates, threshold);

        self.inner
            .cache
            .lock()
            .insert(index.version(), key, result.clone());
        result
    }

    /// Cached lookup at the configured default threshold.
    pub fn resolve(&self, descriptor: &Descriptor, catalog: &[CatalogEntry]) -> Option<MatchResult> {
        self.find_best_match_with_cache(
            &descriptor.name,
            &descriptor.specifications,
            catalog,
            self.inner.config.default_threshold,
        )
    }

    /// Duplicate scan of `catalog` at the configured default threshold.
    pub fn find_duplicates(&self, catalog: &[CatalogEntry], method: DedupMethod) -> DuplicateReport {
        let report = find_duplicate_entries(
            &self.inner.scorer,
            catalog,
            self.inner.config.default_threshold,
            method,
        );
        tracing::debug!(
            catalog_size = catalog.len(),
            groups = report.groups.len(),
            duplicates = report.total_duplicates,
            "duplicate scan finished"
        );
        report
    }

    /// Entry from the indexed snapshot.
    pub fn entry(&self, id: &str) -> Option<CatalogEntry> {
        self.snapshot().get(id).cloned()
    }

    /// Drop the index and every cached result.
    pub fn reset(&self) {
        let _guard = self.inner.rebuild.lock();
        let mut cache = self.inner.cache.lock();
        let version = self.snapshot().version() + 1;
        *self.inner.index.write() = Arc::new(CatalogIndex::empty(version));
        cache.reset(version);
        tracing::debug!(version, "catalog index reset");
    }

    pub fn cache_stats(&self) -> CacheStats {
        let index = self.snapshot();
        let cache = self.inner.cache.lock();
        CacheStats {
            cache_size: cache.len(),
            cache_capacity: cache.capacity(),
            token_count: index.token_count(),
            catalog_size: index.len(),
            version: index.version(),
            hits: cache.hits(),
            misses: cache.misses(),
        }
    }
}

impl Default for CatalogMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CatalogMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogMatcher")
            .field("config", &self.inner.config)
            .field("stats", &self.cache_stats())
            .finish()
    }
}
