//! Inverted token index for candidate pruning
//!
//! Maps normalized tokens (name words and their short prefixes,
//! specification words, barcodes) to the catalog positions that contain
//! them. A query only gets scored against the entries sharing the most
//! tokens with it, instead of the whole catalog.

use ahash::{AHashMap, AHashSet};

use crate::algorithms::{char_len, normalize_text, split_words, within_relative_distance, NormalizationMode};
use crate::catalog::{CatalogEntry, NormalizedText};

/// Shortest token that gets indexed.
pub const MIN_TOKEN_LEN: usize = 2;

/// Longest name prefix that gets indexed.
const MAX_PREFIX_LEN: usize = 5;

/// Name words at least this long also index their prefixes.
const MIN_PREFIXED_WORD_LEN: usize = 3;

/// Maximum normalized edit distance (relative to the longer token) for
/// fuzzy token expansion.
const FUZZY_TOKEN_RATIO: f64 = 0.3;

/// Candidate pool size that always survives pruning.
const MIN_CANDIDATES: usize = 20;

fn long_enough(word: &str) -> bool {
    char_len(word) >= MIN_TOKEN_LEN
}

/// Every prefix of `word` from 2 up to 5 chars (bounded by the word length).
fn prefixes(word: &str) -> impl Iterator<Item = &str> {
    let ends: Vec<usize> = word
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .skip(MIN_TOKEN_LEN - 1)
        .take(MAX_PREFIX_LEN - MIN_TOKEN_LEN + 1)
        .collect();
    ends.into_iter().map(move |end| &word[..end])
}

/// Tokens an entry is indexed under. Entries with a blank name and blank
/// specifications produce nothing.
pub fn entry_tokens(entry: &CatalogEntry, mode: NormalizationMode) -> AHashSet<String> {
    let mut tokens = AHashSet::new();
    if !entry.is_matchable() {
        return tokens;
    }

    let text = NormalizedText::new(&entry.name, &entry.specifications, mode);

    for word in split_words(&text.name).filter(|w| long_enough(w)) {
        tokens.insert(word.to_string());
        if char_len(word) >= MIN_PREFIXED_WORD_LEN {
            tokens.extend(prefixes(word).map(str::to_string));
        }
    }

    for word in split_words(&text.specifications).filter(|w| long_enough(w)) {
        tokens.insert(word.to_string());
    }

    if let Some(barcode) = &entry.barcode {
        let barcode = normalize_text(barcode, mode);
        if long_enough(&barcode) {
            tokens.insert(barcode);
        }
    }

    tokens
}

/// Query tokens: name and specification words, no prefixes, unique in
/// first-seen order.
pub fn query_tokens(query: &NormalizedText) -> Vec<String> {
    let mut seen = AHashSet::new();
    split_words(&query.name)
        .chain(split_words(&query.specifications))
        .filter(|w| long_enough(w))
        .filter(|w| seen.insert(*w))
        .map(str::to_string)
        .collect()
}

/// One immutable index generation, built from one catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    version: u64,
    built: bool,
    catalog_hash: u64,
    entries: Vec<CatalogEntry>,
    entry_map: AHashMap<String, usize>,
    postings: AHashMap<String, AHashSet<usize>>,
    dropped_tokens: usize,
}

impl CatalogIndex {
    /// An unbuilt placeholder carrying a version number.
    pub fn empty(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Index a catalog snapshot, keeping at most `max_tokens` tokens
    /// (those with the largest posting sets).
    pub fn build(
        catalog: &[CatalogEntry],
        catalog_hash: u64,
        version: u64,
        mode: NormalizationMode,
        max_tokens: usize,
    ) -> Self {
        let mut postings: AHashMap<String, AHashSet<usize>> = AHashMap::new();
        let mut entry_map = AHashMap::with_capacity(catalog.len());

        for (pos, entry) in catalog.iter().enumerate() {
            entry_map.entry(entry.id.clone()).or_insert(pos);
            for token in entry_tokens(entry, mode) {
                postings.entry(token).or_default().insert(pos);
            }
        }

        let mut dropped_tokens = 0;
        if postings.len() > max_tokens {
            let mut ranked: Vec<(String, AHashSet<usize>)> = postings.into_iter().collect();
            ranked.sort_by(|(ta, a), (tb, b)| b.len().cmp(&a.len()).then_with(|| ta.cmp(tb)));
            dropped_tokens = ranked.len() - max_tokens;
            ranked.truncate(max_tokens);
            postings = ranked.into_iter().collect();
        }

        Self {
            version,
            built: true,
            catalog_hash,
            entries: catalog.to_vec(),
            entry_map,
            postings,
            dropped_tokens,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn catalog_hash(&self) -> u64 {
        self.catalog_hash
    }

    /// Number of catalog entries in the snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct indexed tokens
    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    /// Tokens discarded by the token limit at build time
    pub fn dropped_tokens(&self) -> usize {
        self.dropped_tokens
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entry_map.get(id).map(|&pos| &self.entries[pos])
    }

    /// Catalog positions indexed under `token`.
    pub fn postings(&self, token: &str) -> Option<&AHashSet<usize>> {
        self.postings.get(token)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Count, per catalog position, how many query tokens hit it. Falls
    /// back to fuzzy token matching when exact hits are too sparse.
    fn token_hits(&self, tokens: &[String]) -> AHashMap<usize, usize> {
        let mut hits: AHashMap<usize, usize> = AHashMap::new();

        for token in tokens {
            if let Some(ids) = self.postings.get(token) {
                for &pos in ids {
                    *hits.entry(pos).or_insert(0) += 1;
                }
            }
        }

        let floor = MIN_CANDIDATES.min(self.entries.len() / 10);
        if hits.len() < floor {
            tracing::trace!(
                exact = hits.len(),
                floor,
                "expanding candidates with fuzzy token matching"
            );
            for token in tokens {
                // An exact token is related too and scores a second hit
                for (indexed, ids) in &self.postings {
                    let related = indexed.contains(token.as_str())
                        || token.contains(indexed.as_str())
                        || within_relative_distance(token, indexed, FUZZY_TOKEN_RATIO);
                    if related {
                        for &pos in ids {
                            *hits.entry(pos).or_insert(0) += 1;
                        }
                    }
                }
            }
        }

        hits
    }

    /// Candidate entries for a query, in catalog order.
    ///
    /// Keeps the `max(min(20, n), n / 2)` best-covered entries; when no
    /// token matches at all, every entry is a candidate.
    pub fn candidates(&self, query: &NormalizedText) -> Vec<&CatalogEntry> {
        let tokens = query_tokens(query);
        let hits = self.token_hits(&tokens);

        if hits.is_empty() {
            return self.entries.iter().collect();
        }

        let n = self.entries.len();
        let keep = MIN_CANDIDATES.min(n).max(n / 2);

        let mut ranked: Vec<(usize, usize)> = hits.into_iter().collect();
        ranked.sort_by(|(pa, ca), (pb, cb)| cb.cmp(ca).then(pa.cmp(pb)));
        ranked.truncate(keep);
        ranked.sort_unstable_by_key(|&(pos, _)| pos);

        ranked.into_iter().map(|(pos, _)| &self.entries[pos]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODE: NormalizationMode = NormalizationMode::Standard;

    fn build(catalog: &[CatalogEntry]) -> CatalogIndex {
        CatalogIndex::build(catalog, 0, 1, MODE, 5000)
    }

    fn ids(entries: &[&CatalogEntry]) -> Vec<String> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_entry_tokens() {
        let entry = CatalogEntry::new("1", "Wireless Mouse x")
            .with_specifications("2.4G 黑")
            .with_barcode(" 6901234567890 ");
        let tokens = entry_tokens(&entry, MODE);

        for expected in [
            "wireless", "wi", "wir", "wire", "wirel", "mouse", "mo", "mou", "mous", "2.4g",
            "6901234567890",
        ] {
            assert!(tokens.contains(expected), "missing {expected}");
        }
        // Too short, or a prefix longer than 5
        assert!(!tokens.contains("x"));
        assert!(!tokens.contains("黑"));
        assert!(!tokens.contains("wirele"));
        // Spec words get no prefixes
        assert!(!tokens.contains("2."));
    }

    #[test]
    fn test_prefixes_are_char_based() {
        let p: Vec<&str> = prefixes("智能控制器型号").collect();
        assert_eq!(p, vec!["智能", "智能控", "智能控制", "智能控制器"]);
    }

    #[test]
    fn test_blank_entries_are_not_indexed() {
        let entry = CatalogEntry::new("1", " ").with_barcode("123456");
        assert!(entry_tokens(&entry, MODE).is_empty());
    }

    #[test]
    fn test_query_tokens_unique() {
        let query = NormalizedText::new("USB 数据线 usb", "1m", MODE);
        assert_eq!(query_tokens(&query), vec!["usb", "数据线", "1m"]);
    }

    #[test]
    fn test_token_limit_keeps_largest_postings() {
        let catalog = vec![
            CatalogEntry::new("1", "aa bb"),
            CatalogEntry::new("2", "aa cc"),
            CatalogEntry::new("3", "aa bb dd"),
        ];
        let index = CatalogIndex::build(&catalog, 0, 1, MODE, 2);
        assert_eq!(index.token_count(), 2);
        assert_eq!(index.dropped_tokens(), 2);
        assert_eq!(index.postings("aa").map(|p| p.len()), Some(3));
        assert_eq!(index.postings("bb").map(|p| p.len()), Some(2));
        assert!(index.postings("cc").is_none());
    }

    #[test]
    fn test_candidates_rank_by_token_hits() {
        // 50 entries: keep max(min(20, 50), 25) = 25
        let mut catalog: Vec<CatalogEntry> = (0..48)
            .map(|i| CatalogEntry::new(format!("n{i}"), format!("item{i} generic")))
            .collect();
        catalog.push(CatalogEntry::new("mouse", "wireless mouse"));
        catalog.push(CatalogEntry::new("kbd", "wireless keyboard"));
        let index = build(&catalog);

        let query = NormalizedText::new("wireless mouse", "", MODE);
        let found = ids(&index.candidates(&query));
        // Only two entries share tokens; the fuzzy floor is min(20, 5) = 5,
        // so expansion kicks in but nothing else is related
        assert_eq!(found, vec!["mouse", "kbd"]);
    }

    #[test]
    fn test_candidates_fall_back_to_whole_catalog() {
        let catalog = vec![CatalogEntry::new("1", "数据线"), CatalogEntry::new("2", "充电器")];
        let index = build(&catalog);
        let query = NormalizedText::new("蓝牙耳机", "", MODE);
        assert_eq!(ids(&index.candidates(&query)), vec!["1", "2"]);
    }

    #[test]
    fn test_fuzzy_expansion() {
        // 100 entries -> floor min(20, 10) = 10; no exact hit for "controler"
        let mut catalog: Vec<CatalogEntry> = (0..99)
            .map(|i| CatalogEntry::new(format!("n{i}"), format!("part{i}")))
            .collect();
        catalog.push(CatalogEntry::new("ctl", "controller"));
        let index = build(&catalog);

        let query = NormalizedText::new("controler", "", MODE);
        assert!(index.postings("controler").is_none());
        let found = ids(&index.candidates(&query));
        assert!(found.contains(&"ctl".to_string()));
        // The top-k limit still applies: max(min(20, 100), 50)
        assert!(found.len() <= 50);
    }

    /// 150 entries containing "qz" inside a longer word, 49 unrelated
    /// fillers, and the exact entry last.
    fn short_token_catalog() -> Vec<CatalogEntry> {
        let mut catalog: Vec<CatalogEntry> = (0..150)
            .map(|i| CatalogEntry::new(format!("x{i}"), format!("xxxxxqz{i}")))
            .collect();
        catalog.extend((0..49).map(|i| CatalogEntry::new(format!("f{i}"), format!("filler{i}"))));
        catalog.push(CatalogEntry::new("e1", "qz"));
        catalog
    }

    #[test]
    fn test_exact_hit_survives_cut_after_expansion() {
        let catalog = short_token_catalog();
        let index = build(&catalog);
        let query = NormalizedText::new("qz", "", MODE);

        // One exact hit is below the floor min(20, 20), so every "xxxxxqz"
        // entry gets a containment hit. The exact entry counts twice.
        let found = ids(&index.candidates(&query));

        // keep = max(min(20, 200), 100) = 100: the exact entry plus the
        // first 99 one-hit entries in catalog order
        let mut expected: Vec<String> = (0..99).map(|i| format!("x{i}")).collect();
        expected.push("e1".to_string());
        assert_eq!(found, expected);
    }

    #[test]
    fn test_get_by_id() {
        let catalog = vec![CatalogEntry::new("a", "数据线"), CatalogEntry::new("b", "充电器")];
        let index = build(&catalog);
        assert_eq!(index.get("b").map(|e| e.name.as_str()), Some("充电器"));
        assert!(index.get("zzz").is_none());
        assert!(index.is_built());
        assert!(!CatalogIndex::empty(3).is_built());
    }
}
