//! Duplicate detection within a catalog
//!
//! Runs the match scorer entry-against-entry to find items that a lookup
//! would resolve to each other, and groups them with union-find. Useful
//! for auditing a catalog that grew duplicates before lookups were wired
//! into stock intake.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::catalog::{CatalogEntry, NormalizedText};
use crate::scoring::{evaluate, Scorer};

/// Result from a duplicate scan. All values are entry ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Groups of two or more entries, largest first, ids in catalog order
    pub groups: Vec<Vec<String>>,
    /// Entries with no duplicate
    pub unique: Vec<String>,
    /// Entries that could be merged away (sum of group sizes minus one each)
    pub total_duplicates: usize,
}

/// Deduplication methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupMethod {
    /// Compare all pairs (O(N^2)). Accurate but slow for large N.
    BruteForce,
    /// Sort by normalized text and compare within a sliding window
    /// (O(N log N)). Misses duplicates that sort far apart.
    SortedNeighborhood { window_size: usize },
}

/// Union-Find data structure for efficient clustering
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }

    /// Groups of positions, each in ascending order, ordered by first member.
    fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root: AHashMap<usize, usize> = AHashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(i);
        }
        groups
    }
}

/// Either direction resolving at or above the threshold links two entries.
fn linked(a: &NormalizedText, b: &NormalizedText, threshold: f64) -> bool {
    if a.is_blank() || b.is_blank() {
        return false;
    }
    [evaluate(a, b), evaluate(b, a)]
        .into_iter()
        .flatten()
        .any(|s| s.score >= threshold)
}

fn brute_force_pairs(texts: &[NormalizedText], threshold: f64) -> Vec<(usize, usize)> {
    let n = texts.len();
    (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            (i + 1..n)
                .filter(move |&j| linked(&texts[i], &texts[j], threshold))
                .map(move |j| (i, j))
        })
        .collect()
}

fn sorted_neighborhood_pairs(
    texts: &[NormalizedText],
    threshold: f64,
    window_size: usize,
) -> Vec<(usize, usize)> {
    let n = texts.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.par_sort_by(|&a, &b| texts[a].combined.cmp(&texts[b].combined).then(a.cmp(&b)));

    let window_size = window_size.max(1);
    let order = &order;
    (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let end = (i + 1 + window_size).min(n);
            (i + 1..end)
                .map(move |j| (order[i], order[j]))
                .filter(move |&(a, b)| linked(&texts[a], &texts[b], threshold))
        })
        .collect()
}

/// Group catalog entries that resolve to one another at `threshold`.
///
/// ```
/// use skumatch::{find_duplicate_entries, CatalogEntry, DedupMethod, Scorer};
///
/// let catalog = vec![
///     CatalogEntry::new("1", "智能控制器CHM2-2ZE"),
///     CatalogEntry::new("2", "CHM2-2ZE控制器说明"),
///     CatalogEntry::new("3", "另一个产品"),
/// ];
/// let report = find_duplicate_entries(&Scorer::default(), &catalog, 0.6, DedupMethod::BruteForce);
/// assert_eq!(report.groups, vec![vec!["1".to_string(), "2".to_string()]]);
/// assert_eq!(report.unique, vec!["3".to_string()]);
/// ```
pub fn find_duplicate_entries(
    scorer: &Scorer,
    catalog: &[CatalogEntry],
    threshold: f64,
    method: DedupMethod,
) -> DuplicateReport {
    if catalog.is_empty() {
        return DuplicateReport::default();
    }

    let texts: Vec<NormalizedText> = catalog
        .iter()
        .map(|e| NormalizedText::new(&e.name, &e.specifications, scorer.mode()))
        .collect();

    let pairs = match method {
        DedupMethod::BruteForce => brute_force_pairs(&texts, threshold),
        DedupMethod::SortedNeighborhood { window_size } => {
            sorted_neighborhood_pairs(&texts, threshold, window_size)
        }
    };

    let mut uf = UnionFind::new(catalog.len());
    for (i, j) in pairs {
        uf.union(i, j);
    }

    let mut groups = Vec::new();
    let mut unique = Vec::new();
    for group in uf.groups() {
        let ids: Vec<String> = group.into_iter().map(|i| catalog[i].id.clone()).collect();
        if ids.len() > 1 {
            groups.push(ids);
        } else {
            unique.extend(ids);
        }
    }

    // Stable: equal-sized groups keep catalog order
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    let total_duplicates = groups.iter().map(|g| g.len() - 1).sum();

    DuplicateReport {
        groups,
        unique,
        total_duplicates,
    }
}
