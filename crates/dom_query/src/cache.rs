//! Per-root memo of query results.
//!
//! Each node that serves as a query root owns one [`QueryCache`]. Entries
//! are keyed by operation kind and the literal parameter text, stamped with
//! the generation pair they were computed under, and hold node handles that
//! do not keep nodes alive.

use crate::revision::Generation;
use core::fmt;
use indextree::NodeId;
use rustc_hash::FxHashMap;

/// The operation a cache entry answers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    ById,
    ByTagName,
    ByClassName,
    QuerySelector,
    QuerySelectorAll,
    Matches,
    Closest,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::ById => "getElementById",
            Self::ByTagName => "getElementsByTagName",
            Self::ByClassName => "getElementsByClassName",
            Self::QuerySelector => "querySelector",
            Self::QuerySelectorAll => "querySelectorAll",
            Self::Matches => "matches",
            Self::Closest => "closest",
        })
    }
}

/// A memoized answer. `Element(None)` is the cached "not found" result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CachedResult {
    Element(Option<NodeId>),
    Elements(Vec<NodeId>),
    Matched(bool),
}

impl CachedResult {
    /// Whether every node handle in the result still resolves.
    fn targets_live(&self, is_live: impl Fn(NodeId) -> bool) -> bool {
        match self {
            Self::Element(element) => element.is_none_or(&is_live),
            Self::Elements(elements) => elements.iter().all(|&element| is_live(element)),
            Self::Matched(_) => true,
        }
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    generation: Generation,
    result: CachedResult,
}

/// Outcome of [`QueryCache::lookup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Hit(CachedResult),
    /// An entry existed but was computed under another generation or refers
    /// to released nodes. It has been dropped.
    Stale,
    Miss,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: FxHashMap<QueryKind, FxHashMap<String, CacheEntry>>,
}

impl QueryCache {
    /// Return the entry for `(kind, key)` if it was computed under `current`
    /// and all of its nodes are still live.
    pub fn lookup(
        &mut self,
        kind: QueryKind,
        key: &str,
        current: Generation,
        is_live: impl Fn(NodeId) -> bool,
    ) -> Lookup {
        let Some(by_key) = self.entries.get_mut(&kind) else {
            return Lookup::Miss;
        };
        let Some(entry) = by_key.get(key) else {
            return Lookup::Miss;
        };
        if entry.generation == current && entry.result.targets_live(is_live) {
            return Lookup::Hit(entry.result.clone());
        }
        by_key.remove(key);
        Lookup::Stale
    }

    /// Store `result` for `(kind, key)`, replacing any earlier entry.
    pub fn store(&mut self, kind: QueryKind, key: &str, result: CachedResult, generation: Generation) {
        self.entries
            .entry(kind)
            .or_default()
            .insert(key.to_owned(), CacheEntry { generation, result });
    }

    /// Drop every entry computed under a generation other than `current`.
    /// Returns how many were dropped.
    pub fn sweep(&mut self, current: Generation) -> usize {
        let before = self.len();
        for by_key in self.entries.values_mut() {
            by_key.retain(|_, entry| entry.generation == current);
        }
        self.entries.retain(|_, by_key| !by_key.is_empty());
        before.saturating_sub(self.len())
    }

    /// Drop every entry.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries across all kinds.
    pub fn len(&self) -> usize {
        self.entries.values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
