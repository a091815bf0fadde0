//! Per-document query counters.

use serde::Serialize;

/// Snapshot of a document's query counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    /// Lookups answered from a valid cache entry.
    pub cache_hits: u64,
    /// Lookups that had to recompute (including stale ones).
    pub cache_misses: u64,
    /// Lookups that found an entry whose generation or targets were stale.
    pub stale_entries: u64,
    /// Elements tested by traversals.
    pub nodes_visited: u64,
    /// Selector texts compiled (memo misses).
    pub selectors_compiled: u64,
}

impl QueryStats {
    /// Render the counters as one JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_counter() {
        let stats = QueryStats {
            cache_hits: 3,
            cache_misses: 2,
            stale_entries: 1,
            nodes_visited: 40,
            selectors_compiled: 2,
        };
        assert_eq!(
            stats.to_json(),
            r#"{"cache_hits":3,"cache_misses":2,"stale_entries":1,"nodes_visited":40,"selectors_compiled":2}"#
        );
    }
}
