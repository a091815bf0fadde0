//! Runtime configuration for document queries.
//!
//! Settings can be built programmatically or loaded from environment
//! variables, mirroring how the engine's page configuration is loaded.

use std::env;

/// Default bound of the compiled-selector memo.
pub const DEFAULT_SELECTOR_CACHE_CAPACITY: usize = 256;

/// How names are compared in a document.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DocumentMode {
    /// Tag and attribute names are folded to ASCII lowercase on storage and
    /// type selectors compare case-insensitively.
    #[default]
    Html,
    /// Every name comparison is case-sensitive.
    Xml,
}

impl DocumentMode {
    /// Parse `html` / `xml` (ASCII case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("html") {
            Some(Self::Html)
        } else if value.eq_ignore_ascii_case("xml") {
            Some(Self::Xml)
        } else {
            None
        }
    }
}

/// Query-layer configuration of a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryConfig {
    /// Name comparison mode.
    pub mode: DocumentMode,
    /// When false every query recomputes and nothing is stored.
    pub cache_enabled: bool,
    /// Upper bound of memoized compiled selectors (minimum 1).
    pub selector_cache_capacity: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::new(DocumentMode::Html, true, DEFAULT_SELECTOR_CACHE_CAPACITY)
    }
}

impl QueryConfig {
    /// Construct a configuration with explicit values.
    #[inline]
    #[must_use]
    pub const fn new(mode: DocumentMode, cache_enabled: bool, selector_cache_capacity: usize) -> Self {
        let capacity = if selector_cache_capacity < 1 {
            1
        } else {
            selector_cache_capacity
        };
        Self {
            mode,
            cache_enabled,
            selector_cache_capacity: capacity,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `DOM_QUERY_MODE`: `html` (default) or `xml`
    /// - `DOM_QUERY_CACHE`: set to `0` to disable result caching
    /// - `DOM_QUERY_SELECTOR_CACHE`: compiled-selector memo bound (default 256)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mode = lookup("DOM_QUERY_MODE")
            .as_deref()
            .and_then(DocumentMode::parse)
            .unwrap_or_default();
        let cache_enabled = lookup("DOM_QUERY_CACHE").as_deref() != Some("0");
        let selector_cache_capacity = lookup("DOM_QUERY_SELECTOR_CACHE")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_SELECTOR_CACHE_CAPACITY)
            .max(1);
        Self {
            mode,
            cache_enabled,
            selector_cache_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: FxHashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(QueryConfig::from_lookup(lookup_from(&[])), QueryConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = QueryConfig::from_lookup(lookup_from(&[
            ("DOM_QUERY_MODE", "XML"),
            ("DOM_QUERY_CACHE", "0"),
            ("DOM_QUERY_SELECTOR_CACHE", "8"),
        ]));
        assert_eq!(config, QueryConfig::new(DocumentMode::Xml, false, 8));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = QueryConfig::from_lookup(lookup_from(&[
            ("DOM_QUERY_MODE", "svg"),
            ("DOM_QUERY_CACHE", "yes"),
            ("DOM_QUERY_SELECTOR_CACHE", "0"),
        ]));
        assert_eq!(config.mode, DocumentMode::Html);
        assert!(config.cache_enabled);
        assert_eq!(config.selector_cache_capacity, 1);
        assert_eq!(QueryConfig::new(DocumentMode::Html, true, 0).selector_cache_capacity, 1);
    }
}
