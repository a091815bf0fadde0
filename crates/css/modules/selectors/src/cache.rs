//! Memo of compiled selectors keyed by selector text.
//! Compilation is a pure function of the text, so the text itself is a
//! sufficient key and failures can be replayed without re-parsing.

use crate::{SelectorList, SyntaxError, parse_selector_list};
use log::trace;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A bounded text -> compiled selector memo.
///
/// When the number of distinct texts exceeds the capacity the memo is
/// cleared wholesale; selector texts used by a page are few and stable, so
/// this keeps the common case at one hash lookup without tracking recency.
#[derive(Debug)]
pub struct SelectorCache {
    store: FxHashMap<String, Result<Arc<SelectorList>, SyntaxError>>,
    capacity: usize,
    compiled: u64,
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl SelectorCache {
    /// Create a memo holding at most `capacity` texts (minimum 1).
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: FxHashMap::default(),
            capacity: capacity.max(1),
            compiled: 0,
        }
    }

    /// Compile `text`, or return the memoized outcome of an earlier compile.
    ///
    /// # Errors
    /// Returns the (memoized) [`SyntaxError`] when `text` is not a valid
    /// selector list.
    pub fn compile(&mut self, text: &str) -> Result<Arc<SelectorList>, SyntaxError> {
        if let Some(outcome) = self.store.get(text) {
            return outcome.clone();
        }
        if self.store.len() >= self.capacity {
            trace!(target: "css_selectors", "selector memo full ({} entries), clearing", self.store.len());
            self.store.clear();
        }
        self.compiled = self.compiled.saturating_add(1);
        let outcome = parse_selector_list(text).map(Arc::new);
        self.store.insert(text.to_owned(), outcome.clone());
        outcome
    }

    /// Number of texts compiled so far (memo misses).
    #[inline]
    pub fn compiled_count(&self) -> u64 {
        self.compiled
    }

    /// Number of memoized texts.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Drop every memoized text.
    #[inline]
    pub fn clear(&mut self) {
        self.store.clear();
    }
}
