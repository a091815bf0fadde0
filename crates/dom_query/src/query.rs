//! Public query operations.
//!
//! Every operation consults the query cache of its root before traversing.
//! On a miss the result is computed against the current tree and stored
//! together with the generation pair it was computed under; negative results
//! are stored too.

use crate::cache::{CachedResult, Lookup, QueryKind};
use crate::document::Document;
use crate::error::{DomError, QueryError};
use css_selectors::{ElementAdapter as _, SelectorList, SyntaxError, descendants, matches_selector_list};
use indextree::NodeId;
use log::{debug, trace};
use std::sync::Arc;

impl Document {
    /// First element in document order whose `id` attribute equals `id`.
    /// The selector engine is not involved.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        let root = self.root();
        let result = self.cached(root, QueryKind::ById, id, |doc| {
            let found = doc
                .traverse(root)
                .find(|&element| doc.tree.attribute_value(element, "id") == Some(id));
            Ok(CachedResult::Element(found))
        });
        match result {
            Ok(CachedResult::Element(found)) => found,
            _ => None,
        }
    }

    /// Descendant elements of `root` with the given tag name (`*` for all),
    /// in document order. HTML documents compare names case-insensitively.
    ///
    /// # Errors
    /// [`DomError::StaleNode`] when `root` has been released.
    pub fn get_elements_by_tag_name(&self, root: NodeId, name: &str) -> Result<Vec<NodeId>, QueryError> {
        self.live(root)?;
        let result = self.cached(root, QueryKind::ByTagName, name, |doc| {
            let case_insensitive = doc.tree.tag_names_case_insensitive();
            let found = doc
                .traverse(root)
                .filter(|&element| {
                    let tag = doc.tree.tag_name(element);
                    name == "*"
                        || tag == name
                        || (case_insensitive && tag.eq_ignore_ascii_case(name))
                })
                .collect();
            Ok(CachedResult::Elements(found))
        })?;
        Ok(into_elements(result))
    }

    /// Descendant elements of `root` carrying every class in the
    /// whitespace-separated `names`. An empty list matches nothing.
    ///
    /// # Errors
    /// [`DomError::StaleNode`] when `root` has been released.
    pub fn get_elements_by_class_name(&self, root: NodeId, names: &str) -> Result<Vec<NodeId>, QueryError> {
        self.live(root)?;
        let result = self.cached(root, QueryKind::ByClassName, names, |doc| {
            let classes: Vec<&str> = names.split_ascii_whitespace().collect();
            if classes.is_empty() {
                return Ok(CachedResult::Elements(Vec::new()));
            }
            let found = doc
                .traverse(root)
                .filter(|&element| classes.iter().all(|class| doc.tree.has_class(element, class)))
                .collect();
            Ok(CachedResult::Elements(found))
        })?;
        Ok(into_elements(result))
    }

    /// First descendant of `root` in document order matching `selector`.
    ///
    /// # Errors
    /// [`QueryError::Syntax`] for malformed selector text,
    /// [`DomError::StaleNode`] when `root` has been released.
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, QueryError> {
        self.live(root)?;
        let result = self.cached(root, QueryKind::QuerySelector, selector, |doc| {
            let list = doc.compile(selector)?;
            let found = doc
                .traverse(root)
                .find(|&element| matches_selector_list(&doc.tree, element, &list));
            Ok(CachedResult::Element(found))
        })?;
        Ok(match result {
            CachedResult::Element(found) => found,
            _ => None,
        })
    }

    /// Every descendant of `root` matching `selector`, in document order.
    ///
    /// # Errors
    /// [`QueryError::Syntax`] for malformed selector text,
    /// [`DomError::StaleNode`] when `root` has been released.
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, QueryError> {
        self.live(root)?;
        let result = self.cached(root, QueryKind::QuerySelectorAll, selector, |doc| {
            let list = doc.compile(selector)?;
            let found = doc
                .traverse(root)
                .filter(|&element| matches_selector_list(&doc.tree, element, &list))
                .collect();
            Ok(CachedResult::Elements(found))
        })?;
        Ok(into_elements(result))
    }

    /// Whether `element` matches `selector`.
    ///
    /// # Errors
    /// [`QueryError::Syntax`] for malformed selector text,
    /// [`DomError::NotAnElement`] / [`DomError::StaleNode`] for a bad handle.
    pub fn matches(&self, element: NodeId, selector: &str) -> Result<bool, QueryError> {
        self.expect_element(element)?;
        let result = self.cached(element, QueryKind::Matches, selector, |doc| {
            let list = doc.compile(selector)?;
            doc.record_stats(|stats| stats.nodes_visited = stats.nodes_visited.saturating_add(1));
            Ok(CachedResult::Matched(matches_selector_list(&doc.tree, element, &list)))
        })?;
        Ok(matches!(result, CachedResult::Matched(true)))
    }

    /// `element` or its nearest ancestor element matching `selector`.
    ///
    /// # Errors
    /// [`QueryError::Syntax`] for malformed selector text,
    /// [`DomError::NotAnElement`] / [`DomError::StaleNode`] for a bad handle.
    pub fn closest(&self, element: NodeId, selector: &str) -> Result<Option<NodeId>, QueryError> {
        self.expect_element(element)?;
        let result = self.cached(element, QueryKind::Closest, selector, |doc| {
            let list = doc.compile(selector)?;
            let mut current = Some(element);
            while let Some(candidate) = current {
                doc.record_stats(|stats| stats.nodes_visited = stats.nodes_visited.saturating_add(1));
                if matches_selector_list(&doc.tree, candidate, &list) {
                    return Ok(CachedResult::Element(Some(candidate)));
                }
                current = doc.tree.parent_element(candidate);
            }
            Ok(CachedResult::Element(None))
        })?;
        Ok(match result {
            CachedResult::Element(found) => found,
            _ => None,
        })
    }

    fn expect_element(&self, element: NodeId) -> Result<(), DomError> {
        if self.live(element)?.is_element() {
            Ok(())
        } else {
            Err(DomError::NotAnElement(element))
        }
    }

    /// Serve `(kind, key)` from the cache of `root`, or compute and store it.
    fn cached(
        &self,
        root: NodeId,
        kind: QueryKind,
        key: &str,
        compute: impl FnOnce(&Self) -> Result<CachedResult, QueryError>,
    ) -> Result<CachedResult, QueryError> {
        if !self.config.cache_enabled {
            return compute(self);
        }
        let generation = self.tracker.generation();
        let lookup = self.caches.borrow_mut().get_mut(&root).map_or(Lookup::Miss, |cache| {
            cache.lookup(kind, key, generation, |id| self.tree.is_live(id))
        });
        match lookup {
            Lookup::Hit(result) => {
                trace!(target: "dom_query", "cache hit for {kind}('{key}') on {root:?}");
                self.record_stats(|stats| stats.cache_hits = stats.cache_hits.saturating_add(1));
                return Ok(result);
            }
            Lookup::Stale => {
                trace!(target: "dom_query", "stale entry for {kind}('{key}') on {root:?} at {generation}");
                self.record_stats(|stats| stats.stale_entries = stats.stale_entries.saturating_add(1));
                self.sweep_caches(generation);
            }
            Lookup::Miss => {
                trace!(target: "dom_query", "cache miss for {kind}('{key}') on {root:?}");
            }
        }
        self.record_stats(|stats| stats.cache_misses = stats.cache_misses.saturating_add(1));

        let result = compute(self)?;
        self.caches
            .borrow_mut()
            .entry(root)
            .or_default()
            .store(kind, key, result.clone(), generation);
        Ok(result)
    }

    /// Compile through the document's selector memo.
    fn compile(&self, text: &str) -> Result<Arc<SelectorList>, SyntaxError> {
        let mut selectors = self.selectors.borrow_mut();
        let before = selectors.compiled_count();
        let outcome = selectors.compile(text);
        let compiled = selectors.compiled_count().saturating_sub(before);
        drop(selectors);
        self.record_stats(|stats| {
            stats.selectors_compiled = stats.selectors_compiled.saturating_add(compiled);
        });
        if let Err(error) = &outcome {
            debug!(target: "dom_query", "rejected selector '{text}': {error}");
        }
        outcome
    }

    /// Element descendants of `root` in document order, counted as visited.
    fn traverse(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        descendants(&self.tree, root).inspect(|_| {
            self.record_stats(|stats| stats.nodes_visited = stats.nodes_visited.saturating_add(1));
        })
    }
}

fn into_elements(result: CachedResult) -> Vec<NodeId> {
    match result {
        CachedResult::Elements(elements) => elements,
        CachedResult::Element(element) => element.into_iter().collect(),
        CachedResult::Matched(_) => Vec::new(),
    }
}
