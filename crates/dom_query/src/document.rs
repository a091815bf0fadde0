//! The document: node tree, edits, generation tracking and observers.

use crate::cache::QueryCache;
use crate::config::{DocumentMode, QueryConfig};
use crate::error::DomError;
use crate::observer::{MutationRecord, ObserverCallback, ObserverId};
use crate::revision::Generation;
use crate::stats::QueryStats;
use crate::tracker::MutationTracker;
use crate::tree::{NodeKind, Tree};
use core::cell::{Cell, RefCell};
use core::mem::{replace, take};
use css_selectors::SelectorCache;
use indextree::NodeId;
use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A document tree with cached queries.
///
/// Tree edits take `&mut self`; queries take `&self` and keep their caches
/// behind interior mutability, so observers (which receive `&Document`) can
/// query while an edit is being reported.
pub struct Document {
    pub(crate) tree: Tree,
    pub(crate) tracker: MutationTracker,
    pub(crate) config: QueryConfig,
    /// Query caches keyed by the node they are rooted at, created lazily.
    pub(crate) caches: RefCell<FxHashMap<NodeId, QueryCache>>,
    pub(crate) selectors: RefCell<SelectorCache>,
    pub(crate) stats: Cell<QueryStats>,
    observers: Vec<(ObserverId, ObserverCallback)>,
    next_observer: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty HTML document with default settings.
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    pub fn with_config(config: QueryConfig) -> Self {
        Self {
            tree: Tree::new(config.mode),
            tracker: MutationTracker::default(),
            selectors: RefCell::new(SelectorCache::with_capacity(config.selector_cache_capacity)),
            config,
            caches: RefCell::new(FxHashMap::default()),
            stats: Cell::new(QueryStats::default()),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// The document node.
    #[inline]
    pub const fn root(&self) -> NodeId {
        self.tree.root
    }

    #[inline]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    #[inline]
    pub fn mode(&self) -> DocumentMode {
        self.tree.mode
    }

    /// The generation pair results computed now are stamped with.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.tracker.generation()
    }

    /// Hook for an external tree layer: a node was inserted, removed or
    /// reordered at or below `changed`.
    pub fn notify_structural_change(&self, changed: NodeId) {
        self.tracker.notify_structural_change(changed);
    }

    /// Hook for an external tree layer: attribute `name` of `changed` was
    /// written.
    pub fn notify_attribute_change(&self, changed: NodeId, name: &str) {
        self.tracker.notify_attribute_change(changed, name);
    }

    pub fn stats(&self) -> QueryStats {
        self.stats.get()
    }

    pub fn reset_stats(&self) {
        self.stats.set(QueryStats::default());
    }

    pub(crate) fn record_stats(&self, update: impl FnOnce(&mut QueryStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    /// Resolve a handle, failing when it has been released.
    pub(crate) fn live(&self, id: NodeId) -> Result<&NodeKind, DomError> {
        self.tree.node(id).ok_or(DomError::StaleNode(id))
    }

    /// Number of nodes currently holding a query cache.
    pub fn cached_roots(&self) -> usize {
        self.caches.borrow().len()
    }

    /// Drop every cached entry computed under an older generation, and the
    /// caches left empty by that.
    pub(crate) fn sweep_caches(&self, current: Generation) {
        let mut caches = self.caches.borrow_mut();
        let mut dropped = 0_usize;
        caches.retain(|_, cache| {
            dropped = dropped.saturating_add(cache.sweep(current));
            !cache.is_empty()
        });
        if dropped > 0 {
            debug!(target: "dom_query", "swept {dropped} outdated cache entries, {} root(s) left", caches.len());
        }
    }

    // ---- creation ----

    /// Create a detached element. HTML documents store the tag lowercased.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = self.tree.fold_name(tag);
        self.tree.nodes.new_node(NodeKind::Element {
            tag,
            attrs: SmallVec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.nodes.new_node(NodeKind::Text {
            text: text.to_owned(),
        })
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.tree.nodes.new_node(NodeKind::Comment {
            text: text.to_owned(),
        })
    }

    // ---- navigation ----

    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.tree.is_live(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    /// Child nodes of every kind, in order. Empty for released handles.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.children(id).collect()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.tree.first_child(id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.tree.next_sibling(id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.tree.previous_sibling(id)
    }

    /// Attribute value; names compare case-insensitively in HTML documents.
    pub fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.tree.attribute_value(element, name)
    }

    pub fn tag_name(&self, element: NodeId) -> Option<&str> {
        match self.tree.node(element)? {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Text of a text or comment node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.tree.node(id)? {
            NodeKind::Text { text } | NodeKind::Comment { text } => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tree.is_element_node(id)
    }

    /// Whether `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.is_live(ancestor) && self.tree.is_inclusive_ancestor(ancestor, node)
    }

    // ---- structural edits ----

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (at the end when
    /// `None`). A child that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if !matches!(self.live(parent)?, NodeKind::Document | NodeKind::Element { .. }) {
            return Err(DomError::Hierarchy("only documents and elements can have children"));
        }
        if matches!(self.live(child)?, NodeKind::Document) {
            return Err(DomError::Hierarchy("the document node cannot be inserted"));
        }
        if self.tree.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Hierarchy("a node cannot be inserted into itself or its descendants"));
        }
        let mut reference = reference;
        if let Some(before) = reference {
            self.live(before)?;
            if self.tree.parent(before) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: before });
            }
            if before == child {
                reference = self.next_sibling(child);
            }
        }

        let old_parent = self.detach(child);
        let linked = match reference {
            Some(before) => before.checked_insert_before(child, &mut self.tree.nodes),
            None => parent.checked_append(child, &mut self.tree.nodes),
        };
        linked.map_err(|error| {
            debug!(target: "dom_query", "arena refused to link {child:?} under {parent:?}: {error:?}");
            DomError::Hierarchy("a node cannot be inserted into itself or its descendants")
        })?;

        self.tracker.notify_structural_change(parent);
        if let Some(old_parent) = old_parent {
            self.dispatch(&MutationRecord::ChildList {
                target: old_parent,
                added: Vec::new(),
                removed: vec![child],
            });
        }
        self.dispatch(&MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    /// Detach `child` from `parent`. The subtree stays allocated and can be
    /// inserted again or [released](Self::release).
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.live(parent)?;
        self.live(child)?;
        if self.tree.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        self.tracker.notify_structural_change(parent);
        self.dispatch(&MutationRecord::ChildList {
            target: parent,
            added: Vec::new(),
            removed: vec![child],
        });
        Ok(())
    }

    /// Unlink `child` from its parent, if any, and drop every query cache
    /// rooted in its subtree. Returns the former parent.
    fn detach(&mut self, child: NodeId) -> Option<NodeId> {
        let parent = self.tree.parent(child)?;
        child.detach(&mut self.tree.nodes);
        let subtree = self.tree.subtree(child);
        let caches = self.caches.get_mut();
        for node in subtree {
            if let Some(cache) = caches.remove(&node) {
                debug!(target: "dom_query", "dropping {} cached queries of detached {node:?}", cache.len());
            }
        }
        Some(parent)
    }

    /// Free the slots of a detached subtree. Every handle into it becomes
    /// stale, including copies held by caches.
    pub fn release(&mut self, node: NodeId) -> Result<(), DomError> {
        self.live(node)?;
        if node == self.root() {
            return Err(DomError::Hierarchy("the document node cannot be released"));
        }
        if self.tree.parent(node).is_some() {
            return Err(DomError::Hierarchy("only detached nodes can be released"));
        }
        let subtree = self.tree.subtree(node);
        debug!(target: "dom_query", "releasing {} node(s) rooted at {node:?}", subtree.len());
        let caches = self.caches.get_mut();
        for id in subtree {
            caches.remove(&id);
        }
        node.remove_subtree(&mut self.tree.nodes);
        Ok(())
    }

    // ---- attribute and text edits ----

    /// Set attribute `name` on `element`. HTML documents store the name
    /// lowercased.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = self.tree.fold_name(name);
        let node = self.tree.node_mut(element).ok_or(DomError::StaleNode(element))?;
        let NodeKind::Element { attrs, .. } = node else {
            return Err(DomError::NotAnElement(element));
        };
        let old_value = match attrs.iter_mut().find(|(attr_name, _)| *attr_name == name) {
            Some((_, current)) => Some(replace(current, value.to_owned())),
            None => {
                attrs.push((name.clone(), value.to_owned()));
                None
            }
        };
        self.tracker.notify_attribute_change(element, &name);
        self.dispatch(&MutationRecord::Attributes {
            target: element,
            name,
            old_value,
        });
        Ok(())
    }

    /// Remove attribute `name` from `element`. Removing an absent attribute
    /// is not an edit and bumps nothing.
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<(), DomError> {
        let name = self.tree.fold_name(name);
        let node = self.tree.node_mut(element).ok_or(DomError::StaleNode(element))?;
        let NodeKind::Element { attrs, .. } = node else {
            return Err(DomError::NotAnElement(element));
        };
        let Some(position) = attrs.iter().position(|(attr_name, _)| *attr_name == name) else {
            return Ok(());
        };
        let (_, old_value) = attrs.remove(position);
        self.tracker.notify_attribute_change(element, &name);
        self.dispatch(&MutationRecord::Attributes {
            target: element,
            name,
            old_value: Some(old_value),
        });
        Ok(())
    }

    /// Replace the text of a text or comment node. Counted as a structural
    /// change since it can flip `:empty`.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let data = self.tree.node_mut(node).ok_or(DomError::StaleNode(node))?;
        let (NodeKind::Text { text: current } | NodeKind::Comment { text: current }) = data else {
            return Err(DomError::NotCharacterData(node));
        };
        let old_value = replace(current, text.to_owned());
        self.tracker.notify_structural_change(node);
        self.dispatch(&MutationRecord::CharacterData {
            target: node,
            old_value,
        });
        Ok(())
    }

    // ---- observers ----

    /// Register a callback invoked synchronously after every edit.
    pub fn observe(&mut self, callback: impl FnMut(&Self, &MutationRecord) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer = self.next_observer.saturating_add(1);
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Remove a registration. Returns whether it existed.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer, _)| *observer != id);
        self.observers.len() != before
    }

    fn dispatch(&mut self, record: &MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        debug!(target: "dom_query", "dispatching {record:?} to {} observer(s)", self.observers.len());
        let mut observers = take(&mut self.observers);
        for (_, callback) in &mut observers {
            callback(self, record);
        }
        self.observers = observers;
    }
}
