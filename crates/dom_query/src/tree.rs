//! Node storage and navigation, and the selector engine's view of it.
//!
//! Nodes live in an [`indextree::Arena`]. Its ids carry a stamp, so a handle
//! taken before a node was removed no longer resolves, even after the slot is
//! reused. That is what lets cache entries hold node handles without keeping
//! nodes alive.

use crate::config::DocumentMode;
use core::iter::successors;
use css_selectors::ElementAdapter;
use indextree::{Arena, Node, NodeId};
use smallvec::SmallVec;

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: SmallVec<(String, String), 4>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl NodeKind {
    #[inline]
    pub const fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }
}

/// The arena of a document together with its document node.
#[derive(Debug)]
pub struct Tree {
    pub nodes: Arena<NodeKind>,
    pub root: NodeId,
    pub mode: DocumentMode,
}

impl Tree {
    pub fn new(mode: DocumentMode) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.new_node(NodeKind::Document);
        Self { nodes, root, mode }
    }

    /// Arena entry of a live node; `None` for removed or reused handles.
    #[inline]
    fn links(&self, id: NodeId) -> Option<&Node<NodeKind>> {
        self.nodes.get(id).filter(|_| !id.is_removed(&self.nodes))
    }

    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.links(id).is_some()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&NodeKind> {
        self.links(id).map(Node::get)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        if !self.is_live(id) {
            return None;
        }
        self.nodes.get_mut(id).map(Node::get_mut)
    }

    #[inline]
    pub fn is_element_node(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(NodeKind::is_element)
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.links(id)?.parent()
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.links(id)?.first_child()
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.links(id)?.next_sibling()
    }

    #[inline]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.links(id)?.previous_sibling()
    }

    /// Child nodes of every kind, in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        successors(self.first_child(id), move |&child| self.next_sibling(child))
    }

    /// Fold a tag or attribute name the way this document stores it.
    pub fn fold_name(&self, name: &str) -> String {
        match self.mode {
            DocumentMode::Html => name.to_ascii_lowercase(),
            DocumentMode::Xml => name.to_owned(),
        }
    }

    pub fn attribute_value(&self, id: NodeId, name: &str) -> Option<&str> {
        let NodeKind::Element { attrs, .. } = self.node(id)? else {
            return None;
        };
        let html = self.mode == DocumentMode::Html;
        attrs
            .iter()
            .find(|(attr_name, _)| {
                if html {
                    attr_name.eq_ignore_ascii_case(name)
                } else {
                    attr_name == name
                }
            })
            .map(|(_, value)| value.as_str())
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        successors(Some(id), |&node| self.parent(node)).any(|node| node == ancestor)
    }

    /// `id` and every node below it, in preorder.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        if !self.is_live(id) {
            return Vec::new();
        }
        id.descendants(&self.nodes).collect()
    }
}

impl ElementAdapter for Tree {
    type Handle = NodeId;

    fn parent_element(&self, element: NodeId) -> Option<NodeId> {
        self.parent(element).filter(|&parent| self.is_element_node(parent))
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        successors(self.previous_sibling(element), |&sibling| self.previous_sibling(sibling))
            .find(|&sibling| self.is_element_node(sibling))
    }

    fn next_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        successors(self.next_sibling(element), |&sibling| self.next_sibling(sibling))
            .find(|&sibling| self.is_element_node(sibling))
    }

    fn first_child_element(&self, element: NodeId) -> Option<NodeId> {
        self.children(element).find(|&child| self.is_element_node(child))
    }

    fn tag_name(&self, element: NodeId) -> &str {
        match self.node(element) {
            Some(NodeKind::Element { tag, .. }) => tag,
            _ => "",
        }
    }

    fn tag_names_case_insensitive(&self) -> bool {
        self.mode == DocumentMode::Html
    }

    fn element_id(&self, element: NodeId) -> Option<&str> {
        self.attribute_value(element, "id")
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.attribute_value(element, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class))
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.attribute_value(element, name)
    }

    /// No element children and no non-empty text; comments are ignored.
    fn is_empty(&self, element: NodeId) -> bool {
        self.children(element).all(|child| match self.node(child) {
            Some(NodeKind::Text { text }) => text.is_empty(),
            Some(NodeKind::Comment { .. }) | None => true,
            Some(NodeKind::Element { .. } | NodeKind::Document) => false,
        })
    }

    fn is_root(&self, element: NodeId) -> bool {
        self.parent(element) == Some(self.root)
    }
}
