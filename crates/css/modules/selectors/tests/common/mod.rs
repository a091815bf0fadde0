//! A tiny in-memory element tree implementing `ElementAdapter` for tests.

use css_selectors::ElementAdapter;

#[derive(Debug, Default)]
struct TestNode {
    tag: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Index 0 is the document node; everything else is an element or a text node.
#[derive(Debug)]
pub struct TestTree {
    nodes: Vec<TestNode>,
}

impl TestTree {
    pub const DOCUMENT: usize = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![TestNode::default()],
        }
    }

    pub fn element(&mut self, parent: usize, tag: &str, attrs: &[(&str, &str)]) -> usize {
        let index = self.nodes.len();
        self.nodes.push(TestNode {
            tag: tag.to_owned(),
            attrs: attrs
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
                .collect(),
            text: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        index
    }

    pub fn text(&mut self, parent: usize, text: &str) -> usize {
        let index = self.nodes.len();
        self.nodes.push(TestNode {
            text: Some(text.to_owned()),
            parent: Some(parent),
            ..TestNode::default()
        });
        self.nodes[parent].children.push(index);
        index
    }

    fn is_element(&self, index: usize) -> bool {
        index != Self::DOCUMENT && self.nodes[index].text.is_none()
    }

    fn sibling_element(&self, element: usize, forward: bool) -> Option<usize> {
        let parent = self.nodes[element].parent?;
        let siblings = &self.nodes[parent].children;
        let position = siblings.iter().position(|&child| child == element)?;
        if forward {
            siblings[position + 1..]
                .iter()
                .copied()
                .find(|&child| self.is_element(child))
        } else {
            siblings[..position]
                .iter()
                .rev()
                .copied()
                .find(|&child| self.is_element(child))
        }
    }
}

impl ElementAdapter for TestTree {
    type Handle = usize;

    fn parent_element(&self, element: usize) -> Option<usize> {
        self.nodes[element]
            .parent
            .filter(|&parent| self.is_element(parent))
    }

    fn previous_sibling_element(&self, element: usize) -> Option<usize> {
        self.sibling_element(element, false)
    }

    fn next_sibling_element(&self, element: usize) -> Option<usize> {
        self.sibling_element(element, true)
    }

    fn first_child_element(&self, element: usize) -> Option<usize> {
        self.nodes[element]
            .children
            .iter()
            .copied()
            .find(|&child| self.is_element(child))
    }

    fn tag_name(&self, element: usize) -> &str {
        &self.nodes[element].tag
    }

    fn tag_names_case_insensitive(&self) -> bool {
        true
    }

    fn element_id(&self, element: usize) -> Option<&str> {
        self.attr(element, "id")
    }

    fn has_class(&self, element: usize, class: &str) -> bool {
        self.attr(element, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class))
    }

    fn attr(&self, element: usize, name: &str) -> Option<&str> {
        self.nodes[element]
            .attrs
            .iter()
            .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn is_empty(&self, element: usize) -> bool {
        self.nodes[element].children.iter().all(|&child| {
            self.nodes[child]
                .text
                .as_deref()
                .is_some_and(str::is_empty)
        })
    }

    fn is_root(&self, element: usize) -> bool {
        self.nodes[element].parent == Some(Self::DOCUMENT)
    }
}
