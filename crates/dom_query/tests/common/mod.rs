//! Shared fixtures for the query integration tests.

use dom_query::{Document, DomError, NodeId};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create an element with attributes and append it to `parent`.
pub fn element(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    attrs: &[(&str, &str)],
) -> Result<NodeId, DomError> {
    let node = doc.create_element(tag);
    for (name, value) in attrs {
        doc.set_attribute(node, name, value)?;
    }
    doc.append_child(parent, node)?;
    Ok(node)
}

/// `<html><body><ul id="list"><li class="item">…</li>×count</ul></body></html>`
pub struct ListPage {
    pub doc: Document,
    pub body: NodeId,
    pub list: NodeId,
    pub items: Vec<NodeId>,
}

impl ListPage {
    pub fn build(count: usize) -> Result<Self, DomError> {
        Self::build_in(Document::new(), count)
    }

    pub fn build_in(mut doc: Document, count: usize) -> Result<Self, DomError> {
        let root = doc.root();
        let html = element(&mut doc, root, "html", &[])?;
        let body = element(&mut doc, html, "body", &[])?;
        let list = element(&mut doc, body, "ul", &[("id", "list")])?;
        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let whitespace = doc.create_text("\n  ");
            doc.append_child(list, whitespace)?;
            let item = element(&mut doc, list, "li", &[("class", "item")])?;
            let label = doc.create_text(&format!("item {index}"));
            doc.append_child(item, label)?;
            items.push(item);
        }
        Ok(Self {
            doc,
            body,
            list,
            items,
        })
    }
}
