mod common;

use anyhow::Result;
use common::{ListPage, element, init_logger};
use dom_query::{Document, DocumentMode, DomError, QueryConfig, QueryError, SyntaxError};
use std::time::{Duration, Instant};

#[test]
fn get_element_by_id_returns_the_first_in_document_order() -> Result<()> {
    init_logger();
    let ListPage { mut doc, body, items, .. } = ListPage::build(3)?;
    doc.set_attribute(items[2], "id", "dup")?;
    let late = element(&mut doc, body, "p", &[("id", "dup")])?;

    assert_eq!(doc.get_element_by_id("dup"), Some(items[2]));
    assert_eq!(doc.get_element_by_id("list"), doc.parent(items[0]));
    assert_eq!(doc.get_element_by_id(""), None);
    assert_eq!(doc.get_element_by_id("DUP"), None);

    doc.remove_attribute(items[2], "id")?;
    assert_eq!(doc.get_element_by_id("dup"), Some(late));
    Ok(())
}

#[test]
fn tag_name_lookups_follow_document_mode() -> Result<()> {
    init_logger();
    let ListPage { doc, list, items, .. } = ListPage::build(4)?;
    assert_eq!(doc.get_elements_by_tag_name(doc.root(), "LI")?, items);
    assert_eq!(doc.get_elements_by_tag_name(list, "li")?, items);
    assert_eq!(doc.get_elements_by_tag_name(doc.root(), "*")?.len(), 7);
    assert!(doc.get_elements_by_tag_name(list, "ul")?.is_empty());

    let mut xml = Document::with_config(QueryConfig::new(DocumentMode::Xml, true, 16));
    let root = xml.root();
    let feed = element(&mut xml, root, "Feed", &[("Lang", "en")])?;
    let entry = element(&mut xml, feed, "entry", &[])?;
    assert_eq!(xml.get_elements_by_tag_name(root, "Feed")?, vec![feed]);
    assert!(xml.get_elements_by_tag_name(root, "feed")?.is_empty());
    assert_eq!(xml.query_selector_all(root, "entry")?, vec![entry]);
    assert!(xml.query_selector_all(root, "ENTRY")?.is_empty());
    assert!(xml.query_selector(root, "[lang]")?.is_none());
    assert_eq!(xml.query_selector(root, "[Lang]")?, Some(feed));
    Ok(())
}

#[test]
fn class_name_lookups_require_every_class() -> Result<()> {
    init_logger();
    let ListPage { mut doc, list, items, .. } = ListPage::build(3)?;
    doc.set_attribute(items[1], "class", "item  active\tbig")?;
    assert_eq!(doc.get_elements_by_class_name(list, "item")?, items);
    assert_eq!(doc.get_elements_by_class_name(list, " active item ")?, vec![items[1]]);
    assert!(doc.get_elements_by_class_name(list, "item missing")?.is_empty());
    assert!(doc.get_elements_by_class_name(list, "   ")?.is_empty());
    Ok(())
}

#[test]
fn query_selector_is_scoped_to_descendants_of_the_root() -> Result<()> {
    init_logger();
    let ListPage { doc, list, items, .. } = ListPage::build(5)?;
    assert_eq!(doc.query_selector(list, "li")?, Some(items[0]));
    assert_eq!(doc.query_selector(list, "body li:nth-child(odd)")?, Some(items[0]));
    assert_eq!(
        doc.query_selector_all(list, "li:nth-child(2n+1)")?,
        vec![items[0], items[2], items[4]]
    );
    assert_eq!(doc.query_selector(list, "ul")?, None);
    assert_eq!(doc.query_selector(doc.root(), "html > body > #list")?, Some(list));
    assert_eq!(doc.query_selector(doc.root(), ":root > body")?, doc.parent(list));
    Ok(())
}

#[test]
fn html_documents_fold_names_on_storage() -> Result<()> {
    init_logger();
    let mut doc = Document::new();
    let root = doc.root();
    let div = element(&mut doc, root, "DIV", &[("DATA-X", "ABCD")])?;
    assert_eq!(doc.tag_name(div), Some("div"));
    assert_eq!(doc.attribute(div, "data-x"), Some("ABCD"));
    assert_eq!(doc.query_selector(root, "Div[Data-X^=\"ab\" i]")?, Some(div));
    assert_eq!(doc.query_selector(root, "[data-x^=\"ab\"]")?, None);
    Ok(())
}

#[test]
fn matches_and_closest() -> Result<()> {
    init_logger();
    let ListPage { doc, body, list, items } = ListPage::build(3)?;
    assert!(doc.matches(items[1], "ul > li.item:nth-child(2)")?);
    assert!(!doc.matches(items[1], "li:first-child")?);
    assert_eq!(doc.closest(items[1], "ul")?, Some(list));
    assert_eq!(doc.closest(items[1], "li")?, Some(items[1]));
    assert_eq!(doc.closest(items[1], "body, ul")?, Some(list));
    assert_eq!(doc.closest(list, ":not(ul)")?, Some(body));
    assert_eq!(doc.closest(items[1], "table")?, None);
    Ok(())
}

#[test]
fn errors_are_reported_not_swallowed() -> Result<()> {
    init_logger();
    let ListPage { mut doc, body, list, items } = ListPage::build(2)?;
    assert_eq!(
        doc.query_selector_all(list, "li >"),
        Err(QueryError::Syntax(SyntaxError::DanglingCombinator {
            combinator: '>',
            position: 3
        }))
    );
    assert!(matches!(
        doc.query_selector(list, ":hover"),
        Err(QueryError::Syntax(SyntaxError::UnknownPseudoClass(_)))
    ));
    assert!(matches!(
        doc.matches(items[0], "li:nth-child(n+)"),
        Err(QueryError::Syntax(SyntaxError::InvalidNth(_)))
    ));

    let label = doc.children(items[0])[0];
    assert_eq!(
        doc.matches(label, "li"),
        Err(QueryError::Dom(DomError::NotAnElement(label)))
    );

    doc.remove_child(body, list)?;
    doc.release(list)?;
    assert_eq!(
        doc.query_selector_all(list, "li"),
        Err(QueryError::Dom(DomError::StaleNode(list)))
    );
    assert_eq!(doc.closest(items[0], "ul"), Err(QueryError::Dom(DomError::StaleNode(items[0]))));
    Ok(())
}

#[test]
fn tree_edits_validate_their_arguments() -> Result<()> {
    init_logger();
    let ListPage { mut doc, body, list, items } = ListPage::build(2)?;
    let root = doc.root();
    assert!(matches!(doc.append_child(items[0], body), Err(DomError::Hierarchy(_))));
    assert!(matches!(doc.append_child(list, list), Err(DomError::Hierarchy(_))));
    assert!(matches!(doc.append_child(body, root), Err(DomError::Hierarchy(_))));
    let text = doc.children(items[0])[0];
    let span = doc.create_element("span");
    assert!(matches!(doc.append_child(text, span), Err(DomError::Hierarchy(_))));
    assert_eq!(
        doc.insert_before(list, span, Some(body)),
        Err(DomError::NotAChild { parent: list, child: body })
    );
    assert_eq!(
        doc.remove_child(body, items[0]),
        Err(DomError::NotAChild { parent: body, child: items[0] })
    );
    assert_eq!(doc.set_attribute(text, "id", "x"), Err(DomError::NotAnElement(text)));
    assert_eq!(doc.set_text(span, "x"), Err(DomError::NotCharacterData(span)));
    assert!(matches!(doc.release(list), Err(DomError::Hierarchy(_))));
    assert!(matches!(doc.release(root), Err(DomError::Hierarchy(_))));
    Ok(())
}

#[test]
fn insert_before_orders_children() -> Result<()> {
    init_logger();
    let ListPage { mut doc, list, items, .. } = ListPage::build(2)?;
    let first = doc.create_element("li");
    doc.insert_before(list, first, Some(items[0]))?;
    assert_eq!(doc.query_selector_all(list, "li")?, vec![first, items[0], items[1]]);
    assert_eq!(doc.query_selector(list, "li:first-child")?, Some(first));

    // Moving an existing child reorders it.
    doc.insert_before(list, items[1], Some(first))?;
    assert_eq!(doc.query_selector_all(list, "li")?, vec![items[1], first, items[0]]);
    assert_eq!(doc.previous_sibling(first), Some(items[1]));
    assert!(doc.contains(list, items[0]));
    Ok(())
}

#[test]
fn navigation_reports_every_node_kind() -> Result<()> {
    init_logger();
    let ListPage { mut doc, list, items, .. } = ListPage::build(1)?;
    let note = doc.create_comment("note");
    doc.append_child(list, note)?;
    let children = doc.children(list).to_vec();
    assert_eq!(children.len(), 3);
    assert_eq!(doc.first_child(list), Some(children[0]));
    assert_eq!(doc.text(children[0]), Some("\n  "));
    assert_eq!(doc.next_sibling(children[0]), Some(items[0]));
    assert_eq!(doc.next_sibling(items[0]), Some(note));
    assert_eq!(doc.next_sibling(note), None);
    assert_eq!(doc.text(note), Some("note"));
    assert!(!doc.is_element(note));
    assert!(doc.is_element(items[0]));
    assert_eq!(doc.tag_name(note), None);
    Ok(())
}

#[test]
fn wide_sibling_lists_stay_cheap_to_navigate() -> Result<()> {
    init_logger();
    let ListPage { doc, list, items, .. } = ListPage::build(3000)?;
    let started = Instant::now();

    let odd = doc.query_selector_all(list, "li:nth-child(odd)")?;
    let expected: Vec<_> = items.iter().copied().step_by(2).collect();
    assert_eq!(odd, expected);
    let last = items.last().copied();
    assert_eq!(doc.query_selector_all(list, "li:last-child")?, last.into_iter().collect::<Vec<_>>());
    assert_eq!(doc.query_selector(list, "li:nth-last-child(2)")?, items.get(2998).copied());

    let elapsed = started.elapsed();
    assert!(elapsed < Duration::from_secs(2), "wide list queries took {elapsed:?}");
    Ok(())
}
