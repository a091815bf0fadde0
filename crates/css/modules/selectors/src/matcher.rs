//! CSS selector matching engine.
//! See <https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element>

use crate::{
    Combinator, ComplexSelector, CompoundSelector, ElementAdapter, NthFormula, PseudoClass,
    SelectorList,
};

/// Form controls that take part in `:enabled` / `:disabled`.
const FORM_CONTROLS: [&str; 7] = [
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

/// Elements that take part in `:required` / `:optional`.
const REQUIRABLE: [&str; 3] = ["input", "select", "textarea"];

/// Match a selector list against an element.
/// Selectors 4 §4.1: an element matches a list if it matches any member
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element.
/// Selectors 4 §3.1, 16: Right-to-left matching strategy
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    match sel.compounds.len().checked_sub(1) {
        Some(subject) => match_from(adapter, &sel.compounds, subject, element),
        None => false,
    }
}

/// Match `compounds[..=index]` with `compounds[index]` pinned to `element`.
///
/// Descendant and general-sibling combinators try every candidate from the
/// nearest outward, so a candidate that satisfies its own compound but not
/// the rest of the chain does not end the search.
fn match_from<A: ElementAdapter>(
    adapter: &A,
    compounds: &[CompoundSelector],
    index: usize,
    element: A::Handle,
) -> bool {
    let Some(compound) = compounds.get(index) else {
        return false;
    };
    if !matches_compound(adapter, element, compound) {
        return false;
    }
    let Some(left_index) = index.checked_sub(1) else {
        return true;
    };
    let Some(combinator) = compounds.get(left_index).and_then(|left| left.combinator) else {
        return false;
    };

    match combinator {
        Combinator::Descendant => {
            let mut current_parent = adapter.parent_element(element);
            while let Some(ancestor_element) = current_parent {
                if match_from(adapter, compounds, left_index, ancestor_element) {
                    return true;
                }
                current_parent = adapter.parent_element(ancestor_element);
            }
            false
        }
        Combinator::Child => adapter
            .parent_element(element)
            .is_some_and(|parent_el| match_from(adapter, compounds, left_index, parent_el)),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(|prev_el| match_from(adapter, compounds, left_index, prev_el)),
        Combinator::GeneralSibling => {
            let mut current_sibling = adapter.previous_sibling_element(element);
            while let Some(sibling_element) = current_sibling {
                if match_from(adapter, compounds, left_index, sibling_element) {
                    return true;
                }
                current_sibling = adapter.previous_sibling_element(sibling_element);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
/// Selectors 4 §5–7, 12–15
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    if let Some(type_name) = &compound.tag
        && !same_tag(adapter, adapter.tag_name(element), type_name)
    {
        return false;
    }
    if let Some(id_value) = &compound.id
        && adapter
            .element_id(element)
            .is_none_or(|value| value != id_value.as_str())
    {
        return false;
    }
    if !compound
        .classes
        .iter()
        .all(|class_name| adapter.has_class(element, class_name))
    {
        return false;
    }
    if !compound
        .attributes
        .iter()
        .all(|attribute| attribute.matches(adapter.attr(element, &attribute.name)))
    {
        return false;
    }
    compound
        .pseudos
        .iter()
        .all(|pseudo| matches_pseudo(adapter, element, pseudo))
}

/// Evaluate one pseudo-class.
/// Selectors 4 §4 (logical), 12 (input), 14 (tree-structural)
fn matches_pseudo<A: ElementAdapter>(adapter: &A, element: A::Handle, pseudo: &PseudoClass) -> bool {
    match pseudo {
        PseudoClass::Not(list) => !matches_selector_list(adapter, element, list),
        PseudoClass::Is(list) | PseudoClass::Where(list) => {
            matches_selector_list(adapter, element, list)
        }
        PseudoClass::NthChild { formula, of } => {
            nth_position(adapter, element, of.as_ref(), Direction::Forward)
                .is_some_and(|position| formula.matches(position))
        }
        PseudoClass::NthLastChild { formula, of } => {
            nth_position(adapter, element, of.as_ref(), Direction::Backward)
                .is_some_and(|position| formula.matches(position))
        }
        PseudoClass::NthOfType(formula) => {
            of_type_position(adapter, element, Direction::Forward, *formula)
        }
        PseudoClass::NthLastOfType(formula) => {
            of_type_position(adapter, element, Direction::Backward, *formula)
        }
        PseudoClass::FirstChild => adapter.previous_sibling_element(element).is_none(),
        PseudoClass::LastChild => adapter.next_sibling_element(element).is_none(),
        PseudoClass::OnlyChild => {
            adapter.previous_sibling_element(element).is_none()
                && adapter.next_sibling_element(element).is_none()
        }
        PseudoClass::FirstOfType => {
            of_type_position(adapter, element, Direction::Forward, NthFormula::new(0, 1))
        }
        PseudoClass::LastOfType => {
            of_type_position(adapter, element, Direction::Backward, NthFormula::new(0, 1))
        }
        PseudoClass::OnlyOfType => {
            of_type_position(adapter, element, Direction::Forward, NthFormula::new(0, 1))
                && of_type_position(adapter, element, Direction::Backward, NthFormula::new(0, 1))
        }
        PseudoClass::Empty => adapter.is_empty(element),
        PseudoClass::Root => adapter.is_root(element),
        PseudoClass::Checked => {
            (tag_is(adapter, element, "input") && adapter.attr(element, "checked").is_some())
                || (tag_is(adapter, element, "option")
                    && adapter.attr(element, "selected").is_some())
        }
        PseudoClass::Disabled => {
            tag_in(adapter, element, &FORM_CONTROLS) && adapter.attr(element, "disabled").is_some()
        }
        PseudoClass::Enabled => {
            tag_in(adapter, element, &FORM_CONTROLS) && adapter.attr(element, "disabled").is_none()
        }
        PseudoClass::Required => {
            tag_in(adapter, element, &REQUIRABLE) && adapter.attr(element, "required").is_some()
        }
        PseudoClass::Optional => {
            tag_in(adapter, element, &REQUIRABLE) && adapter.attr(element, "required").is_none()
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

#[inline]
fn step_sibling<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    direction: Direction,
) -> Option<A::Handle> {
    match direction {
        Direction::Forward => adapter.previous_sibling_element(element),
        Direction::Backward => adapter.next_sibling_element(element),
    }
}

/// 1-based element-sibling position counted from the start (`Forward`) or
/// the end (`Backward`), restricted to siblings matching `of` when present.
/// `None` when the element itself does not match `of`.
/// Selectors 4 §14.4: child-indexed pseudo-classes
fn nth_position<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    of: Option<&SelectorList>,
    direction: Direction,
) -> Option<usize> {
    if of.is_some_and(|list| !matches_selector_list(adapter, element, list)) {
        return None;
    }
    let mut position = 1_usize;
    let mut current = step_sibling(adapter, element, direction);
    while let Some(sibling) = current {
        if of.is_none_or(|list| matches_selector_list(adapter, sibling, list)) {
            position = position.saturating_add(1);
        }
        current = step_sibling(adapter, sibling, direction);
    }
    Some(position)
}

/// Position among siblings with the same type, tested against `formula`.
/// Selectors 4 §14.5: typed child-indexed pseudo-classes
fn of_type_position<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    direction: Direction,
    formula: NthFormula,
) -> bool {
    let own_tag = adapter.tag_name(element);
    let mut position = 1_usize;
    let mut current = step_sibling(adapter, element, direction);
    while let Some(sibling) = current {
        if same_tag(adapter, adapter.tag_name(sibling), own_tag) {
            position = position.saturating_add(1);
        }
        current = step_sibling(adapter, sibling, direction);
    }
    formula.matches(position)
}

#[inline]
fn same_tag<A: ElementAdapter>(adapter: &A, actual: &str, expected: &str) -> bool {
    if adapter.tag_names_case_insensitive() {
        actual.eq_ignore_ascii_case(expected)
    } else {
        actual == expected
    }
}

#[inline]
fn tag_is<A: ElementAdapter>(adapter: &A, element: A::Handle, name: &str) -> bool {
    same_tag(adapter, adapter.tag_name(element), name)
}

#[inline]
fn tag_in<A: ElementAdapter>(adapter: &A, element: A::Handle, names: &[&str]) -> bool {
    let tag = adapter.tag_name(element);
    names.iter().any(|name| same_tag(adapter, tag, name))
}

/// Preorder iterator over the element descendants of a root (the root
/// itself excluded).
pub struct Descendants<'adapter, A: ElementAdapter> {
    adapter: &'adapter A,
    root: A::Handle,
    next: Option<A::Handle>,
}

impl<A: ElementAdapter> Iterator for Descendants<'_, A> {
    type Item = A::Handle;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.adapter.first_child_element(current).or_else(|| {
            let mut node = current;
            loop {
                if node == self.root {
                    return None;
                }
                if let Some(sibling) = self.adapter.next_sibling_element(node) {
                    return Some(sibling);
                }
                node = self.adapter.parent_element(node)?;
            }
        });
        Some(current)
    }
}

/// Walk the element descendants of `root` in document order.
pub fn descendants<A: ElementAdapter>(adapter: &A, root: A::Handle) -> Descendants<'_, A> {
    Descendants {
        adapter,
        root,
        next: adapter.first_child_element(root),
    }
}

/// First descendant of `root` in document order that matches `list`.
pub fn find_first<A: ElementAdapter>(
    adapter: &A,
    root: A::Handle,
    list: &SelectorList,
) -> Option<A::Handle> {
    descendants(adapter, root).find(|&element| matches_selector_list(adapter, element, list))
}

/// Every descendant of `root` that matches `list`, in document order.
pub fn find_all<A: ElementAdapter>(
    adapter: &A,
    root: A::Handle,
    list: &SelectorList,
) -> Vec<A::Handle> {
    descendants(adapter, root)
        .filter(|&element| matches_selector_list(adapter, element, list))
        .collect()
}
