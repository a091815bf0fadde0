//! Selectors Level 4 subset: compilation and element matching.
//! See <https://www.w3.org/TR/selectors-4/>
//!
//! This crate compiles selector text into a tree-independent [`SelectorList`]
//! and evaluates it against any tree that implements [`ElementAdapter`]:
//! - Type, universal, class, id and attribute selectors (all seven operators,
//!   with `i`/`s` case modifiers)
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - Structural and form pseudo-classes, `:not()`, `:is()`, `:where()` and
//!   `:nth-*()` with `An+B [of S]`
//! - A memo of compiled selectors keyed by selector text
//!
//! Each item notes the Selectors 4 section it implements where one applies.

mod attribute;
mod cache;
mod error;
mod matcher;
mod nth;
mod parser;

pub use attribute::{AttrCase, AttrOperator, AttributeSelector};
pub use cache::SelectorCache;
pub use error::SyntaxError;
pub use matcher::{
    Descendants, descendants, find_all, find_first, matches_complex, matches_compound,
    matches_selector_list,
};
pub use nth::NthFormula;
pub use parser::parse_selector_list;

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
///
/// Every navigation method only ever yields element handles: text, comment
/// and document nodes are skipped by the implementation.
///
/// See Selectors 4 §3: Selectors overview and element matching
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any. The document node is not an element.
    /// Selectors 4 §16: Combinators (for tree relationships)
    fn parent_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Nearest preceding sibling that is an element.
    /// Selectors 4 §16.3/16.4: Sibling combinators
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Nearest following sibling that is an element.
    fn next_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// First child that is an element.
    fn first_child_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name as stored by the tree.
    /// Selectors 4 §5.1: Type selectors
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Whether type selectors compare tag names ASCII case-insensitively
    /// (true for HTML documents).
    fn tag_names_case_insensitive(&self) -> bool;

    /// Returns Some(id) if the element has an id attribute, else None.
    /// Selectors 4 §7.2: ID selectors
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element has the given class token.
    /// Selectors 4 §7.1: Class selectors
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present.
    /// Selectors 4 §6: Attribute selectors
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// True if the element has no element children and no non-empty text.
    /// Selectors 4 §14.2: `:empty`
    fn is_empty(&self, element: Self::Handle) -> bool;

    /// True if the element's parent is the document node.
    /// Selectors 4 §14.1: `:root`
    fn is_root(&self, element: Self::Handle) -> bool {
        self.parent_element(element).is_none()
    }
}

/// Combinators between compounds.
/// Selectors 4 §16: Combinators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the immediate parent.
    Child,
    /// `+`: the immediately preceding element sibling.
    AdjacentSibling,
    /// `~`: any preceding element sibling.
    GeneralSibling,
}

/// Pseudo-classes understood by the parser. Each arm carries only the data
/// its shape needs: a nested selector list, an `An+B` formula, or nothing.
/// Selectors 4 §4, 12–15
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:not(S)`
    Not(SelectorList),
    /// `:is(S)`
    Is(SelectorList),
    /// `:where(S)`
    Where(SelectorList),
    /// `:nth-child(An+B [of S])`
    NthChild {
        formula: NthFormula,
        of: Option<SelectorList>,
    },
    /// `:nth-last-child(An+B [of S])`
    NthLastChild {
        formula: NthFormula,
        of: Option<SelectorList>,
    },
    /// `:nth-of-type(An+B)`
    NthOfType(NthFormula),
    /// `:nth-last-of-type(An+B)`
    NthLastOfType(NthFormula),
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
    Root,
    Checked,
    Disabled,
    Enabled,
    Required,
    Optional,
}

/// A compound selector: every simple selector that constrains one element.
/// Selectors 4 §3.1: Compound selectors
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// Type constraint; `None` for `*` or when no type selector is present.
    pub tag: Option<String>,
    /// Id constraint.
    pub id: Option<String>,
    /// Class tokens that must all be present.
    pub classes: Vec<String>,
    /// Attribute predicates, in source order.
    pub attributes: Vec<AttributeSelector>,
    /// Pseudo-class predicates, in source order.
    pub pseudos: Vec<PseudoClass>,
    /// Combinator joining this compound to the next one toward the subject.
    /// `None` on the subject (rightmost) compound.
    pub combinator: Option<Combinator>,
}

/// A complex selector: compounds joined by combinators, stored left to
/// right. The last compound is the subject.
/// Selectors 4 §3.1: Complex selectors
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
}

impl ComplexSelector {
    /// The rightmost compound, which constrains the candidate element itself.
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.compounds.last()
    }
}

/// A selector list separated by commas. An element matches the list if it
/// matches any member.
/// Selectors 4 §4.1: Selector lists
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}
