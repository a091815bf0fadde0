//! Attribute selectors.
//! Selectors 4 §6: Attribute selectors

/// Operator of an attribute selector.
/// Selectors 4 §6.1, 6.2
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[name]`
    Exists,
    /// `[name=value]`
    Equals,
    /// `[name~=value]`: whitespace-separated token membership
    Includes,
    /// `[name|=value]`: exact or `value-` prefix
    DashMatch,
    /// `[name^=value]`
    Prefix,
    /// `[name$=value]`
    Suffix,
    /// `[name*=value]`
    Substring,
}

/// Case-sensitivity modifier.
/// Selectors 4 §6.3
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AttrCase {
    /// No modifier: values compare case-sensitively.
    #[default]
    Default,
    /// `s`
    Sensitive,
    /// `i`: ASCII case-insensitive.
    Insensitive,
}

/// A compiled attribute predicate. Operator and case modifier are fixed at
/// compile time; for `i` the expected value is stored already folded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: AttrOperator,
    pub value: String,
    pub case: AttrCase,
}

impl AttributeSelector {
    /// Build a predicate, folding the expected value when the `i` modifier
    /// is present.
    pub fn new(name: String, operator: AttrOperator, value: String, case: AttrCase) -> Self {
        let value = if case == AttrCase::Insensitive {
            value.to_ascii_lowercase()
        } else {
            value
        };
        Self {
            name,
            operator,
            value,
            case,
        }
    }

    /// Test an attribute value (`None` when the attribute is absent).
    pub fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        if self.operator == AttrOperator::Exists {
            return true;
        }
        if self.case == AttrCase::Insensitive {
            self.matches_value(&actual.to_ascii_lowercase())
        } else {
            self.matches_value(actual)
        }
    }

    fn matches_value(&self, actual: &str) -> bool {
        let expected = self.value.as_str();
        match self.operator {
            AttrOperator::Exists => true,
            AttrOperator::Equals => actual == expected,
            AttrOperator::Includes => {
                !expected.is_empty()
                    && !expected.contains(|ch: char| ch.is_ascii_whitespace())
                    && actual.split_ascii_whitespace().any(|token| token == expected)
            }
            AttrOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttrOperator::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}
