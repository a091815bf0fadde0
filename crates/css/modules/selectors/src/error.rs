//! Selector syntax errors.
//! Selectors 4 §4.1: an invalid selector invalidates the whole list

use thiserror::Error;

/// Why a selector text failed to compile. Compilation is all-or-nothing:
/// a caller never receives a partially compiled selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("selector is empty")]
    Empty,

    #[error("combinator '{combinator}' at offset {position} has no selector on one side")]
    DanglingCombinator { combinator: char, position: usize },

    #[error("empty compound selector at offset {position}")]
    EmptyCompound { position: usize },

    #[error("expected an identifier at offset {position}")]
    ExpectedIdentifier { position: usize },

    #[error("unexpected '{found}' at offset {position}")]
    UnexpectedToken { found: char, position: usize },

    /// An opener without its closer, or a closer without its opener.
    #[error("unbalanced '{bracket}' at offset {position}")]
    Unbalanced { bracket: char, position: usize },

    #[error("unterminated string starting at offset {position}")]
    UnterminatedString { position: usize },

    #[error("unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),

    #[error("malformed An+B expression '{0}'")]
    InvalidNth(String),

    #[error("malformed attribute selector at offset {position}: {reason}")]
    InvalidAttribute { position: usize, reason: &'static str },
}
