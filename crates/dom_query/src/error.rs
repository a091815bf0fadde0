use css_selectors::SyntaxError;
use indextree::NodeId;
use thiserror::Error;

/// Failures of tree edits and of node handles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} has been released")]
    StaleNode(NodeId),

    #[error("hierarchy violation: {0}")]
    Hierarchy(&'static str),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} is neither a text nor a comment node")]
    NotCharacterData(NodeId),
}

/// Failures of the public query operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Dom(#[from] DomError),
}
