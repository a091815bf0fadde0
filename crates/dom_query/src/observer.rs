//! Synchronous mutation notifications.

use crate::document::Document;
use indextree::NodeId;

/// What a tree edit changed. Delivered after the edit is applied and the
/// generation pair has been bumped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    /// Children of `target` were inserted or removed.
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// Attribute `name` of `target` was set or removed.
    Attributes {
        target: NodeId,
        name: String,
        old_value: Option<String>,
    },
    /// The text of a text or comment node was replaced.
    CharacterData { target: NodeId, old_value: String },
}

impl MutationRecord {
    pub const fn target(&self) -> NodeId {
        match self {
            Self::ChildList { target, .. }
            | Self::Attributes { target, .. }
            | Self::CharacterData { target, .. } => *target,
        }
    }
}

/// Registration handle returned by [`Document::observe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

pub type ObserverCallback = Box<dyn FnMut(&Document, &MutationRecord)>;
