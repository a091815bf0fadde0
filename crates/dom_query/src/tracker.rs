//! Mutation tracker: the document-owned generation pair.

use crate::revision::{Generation, RevisionCounter};
use indextree::NodeId;
use log::trace;

/// Generation counters of one document. Edits anywhere in the document bump
/// the matching counter; no attempt is made to scope a bump to a subtree.
#[derive(Debug, Default)]
pub struct MutationTracker {
    structural: RevisionCounter,
    attribute: RevisionCounter,
}

impl MutationTracker {
    /// Record an insertion, removal, reorder or text change below `changed`.
    pub fn notify_structural_change(&self, changed: NodeId) {
        let revision = self.structural.increment();
        trace!(target: "dom_query", "structural change at {changed:?} -> s{}", revision.get());
    }

    /// Record an attribute write or removal on `changed`.
    pub fn notify_attribute_change(&self, changed: NodeId, name: &str) {
        let revision = self.attribute.increment();
        trace!(target: "dom_query", "attribute '{name}' changed on {changed:?} -> a{}", revision.get());
    }

    /// The pair a result computed right now would be stamped with.
    #[inline]
    pub fn generation(&self) -> Generation {
        Generation {
            structural: self.structural.current(),
            attribute: self.attribute.current(),
        }
    }
}
