//! Revision counters for cache validation.
//!
//! A document owns two counters: one for structural edits and one for
//! attribute edits. Every cache entry is stamped with the pair it was
//! computed under and is only served while the pair is unchanged.

use core::cell::Cell;
use core::fmt;

/// A point in a counter's history. Higher means more recent.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Revision(u64);

impl Revision {
    /// The revision of a document nobody has edited yet.
    pub const INITIAL: Self = Self(0);

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic revision counter. A document and its counters live on one
/// thread.
#[derive(Debug, Default)]
pub struct RevisionCounter {
    current: Cell<u64>,
}

impl RevisionCounter {
    #[inline]
    pub fn current(&self) -> Revision {
        Revision(self.current.get())
    }

    /// Advance the counter and return the new revision.
    #[inline]
    pub fn increment(&self) -> Revision {
        let next = self.current.get().saturating_add(1);
        self.current.set(next);
        Revision(next)
    }
}

/// The (structural, attribute) revision pair a result was computed under.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Generation {
    pub structural: Revision,
    pub attribute: Revision,
}

impl fmt::Display for Generation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "s{}/a{}", self.structural.0, self.attribute.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_move_forward() {
        let counter = RevisionCounter::default();
        assert_eq!(counter.current(), Revision::INITIAL);
        let first = counter.increment();
        let second = counter.increment();
        assert!(second > first);
        assert_eq!(counter.current(), second);
        assert_eq!(second.get(), 2);
    }
}
