//! Cached element lookups and selector queries over a document tree.
//!
//! A [`Document`] owns its nodes in an `indextree` arena and a pair of generation
//! counters bumped by every structural and attribute edit. Query operations
//! (`get_element_by_id`, `get_elements_by_tag_name`,
//! `get_elements_by_class_name`, `query_selector`, `query_selector_all`,
//! `matches`, `closest`) are memoized per query root and served from the
//! cache for as long as the generation pair is unchanged and every cached
//! node handle still resolves.

mod cache;
mod config;
mod document;
mod error;
mod observer;
mod query;
mod revision;
mod stats;
mod tracker;
mod tree;

pub use cache::{CachedResult, Lookup, QueryCache, QueryKind};
pub use config::{DEFAULT_SELECTOR_CACHE_CAPACITY, DocumentMode, QueryConfig};
pub use css_selectors::SyntaxError;
pub use document::Document;
pub use error::{DomError, QueryError};
pub use indextree::NodeId;
pub use observer::{MutationRecord, ObserverCallback, ObserverId};
pub use revision::{Generation, Revision};
pub use stats::QueryStats;
