//! Content-addressed string storage with term search.
//!
//! Every link (an opaque 64-bit identifier supplied by the graph) may carry a
//! byte string. Identical strings are stored once in append-only channel
//! files; three tries index them:
//!
//! - term → offsets of the strings containing the term,
//! - offset → links sharing the string at that offset (the content group),
//! - link → offset of its string.
//!
//! [`StringStorage`] is the entry point. It dispatches to a [`StringEngine`],
//! by default the trie-backed [`DictionaryEngine`]. Searches either collect
//! their results or stream them into a [`LinkFilter`] that can reject links
//! and stop the search early.

pub mod content;
pub mod engine;
pub mod filter;
pub mod index;
pub mod link;
pub mod options;
pub mod storage;

pub use engine::{DictionaryEngine, StorageStats, StringEngine};
pub use filter::LinkFilter;
pub use index::TermMatch;
pub use link::LinkId;
pub use options::StoreOptions;
pub use storage::StringStorage;
