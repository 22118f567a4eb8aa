//! Backing engines of the string storage.

mod dictionary;
mod legacy;
mod persist;
mod search;

pub use dictionary::DictionaryEngine;
pub use legacy::LEGACY_FILE;
pub use persist::{GROUPS_FILE, TERMS_FILE};

use lexis_common::Result;
use serde::Serialize;

use crate::{
    filter::{Collect, LinkFilter},
    index::TermMatch,
    link::LinkId,
};

/// Operations a storage engine provides to [`StringStorage`](crate::StringStorage).
///
/// Engines are shared between threads; every method takes `&self` and
/// synchronizes internally. Lookup misses are empty results, not errors.
/// The searches returning vectors collect what the `visit_*` searches stream.
pub trait StringEngine: Send + Sync {
    /// Engine name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Attaches `content` to `link`, replacing the content it had before.
    /// Content is stored once no matter how many links carry it. Strings not
    /// `is_searchable` are stored and retrievable but never indexed by terms.
    fn link_string(&self, link: LinkId, content: &[u8], is_searchable: bool) -> Result<()>;

    /// Detaches the content of `link`. Returns whether the link had content.
    fn unlink_string(&self, link: LinkId) -> Result<bool>;

    fn get_string_by_link_hash(&self, link: LinkId) -> Result<Option<Vec<u8>>>;

    /// Streams the links whose content equals `content` into `filter`.
    fn visit_link_hashes_by_string(
        &self,
        content: &[u8],
        filter: &mut dyn LinkFilter,
    ) -> Result<()>;

    /// Streams the links whose content contains `query`, or starts with it
    /// when `query.len() <= max_prefix_len`, into `filter`.
    fn visit_link_hashes_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
        filter: &mut dyn LinkFilter,
    ) -> Result<()>;

    /// Streams the distinct contents matched like in
    /// [`visit_link_hashes_by_substring`](StringEngine::visit_link_hashes_by_substring)
    /// into `filter`, each one at most once.
    fn visit_strings_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
        filter: &mut dyn LinkFilter,
    ) -> Result<()>;

    /// Streams the links whose content holds every one (`All`) or any
    /// (`Any`) of `terms` into `filter`.
    fn visit_link_hashes_by_terms(
        &self,
        terms: &[&[u8]],
        mode: TermMatch,
        filter: &mut dyn LinkFilter,
    ) -> Result<()>;

    /// Links whose content equals `content`.
    fn get_link_hashes_by_string(&self, content: &[u8]) -> Result<Vec<LinkId>> {
        let mut collect = Collect::default();
        self.visit_link_hashes_by_string(content, &mut collect)?;
        Ok(collect.links)
    }

    fn get_link_hashes_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
    ) -> Result<Vec<LinkId>> {
        let mut collect = Collect::default();
        self.visit_link_hashes_by_substring(query, max_prefix_len, &mut collect)?;
        Ok(collect.links)
    }

    fn get_strings_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let mut collect = Collect::default();
        self.visit_strings_by_substring(query, max_prefix_len, &mut collect)?;
        Ok(collect.contents)
    }

    /// Links whose content holds every one of `terms`.
    fn intersect_link_hashes_by_terms(&self, terms: &[&[u8]]) -> Result<Vec<LinkId>> {
        let mut collect = Collect::default();
        self.visit_link_hashes_by_terms(terms, TermMatch::All, &mut collect)?;
        Ok(collect.links)
    }

    /// Links whose content holds any of `terms`.
    fn unite_link_hashes_by_terms(&self, terms: &[&[u8]]) -> Result<Vec<LinkId>> {
        let mut collect = Collect::default();
        self.visit_link_hashes_by_terms(terms, TermMatch::Any, &mut collect)?;
        Ok(collect.links)
    }

    fn intersect_strings_by_terms(&self, terms: &[&[u8]]) -> Result<Vec<Vec<u8>>>;

    fn unite_strings_by_terms(&self, terms: &[&[u8]]) -> Result<Vec<Vec<u8>>>;

    /// Replaces the in-memory state with the persisted one.
    fn load(&self) -> Result<()>;

    /// Persists the in-memory state.
    fn save(&self) -> Result<()>;

    /// Releases open files. The engine is not used afterwards.
    fn shutdown(&self) -> Result<()>;

    fn stats(&self) -> StorageStats;
}

/// Point-in-time counters of an engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Offset the next new string will be written at.
    pub last_offset: u64,
    pub open_channels: usize,
    pub terms: usize,
    /// Distinct stored strings known to the index, linked or not.
    pub content_groups: usize,
    pub linked: usize,
}
