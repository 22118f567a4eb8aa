//! Storage handle callers link, read and search strings through.

use std::sync::{Arc, PoisonError, RwLock};

use lexis_common::{Result, error::Error};

use crate::{
    engine::{DictionaryEngine, StorageStats, StringEngine},
    filter::LinkFilter,
    index::TermMatch,
    link::LinkId,
    options::StoreOptions,
};

/// Handle of one string storage.
///
/// The handle is shared between threads by reference. Once shut down, every
/// operation fails with `NoInstance`.
pub struct StringStorage {
    engine: RwLock<Option<Arc<dyn StringEngine>>>,
}

impl StringStorage {
    /// Opens a dictionary-backed storage under `options.repo_path`, creating
    /// the directory if needed and wiping it first when `options.clear` is set.
    ///
    /// Persisted state is not read until [`load`](Self::load) is called.
    pub fn initialize(options: StoreOptions) -> Result<StringStorage> {
        let root = &options.repo_path;
        if root.as_os_str().is_empty() {
            return Err(Error::invalid_path(root, "repository path is empty"));
        }
        if let Err(e) = std::fs::create_dir_all(root) {
            log::error!("cannot create repository {}: {e}", root.display());
            return Err(Error::invalid_path(root, e.to_string()));
        }
        if options.clear {
            let removed = DictionaryEngine::remove_files(&options)?;
            log::info!("cleared {removed} storage files from {}", root.display());
        }

        let engine = DictionaryEngine::open(options)?;
        Ok(Self::with_engine(Arc::new(engine)))
    }

    /// Storage dispatching to an already constructed engine.
    pub fn with_engine(engine: Arc<dyn StringEngine>) -> StringStorage {
        log::debug!("string storage uses the {} engine", engine.name());
        StringStorage {
            engine: RwLock::new(Some(engine)),
        }
    }

    /// Releases the engine. Later calls, including a second shutdown, fail
    /// with `NoInstance`.
    pub fn shutdown(&self) -> Result<()> {
        let engine = self
            .engine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(Error::no_instance)?;
        engine.shutdown()
    }

    pub fn is_active(&self) -> bool {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn engine(&self) -> Result<Arc<dyn StringEngine>> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(Error::no_instance)
    }

    /// Attaches searchable `content` to `link`.
    pub fn link_string(&self, link: impl Into<LinkId>, content: &[u8]) -> Result<()> {
        self.link_string_ext(link, content, true)
    }

    pub fn link_string_ext(
        &self,
        link: impl Into<LinkId>,
        content: &[u8],
        is_searchable: bool,
    ) -> Result<()> {
        self.engine()?.link_string(link.into(), content, is_searchable)
    }

    /// Returns whether `link` had content.
    pub fn unlink_string(&self, link: impl Into<LinkId>) -> Result<bool> {
        self.engine()?.unlink_string(link.into())
    }

    /// Content of `link`, `None` when it has none.
    pub fn get_string_by_link_hash(&self, link: impl Into<LinkId>) -> Result<Option<Vec<u8>>> {
        self.engine()?.get_string_by_link_hash(link.into())
    }

    pub fn get_link_hashes_by_string(&self, content: &[u8]) -> Result<Vec<LinkId>> {
        self.engine()?.get_link_hashes_by_string(content)
    }

    /// Streams the links whose content equals `content` into `filter`.
    pub fn visit_link_hashes_by_string(
        &self,
        content: &[u8],
        filter: &mut dyn LinkFilter,
    ) -> Result<()> {
        self.engine()?.visit_link_hashes_by_string(content, filter)
    }

    /// Links whose content contains `query`. Queries of at most
    /// `max_prefix_len` bytes only match at the start of the content.
    pub fn get_link_hashes_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
    ) -> Result<Vec<LinkId>> {
        self.engine()?.get_link_hashes_by_substring(query, max_prefix_len)
    }

    pub fn visit_link_hashes_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
        filter: &mut dyn LinkFilter,
    ) -> Result<()> {
        self.engine()?.visit_link_hashes_by_substring(query, max_prefix_len, filter)
    }

    pub fn get_strings_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
    ) -> Result<Vec<Vec<u8>>> {
        self.engine()?.get_strings_by_substring(query, max_prefix_len)
    }

    /// Streams each matching string with at least one link accepted by
    /// `filter` into it.
    pub fn visit_strings_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
        filter: &mut dyn LinkFilter,
    ) -> Result<()> {
        self.engine()?.visit_strings_by_substring(query, max_prefix_len, filter)
    }

    /// Links whose content holds all of `terms`.
    pub fn intersect_link_hashes_by_terms<T: AsRef<[u8]>>(
        &self,
        terms: &[T],
    ) -> Result<Vec<LinkId>> {
        self.engine()?.intersect_link_hashes_by_terms(&as_slices(terms))
    }

    /// Links whose content holds any of `terms`.
    pub fn unite_link_hashes_by_terms<T: AsRef<[u8]>>(&self, terms: &[T]) -> Result<Vec<LinkId>> {
        self.engine()?.unite_link_hashes_by_terms(&as_slices(terms))
    }

    pub fn visit_link_hashes_by_terms<T: AsRef<[u8]>>(
        &self,
        terms: &[T],
        mode: TermMatch,
        filter: &mut dyn LinkFilter,
    ) -> Result<()> {
        self.engine()?.visit_link_hashes_by_terms(&as_slices(terms), mode, filter)
    }

    pub fn intersect_strings_by_terms<T: AsRef<[u8]>>(&self, terms: &[T]) -> Result<Vec<Vec<u8>>> {
        self.engine()?.intersect_strings_by_terms(&as_slices(terms))
    }

    pub fn unite_strings_by_terms<T: AsRef<[u8]>>(&self, terms: &[T]) -> Result<Vec<Vec<u8>>> {
        self.engine()?.unite_strings_by_terms(&as_slices(terms))
    }

    /// Replaces the in-memory indices with the persisted ones.
    pub fn load(&self) -> Result<()> {
        self.engine()?.load()
    }

    pub fn save(&self) -> Result<()> {
        self.engine()?.save()
    }

    pub fn stats(&self) -> Result<StorageStats> {
        Ok(self.engine()?.stats())
    }
}

impl std::fmt::Debug for StringStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let engine = self.engine.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("StringStorage")
            .field("engine", &engine.as_ref().map(|engine| engine.name()))
            .finish()
    }
}

fn as_slices<T: AsRef<[u8]>>(terms: &[T]) -> Vec<&[u8]> {
    terms.iter().map(AsRef::as_ref).collect()
}
