use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lexis_common::{Result, error::Error};
use lexis_io::{ChannelStore, file::remove_if_exists};
use lexis_text::TermExtractor;

use super::{
    StorageStats, StringEngine, legacy,
    legacy::LEGACY_FILE,
    persist::{self, GROUPS_FILE, TERMS_FILE},
};
use crate::{
    content,
    filter::LinkFilter,
    index::{Indices, TermMatch},
    link::LinkId,
    options::StoreOptions,
};

/// Engine keeping its indices in in-memory tries and string payloads in
/// channel files.
///
/// Lock order: indices, then the channel table, then a single channel.
/// Mutations hold the indices write lock for their whole duration, so readers
/// never observe a half-updated link.
pub struct DictionaryEngine {
    pub(super) options: StoreOptions,
    pub(super) extractor: TermExtractor,
    pub(super) channels: ChannelStore,
    pub(super) indices: RwLock<Indices>,
}

impl DictionaryEngine {
    pub const NAME: &'static str = "dictionary";

    /// Creates an engine over `options.repo_path` with empty indices. Call
    /// [`load`](StringEngine::load) to pick up persisted state.
    pub fn open(options: StoreOptions) -> Result<DictionaryEngine> {
        options.validate()?;
        let extractor =
            TermExtractor::with_tokenizer(&options.tokenizer, options.term_separators.as_bytes())?;
        let channels = ChannelStore::new(
            &options.repo_path,
            options.max_strings_channels,
            options.max_strings_channel_size,
        )?;
        log::info!(
            "string storage at {}: {} channels of {} bytes, searchable below {} bytes, {} tokens",
            options.repo_path.display(),
            options.max_strings_channels,
            options.max_strings_channel_size,
            options.max_searchable_string_size,
            options.tokenizer,
        );
        Ok(DictionaryEngine {
            options,
            extractor,
            channels,
            indices: RwLock::new(Indices::new()),
        })
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Deletes the index, channel and legacy files under `options.repo_path`.
    pub fn remove_files(options: &StoreOptions) -> Result<usize> {
        let root = &options.repo_path;
        let mut removed = ChannelStore::remove_files(root, options.max_strings_channels)?;
        for name in [TERMS_FILE, GROUPS_FILE, LEGACY_FILE] {
            let path = root.join(name);
            if remove_if_exists(&path).map_err(|e| Error::io(path.display().to_string(), e))? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub(super) fn read_indices(&self) -> RwLockReadGuard<'_, Indices> {
        self.indices.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn write_indices(&self) -> RwLockWriteGuard<'_, Indices> {
        self.indices.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Link update with the indices write lock already held.
    pub(super) fn link_locked(
        &self,
        indices: &mut Indices,
        link: LinkId,
        content: &[u8],
        is_searchable: bool,
    ) -> Result<()> {
        let searchable = is_searchable && content.len() < self.options.max_searchable_string_size;
        let terms = if searchable {
            self.extractor.terms(content)
        } else {
            Vec::new()
        };

        let existing = match terms.first() {
            Some(first) => self.find_stored(indices, first, content),
            None => None,
        };
        let offset = match existing {
            Some(offset) => {
                log::trace!("link {link} shares content at offset {offset}");
                offset
            }
            None => {
                let offset = self.channels.append_record(content)?;
                let indexed = if self.options.search_by_substring {
                    &terms[..]
                } else {
                    &terms[..terms.len().min(1)]
                };
                for term in indexed {
                    indices.add_term(term, offset);
                }
                log::trace!(
                    "link {link}: stored {} bytes at offset {offset} under {} terms",
                    content.len(),
                    indexed.len()
                );
                offset
            }
        };

        indices.attach(link, offset);
        Ok(())
    }

    /// Offset of a stored copy of `content` among the strings indexed under
    /// its first term. Unreadable candidates are skipped.
    fn find_stored(&self, indices: &Indices, first_term: &[u8], content: &[u8]) -> Option<u64> {
        indices
            .offsets_by_term(first_term)
            .iter()
            .copied()
            .find(|&offset| {
                match self
                    .channels
                    .read_record_if(offset, |len| len == content.len() as u64)
                {
                    Ok(stored) => stored.is_some_and(|stored| stored == content),
                    Err(e) => {
                        log::warn!("skipping unreadable string at offset {offset}: {e}");
                        false
                    }
                }
            })
    }

    /// Saves with the indices lock already held.
    pub(super) fn save_locked(&self, indices: &Indices) -> Result<()> {
        let root = &self.options.repo_path;
        persist::save_terms(&root.join(TERMS_FILE), self.channels.last_offset(), indices)?;
        persist::save_groups(&root.join(GROUPS_FILE), indices)?;
        self.channels.flush()?;
        log::info!(
            "saved {} terms and {} content groups to {}",
            indices.term_count(),
            indices.group_count(),
            root.display()
        );
        Ok(())
    }
}

impl StringEngine for DictionaryEngine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn link_string(&self, link: LinkId, content: &[u8], is_searchable: bool) -> Result<()> {
        let mut indices = self.write_indices();
        self.link_locked(&mut indices, link, content, is_searchable)
    }

    fn unlink_string(&self, link: LinkId) -> Result<bool> {
        let detached = self.write_indices().detach(link);
        match detached {
            Some(offset) => log::trace!("link {link} detached from offset {offset}"),
            None => log::debug!("link {link} has no content to unlink"),
        }
        Ok(detached.is_some())
    }

    fn get_string_by_link_hash(&self, link: LinkId) -> Result<Option<Vec<u8>>> {
        let stored = {
            let indices = self.read_indices();
            match indices.offset_of(link) {
                Some(offset) => self.channels.read_record(offset)?,
                None => return Ok(None),
            }
        };

        if self.options.resolve_file_links
            && let Some(file_content) = content::resolve_file_link(&stored)
        {
            return Ok(Some(file_content));
        }
        Ok(Some(stored))
    }

    fn visit_link_hashes_by_string(
        &self,
        content: &[u8],
        filter: &mut dyn LinkFilter,
    ) -> Result<()> {
        let indices = self.read_indices();
        self.visit_exact(&indices, content, |offset| {
            Self::push_group(&indices, offset, filter)
        })
    }

    fn visit_link_hashes_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
        filter: &mut dyn LinkFilter,
    ) -> Result<()> {
        let indices = self.read_indices();
        self.visit_substring_matches(&indices, query, max_prefix_len, |offset, _| {
            Self::push_group(&indices, offset, filter)
        })
    }

    fn visit_strings_by_substring(
        &self,
        query: &[u8],
        max_prefix_len: usize,
        filter: &mut dyn LinkFilter,
    ) -> Result<()> {
        let indices = self.read_indices();
        self.visit_substring_matches(&indices, query, max_prefix_len, |offset, stored| {
            Self::push_group_content(&indices, offset, stored, filter)
        })
    }

    fn visit_link_hashes_by_terms(
        &self,
        terms: &[&[u8]],
        mode: TermMatch,
        filter: &mut dyn LinkFilter,
    ) -> Result<()> {
        let indices = self.read_indices();
        for offset in indices.offsets_by_terms(terms, mode) {
            if Self::push_group(&indices, offset, filter).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn intersect_strings_by_terms(&self, terms: &[&[u8]]) -> Result<Vec<Vec<u8>>> {
        self.strings_by_terms(terms, TermMatch::All)
    }

    fn unite_strings_by_terms(&self, terms: &[&[u8]]) -> Result<Vec<Vec<u8>>> {
        self.strings_by_terms(terms, TermMatch::Any)
    }

    fn load(&self) -> Result<()> {
        let mut indices = self.write_indices();
        indices.clear();
        let root = &self.options.repo_path;
        let mut first_error = None;

        let persisted = match persist::load_terms(&root.join(TERMS_FILE), &mut indices) {
            Ok(last_offset) => last_offset,
            Err(e) => {
                log::error!("failed to load the term index from {}: {e}", root.display());
                first_error = Some(e);
                0
            }
        };
        // Never hand out offsets of records already on disk.
        let stored_end = self.channels.stored_end()?;
        if stored_end > persisted {
            log::warn!(
                "channels hold data up to offset {stored_end}, past the indexed {persisted}"
            );
        }
        self.channels.set_last_offset(persisted.max(stored_end));

        if let Err(e) = persist::load_groups(&root.join(GROUPS_FILE), &mut indices) {
            log::error!("failed to load the link index from {}: {e}", root.display());
            first_error.get_or_insert(e);
        }

        let legacy_path = root.join(LEGACY_FILE);
        if legacy_path.is_file() {
            legacy::migrate(self, &mut indices, &legacy_path)?;
        }

        log::info!(
            "loaded {} terms, {} content groups and {} links from {}",
            indices.term_count(),
            indices.group_count(),
            indices.linked_count(),
            root.display()
        );
        first_error.map_or(Ok(()), Err)
    }

    fn save(&self) -> Result<()> {
        let indices = self.read_indices();
        self.save_locked(&indices)
    }

    fn shutdown(&self) -> Result<()> {
        self.channels.close()?;
        log::info!("string storage at {} shut down", self.options.repo_path.display());
        Ok(())
    }

    fn stats(&self) -> StorageStats {
        let indices = self.read_indices();
        StorageStats {
            last_offset: self.channels.last_offset(),
            open_channels: self.channels.open_channels(),
            terms: indices.term_count(),
            content_groups: indices.group_count(),
            linked: indices.linked_count(),
        }
    }
}

impl std::fmt::Debug for DictionaryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryEngine")
            .field("options", &self.options)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}
