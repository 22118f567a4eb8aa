//! Query paths of the dictionary engine.

use std::ops::ControlFlow;

use lexis_common::Result;

use super::DictionaryEngine;
use crate::{
    filter::LinkFilter,
    index::{Indices, TermMatch},
};

impl DictionaryEngine {
    /// Offers every offset storing exactly `content` to `visit`.
    ///
    /// Only the strings indexed under the first term of `content` can match,
    /// every one of them is checked by length and then byte by byte.
    pub(super) fn visit_exact(
        &self,
        indices: &Indices,
        content: &[u8],
        mut visit: impl FnMut(u64) -> ControlFlow<()>,
    ) -> Result<()> {
        let first_term = self.extractor.first_term(content);
        for &offset in indices.offsets_by_term(first_term) {
            let stored = self
                .channels
                .read_record_if(offset, |len| len == content.len() as u64)?;
            if stored.is_some_and(|stored| stored == content) && visit(offset).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Offers the linked strings matching `query` to `visit`, with their
    /// offsets.
    ///
    /// Candidates are the strings indexed under any term the first term of
    /// `query` is a prefix of. Short queries (up to `max_prefix_len` bytes)
    /// match strings starting with them, longer ones match anywhere.
    pub(super) fn visit_substring_matches(
        &self,
        indices: &Indices,
        query: &[u8],
        max_prefix_len: usize,
        mut visit: impl FnMut(u64, &[u8]) -> ControlFlow<()>,
    ) -> Result<()> {
        let prefix_mode = query.len() <= max_prefix_len;
        let first_term = self.extractor.first_term(query);
        let candidates = indices.linked_offsets_by_term_prefix(first_term);
        log::trace!(
            "substring query of {} bytes: {} candidates, prefix mode {prefix_mode}",
            query.len(),
            candidates.len()
        );

        for offset in candidates {
            let stored = self.channels.read_record(offset)?;
            let matched = if prefix_mode {
                stored.starts_with(query)
            } else {
                contains(&stored, query)
            };
            if matched && visit(offset, &stored).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Stored strings of the offsets matching `terms`, unlinked ones included.
    pub(super) fn strings_by_terms(
        &self,
        terms: &[&[u8]],
        mode: TermMatch,
    ) -> Result<Vec<Vec<u8>>> {
        let indices = self.read_indices();
        indices
            .offsets_by_terms(terms, mode)
            .into_iter()
            .map(|offset| self.channels.read_record(offset))
            .collect()
    }

    /// Offers the members of the content group at `offset` to `filter`.
    pub(super) fn push_group(
        indices: &Indices,
        offset: u64,
        filter: &mut dyn LinkFilter,
    ) -> ControlFlow<()> {
        for &link in indices.group(offset) {
            if filter.check_link(link) && filter.push_link(link).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Pushes `content` when the group at `offset` has an accepted link.
    pub(super) fn push_group_content(
        indices: &Indices,
        offset: u64,
        content: &[u8],
        filter: &mut dyn LinkFilter,
    ) -> ControlFlow<()> {
        if indices.group(offset).iter().any(|&link| filter.check_link(link)) {
            filter.push_content(content)
        } else {
            ControlFlow::Continue(())
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinkId, StoreOptions, StringEngine, filter::FirstLinks};

    fn corpus(dir: &std::path::Path, options: StoreOptions) -> DictionaryEngine {
        let engine = DictionaryEngine::open(StoreOptions {
            repo_path: dir.to_path_buf(),
            ..options
        })
        .expect("open");
        engine
            .link_string(LinkId(112), b"it is the first string", true)
            .expect("link");
        engine
            .link_string(LinkId(518), b"it is the second string", true)
            .expect("link");
        engine
    }

    fn exact_offsets(engine: &DictionaryEngine, content: &[u8]) -> Vec<u64> {
        let indices = engine.read_indices();
        let mut offsets = Vec::new();
        engine
            .visit_exact(&indices, content, |offset| {
                offsets.push(offset);
                ControlFlow::Continue(())
            })
            .expect("search");
        offsets
    }

    fn substring_offsets(
        engine: &DictionaryEngine,
        query: &[u8],
        max_prefix_len: usize,
    ) -> Vec<u64> {
        let indices = engine.read_indices();
        let mut offsets = Vec::new();
        engine
            .visit_substring_matches(&indices, query, max_prefix_len, |offset, _| {
                offsets.push(offset);
                ControlFlow::Continue(())
            })
            .expect("search");
        offsets
    }

    #[test]
    fn test_contains() {
        assert!(contains(b"abc", b""));
        assert!(contains(b"abc", b"bc"));
        assert!(!contains(b"ab", b"abc"));
        assert!(!contains(b"", b"a"));
    }

    #[test]
    fn test_exact_offsets() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let engine = corpus(tempdir.path(), StoreOptions::default());
        assert_eq!(exact_offsets(&engine, b"it is the second string"), vec![30]);
        assert!(exact_offsets(&engine, b"it is").is_empty());
        assert!(exact_offsets(&engine, b"IT IS THE FIRST STRING").is_empty());
    }

    #[test]
    fn test_prefix_and_substring_modes() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let engine = corpus(tempdir.path(), StoreOptions::default());
        assert_eq!(substring_offsets(&engine, b"the first", 0), vec![0]);
        assert!(substring_offsets(&engine, b"the first", 100).is_empty());
        assert_eq!(substring_offsets(&engine, b"it is the s", 100), vec![30]);
        assert_eq!(substring_offsets(&engine, b"str", 0), vec![0, 30]);
    }

    #[test]
    fn test_substring_visit_stops_on_break() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let engine = corpus(tempdir.path(), StoreOptions::default());
        let indices = engine.read_indices();
        let mut visited = 0;
        engine
            .visit_substring_matches(&indices, b"str", 0, |_, stored| {
                visited += 1;
                assert!(stored.starts_with(b"it is"));
                ControlFlow::Break(())
            })
            .expect("search");
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_push_group() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let engine = corpus(tempdir.path(), StoreOptions::default());
        engine
            .link_string(LinkId(519), b"it is the second string", true)
            .expect("link");
        engine
            .link_string(LinkId(520), b"it is the second string", true)
            .expect("link");
        let indices = engine.read_indices();

        let mut odd = FirstLinks::new(usize::MAX, |link: LinkId| link.get() % 2 == 1);
        assert!(DictionaryEngine::push_group(&indices, 30, &mut odd).is_continue());
        assert_eq!(odd.into_links(), vec![LinkId(519)]);

        let mut first = FirstLinks::new(1, |_| true);
        assert!(DictionaryEngine::push_group(&indices, 30, &mut first).is_break());
        assert_eq!(first.into_links(), vec![LinkId(518)]);

        let mut none = FirstLinks::new(1, |_| false);
        let pushed = DictionaryEngine::push_group_content(&indices, 30, b"x", &mut none);
        assert!(pushed.is_continue());
        assert!(none.into_links().is_empty());
    }

    #[test]
    fn test_first_term_only_indexing() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let engine = corpus(
            tempdir.path(),
            StoreOptions::default().with_search_by_substring(false),
        );
        assert!(substring_offsets(&engine, b"the first", 0).is_empty());
        assert_eq!(substring_offsets(&engine, b"it", 0).len(), 2);
    }
}
