//! The three tries indexing stored strings.

use ahash::AHashSet;
use itertools::Itertools;
use lexis_dictionary::{Alphabet, DecimalKey, Dictionary};

use crate::link::LinkId;

/// How a multi-term query combines its terms.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TermMatch {
    /// Offsets indexed under every query term.
    All,
    /// Offsets indexed under at least one query term.
    Any,
}

/// Term, content group and link indices of one storage.
///
/// Offsets and links key the digit tries by their decimal rendition. A
/// content group keeps its trie key after its last link leaves, so an offset
/// once linked stays known to the index.
pub struct Indices {
    terms: Dictionary<u64>,
    groups: Dictionary<LinkId>,
    links: Dictionary<u64>,
}

impl Indices {
    pub fn new() -> Indices {
        Indices {
            terms: Dictionary::new(Alphabet::BYTES),
            groups: Dictionary::new(Alphabet::DIGITS),
            links: Dictionary::new(Alphabet::DIGITS),
        }
    }

    pub fn clear(&mut self) {
        self.terms.clear();
        self.groups.clear();
        self.links.clear();
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn linked_count(&self) -> usize {
        self.links.len()
    }

    pub fn add_term(&mut self, term: &[u8], offset: u64) {
        self.terms.append(term, offset);
    }

    pub fn offsets_by_term(&self, term: &[u8]) -> &[u64] {
        self.terms.get_all(term).unwrap_or_default()
    }

    /// Offsets indexed under any term starting with `prefix`, each reported
    /// once. Offsets whose content group is empty are left out.
    pub fn linked_offsets_by_term_prefix(&self, prefix: &[u8]) -> Vec<u64> {
        let mut seen = AHashSet::new();
        let mut offsets = Vec::new();
        self.terms.visit_prefix(prefix, |_, indexed| {
            for &offset in indexed {
                if seen.insert(offset) && !self.group(offset).is_empty() {
                    offsets.push(offset);
                }
            }
            true
        });
        offsets
    }

    /// Offsets matching a set of terms. Duplicate query terms count once.
    pub fn offsets_by_terms(&self, terms: &[&[u8]], mode: TermMatch) -> Vec<u64> {
        let distinct: Vec<&[u8]> = terms.iter().copied().unique().collect();

        // offset -> positions of the query terms indexing it
        let mut hits: Dictionary<usize> = Dictionary::new(Alphabet::DIGITS);
        for (position, term) in distinct.iter().enumerate() {
            for &offset in self.offsets_by_term(term) {
                hits.append(DecimalKey::new(offset).as_bytes(), position);
            }
        }

        let mut offsets = Vec::new();
        hits.visit_down(|key, positions| {
            let matched = match mode {
                TermMatch::All => positions.iter().dedup().count() == distinct.len(),
                TermMatch::Any => true,
            };
            if let Some(offset) = DecimalKey::parse(key).filter(|_| matched) {
                offsets.push(offset);
            }
            true
        });
        offsets
    }

    /// Links sharing the string at `offset`.
    pub fn group(&self, offset: u64) -> &[LinkId] {
        self.groups
            .get_all(DecimalKey::new(offset).as_bytes())
            .unwrap_or_default()
    }

    pub fn offset_of(&self, link: LinkId) -> Option<u64> {
        self.links.get(DecimalKey::new(link.0).as_bytes()).copied()
    }

    /// Makes `link` a member of the content group of `offset`, leaving the
    /// group it was in before.
    pub fn attach(&mut self, link: LinkId, offset: u64) {
        match self.offset_of(link) {
            Some(previous) if previous == offset => {}
            Some(previous) => self.leave_group(previous, link),
            None => {}
        }

        if let Some(node) = self.groups.append_to_node(DecimalKey::new(offset).as_bytes()) {
            let members = self.groups.values_mut(node);
            if !members.contains(&link) {
                members.push(link);
            }
        }
        self.links.insert(DecimalKey::new(link.0).as_bytes(), offset);
    }

    /// Removes `link` from its content group. Returns the offset it was
    /// attached to.
    pub fn detach(&mut self, link: LinkId) -> Option<u64> {
        let offset = self
            .links
            .remove(DecimalKey::new(link.0).as_bytes())?
            .first()
            .copied()?;
        self.leave_group(offset, link);
        Some(offset)
    }

    /// Registers the content group of `offset`, even when `members` is empty.
    pub fn restore_group(&mut self, offset: u64, members: &[LinkId]) {
        self.groups.append_to_node(DecimalKey::new(offset).as_bytes());
        for &link in members {
            self.attach(link, offset);
        }
    }

    pub fn visit_terms<F>(&self, f: F) -> bool
    where
        F: FnMut(&[u8], &[u64]) -> bool,
    {
        self.terms.visit_down(f)
    }

    pub fn visit_groups<F>(&self, mut f: F) -> bool
    where
        F: FnMut(u64, &[LinkId]) -> bool,
    {
        self.groups.visit_down(|key, members| match DecimalKey::parse(key) {
            Some(offset) => f(offset, members),
            None => true,
        })
    }

    fn leave_group(&mut self, offset: u64, link: LinkId) {
        if let Some(members) = self.groups.get_all_mut(DecimalKey::new(offset).as_bytes()) {
            members.retain(|&member| member != link);
        }
    }
}

impl Default for Indices {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_moves_between_groups() {
        let mut indices = Indices::new();
        indices.attach(LinkId(112), 0);
        indices.attach(LinkId(518), 0);
        assert_eq!(indices.group(0), &[LinkId(112), LinkId(518)]);

        indices.attach(LinkId(112), 30);
        assert_eq!(indices.group(0), &[LinkId(518)]);
        assert_eq!(indices.group(30), &[LinkId(112)]);
        assert_eq!(indices.offset_of(LinkId(112)), Some(30));

        // Relinking to the same offset keeps a single membership.
        indices.attach(LinkId(112), 30);
        assert_eq!(indices.group(30), &[LinkId(112)]);
        assert_eq!(indices.linked_count(), 2);
    }

    #[test]
    fn test_detach_keeps_empty_group() {
        let mut indices = Indices::new();
        indices.attach(LinkId(7), 42);
        assert_eq!(indices.detach(LinkId(7)), Some(42));
        assert_eq!(indices.detach(LinkId(7)), None);
        assert_eq!(indices.offset_of(LinkId(7)), None);
        assert!(indices.group(42).is_empty());
        assert_eq!(indices.group_count(), 1);

        let mut groups = Vec::new();
        indices.visit_groups(|offset, members| {
            groups.push((offset, members.len()));
            true
        });
        assert_eq!(groups, vec![(42, 0)]);
    }

    #[test]
    fn test_prefix_candidates_skip_unlinked() {
        let mut indices = Indices::new();
        indices.add_term(b"the", 0);
        indices.add_term(b"there", 0);
        indices.add_term(b"theory", 30);
        indices.add_term(b"other", 60);
        indices.attach(LinkId(1), 0);
        indices.attach(LinkId(2), 30);
        indices.restore_group(60, &[]);

        let mut offsets = indices.linked_offsets_by_term_prefix(b"the");
        offsets.sort();
        assert_eq!(offsets, vec![0, 30]);

        indices.detach(LinkId(2));
        assert_eq!(indices.linked_offsets_by_term_prefix(b"theo"), Vec::<u64>::new());
    }

    #[test]
    fn test_offsets_by_terms() {
        let mut indices = Indices::new();
        for term in ["it", "is", "the", "first", "string"] {
            indices.add_term(term.as_bytes(), 0);
        }
        for term in ["it", "is", "the", "second", "string"] {
            indices.add_term(term.as_bytes(), 30);
        }

        let query: [&[u8]; 3] = [b"it", b"first", b"the"];
        assert_eq!(indices.offsets_by_terms(&query, TermMatch::All), vec![0]);
        assert_eq!(indices.offsets_by_terms(&query, TermMatch::Any), vec![0, 30]);

        let repeated: [&[u8]; 3] = [b"second", b"second", b"it"];
        assert_eq!(indices.offsets_by_terms(&repeated, TermMatch::All), vec![30]);

        let missing: [&[u8]; 2] = [b"it", b"third"];
        assert!(indices.offsets_by_terms(&missing, TermMatch::All).is_empty());
        assert!(indices.offsets_by_terms(&[], TermMatch::Any).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut indices = Indices::new();
        indices.add_term(b"", 0);
        indices.attach(LinkId(1), 0);
        indices.clear();
        assert_eq!(indices.term_count(), 0);
        assert_eq!(indices.group_count(), 0);
        assert_eq!(indices.linked_count(), 0);
    }
}
