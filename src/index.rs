// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The inverted index: term -> posting list.
//!
//! Two families share the ingest path and the cursor contract: the
//! delta-compressed default and the uncompressed vector variant. Ingest is
//! exclusive (`&mut self`); after it completes the index is read-only and
//! freely shared across query threads — the borrow checker enforces exactly
//! the no-interleaving contract the engine promises.

use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::postings::{
    BloomSidecar, DeltaCursor, DocId, OffsetPair, Position, Posting, PostingListDelta,
    PostingListVec, TermBloom, VecCursor,
};

/// One token occurrence of a document, in token-stream order.
#[derive(Debug, Clone, Copy)]
pub struct TokenOccurrence<'a> {
    pub term: &'a str,
    pub offset: OffsetPair,
    pub position: Position,
}

struct TermGroup {
    offsets: Vec<OffsetPair>,
    positions: Vec<Position>,
    bloom: Option<BloomSidecar>,
}

/// Group a document's occurrence stream per term, building bloom sidecars
/// from the position-adjacent neighbours when asked.
fn group_by_term<'a>(
    occurrences: &[TokenOccurrence<'a>],
    build_blooms: bool,
) -> BTreeMap<&'a str, TermGroup> {
    let by_position: HashMap<Position, &str> = occurrences
        .iter()
        .map(|occ| (occ.position, occ.term))
        .collect();

    let mut groups: BTreeMap<&str, TermGroup> = BTreeMap::new();
    for occ in occurrences {
        let group = groups.entry(occ.term).or_insert_with(|| TermGroup {
            offsets: Vec::new(),
            positions: Vec::new(),
            bloom: None,
        });
        group.offsets.push(occ.offset);
        group.positions.push(occ.position);
    }

    if build_blooms {
        for group in groups.values_mut() {
            let next = TermBloom::from_terms(
                group
                    .positions
                    .iter()
                    .filter_map(|&p| by_position.get(&(p + 1)).copied()),
            );
            let prior = TermBloom::from_terms(group.positions.iter().filter_map(|&p| {
                p.checked_sub(1)
                    .and_then(|prev| by_position.get(&prev).copied())
            }));
            group.bloom = Some(BloomSidecar::new(next, prior));
        }
    }

    groups
}

#[derive(Debug)]
pub struct InvertedIndexDelta {
    lists: HashMap<String, PostingListDelta>,
    build_blooms: bool,
}

impl InvertedIndexDelta {
    pub fn new(build_blooms: bool) -> Self {
        Self {
            lists: HashMap::new(),
            build_blooms,
        }
    }

    pub fn add_document(&mut self, doc_id: DocId, occurrences: &[TokenOccurrence<'_>]) {
        for (term, group) in group_by_term(occurrences, self.build_blooms) {
            let list = self
                .lists
                .entry(term.to_string())
                .or_insert_with(|| PostingListDelta::new(term));
            list.add_posting(
                &Posting::new(doc_id, group.offsets, group.positions),
                group.bloom,
            );
        }
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.lists.len()
    }

    pub fn postinglist_sizes(&self, terms: &[String]) -> BTreeMap<String, usize> {
        terms
            .iter()
            .filter_map(|t| self.lists.get(t).map(|l| (t.clone(), l.size())))
            .collect()
    }

    /// One cursor per query term, or `None` when any term is absent.
    pub fn cursors(&self, terms: &[String]) -> Result<Option<Vec<DeltaCursor<'_>>>> {
        let mut cursors = Vec::with_capacity(terms.len());
        for term in terms {
            match self.lists.get(term) {
                None => return Ok(None),
                Some(list) => cursors.push(list.begin()?),
            }
        }
        Ok(Some(cursors))
    }
}

#[derive(Debug)]
pub struct InvertedIndexVec {
    lists: HashMap<String, PostingListVec>,
    build_blooms: bool,
}

impl InvertedIndexVec {
    pub fn new(build_blooms: bool) -> Self {
        Self {
            lists: HashMap::new(),
            build_blooms,
        }
    }

    pub fn add_document(&mut self, doc_id: DocId, occurrences: &[TokenOccurrence<'_>]) {
        for (term, group) in group_by_term(occurrences, self.build_blooms) {
            let list = self
                .lists
                .entry(term.to_string())
                .or_insert_with(|| PostingListVec::new(term));
            list.add_posting(
                Posting::new(doc_id, group.offsets, group.positions),
                group.bloom,
            );
        }
    }

    pub fn term_count(&self) -> usize {
        self.lists.len()
    }

    pub fn postinglist_sizes(&self, terms: &[String]) -> BTreeMap<String, usize> {
        terms
            .iter()
            .filter_map(|t| self.lists.get(t).map(|l| (t.clone(), l.size())))
            .collect()
    }

    pub fn cursors(&self, terms: &[String]) -> Result<Option<Vec<VecCursor<'_>>>> {
        let mut cursors = Vec::with_capacity(terms.len());
        for term in terms {
            match self.lists.get(term) {
                None => return Ok(None),
                Some(list) => cursors.push(list.begin()),
            }
        }
        Ok(Some(cursors))
    }
}

/// The family actually backing an engine, picked at construction.
#[derive(Debug)]
pub enum IndexStore {
    Delta(InvertedIndexDelta),
    Vec(InvertedIndexVec),
}

impl IndexStore {
    pub fn add_document(&mut self, doc_id: DocId, occurrences: &[TokenOccurrence<'_>]) {
        match self {
            IndexStore::Delta(index) => index.add_document(doc_id, occurrences),
            IndexStore::Vec(index) => index.add_document(doc_id, occurrences),
        }
    }

    pub fn term_count(&self) -> usize {
        match self {
            IndexStore::Delta(index) => index.term_count(),
            IndexStore::Vec(index) => index.term_count(),
        }
    }

    pub fn postinglist_sizes(&self, terms: &[String]) -> BTreeMap<String, usize> {
        match self {
            IndexStore::Delta(index) => index.postinglist_sizes(terms),
            IndexStore::Vec(index) => index.postinglist_sizes(terms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postings::PostingCursor;

    fn occurrences<'a>(tokens: &[(&'a str, u32)]) -> Vec<TokenOccurrence<'a>> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, &(term, start))| TokenOccurrence {
                term,
                offset: OffsetPair::new(start, start + term.len() as u32 - 1),
                position: i as Position,
            })
            .collect()
    }

    #[test]
    fn groups_repeated_terms_into_one_posting() {
        let mut index = InvertedIndexDelta::new(false);
        // "hello world hello"
        index.add_document(
            0,
            &occurrences(&[("hello", 0), ("world", 6), ("hello", 12)]),
        );

        assert_eq!(index.term_count(), 2);
        let cursors = index
            .cursors(&["hello".to_string()])
            .unwrap()
            .expect("term present");
        assert_eq!(cursors[0].size(), 1);
        assert_eq!(cursors[0].term_freq(), 2);
    }

    #[test]
    fn missing_term_resolves_to_none() {
        let mut index = InvertedIndexDelta::new(false);
        index.add_document(0, &occurrences(&[("hello", 0)]));
        assert!(index
            .cursors(&["hello".to_string(), "ghost".to_string()])
            .unwrap()
            .is_none());
    }

    #[test]
    fn bloom_sidecars_see_adjacent_terms() {
        let mut index = InvertedIndexVec::new(true);
        // "hello world big"
        index.add_document(
            0,
            &occurrences(&[("hello", 0), ("world", 6), ("big", 12)]),
        );

        let cursors = index
            .cursors(&["world".to_string()])
            .unwrap()
            .expect("term present");
        use crate::postings::Presence;
        assert_eq!(cursors[0].has_next_term("big"), Presence::Present);
        assert_eq!(cursors[0].has_prior_term("hello"), Presence::Present);
        assert_eq!(cursors[0].has_next_term("hello"), Presence::NotPresent);
    }

    #[test]
    fn postinglist_sizes_skip_absent_terms() {
        let mut index = InvertedIndexDelta::new(false);
        index.add_document(0, &occurrences(&[("hello", 0), ("world", 6)]));
        index.add_document(1, &occurrences(&[("hello", 0)]));

        let sizes =
            index.postinglist_sizes(&["hello".to_string(), "ghost".to_string()]);
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes["hello"], 2);
    }
}
