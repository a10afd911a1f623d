// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Uncompressed posting lists.
//!
//! Plain `Vec<Posting>` storage behind the same cursor contract as the
//! delta-compressed family. Trades memory for decode-free reads; selected
//! with the `inverted_index = "uncompressed"` config key.

use crate::error::Result;
use crate::postings::bloom::{BloomSidecar, Presence};
use crate::postings::cursor::{OffsetPairsCursor, PositionsCursor, PostingCursor};
use crate::postings::posting::{DocId, Posting};

#[derive(Debug)]
pub struct PostingListVec {
    term: String,
    postings: Vec<Posting>,
    blooms: Option<Vec<BloomSidecar>>,
}

impl PostingListVec {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            postings: Vec::new(),
            blooms: None,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn size(&self) -> usize {
        self.postings.len()
    }

    /// Append one posting. Doc ids must strictly increase across calls.
    pub fn add_posting(&mut self, posting: Posting, bloom: Option<BloomSidecar>) {
        debug_assert!(self
            .postings
            .last()
            .map_or(true, |p| posting.doc_id > p.doc_id));
        match bloom {
            Some(sidecar) => {
                debug_assert!(self.postings.is_empty() || self.blooms.is_some());
                self.blooms.get_or_insert_with(Vec::new).push(sidecar);
            }
            None => debug_assert!(self.blooms.is_none()),
        }
        self.postings.push(posting);
    }

    pub fn begin(&self) -> VecCursor<'_> {
        VecCursor { list: self, idx: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct VecCursor<'a> {
    list: &'a PostingListVec,
    idx: usize,
}

impl<'a> PostingCursor<'a> for VecCursor<'a> {
    fn size(&self) -> usize {
        self.list.postings.len()
    }

    fn term(&self) -> &'a str {
        &self.list.term
    }

    fn is_end(&self) -> bool {
        self.idx >= self.list.postings.len()
    }

    fn doc_id(&self) -> DocId {
        self.list.postings[self.idx].doc_id
    }

    fn advance(&mut self) -> Result<()> {
        debug_assert!(!self.is_end());
        self.idx += 1;
        Ok(())
    }

    fn skip_forward(&mut self, target: DocId) -> Result<()> {
        let rest = &self.list.postings[self.idx.min(self.list.postings.len())..];
        self.idx += rest.partition_point(|p| p.doc_id < target);
        Ok(())
    }

    fn term_freq(&self) -> u32 {
        self.list.postings[self.idx].term_freq()
    }

    fn offset_pairs(&self) -> OffsetPairsCursor<'a> {
        OffsetPairsCursor::Slice {
            pairs: &self.list.postings[self.idx].offsets,
            idx: 0,
        }
    }

    fn assign_positions(&self, out: &mut PositionsCursor<'a>) {
        *out = PositionsCursor::Slice {
            positions: &self.list.postings[self.idx].positions,
            idx: 0,
        };
    }

    fn has_next_term(&self, term: &str) -> Presence {
        match &self.list.blooms {
            None => Presence::Unknown,
            Some(blooms) => {
                if blooms[self.idx].next.may_contain(term) {
                    Presence::Present
                } else {
                    Presence::NotPresent
                }
            }
        }
    }

    fn has_prior_term(&self, term: &str) -> Presence {
        match &self.list.blooms {
            None => Presence::Unknown,
            Some(blooms) => {
                if blooms[self.idx].prior.may_contain(term) {
                    Presence::Present
                } else {
                    Presence::NotPresent
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postings::posting::OffsetPair;

    fn posting(doc_id: DocId) -> Posting {
        Posting::new(doc_id, vec![OffsetPair::new(0, 4)], vec![0])
    }

    #[test]
    fn skip_forward_binary_searches() {
        let mut list = PostingListVec::new("body");
        for doc in [2u32, 5, 9, 14, 30] {
            list.add_posting(posting(doc), None);
        }
        let mut cursor = list.begin();
        cursor.skip_forward(6).unwrap();
        assert_eq!(cursor.doc_id(), 9);
        cursor.skip_forward(9).unwrap();
        assert_eq!(cursor.doc_id(), 9);
        cursor.skip_forward(31).unwrap();
        assert!(cursor.is_end());
    }

    #[test]
    fn advance_walks_in_order() {
        let mut list = PostingListVec::new("body");
        for doc in [1u32, 4, 6] {
            list.add_posting(posting(doc), None);
        }
        let mut cursor = list.begin();
        let mut seen = Vec::new();
        while !cursor.is_end() {
            seen.push(cursor.doc_id());
            cursor.advance().unwrap();
        }
        assert_eq!(seen, vec![1, 4, 6]);
    }
}
