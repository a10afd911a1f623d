// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Delta-compressed posting lists.
//!
//! A list is a run of skip blocks of up to 128 postings. Sealed (full)
//! blocks live in one contiguous payload buffer; the block header records
//! the first/last doc id, the first doc id's delta against the previous
//! block's last, the posting count, and the payload offsets of the four
//! streams (doc ids, term frequencies, offset pairs, positions). Doc-id
//! gaps in a sealed block are bit-packed; the still-growing tail block
//! keeps plain var-int streams. `skip_forward` walks headers to hop over
//! whole blocks without touching their payload.
//!
//! Stream encodings per posting:
//! - doc ids: delta against the previous posting (first delta in a block is
//!   against the previous block's last doc id)
//! - term frequencies: raw var-ints, not delta-encoded
//! - offset pairs: `(start_delta, length)` var-ints over a running cursor
//!   that resets per posting
//! - positions: gap-encoded var-ints, resetting per posting

use crate::codec::{packed, PackedBlock, VarintBuffer, VarintReader, PACK_ITEM_COUNT};
use crate::error::Result;
use crate::postings::bloom::{BloomSidecar, Presence};
use crate::postings::cursor::{OffsetPairsCursor, PositionsCursor, PostingCursor};
use crate::postings::posting::{DocId, Posting};

/// Postings per skip block; full blocks pack their doc gaps.
pub const BLOCK_CAP: usize = PACK_ITEM_COUNT;

#[derive(Debug, Clone)]
struct BlockHeader {
    first_doc: DocId,
    /// `first_doc` as a delta from the previous block's last doc id.
    first_delta: u32,
    last_doc: DocId,
    count: u32,
    doc_start: u32,
    tf_start: u32,
    off_start: u32,
    pos_start: u32,
    end: u32,
}

/// The unsealed block postings are appended into. Doc gaps are kept both
/// var-int encoded (what the cursor reads) and staged raw (what sealing
/// packs).
#[derive(Debug, Default)]
struct TailBlock {
    first_doc: DocId,
    first_delta: u32,
    last_doc: DocId,
    count: u32,
    delta_values: Vec<u32>,
    docs: VarintBuffer,
    tfs: VarintBuffer,
    offs: VarintBuffer,
    poss: VarintBuffer,
}

impl TailBlock {
    fn reset(&mut self) {
        self.count = 0;
        self.delta_values.clear();
        self.docs.clear();
        self.tfs.clear();
        self.offs.clear();
        self.poss.clear();
    }
}

#[derive(Debug)]
pub struct PostingListDelta {
    term: String,
    payload: Vec<u8>,
    headers: Vec<BlockHeader>,
    tail: TailBlock,
    n_postings: usize,
    last_doc: DocId,
    blooms: Option<Vec<BloomSidecar>>,
}

impl PostingListDelta {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            payload: Vec::new(),
            headers: Vec::new(),
            tail: TailBlock::default(),
            n_postings: 0,
            last_doc: 0,
            blooms: None,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Total posting count (the term's document frequency).
    pub fn size(&self) -> usize {
        self.n_postings
    }

    /// Append one posting. Doc ids must strictly increase across calls.
    /// Either every posting carries a bloom sidecar or none does.
    pub fn add_posting(&mut self, posting: &Posting, bloom: Option<BloomSidecar>) {
        debug_assert!(self.n_postings == 0 || posting.doc_id > self.last_doc);

        let delta = posting.doc_id - self.last_doc;
        if self.tail.count == 0 {
            self.tail.first_doc = posting.doc_id;
            self.tail.first_delta = delta;
        }
        self.tail.delta_values.push(delta);
        self.tail.docs.append(delta);
        self.tail.tfs.append(posting.term_freq());

        let mut prev_end = 0u32;
        for pair in &posting.offsets {
            debug_assert!(pair.start >= prev_end);
            self.tail.offs.append(pair.start - prev_end);
            self.tail.offs.append(pair.end - pair.start);
            prev_end = pair.end;
        }

        let mut last_pos = 0u32;
        for (i, &pos) in posting.positions.iter().enumerate() {
            let gap = if i == 0 { pos } else { pos - last_pos };
            self.tail.poss.append(gap);
            last_pos = pos;
        }

        match bloom {
            Some(sidecar) => {
                debug_assert!(self.n_postings == 0 || self.blooms.is_some());
                self.blooms.get_or_insert_with(Vec::new).push(sidecar);
            }
            None => debug_assert!(self.blooms.is_none()),
        }

        self.tail.count += 1;
        self.tail.last_doc = posting.doc_id;
        self.last_doc = posting.doc_id;
        self.n_postings += 1;

        if self.tail.count as usize == BLOCK_CAP {
            self.seal_tail();
        }
    }

    /// Move the full tail block into the payload buffer, packing its doc
    /// gaps.
    fn seal_tail(&mut self) {
        debug_assert_eq!(self.tail.count as usize, BLOCK_CAP);

        let doc_start = self.payload.len() as u32;
        packed::encode(&self.tail.delta_values, &mut self.payload);
        let tf_start = self.payload.len() as u32;
        self.payload.extend_from_slice(self.tail.tfs.as_slice());
        let off_start = self.payload.len() as u32;
        self.payload.extend_from_slice(self.tail.offs.as_slice());
        let pos_start = self.payload.len() as u32;
        self.payload.extend_from_slice(self.tail.poss.as_slice());

        self.headers.push(BlockHeader {
            first_doc: self.tail.first_doc,
            first_delta: self.tail.first_delta,
            last_doc: self.tail.last_doc,
            count: self.tail.count,
            doc_start,
            tf_start,
            off_start,
            pos_start,
            end: self.payload.len() as u32,
        });
        self.tail.reset();
    }

    fn n_blocks(&self) -> usize {
        self.headers.len() + usize::from(self.tail.count > 0)
    }

    fn block_last_doc(&self, idx: usize) -> DocId {
        if idx < self.headers.len() {
            self.headers[idx].last_doc
        } else {
            self.tail.last_doc
        }
    }

    /// Cursor positioned at the first posting.
    pub fn begin(&self) -> Result<DeltaCursor<'_>> {
        let mut cursor = DeltaCursor {
            list: self,
            block_idx: 0,
            in_block: 0,
            block_count: 0,
            doc_cache: Vec::new(),
            tf: 0,
            tf_reader: VarintReader::new(&[]),
            off_reader: VarintReader::new(&[]),
            pos_reader: VarintReader::new(&[]),
            at_end: self.n_postings == 0,
        };
        if !cursor.at_end {
            cursor.enter_block(0)?;
        }
        Ok(cursor)
    }
}

/// Cursor over a [`PostingListDelta`]. Entering a block decodes its doc-id
/// stream into an absolute-doc-id cache; the other streams decode lazily as
/// the cursor walks.
#[derive(Debug, Clone)]
pub struct DeltaCursor<'a> {
    list: &'a PostingListDelta,
    block_idx: usize,
    in_block: usize,
    block_count: usize,
    doc_cache: Vec<DocId>,
    tf: u32,
    tf_reader: VarintReader<'a>,
    off_reader: VarintReader<'a>,
    pos_reader: VarintReader<'a>,
    at_end: bool,
}

impl<'a> DeltaCursor<'a> {
    fn enter_block(&mut self, idx: usize) -> Result<()> {
        let list = self.list;
        let (deltas, count, prev_doc);
        if idx < list.headers.len() {
            let hdr = &list.headers[idx];
            let doc_bytes = &list.payload[hdr.doc_start as usize..hdr.tf_start as usize];
            let block = PackedBlock::decode(doc_bytes)?;
            deltas = block.values().to_vec();
            count = hdr.count as usize;
            prev_doc = hdr.first_doc - hdr.first_delta;
            self.tf_reader =
                VarintReader::new(&list.payload[hdr.tf_start as usize..hdr.off_start as usize]);
            self.off_reader =
                VarintReader::new(&list.payload[hdr.off_start as usize..hdr.pos_start as usize]);
            self.pos_reader =
                VarintReader::new(&list.payload[hdr.pos_start as usize..hdr.end as usize]);
        } else {
            let tail = &list.tail;
            count = tail.count as usize;
            let mut reader = VarintReader::new(tail.docs.as_slice());
            let mut tmp = Vec::with_capacity(count);
            for _ in 0..count {
                tmp.push(reader.next()?);
            }
            deltas = tmp;
            prev_doc = tail.first_doc - tail.first_delta;
            self.tf_reader = VarintReader::new(tail.tfs.as_slice());
            self.off_reader = VarintReader::new(tail.offs.as_slice());
            self.pos_reader = VarintReader::new(tail.poss.as_slice());
        }

        self.doc_cache.clear();
        let mut running = prev_doc;
        for &d in deltas.iter().take(count) {
            running += d;
            self.doc_cache.push(running);
        }

        self.block_idx = idx;
        self.block_count = count;
        self.in_block = 0;
        self.tf = self.tf_reader.next()?;
        Ok(())
    }

    fn ord(&self) -> usize {
        self.block_idx * BLOCK_CAP + self.in_block
    }
}

impl<'a> PostingCursor<'a> for DeltaCursor<'a> {
    fn size(&self) -> usize {
        self.list.n_postings
    }

    fn term(&self) -> &'a str {
        &self.list.term
    }

    fn is_end(&self) -> bool {
        self.at_end
    }

    fn doc_id(&self) -> DocId {
        debug_assert!(!self.at_end);
        self.doc_cache[self.in_block]
    }

    fn advance(&mut self) -> Result<()> {
        debug_assert!(!self.at_end);
        // step over the current posting's offset and position bytes
        self.off_reader.skip(2 * self.tf as usize)?;
        self.pos_reader.skip(self.tf as usize)?;

        if self.in_block + 1 == self.block_count {
            if self.block_idx + 1 < self.list.n_blocks() {
                self.enter_block(self.block_idx + 1)?;
            } else {
                self.at_end = true;
            }
        } else {
            self.in_block += 1;
            self.tf = self.tf_reader.next()?;
        }
        Ok(())
    }

    fn skip_forward(&mut self, target: DocId) -> Result<()> {
        if self.at_end || self.doc_id() >= target {
            return Ok(());
        }

        if self.list.block_last_doc(self.block_idx) < target {
            let n_blocks = self.list.n_blocks();
            let mut idx = self.block_idx + 1;
            while idx < n_blocks && self.list.block_last_doc(idx) < target {
                idx += 1;
            }
            if idx == n_blocks {
                self.at_end = true;
                return Ok(());
            }
            self.enter_block(idx)?;
        }

        while !self.at_end && self.doc_id() < target {
            self.advance()?;
        }
        Ok(())
    }

    fn term_freq(&self) -> u32 {
        debug_assert!(!self.at_end);
        self.tf
    }

    fn offset_pairs(&self) -> OffsetPairsCursor<'a> {
        OffsetPairsCursor::Delta {
            reader: self.off_reader.clone(),
            remaining: self.tf,
            prev_end: 0,
        }
    }

    fn assign_positions(&self, out: &mut PositionsCursor<'a>) {
        *out = PositionsCursor::Delta {
            reader: self.pos_reader.clone(),
            remaining: self.tf,
            last: 0,
        };
    }

    fn has_next_term(&self, term: &str) -> Presence {
        match &self.list.blooms {
            None => Presence::Unknown,
            Some(blooms) => {
                if blooms[self.ord()].next.may_contain(term) {
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
                if blooms[self.ord()].prior.may_contain(term) {
                    Presence::Present
                } else {
                    Presence::NotPresent
                }
            }
        }
    }
}
