// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Document-at-a-time top-k retrieval.
//!
//! Three strategies picked by arity: a single-term scan, a two-term
//! skip-forward leap-frog, and the general N-term max/skip loop. All are
//! written once against the `PostingCursor` trait and monomorphised per
//! posting-list family.
//!
//! Heap entries own clones of the offset (and for phrase queries, position
//! table) state of their document, so snippets can be generated after the
//! intersection loop has moved the cursors far past it.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::doc_length::DocLengthStore;
use crate::error::{Error, Result};
use crate::postings::{DocId, OffsetPair, OffsetPairsCursor, PostingCursor, Presence};
use crate::query::phrase::{PhraseVerifier, PositionTable};
use crate::scoring::{idf, score_doc, Bm25Similarity};

/// A scored candidate held in the top-k heap until result emission.
#[derive(Debug, Clone)]
pub struct ResultDocEntry<'a> {
    pub doc_id: DocId,
    pub score: f64,
    pub offset_cursors: Vec<OffsetPairsCursor<'a>>,
    pub position_table: PositionTable,
    pub is_phrase: bool,
}

impl<'a> ResultDocEntry<'a> {
    /// One offset row per query term, ready for the highlighter. Phrase
    /// entries keep only the pairs their matches selected.
    pub fn offsets_for_highlighting(&self) -> Result<Vec<Vec<OffsetPair>>> {
        if self.is_phrase {
            self.filter_offsets_by_position()
        } else {
            self.expand_offsets()
        }
    }

    fn expand_offsets(&self) -> Result<Vec<Vec<OffsetPair>>> {
        self.offset_cursors
            .iter()
            .map(|cursor| cursor.clone().collect_remaining())
            .collect()
    }

    /// Walk each term's offset stream alongside its position-table row,
    /// keeping the pair at each recorded `term_appearance`.
    fn filter_offsets_by_position(&self) -> Result<Vec<Vec<OffsetPair>>> {
        let mut table = Vec::with_capacity(self.position_table.n_rows());
        for (row_i, cursor) in self.offset_cursors.iter().enumerate() {
            let mut cursor = cursor.clone();
            let mut row = Vec::new();
            let mut at: i64 = -1;
            let mut current = None;
            for entry in self.position_table.row(row_i) {
                while at < entry.term_appearance as i64 {
                    current = Some(cursor.next()?.ok_or(Error::CorruptStream(
                        "offset stream shorter than position table",
                    ))?);
                    at += 1;
                }
                match current {
                    Some(pair) => row.push(pair),
                    None => {
                        return Err(Error::CorruptStream(
                            "position table column without offsets",
                        ))
                    }
                }
            }
            table.push(row);
        }
        Ok(table)
    }
}

struct HeapEntry<'a> {
    seq: u64,
    entry: ResultDocEntry<'a>,
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry<'_> {}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry<'_> {
    // score ascending; among equal scores the later insertion is "smaller",
    // so the drain-and-reverse emission keeps ties in insertion order
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .score
            .total_cmp(&other.entry.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of at most k entries keyed by score.
pub struct TopKHeap<'a> {
    heap: BinaryHeap<Reverse<HeapEntry<'a>>>,
    capacity: usize,
    next_seq: u64,
}

impl<'a> TopKHeap<'a> {
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
            capacity,
            next_seq: 0,
        }
    }

    /// Insert unless the heap is full and the score does not strictly beat
    /// the current minimum. `build` runs only when the entry is kept.
    pub fn offer(&mut self, score: f64, build: impl FnOnce() -> ResultDocEntry<'a>) {
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() == self.capacity {
            if let Some(Reverse(min)) = self.heap.peek() {
                if score <= min.entry.score {
                    return;
                }
            }
            self.heap.pop();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(HeapEntry {
            seq,
            entry: build(),
        }));
    }

    /// Drain to a vector sorted by score descending, ties in insertion
    /// order.
    pub fn into_sorted_entries(mut self) -> Vec<ResultDocEntry<'a>> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(Reverse(top)) = self.heap.pop() {
            out.push(top.entry);
        }
        out.reverse();
        out
    }
}

/// Run one query over the resolved posting cursors. `cursors` must be
/// non-empty and ordered like the query terms.
pub fn process_query<'a, C: PostingCursor<'a>>(
    mut cursors: Vec<C>,
    doc_lengths: &DocLengthStore,
    n_total_docs: usize,
    similarity: &Bm25Similarity,
    k: usize,
    is_phrase: bool,
    bloom_enable_factor: Option<u32>,
) -> Result<Vec<ResultDocEntry<'a>>> {
    let idfs: Vec<f64> = cursors
        .iter()
        .map(|c| idf(n_total_docs, c.size()))
        .collect();
    let mut heap = TopKHeap::new(k);

    if cursors.len() == 1 {
        process_single_term(&mut cursors, &idfs, doc_lengths, similarity, &mut heap)?;
    } else if cursors.len() == 2 && !is_phrase {
        process_two_term(&mut cursors, &idfs, doc_lengths, similarity, &mut heap)?;
    } else {
        process_multi_term(
            &mut cursors,
            &idfs,
            doc_lengths,
            similarity,
            is_phrase,
            bloom_enable_factor,
            &mut heap,
        )?;
    }

    Ok(heap.into_sorted_entries())
}

fn rank_non_phrase<'a, C: PostingCursor<'a>>(
    cursors: &[C],
    idfs: &[f64],
    doc_lengths: &DocLengthStore,
    similarity: &Bm25Similarity,
    heap: &mut TopKHeap<'a>,
) -> Result<()> {
    let doc_id = cursors[0].doc_id();
    let score = score_doc(cursors, idfs, doc_lengths, similarity)?;
    heap.offer(score, || ResultDocEntry {
        doc_id,
        score,
        offset_cursors: cursors.iter().map(|c| c.offset_pairs()).collect(),
        position_table: PositionTable::empty(),
        is_phrase: false,
    });
    Ok(())
}

fn process_single_term<'a, C: PostingCursor<'a>>(
    cursors: &mut Vec<C>,
    idfs: &[f64],
    doc_lengths: &DocLengthStore,
    similarity: &Bm25Similarity,
    heap: &mut TopKHeap<'a>,
) -> Result<()> {
    while !cursors[0].is_end() {
        rank_non_phrase(cursors, idfs, doc_lengths, similarity, heap)?;
        cursors[0].advance()?;
    }
    Ok(())
}

/// Alternating leap-frog: the laggard skips to the leader's doc id.
fn process_two_term<'a, C: PostingCursor<'a>>(
    cursors: &mut Vec<C>,
    idfs: &[f64],
    doc_lengths: &DocLengthStore,
    similarity: &Bm25Similarity,
    heap: &mut TopKHeap<'a>,
) -> Result<()> {
    while !cursors[0].is_end() && !cursors[1].is_end() {
        let doc0 = cursors[0].doc_id();
        let doc1 = cursors[1].doc_id();
        if doc0 > doc1 {
            cursors[1].skip_forward(doc0)?;
        } else if doc0 < doc1 {
            cursors[0].skip_forward(doc1)?;
        } else {
            rank_non_phrase(cursors, idfs, doc_lengths, similarity, heap)?;
            cursors[0].advance()?;
            cursors[1].advance()?;
        }
    }
    Ok(())
}

fn process_multi_term<'a, C: PostingCursor<'a>>(
    cursors: &mut Vec<C>,
    idfs: &[f64],
    doc_lengths: &DocLengthStore,
    similarity: &Bm25Similarity,
    is_phrase: bool,
    bloom_enable_factor: Option<u32>,
    heap: &mut TopKHeap<'a>,
) -> Result<()> {
    let mut verifier = PhraseVerifier::new();

    'outer: loop {
        // the largest current doc id is the only possible next match
        let mut max_doc = 0;
        for cursor in cursors.iter() {
            if cursor.is_end() {
                break 'outer;
            }
            max_doc = max_doc.max(cursor.doc_id());
        }

        let mut all_at_max = true;
        for cursor in cursors.iter_mut() {
            cursor.skip_forward(max_doc)?;
            if cursor.is_end() {
                break 'outer;
            }
            if cursor.doc_id() != max_doc {
                all_at_max = false;
                break;
            }
        }

        if all_at_max {
            handle_found_doc(
                cursors,
                idfs,
                doc_lengths,
                similarity,
                is_phrase,
                bloom_enable_factor,
                &mut verifier,
                heap,
            )?;
            for cursor in cursors.iter_mut() {
                cursor.advance()?;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_found_doc<'a, C: PostingCursor<'a>>(
    cursors: &[C],
    idfs: &[f64],
    doc_lengths: &DocLengthStore,
    similarity: &Bm25Similarity,
    is_phrase: bool,
    bloom_enable_factor: Option<u32>,
    verifier: &mut PhraseVerifier<'a>,
    heap: &mut TopKHeap<'a>,
) -> Result<()> {
    if !(is_phrase && cursors.len() > 1) {
        return rank_non_phrase(cursors, idfs, doc_lengths, similarity, heap);
    }

    if !bloom_allows(cursors, bloom_enable_factor) {
        return Ok(());
    }

    verifier.reset(cursors.len());
    for (i, cursor) in cursors.iter().enumerate() {
        cursor.assign_positions(verifier.iter_mut(i));
    }
    if verifier.process()? == 0 {
        return Ok(());
    }

    let doc_id = cursors[0].doc_id();
    let score = score_doc(cursors, idfs, doc_lengths, similarity)?;
    heap.offer(score, || ResultDocEntry {
        doc_id,
        score,
        offset_cursors: cursors.iter().map(|c| c.offset_pairs()).collect(),
        position_table: verifier.take_table(),
        is_phrase: true,
    });
    Ok(())
}

/// Ask the bloom sidecars whether the candidate can possibly hold the
/// phrase. The enable factor picks which side answers based on the
/// posting-list size ratio; with more than two terms each adjacent pair is
/// probed. `NotPresent` is reliable, so a single one prunes the document.
fn bloom_allows<'a, C: PostingCursor<'a>>(cursors: &[C], factor: Option<u32>) -> bool {
    let Some(factor) = factor else {
        return true;
    };

    if cursors.len() != 2 {
        return cursors
            .windows(2)
            .all(|pair| pair[0].has_next_term(pair[1].term()) != Presence::NotPresent);
    }

    let size0 = cursors[0].size() as u64;
    let size1 = cursors[1].size() as u64;
    let factor = factor as u64;
    if factor * size0 <= size1 {
        cursors[0].has_next_term(cursors[1].term()) != Presence::NotPresent
    } else if factor * size1 < size0 {
        cursors[1].has_prior_term(cursors[0].term()) != Presence::NotPresent
    } else {
        cursors[0].has_next_term(cursors[1].term()) != Presence::NotPresent
            && cursors[1].has_prior_term(cursors[0].term()) != Presence::NotPresent
    }
}
