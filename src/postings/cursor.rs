// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The posting-list iterator contract.
//!
//! Both posting-list families (delta-compressed and uncompressed) expose the
//! same cursor surface; the query processors are written once against this
//! trait and instantiated per concrete cursor type, so dispatch is resolved
//! at monomorphisation time rather than through vtables.
//!
//! Cursors borrow from their posting list and must not outlive it. The
//! offset and position sub-cursors carry the list's lifetime rather than the
//! cursor's, so a top-k heap entry can keep them after the main cursor has
//! moved on.

use crate::codec::VarintReader;
use crate::error::Result;
use crate::postings::bloom::Presence;
use crate::postings::posting::{DocId, OffsetPair, Position};

pub trait PostingCursor<'a> {
    /// Total posting count of the list (the term's document frequency).
    fn size(&self) -> usize;

    fn term(&self) -> &'a str;

    /// True iff the cursor is past the last posting.
    fn is_end(&self) -> bool;

    /// Current doc id. Precondition: `!is_end()`.
    fn doc_id(&self) -> DocId;

    /// Move to the next posting. Precondition: `!is_end()`.
    fn advance(&mut self) -> Result<()>;

    /// After the call, either `is_end()` or `doc_id() >= target`. Whole
    /// blocks whose last doc id is below the target are skipped via their
    /// headers without decoding.
    fn skip_forward(&mut self, target: DocId) -> Result<()>;

    /// Current posting's term frequency. Precondition: `!is_end()`.
    fn term_freq(&self) -> u32;

    /// Lazy finite iterator over the current posting's offset pairs.
    fn offset_pairs(&self) -> OffsetPairsCursor<'a>;

    /// Populate `out` with the current posting's positions.
    fn assign_positions(&self, out: &mut PositionsCursor<'a>);

    /// Bloom sidecar: can `term` follow this term in the current document?
    fn has_next_term(&self, term: &str) -> Presence;

    /// Bloom sidecar: can `term` precede this term in the current document?
    fn has_prior_term(&self, term: &str) -> Presence;
}

/// Lazy iterator over one posting's offset pairs.
///
/// The delta variant decodes `(start_delta, length)` var-int pairs against a
/// running cursor that starts at zero for each posting; the slice variant
/// just walks borrowed pairs.
#[derive(Debug, Clone)]
pub enum OffsetPairsCursor<'a> {
    Delta {
        reader: VarintReader<'a>,
        remaining: u32,
        prev_end: u32,
    },
    Slice {
        pairs: &'a [OffsetPair],
        idx: usize,
    },
}

impl<'a> OffsetPairsCursor<'a> {
    pub fn empty() -> Self {
        OffsetPairsCursor::Slice { pairs: &[], idx: 0 }
    }

    pub fn is_end(&self) -> bool {
        match self {
            OffsetPairsCursor::Delta { remaining, .. } => *remaining == 0,
            OffsetPairsCursor::Slice { pairs, idx } => *idx >= pairs.len(),
        }
    }

    /// Pop the next pair, or `None` when the posting's pairs are exhausted.
    pub fn next(&mut self) -> Result<Option<OffsetPair>> {
        match self {
            OffsetPairsCursor::Delta {
                reader,
                remaining,
                prev_end,
            } => {
                if *remaining == 0 {
                    return Ok(None);
                }
                let start_delta = reader.next()?;
                let length = reader.next()?;
                let start = *prev_end + start_delta;
                let end = start + length;
                *prev_end = end;
                *remaining -= 1;
                Ok(Some(OffsetPair { start, end }))
            }
            OffsetPairsCursor::Slice { pairs, idx } => {
                if *idx >= pairs.len() {
                    return Ok(None);
                }
                let pair = pairs[*idx];
                *idx += 1;
                Ok(Some(pair))
            }
        }
    }

    /// Drain the remaining pairs into a vector.
    pub fn collect_remaining(&mut self) -> Result<Vec<OffsetPair>> {
        let mut out = Vec::new();
        while let Some(pair) = self.next()? {
            out.push(pair);
        }
        Ok(out)
    }
}

/// Pop-style iterator over one posting's positions (gap-decoded for the
/// compressed family). This is the iterator the phrase verifier consumes.
#[derive(Debug, Clone)]
pub enum PositionsCursor<'a> {
    Delta {
        reader: VarintReader<'a>,
        remaining: u32,
        last: u32,
    },
    Slice {
        positions: &'a [Position],
        idx: usize,
    },
}

impl<'a> PositionsCursor<'a> {
    pub fn empty() -> Self {
        PositionsCursor::Slice {
            positions: &[],
            idx: 0,
        }
    }

    pub fn is_end(&self) -> bool {
        match self {
            PositionsCursor::Delta { remaining, .. } => *remaining == 0,
            PositionsCursor::Slice { positions, idx } => *idx >= positions.len(),
        }
    }

    /// Pop the next position. Precondition: `!is_end()`.
    pub fn pop(&mut self) -> Result<Position> {
        match self {
            PositionsCursor::Delta {
                reader,
                remaining,
                last,
            } => {
                debug_assert!(*remaining > 0);
                let gap = reader.next()?;
                *last += gap;
                *remaining -= 1;
                Ok(*last)
            }
            PositionsCursor::Slice { positions, idx } => {
                debug_assert!(*idx < positions.len());
                let pos = positions[*idx];
                *idx += 1;
                Ok(pos)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::varint::VarintBuffer;

    #[test]
    fn delta_offsets_decode_against_running_cursor() {
        // pairs (0,4) and (6,10): deltas (0,4) then (2,4)
        let mut buf = VarintBuffer::new();
        for v in [0u32, 4, 2, 4] {
            buf.append(v);
        }
        let mut cursor = OffsetPairsCursor::Delta {
            reader: VarintReader::new(buf.as_slice()),
            remaining: 2,
            prev_end: 0,
        };
        assert_eq!(cursor.next().unwrap(), Some(OffsetPair::new(0, 4)));
        assert_eq!(cursor.next().unwrap(), Some(OffsetPair::new(6, 10)));
        assert_eq!(cursor.next().unwrap(), None);
    }

    #[test]
    fn slice_positions_pop_in_order() {
        let positions = [1u32, 5, 9];
        let mut cursor = PositionsCursor::Slice {
            positions: &positions,
            idx: 0,
        };
        assert_eq!(cursor.pop().unwrap(), 1);
        assert_eq!(cursor.pop().unwrap(), 5);
        assert_eq!(cursor.pop().unwrap(), 9);
        assert!(cursor.is_end());
    }
}
