// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Ordered-adjacency phrase matching over position iterators.
//!
//! A document that survives conjunctive intersection contains every query
//! term somewhere; the verifier checks that the terms appear at consecutive
//! positions. Subtracting each iterator's query ordinal from its positions
//! reduces the problem to "all adjusted positions equal": for the phrase
//! `hello world program`, a match at anchor `a` means term i sits at `a+i`.
//!
//! Every match records, per term, the position and the 0-based ordinal of
//! that position within the term's posting (`term_appearance`); the
//! highlighter later uses the ordinal to pick the matching offset pairs out
//! of the offset stream.

use crate::error::Result;
use crate::postings::{Position, PositionsCursor};

/// One cell of the position table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionEntry {
    pub pos: Position,
    /// Ordinal of `pos` within its term's posting; indexes the offset-pair
    /// stream.
    pub term_appearance: u32,
}

/// One row per query term, one column per phrase match.
#[derive(Debug, Clone, Default)]
pub struct PositionTable {
    rows: Vec<Vec<PositionEntry>>,
}

impl PositionTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_matches(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row(&self, i: usize) -> &[PositionEntry] {
        &self.rows[i]
    }

    fn reset(&mut self, n_rows: usize) {
        self.rows.clear();
        self.rows.resize(n_rows, Vec::new());
    }

    fn push(&mut self, row: usize, pos: Position, term_appearance: u32) {
        self.rows[row].push(PositionEntry {
            pos,
            term_appearance,
        });
    }
}

#[derive(Debug, Clone, Copy)]
struct LastPopped {
    pos: i64,
    appearance: i64,
}

/// Reusable phrase matcher. `reset` it for each candidate document, let the
/// posting cursors assign their position iterators, then `process`.
#[derive(Debug, Default)]
pub struct PhraseVerifier<'a> {
    iters: Vec<PositionsCursor<'a>>,
    last: Vec<LastPopped>,
    table: PositionTable,
}

impl<'a> PhraseVerifier<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, n_terms: usize) {
        self.iters.clear();
        self.iters.resize_with(n_terms, PositionsCursor::empty);
        self.last.clear();
        self.last.resize(
            n_terms,
            LastPopped {
                pos: 0,
                appearance: -1,
            },
        );
        self.table.reset(n_terms);
    }

    /// The slot the i-th posting cursor assigns its positions into.
    pub fn iter_mut(&mut self, i: usize) -> &mut PositionsCursor<'a> {
        &mut self.iters[i]
    }

    /// Find all anchors; returns the match count.
    pub fn process(&mut self) -> Result<usize> {
        if self.iters.len() == 2 {
            self.process_two_term()?;
        } else {
            self.process_general()?;
        }
        Ok(self.table.n_matches())
    }

    /// Column-for-column copy of every match found.
    pub fn take_table(&mut self) -> PositionTable {
        std::mem::take(&mut self.table)
    }

    fn pop(&mut self, i: usize) -> Result<()> {
        self.last[i].pos = self.iters[i].pop()? as i64;
        self.last[i].appearance += 1;
        Ok(())
    }

    /// Two-pointer merge on (pos0, pos1 - 1); equal adjusted positions are
    /// matches.
    fn process_two_term(&mut self) -> Result<()> {
        if self.iters[0].is_end() || self.iters[1].is_end() {
            return Ok(());
        }
        self.pop(0)?;
        self.pop(1)?;

        loop {
            let p0 = self.last[0].pos;
            let p1 = self.last[1].pos - 1;
            if p0 == p1 {
                let (a0, a1) = (self.last[0].appearance, self.last[1].appearance);
                self.table.push(0, p0 as Position, a0 as u32);
                self.table.push(1, (p1 + 1) as Position, a1 as u32);
                if self.iters[0].is_end() || self.iters[1].is_end() {
                    break;
                }
                self.pop(0)?;
                self.pop(1)?;
            } else if p0 < p1 {
                if self.iters[0].is_end() {
                    break;
                }
                self.pop(0)?;
            } else {
                if self.iters[1].is_end() {
                    break;
                }
                self.pop(1)?;
            }
        }
        Ok(())
    }

    fn process_general(&mut self) -> Result<()> {
        // prime one position from each list
        for i in 0..self.iters.len() {
            if self.iters[i].is_end() {
                return Ok(());
            }
            self.pop(i)?;
        }

        loop {
            let max_adjusted = self.max_adjusted();
            if !self.move_popped_beyond(max_adjusted)? {
                return Ok(());
            }
            if self.is_popped_match(max_adjusted) {
                for i in 0..self.iters.len() {
                    let LastPopped { pos, appearance } = self.last[i];
                    self.table.push(i, pos as Position, appearance as u32);
                }
                if !self.move_popped_beyond(max_adjusted + 1)? {
                    return Ok(());
                }
            }
        }
    }

    fn max_adjusted(&self) -> i64 {
        self.last
            .iter()
            .enumerate()
            .map(|(i, l)| l.pos - i as i64)
            .max()
            .unwrap_or(0)
    }

    /// Pop each list until its adjusted position reaches `target`. False
    /// when a list exhausts short of it, which ends the search.
    fn move_popped_beyond(&mut self, target: i64) -> Result<bool> {
        for i in 0..self.iters.len() {
            while !self.iters[i].is_end() && self.last[i].pos - (i as i64) < target {
                self.pop(i)?;
            }
            if self.iters[i].is_end() && self.last[i].pos - (i as i64) < target {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn is_popped_match(&self, max_adjusted: i64) -> bool {
        self.last
            .iter()
            .enumerate()
            .all(|(i, l)| l.pos - i as i64 == max_adjusted)
    }
}
