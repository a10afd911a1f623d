// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Passage-scoring snippet highlighter.
//!
//! The document is split into sentence passages; the per-term offset
//! streams are merge-scanned by ascending start offset and bucketed into
//! the passage that contains them. Each passage scores as the sum over the
//! terms it contains of `passage_norm(start) * tf_norm(matches, length)` —
//! a positional factor favouring early passages times the BM25 shape over
//! the match count. The top passages are re-sorted into document order and
//! rendered with every matched span wrapped in `<b>…<\b>` (the closing tag
//! carries a literal backslash), one `\n` after each passage.

pub mod sentence;

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use crate::postings::OffsetPair;

pub use sentence::SentenceBreakIterator;

/// Byte-length pivot for both the positional and the tf norm.
const PASSAGE_PIVOT: f64 = 87.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PassageMatch {
    start: usize,
    end: usize,
    term: usize,
}

#[derive(Debug, Clone)]
struct Passage {
    start: usize,
    end: usize,
    matches: Vec<PassageMatch>,
    score: f64,
}

impl PartialEq for Passage {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Passage {}

impl PartialOrd for Passage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Passage {
    // score ascending; equal scores pop the later passage first so the
    // earlier one survives eviction
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.start.cmp(&self.start))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimpleHighlighter {
    pub k1: f64,
    pub b: f64,
}

impl Default for SimpleHighlighter {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl SimpleHighlighter {
    /// Positional factor: early passages make better snippets.
    fn passage_norm(&self, start: f64) -> f64 {
        1.0 / (1.0 + start / PASSAGE_PIVOT)
    }

    /// BM25-shaped saturation over the match count of one term.
    fn tf_norm(&self, freq: f64, passage_len: f64) -> f64 {
        freq * (self.k1 + 1.0)
            / (freq + self.k1 * (1.0 - self.b + self.b * passage_len / PASSAGE_PIVOT))
    }

    fn score_passage(&self, passage: &Passage) -> f64 {
        let mut freq_by_term: HashMap<usize, u32> = HashMap::new();
        for m in &passage.matches {
            *freq_by_term.entry(m.term).or_default() += 1;
        }
        let len = (passage.end - passage.start + 1) as f64;
        let norm = self.passage_norm(passage.start as f64);
        freq_by_term
            .values()
            .map(|&f| norm * self.tf_norm(f as f64, len))
            .sum()
    }

    /// Render the best `n_passages` snippets for a document. `offsets`
    /// holds one ascending stream of matched spans per query term.
    pub fn highlight(
        &self,
        offsets: &[Vec<OffsetPair>],
        n_passages: usize,
        text: &str,
    ) -> String {
        if text.is_empty() || n_passages == 0 {
            return String::new();
        }

        // merge-scan the streams by ascending start offset
        let mut merge: BinaryHeap<Reverse<(u32, u32, usize, usize)>> = BinaryHeap::new();
        for (term, stream) in offsets.iter().enumerate() {
            if let Some(pair) = stream.first() {
                merge.push(Reverse((pair.start, pair.end, term, 0)));
            }
        }

        let mut sentences = SentenceBreakIterator::new(text);
        let mut selected: BinaryHeap<Reverse<Passage>> = BinaryHeap::new();
        let mut current: Option<Passage> = None;

        while let Some(Reverse((start, end, term, idx))) = merge.pop() {
            if let Some(next) = offsets[term].get(idx + 1) {
                merge.push(Reverse((next.start, next.end, term, idx + 1)));
            }
            let start = start as usize;
            if start >= text.len() {
                break;
            }

            let needs_new_passage = current.as_ref().map_or(true, |p| start > p.end);
            if needs_new_passage {
                if let Some(done) = current.take() {
                    self.offer_passage(&mut selected, done, n_passages);
                }
                if sentences.skip_to(start) == 0 {
                    break;
                }
                current = Some(Passage {
                    start: sentences.start_offset(),
                    end: sentences.end_offset(),
                    matches: Vec::new(),
                    score: 0.0,
                });
            }

            if let Some(passage) = current.as_mut() {
                passage.matches.push(PassageMatch {
                    start,
                    end: (end as usize).min(passage.end),
                    term,
                });
            }
        }
        if let Some(done) = current.take() {
            self.offer_passage(&mut selected, done, n_passages);
        }

        // back into document order
        let mut passages: Vec<Passage> = selected.into_iter().map(|r| r.0).collect();
        passages.sort_by_key(|p| p.start);

        let mut out = String::new();
        for passage in &passages {
            render_passage(passage, text, &mut out);
        }
        out
    }

    fn offer_passage(
        &self,
        selected: &mut BinaryHeap<Reverse<Passage>>,
        mut passage: Passage,
        n_passages: usize,
    ) {
        passage.score = self.score_passage(&passage);
        if selected.len() == n_passages {
            if let Some(Reverse(min)) = selected.peek() {
                if passage.score <= min.score {
                    return;
                }
            }
            selected.pop();
        }
        selected.push(Reverse(passage));
    }
}

fn render_passage(passage: &Passage, text: &str, out: &mut String) {
    let mut matches = passage.matches.clone();
    matches.sort_by_key(|m| (m.start, m.end));
    matches.dedup();

    let mut cur = passage.start;
    for m in &matches {
        if m.start < cur {
            // overlapping span from a duplicated query term
            continue;
        }
        out.push_str(&text[cur..m.start]);
        out.push_str("<b>");
        out.push_str(&text[m.start..=m.end]);
        out.push_str("<\\b>");
        cur = m.end + 1;
    }
    if cur <= passage.end {
        out.push_str(&text[cur..=passage.end]);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(spans: &[(u32, u32)]) -> Vec<OffsetPair> {
        spans.iter().map(|&(s, e)| OffsetPair::new(s, e)).collect()
    }

    #[test]
    fn one_term_query() {
        let highlighter = SimpleHighlighter::default();
        let s = highlighter.highlight(&[pairs(&[(0, 4)])], 2, "hello world");
        assert_eq!(s, "<b>hello<\\b> world\n");
    }

    #[test]
    fn two_term_query() {
        let highlighter = SimpleHighlighter::default();
        let s = highlighter.highlight(&[pairs(&[(0, 4)]), pairs(&[(6, 10)])], 2, "hello world");
        assert_eq!(s, "<b>hello<\\b> <b>world<\\b>\n");
    }

    #[test]
    fn repeated_term_highlights_every_occurrence() {
        let highlighter = SimpleHighlighter::default();
        let s = highlighter.highlight(
            &[pairs(&[(0, 4)]), pairs(&[(6, 10), (16, 20)])],
            2,
            "hello world big world",
        );
        assert_eq!(s, "<b>hello<\\b> <b>world<\\b> big <b>world<\\b>\n");
    }

    #[test]
    fn empty_document() {
        let highlighter = SimpleHighlighter::default();
        assert_eq!(highlighter.highlight(&[], 5, ""), "");
    }

    #[test]
    fn single_letter_document() {
        let highlighter = SimpleHighlighter::default();
        let s = highlighter.highlight(&[pairs(&[(0, 0)])], 5, "0");
        assert_eq!(s, "<b>0<\\b>\n");
    }

    #[test]
    fn two_letter_document() {
        let highlighter = SimpleHighlighter::default();
        let s = highlighter.highlight(&[pairs(&[(0, 0)]), pairs(&[(2, 2)])], 5, "0 1");
        assert_eq!(s, "<b>0<\\b> <b>1<\\b>\n");
    }

    #[test]
    fn passage_cap_keeps_best_and_restores_order() {
        // three sentences with matches; a cap of two drops the weakest
        let text = "cat here. filler sentence without it. cat again and cat.";
        //          cat at 0, cat at 38, cat at 52
        let highlighter = SimpleHighlighter::default();
        let s = highlighter.highlight(&[pairs(&[(0, 2), (38, 40), (52, 54)])], 2, text);
        let rendered: Vec<&str> = s.split_terminator('\n').collect();
        assert_eq!(rendered.len(), 2);
        // first passage leads; chosen passages stay in document order
        assert_eq!(rendered[0], "<b>cat<\\b> here. ");
        assert_eq!(rendered[1], "<b>cat<\\b> again and <b>cat<\\b>.");
    }

    #[test]
    fn offsets_past_the_text_are_ignored() {
        let highlighter = SimpleHighlighter::default();
        let s = highlighter.highlight(&[pairs(&[(0, 4), (90, 95)])], 2, "hello world");
        assert_eq!(s, "<b>hello<\\b> world\n");
    }
}
