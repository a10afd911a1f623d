// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! BM25 similarity.
//!
//! The formula and defaults (k1 = 1.2, b = 0.75) follow the Lucene/
//! Elasticsearch practical variant; the concrete scores in the integration
//! tests were produced by indexing the same corpus into Elasticsearch and
//! match to three significant digits.

use crate::doc_length::DocLengthStore;
use crate::error::Result;
use crate::postings::PostingCursor;

#[derive(Debug, Clone, Copy)]
pub struct Bm25Similarity {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Similarity {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Similarity {
    /// The term-frequency factor: `tf*(k1+1) / (tf + k1*(1 - b + b*|d|/avg))`.
    pub fn tf_norm(&self, term_freq: f64, doc_length: f64, avg_doc_length: f64) -> f64 {
        term_freq * (self.k1 + 1.0)
            / (term_freq + self.k1 * (1.0 - self.b + self.b * doc_length / avg_doc_length))
    }
}

/// `ln(1 + (N - df + 0.5) / (df + 0.5))`, stable over a query.
pub fn idf(n_total_docs: usize, doc_freq: usize) -> f64 {
    let n = n_total_docs as f64;
    let df = doc_freq as f64;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// Score the document every cursor currently rests on. Preconditions: no
/// cursor is at end and all report the same doc id.
pub fn score_doc<'a, C: PostingCursor<'a>>(
    cursors: &[C],
    idfs: &[f64],
    doc_lengths: &DocLengthStore,
    similarity: &Bm25Similarity,
) -> Result<f64> {
    debug_assert_eq!(cursors.len(), idfs.len());
    let doc_length = doc_lengths.get_length(cursors[0].doc_id());
    let avg = doc_lengths.avg_length();

    let mut score = 0.0;
    for (cursor, &idf_of_term) in cursors.iter().zip(idfs) {
        debug_assert_eq!(cursor.doc_id(), cursors[0].doc_id());
        score += idf_of_term * similarity.tf_norm(cursor.term_freq() as f64, doc_length, avg);
    }
    Ok(score)
}
