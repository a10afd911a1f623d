// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query and result types, and the DAAT processors behind them.

pub mod phrase;
pub mod processor;

use serde::{Deserialize, Serialize};

use crate::postings::DocId;

pub use phrase::{PhraseVerifier, PositionEntry, PositionTable};
pub use processor::{process_query, ResultDocEntry, TopKHeap};

pub const DEFAULT_N_RESULTS: usize = 5;
pub const DEFAULT_SNIPPET_PASSAGES: usize = 3;

/// One ranked query. `n_results == 0` short-circuits to an empty result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub terms: Vec<String>,
    pub is_phrase: bool,
    pub n_results: usize,
    pub return_snippets: bool,
    pub n_snippet_passages: usize,
}

impl SearchQuery {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            is_phrase: false,
            n_results: DEFAULT_N_RESULTS,
            return_snippets: false,
            n_snippet_passages: DEFAULT_SNIPPET_PASSAGES,
        }
    }

    pub fn phrase(mut self, is_phrase: bool) -> Self {
        self.is_phrase = is_phrase;
        self
    }

    pub fn n_results(mut self, n: usize) -> Self {
        self.n_results = n;
        self
    }

    pub fn snippets(mut self, enabled: bool) -> Self {
        self.return_snippets = enabled;
        self
    }

    pub fn n_snippet_passages(mut self, n: usize) -> Self {
        self.n_snippet_passages = n;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResultEntry {
    pub doc_id: DocId,
    pub score: f64,
    /// Empty unless the query asked for snippets.
    pub snippet: String,
}

/// Entries are sorted by score descending; ties keep insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub entries: Vec<SearchResultEntry>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
