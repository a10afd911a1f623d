// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The engine facade: ingest on one side, ranked search on the other.
//!
//! Ingest requires `&mut self` and queries take `&self`, so the type system
//! rules out interleaving; once ingest is done the engine can be shared
//! across any number of query threads without locks. A query itself is a
//! plain synchronous function — bounded by the posting-list sizes and the
//! top-k heap, with no internal concurrency.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::EngineConfig;
use crate::doc_length::DocLengthStore;
use crate::doc_store::DocStore;
use crate::error::{Error, Result};
use crate::highlight::SimpleHighlighter;
use crate::index::{IndexStore, InvertedIndexDelta, InvertedIndexVec, TokenOccurrence};
use crate::load::{
    self, count_terms, parse_offsets, parse_positions, tokenize_with_spans, LineDocFile,
    LoaderKind,
};
use crate::postings::{DocId, OffsetPair, Position, PostingCursor};
use crate::query::{process_query, SearchQuery, SearchResult, SearchResultEntry};
use crate::scoring::Bm25Similarity;

pub struct Engine {
    index: IndexStore,
    doc_store: DocStore,
    doc_lengths: DocLengthStore,
    similarity: Bm25Similarity,
    highlighter: SimpleHighlighter,
    bloom_enable_factor: Option<u32>,
    next_doc_id: DocId,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Compressed index, plain document store, bloom pruning off.
    pub fn new() -> Self {
        Self {
            index: IndexStore::Delta(InvertedIndexDelta::new(false)),
            doc_store: DocStore::plain(),
            doc_lengths: DocLengthStore::new(),
            similarity: Bm25Similarity::default(),
            highlighter: SimpleHighlighter::default(),
            bloom_enable_factor: None,
            next_doc_id: 0,
        }
    }

    pub fn with_config(config: &EngineConfig) -> Result<Self> {
        let bloom_enable_factor = if config.has_int("bloom_enable_factor") {
            Some(config.get_int("bloom_enable_factor")? as u32)
        } else {
            None
        };
        // sidecars are only worth building when something will consult them
        let build_blooms = bloom_enable_factor.is_some();

        let index = match config
            .has_str("inverted_index")
            .then(|| config.get_str("inverted_index"))
            .transpose()?
            .unwrap_or("compressed")
        {
            "compressed" => IndexStore::Delta(InvertedIndexDelta::new(build_blooms)),
            "uncompressed" => IndexStore::Vec(InvertedIndexVec::new(build_blooms)),
            other => {
                return Err(Error::UnknownConfigKey(format!(
                    "inverted_index value '{other}'"
                )))
            }
        };

        let doc_store = match config
            .has_str("doc_store")
            .then(|| config.get_str("doc_store"))
            .transpose()?
            .unwrap_or("plain")
        {
            "plain" => DocStore::plain(),
            "compressed" => DocStore::compressed(),
            other => {
                return Err(Error::UnknownConfigKey(format!(
                    "doc_store value '{other}'"
                )))
            }
        };

        Ok(Self {
            index,
            doc_store,
            doc_lengths: DocLengthStore::new(),
            similarity: Bm25Similarity::default(),
            highlighter: SimpleHighlighter::default(),
            bloom_enable_factor,
            next_doc_id: 0,
        })
    }

    /// Ingest one document and return its id.
    ///
    /// `tokens` is the tokenized body. Without `token_offsets` the offsets
    /// and positions are derived from the token stream itself; with them,
    /// `tokens` lists distinct terms and each offset group carries every
    /// occurrence of its term. Positions default to the rank of each offset
    /// in the document when their group is absent.
    pub fn add_document(
        &mut self,
        body: &str,
        tokens: &str,
        token_offsets: Option<&[Vec<OffsetPair>]>,
        token_positions: Option<&[Vec<Position>]>,
    ) -> Result<DocId> {
        let doc_id = self.next_doc_id;

        let occurrences: Vec<TokenOccurrence<'_>> = match token_offsets {
            None => tokenize_with_spans(tokens)
                .into_iter()
                .map(|(term, offset, position)| TokenOccurrence {
                    term,
                    offset,
                    position,
                })
                .collect(),
            Some(offset_groups) => {
                let terms: Vec<&str> = tokens.split(' ').filter(|t| !t.is_empty()).collect();
                if offset_groups.len() != terms.len() {
                    return Err(malformed(format!(
                        "{} offset groups for {} terms",
                        offset_groups.len(),
                        terms.len()
                    )));
                }
                let positions = match token_positions {
                    Some(groups) => {
                        if groups.len() != terms.len()
                            || groups
                                .iter()
                                .zip(offset_groups)
                                .any(|(p, o)| p.len() != o.len())
                        {
                            return Err(malformed(
                                "position groups do not line up with offsets".to_string(),
                            ));
                        }
                        groups.to_vec()
                    }
                    None => derive_positions(offset_groups),
                };
                terms
                    .iter()
                    .zip(offset_groups.iter().zip(&positions))
                    .flat_map(|(&term, (offsets, positions))| {
                        offsets.iter().zip(positions).map(move |(&offset, &position)| {
                            TokenOccurrence {
                                term,
                                offset,
                                position,
                            }
                        })
                    })
                    .collect()
            }
        };

        self.doc_store.add(doc_id, body)?;
        self.index.add_document(doc_id, &occurrences);
        self.doc_lengths
            .add_length(doc_id, count_terms(body) as u32);
        self.next_doc_id += 1;
        Ok(doc_id)
    }

    /// Batch-ingest up to `n_rows` documents from a line-doc file. Returns
    /// the number loaded; a malformed row aborts with that count attached.
    pub fn load_local_documents(
        &mut self,
        path: impl AsRef<Path>,
        n_rows: usize,
        loader: LoaderKind,
    ) -> Result<usize> {
        let mut file = LineDocFile::open(path.as_ref())?;

        let require = |col: Option<usize>, name: &str| {
            col.ok_or_else(|| Error::MalformedLineDoc {
                line: 1,
                reason: format!("missing required column '{name}'"),
                accepted: 0,
            })
        };
        require(file.column(load::COL_TITLE), load::COL_TITLE)?;
        let body_col = require(file.column(load::COL_BODY), load::COL_BODY)?;
        let tokens_col = require(file.column(load::COL_TOKENS), load::COL_TOKENS)?;
        let offsets_col = match loader {
            LoaderKind::Naive => None,
            LoaderKind::WithOffsets => {
                Some(require(file.column(load::COL_OFFSETS), load::COL_OFFSETS)?)
            }
        };
        let positions_col = file.column(load::COL_POSITIONS);

        let mut accepted = 0usize;
        while accepted < n_rows {
            let Some(row) = file.next_row()? else {
                break;
            };
            let line = file.line_no();

            let body = get_field(&row, body_col, load::COL_BODY, line, accepted)?;
            let tokens = get_field(&row, tokens_col, load::COL_TOKENS, line, accepted)?;

            let offsets = match offsets_col {
                None => None,
                Some(col) => {
                    let raw = get_field(&row, col, load::COL_OFFSETS, line, accepted)?;
                    Some(parse_offsets(raw).ok_or_else(|| Error::MalformedLineDoc {
                        line,
                        reason: "bad token_offsets field".to_string(),
                        accepted,
                    })?)
                }
            };
            let positions = match (offsets.is_some(), positions_col) {
                (true, Some(col)) => match row.get(col).map(String::as_str) {
                    Some(raw) if !raw.is_empty() => {
                        Some(parse_positions(raw).ok_or_else(|| Error::MalformedLineDoc {
                            line,
                            reason: "bad token_positions field".to_string(),
                            accepted,
                        })?)
                    }
                    _ => None,
                },
                _ => None,
            };

            self.add_document(body, tokens, offsets.as_deref(), positions.as_deref())
                .map_err(|e| match e {
                    Error::MalformedLineDoc { reason, .. } => Error::MalformedLineDoc {
                        line,
                        reason,
                        accepted,
                    },
                    other => other,
                })?;
            accepted += 1;

            if accepted % 10_000 == 0 {
                log::info!("indexed {accepted} documents");
            }
        }

        log::info!(
            "loaded {accepted} documents, {} terms in inverted index",
            self.term_count()
        );
        Ok(accepted)
    }

    pub fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        let result = self.search_inner(query);
        if let Err(Error::CorruptStream(what)) = &result {
            log::warn!("query aborted on corrupt stream: {what}");
        }
        result
    }

    fn search_inner(&self, query: &SearchQuery) -> Result<SearchResult> {
        if query.n_results == 0 || query.terms.is_empty() {
            return Ok(SearchResult::empty());
        }
        match &self.index {
            IndexStore::Delta(index) => match index.cursors(&query.terms)? {
                None => Ok(SearchResult::empty()),
                Some(cursors) => self.run_query(cursors, query),
            },
            IndexStore::Vec(index) => match index.cursors(&query.terms)? {
                None => Ok(SearchResult::empty()),
                Some(cursors) => self.run_query(cursors, query),
            },
        }
    }

    fn run_query<'a, C: PostingCursor<'a>>(
        &'a self,
        cursors: Vec<C>,
        query: &SearchQuery,
    ) -> Result<SearchResult> {
        let entries = process_query(
            cursors,
            &self.doc_lengths,
            self.doc_lengths.size(),
            &self.similarity,
            query.n_results,
            query.is_phrase,
            self.bloom_enable_factor,
        )?;

        let mut result = SearchResult::empty();
        for entry in entries {
            let snippet = if query.return_snippets {
                let offsets = entry.offsets_for_highlighting()?;
                match self.doc_store.get(entry.doc_id)? {
                    Some(body) => {
                        self.highlighter
                            .highlight(&offsets, query.n_snippet_passages, &body)
                    }
                    None => String::new(),
                }
            } else {
                String::new()
            };
            result.entries.push(SearchResultEntry {
                doc_id: entry.doc_id,
                score: entry.score,
                snippet,
            });
        }
        Ok(result)
    }

    /// Number of distinct terms indexed.
    pub fn term_count(&self) -> usize {
        self.index.term_count()
    }

    pub fn postinglist_sizes(&self, terms: &[String]) -> BTreeMap<String, usize> {
        self.index.postinglist_sizes(terms)
    }

    /// Quantised token length of a document, 0 for unknown ids.
    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get_length(doc_id).round() as u32
    }

    pub fn document(&self, doc_id: DocId) -> Result<Option<String>> {
        Ok(self.doc_store.get(doc_id)?.map(|c| c.into_owned()))
    }

    pub fn doc_count(&self) -> usize {
        self.doc_lengths.size()
    }
}

fn malformed(reason: String) -> Error {
    Error::MalformedLineDoc {
        line: 0,
        reason,
        accepted: 0,
    }
}

fn get_field<'r>(
    row: &'r [String],
    col: usize,
    name: &str,
    line: usize,
    accepted: usize,
) -> Result<&'r str> {
    row.get(col)
        .map(String::as_str)
        .ok_or_else(|| Error::MalformedLineDoc {
            line,
            reason: format!("row has no '{name}' field"),
            accepted,
        })
}

/// Positions from offsets alone: each pair's rank by start offset across
/// the whole document is its token ordinal.
fn derive_positions(offset_groups: &[Vec<OffsetPair>]) -> Vec<Vec<Position>> {
    let mut flat: Vec<(u32, usize, usize)> = offset_groups
        .iter()
        .enumerate()
        .flat_map(|(g, pairs)| pairs.iter().enumerate().map(move |(i, p)| (p.start, g, i)))
        .collect();
    flat.sort_unstable();

    let mut positions: Vec<Vec<Position>> = offset_groups
        .iter()
        .map(|pairs| vec![0; pairs.len()])
        .collect();
    for (ordinal, &(_, g, i)) in flat.iter().enumerate() {
        positions[g][i] = ordinal as Position;
    }
    positions
}
