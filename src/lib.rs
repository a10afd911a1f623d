// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory full-text search: delta-compressed postings, BM25 top-k
//! retrieval, phrase queries, and passage-scored snippets.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌───────────────┐    ┌───────────────┐
//! │  codec/    │───▶│  postings/    │───▶│  query/       │
//! │  (varint,  │    │  (delta + vec │    │  (DAAT top-k, │
//! │   packed)  │    │   cursors)    │    │   phrase)     │
//! └────────────┘    └───────────────┘    └───────┬───────┘
//!       ▲                  ▲                     │
//!       │           ┌──────┴──────┐      ┌───────▼───────┐
//!       │           │  index.rs   │      │  highlight/   │
//!       │           │ term → list │      │  (passages)   │
//!       │           └──────┬──────┘      └───────┬───────┘
//!       │                  │                     │
//!       └──────────┬───────┴─────────────────────┘
//!                  │     engine.rs (ingest + search facade)
//!                  └───── scoring.rs · doc_length.rs · doc_store.rs
//! ```
//!
//! Queries are document-at-a-time: the per-term posting cursors leap-frog
//! each other with `skip_forward`, matching docs are BM25-scored against
//! the byte-quantised length store, and survivors hold their offset
//! iterators so the highlighter can render `<b>…<\b>` snippets afterwards.
//! Phrase queries add an ordered-adjacency pass over position iterators,
//! optionally pruned by per-posting bloom fingerprints.
//!
//! # Usage
//!
//! ```
//! use skipjack::{Engine, SearchQuery};
//!
//! let mut engine = Engine::new();
//! engine.add_document("hello world", "hello world", None, None).unwrap();
//!
//! let result = engine.search(&SearchQuery::new(["hello"])).unwrap();
//! assert_eq!(result.entries[0].doc_id, 0);
//! ```
//!
//! Ingest is exclusive (`&mut`), search is shared (`&`); after ingest the
//! engine is safely queried from many threads at once.

pub mod codec;
pub mod config;
pub mod doc_length;
pub mod doc_store;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod index;
pub mod load;
pub mod postings;
pub mod query;
pub mod scoring;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use highlight::{SentenceBreakIterator, SimpleHighlighter};
pub use index::{IndexStore, InvertedIndexDelta, InvertedIndexVec, TokenOccurrence};
pub use load::LoaderKind;
pub use postings::{
    DocId, OffsetPair, Position, Posting, PostingCursor, PostingListDelta, PostingListVec,
    Presence,
};
pub use query::{SearchQuery, SearchResult, SearchResultEntry};
pub use scoring::Bm25Similarity;
