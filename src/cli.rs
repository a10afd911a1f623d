// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the skipjack binary.
//!
//! Two subcommands: `query` loads a line-doc file into a fresh in-memory
//! index and runs one search against it; `stats` loads and prints corpus
//! figures instead.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "skipjack",
    about = "In-memory full-text search over line-doc corpora",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a line-doc file and run one query against it
    Query {
        /// Path to the tab-separated line-doc file
        #[arg(short, long)]
        line_docs: PathBuf,

        /// Maximum number of documents to load
        #[arg(short, long, default_value = "1000000")]
        n_docs: usize,

        /// Loader kind: `naive` or `with-offsets`
        #[arg(long, default_value = "naive")]
        loader: String,

        /// Query terms
        #[arg(required = true)]
        terms: Vec<String>,

        /// Require the terms as an ordered adjacent phrase
        #[arg(long)]
        phrase: bool,

        /// Number of results to return
        #[arg(short = 'k', long, default_value = "5")]
        n_results: usize,

        /// Generate highlighted snippets
        #[arg(long)]
        snippets: bool,

        /// Passages per snippet
        #[arg(long, default_value = "3")]
        n_passages: usize,

        /// Posting list layout: `compressed` or `uncompressed`
        #[arg(long, default_value = "compressed")]
        index_kind: String,

        /// Document store layout: `plain` or `compressed`
        #[arg(long, default_value = "plain")]
        doc_store: String,

        /// Bloom phrase-pruning enable factor (omit to disable)
        #[arg(long)]
        bloom_factor: Option<i64>,

        /// Emit the result as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Load a line-doc file and print corpus statistics
    Stats {
        /// Path to the tab-separated line-doc file
        #[arg(short, long)]
        line_docs: PathBuf,

        /// Maximum number of documents to load
        #[arg(short, long, default_value = "1000000")]
        n_docs: usize,

        /// Loader kind: `naive` or `with-offsets`
        #[arg(long, default_value = "naive")]
        loader: String,

        /// Terms to report posting-list sizes for
        terms: Vec<String>,
    },
}
