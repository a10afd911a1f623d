// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Skipjack CLI: load a line-doc corpus and query it.
//!
//! ```bash
//! # top-5 conjunction with snippets
//! skipjack query --line-docs wiki.linedoc -n 10000 hello world --snippets
//!
//! # ordered phrase, JSON output
//! skipjack query --line-docs wiki.linedoc "hello" "world" --phrase --json
//!
//! # corpus statistics
//! skipjack stats --line-docs wiki.linedoc hello world
//! ```

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;

use skipjack::{Engine, EngineConfig, LoaderKind, SearchQuery};

mod cli;
use cli::{Cli, Commands};

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> skipjack::Result<()> {
    match cli.command {
        Commands::Query {
            line_docs,
            n_docs,
            loader,
            terms,
            phrase,
            n_results,
            snippets,
            n_passages,
            index_kind,
            doc_store,
            bloom_factor,
            json,
        } => {
            let mut config = EngineConfig::new();
            config.set_str("inverted_index", &index_kind);
            config.set_str("doc_store", &doc_store);
            if let Some(factor) = bloom_factor {
                config.set_int("bloom_enable_factor", factor);
            }

            let mut engine = Engine::with_config(&config)?;
            let loaded =
                engine.load_local_documents(&line_docs, n_docs, LoaderKind::from_str(&loader)?)?;

            let query = SearchQuery::new(terms)
                .phrase(phrase)
                .n_results(n_results)
                .snippets(snippets)
                .n_snippet_passages(n_passages);
            let result = engine.search(&query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result).expect("json"));
            } else {
                println!("{loaded} documents loaded, {} hits", result.len());
                for entry in &result.entries {
                    println!("doc {:>6}  score {:.3}", entry.doc_id, entry.score);
                    if snippets && !entry.snippet.is_empty() {
                        for line in entry.snippet.split_terminator('\n') {
                            println!("    {line}");
                        }
                    }
                }
            }
            Ok(())
        }

        Commands::Stats {
            line_docs,
            n_docs,
            loader,
            terms,
        } => {
            let mut engine = Engine::new();
            let loaded =
                engine.load_local_documents(&line_docs, n_docs, LoaderKind::from_str(&loader)?)?;

            println!("documents: {loaded}");
            println!("terms:     {}", engine.term_count());
            if !terms.is_empty() {
                for (term, size) in engine.postinglist_sizes(&terms) {
                    println!("df({term}) = {size}");
                }
            }
            Ok(())
        }
    }
}
