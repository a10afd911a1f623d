// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Search invariants over randomly generated corpora: result bounds,
//! ordering, conjunction semantics, phrase semantics, and family parity.

use proptest::prelude::*;

use skipjack::{Engine, EngineConfig, SearchQuery};

const ALPHABET: [&str; 6] = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"];

fn corpus() -> impl Strategy<Value = Vec<Vec<&'static str>>> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(&ALPHABET[..]), 1..15),
        1..12,
    )
}

fn query_terms() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(&ALPHABET[..]), 1..4)
}

fn build_engine(corpus: &[Vec<&str>], config: Option<&EngineConfig>) -> Engine {
    let mut engine = match config {
        Some(config) => Engine::with_config(config).unwrap(),
        None => Engine::new(),
    };
    for doc in corpus {
        let body = doc.join(" ");
        engine.add_document(&body, &body, None, None).unwrap();
    }
    engine
}

fn contains_all(doc: &[&str], terms: &[&str]) -> bool {
    terms.iter().all(|t| doc.contains(t))
}

fn contains_phrase(doc: &[&str], terms: &[&str]) -> bool {
    doc.windows(terms.len()).any(|w| w == terms)
}

proptest! {
    #[test]
    fn results_are_bounded_and_sorted(
        corpus in corpus(),
        terms in query_terms(),
        k in 1usize..6,
    ) {
        let engine = build_engine(&corpus, None);
        let result = engine
            .search(&SearchQuery::new(terms.iter().copied()).n_results(k))
            .unwrap();

        prop_assert!(result.len() <= k);
        for pair in result.entries.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for entry in &result.entries {
            prop_assert!(contains_all(&corpus[entry.doc_id as usize], &terms));
        }
    }

    #[test]
    fn conjunction_finds_every_matching_doc(
        corpus in corpus(),
        terms in query_terms(),
    ) {
        let engine = build_engine(&corpus, None);
        let result = engine
            .search(&SearchQuery::new(terms.iter().copied()).n_results(corpus.len()))
            .unwrap();

        let mut want: Vec<u32> = corpus
            .iter()
            .enumerate()
            .filter(|(_, doc)| contains_all(doc, &terms))
            .map(|(i, _)| i as u32)
            .collect();
        let mut got: Vec<u32> = result.entries.iter().map(|e| e.doc_id).collect();
        want.sort_unstable();
        got.sort_unstable();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn phrase_matches_exactly_the_adjacent_docs(
        corpus in corpus(),
        terms in query_terms(),
    ) {
        let engine = build_engine(&corpus, None);
        let result = engine
            .search(
                &SearchQuery::new(terms.iter().copied())
                    .phrase(true)
                    .n_results(corpus.len()),
            )
            .unwrap();

        let mut want: Vec<u32> = corpus
            .iter()
            .enumerate()
            .filter(|(_, doc)| contains_phrase(doc, &terms))
            .map(|(i, _)| i as u32)
            .collect();
        let mut got: Vec<u32> = result.entries.iter().map(|e| e.doc_id).collect();
        want.sort_unstable();
        got.sort_unstable();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn bloom_pruning_never_changes_phrase_results(
        corpus in corpus(),
        terms in query_terms(),
    ) {
        let plain = build_engine(&corpus, None);
        let mut config = EngineConfig::new();
        config.set_int("bloom_enable_factor", 1);
        let bloomed = build_engine(&corpus, Some(&config));

        let query = SearchQuery::new(terms.iter().copied())
            .phrase(true)
            .n_results(corpus.len());
        let a = plain.search(&query).unwrap();
        let b = bloomed.search(&query).unwrap();

        let docs_a: Vec<u32> = a.entries.iter().map(|e| e.doc_id).collect();
        let docs_b: Vec<u32> = b.entries.iter().map(|e| e.doc_id).collect();
        prop_assert_eq!(docs_a, docs_b);
    }

    #[test]
    fn index_families_rank_identically(
        corpus in corpus(),
        terms in query_terms(),
        k in 1usize..6,
    ) {
        let compressed = build_engine(&corpus, None);
        let mut config = EngineConfig::new();
        config.set_str("inverted_index", "uncompressed");
        let uncompressed = build_engine(&corpus, Some(&config));

        let query = SearchQuery::new(terms.iter().copied())
            .n_results(k)
            .snippets(true);
        let a = compressed.search(&query).unwrap();
        let b = uncompressed.search(&query).unwrap();

        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.entries.iter().zip(&b.entries) {
            prop_assert_eq!(x.doc_id, y.doc_id);
            prop_assert_eq!(x.score, y.score);
            prop_assert_eq!(&x.snippet, &y.snippet);
        }
    }
}
