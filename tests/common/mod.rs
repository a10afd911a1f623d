// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for the integration and property suites.

use skipjack::{Engine, EngineConfig};

/// The three-document reference corpus the scoring fixtures are quoted
/// against (scores cross-checked with Elasticsearch).
pub const CORPUS: [&str; 3] = ["hello world", "hello wisconsin", "hello world big world"];

pub fn reference_engine() -> Engine {
    let mut engine = Engine::new();
    for body in CORPUS {
        engine.add_document(body, body, None, None).unwrap();
    }
    engine
}

pub fn reference_engine_with(config: &EngineConfig) -> Engine {
    let mut engine = Engine::with_config(config).unwrap();
    for body in CORPUS {
        engine.add_document(body, body, None, None).unwrap();
    }
    engine
}

/// Format to three significant digits, matching how the reference scores
/// are quoted (`1.09`, `0.149`).
pub fn sig3(x: f64) -> String {
    let magnitude = x.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    format!("{:.*}", decimals, x)
}
