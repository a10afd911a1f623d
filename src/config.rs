// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Typed key/value configuration for the engine.
//!
//! Keys are plain strings; each value type lives in its own map, so the same
//! key may carry a string and an integer at once. Reading a key that was
//! never set is `Error::UnknownConfigKey` — callers that want optional keys
//! probe with `has_str`/`has_int` first.
//!
//! Keys consumed by the engine:
//!
//! | key                   | type | values                                |
//! |-----------------------|------|---------------------------------------|
//! | `inverted_index`      | str  | `compressed` (default), `uncompressed`|
//! | `doc_store`           | str  | `plain` (default), `compressed`       |
//! | `bloom_enable_factor` | int  | phrase-pruning factor; absent = off   |

use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    strings: HashMap<String, String>,
    ints: HashMap<String, i64>,
    bools: HashMap<String, bool>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_str(&mut self, key: &str, value: &str) -> &mut Self {
        self.strings.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_int(&mut self, key: &str, value: i64) -> &mut Self {
        self.ints.insert(key.to_string(), value);
        self
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> &mut Self {
        self.bools.insert(key.to_string(), value);
        self
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.strings
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownConfigKey(key.to_string()))
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.ints
            .get(key)
            .copied()
            .ok_or_else(|| Error::UnknownConfigKey(key.to_string()))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.bools
            .get(key)
            .copied()
            .ok_or_else(|| Error::UnknownConfigKey(key.to_string()))
    }

    pub fn has_str(&self, key: &str) -> bool {
        self.strings.contains_key(key)
    }

    pub fn has_int(&self, key: &str) -> bool {
        self.ints.contains_key(key)
    }

    pub fn has_bool(&self, key: &str) -> bool {
        self.bools.contains_key(key)
    }
}
