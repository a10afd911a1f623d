// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types shared across the crate.
//!
//! Codec failures (`CorruptStream`) bubble up through posting-list cursors
//! and terminate the query they occur in. Loader failures carry enough
//! context to tell the caller how far ingest got before the bad row.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// A line-doc row could not be parsed. `accepted` counts the rows that
    /// were already ingested before the bad one.
    #[error("malformed line-doc at line {line}: {reason} ({accepted} rows accepted)")]
    MalformedLineDoc {
        line: usize,
        reason: String,
        accepted: usize,
    },

    #[error("unknown loader kind: {0}")]
    UnknownLoader(String),

    /// A var-int or packed-int stream was truncated or out of range.
    #[error("corrupt stream: {0}")]
    CorruptStream(&'static str),

    #[error("unknown config key: {0}")]
    UnknownConfigKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
