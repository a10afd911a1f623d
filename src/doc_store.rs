// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Document body storage.
//!
//! Two flavours behind one enum: plain strings, or brotli-compressed bytes
//! decompressed on read (`doc_store = "compressed"`). Snippet generation is
//! the only hot reader, and it touches a handful of top-k documents per
//! query, so decompression cost stays off the intersection path.

use std::borrow::Cow;
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::postings::DocId;

const BROTLI_BUF: usize = 4096;
const BROTLI_QUALITY: u32 = 5;
const BROTLI_LG_WINDOW: u32 = 22;

#[derive(Debug)]
pub enum DocStore {
    Plain(Vec<String>),
    Compressed(Vec<Vec<u8>>),
}

impl DocStore {
    pub fn plain() -> Self {
        DocStore::Plain(Vec::new())
    }

    pub fn compressed() -> Self {
        DocStore::Compressed(Vec::new())
    }

    /// Store a body under `doc_id`. Ids must be assigned densely from zero.
    pub fn add(&mut self, doc_id: DocId, body: &str) -> Result<()> {
        match self {
            DocStore::Plain(docs) => {
                debug_assert_eq!(doc_id as usize, docs.len());
                docs.push(body.to_string());
            }
            DocStore::Compressed(docs) => {
                debug_assert_eq!(doc_id as usize, docs.len());
                let mut compressed = Vec::new();
                let mut encoder = brotli::CompressorWriter::new(
                    &mut compressed,
                    BROTLI_BUF,
                    BROTLI_QUALITY,
                    BROTLI_LG_WINDOW,
                );
                encoder.write_all(body.as_bytes())?;
                drop(encoder);
                docs.push(compressed);
            }
        }
        Ok(())
    }

    /// Fetch a body. `None` for ids that were never stored.
    pub fn get(&self, doc_id: DocId) -> Result<Option<Cow<'_, str>>> {
        match self {
            DocStore::Plain(docs) => Ok(docs.get(doc_id as usize).map(|s| Cow::Borrowed(s.as_str()))),
            DocStore::Compressed(docs) => {
                let Some(bytes) = docs.get(doc_id as usize) else {
                    return Ok(None);
                };
                let mut decoder = brotli::Decompressor::new(bytes.as_slice(), BROTLI_BUF);
                let mut body = Vec::new();
                decoder
                    .read_to_end(&mut body)
                    .map_err(|_| Error::CorruptStream("brotli document blob"))?;
                let body = String::from_utf8(body)
                    .map_err(|_| Error::CorruptStream("document blob is not utf-8"))?;
                Ok(Some(Cow::Owned(body)))
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DocStore::Plain(docs) => docs.len(),
            DocStore::Compressed(docs) => docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
