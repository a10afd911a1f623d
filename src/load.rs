// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Line-doc ingestion: one document per line, tab-separated fields.
//!
//! The first line is a header: `#` followed by whitespace-separated column
//! names. `title`, `body` and `tokenized_body` are required; `token_offsets`
//! and `token_positions` are optional. Offset fields encode per-term groups
//! separated by `.`, pairs within a group by `;`, and the two integers of a
//! pair by `,`; position fields use the same group/`;` nesting. Offsets are
//! byte-indexed and inclusive on both ends.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::postings::{OffsetPair, Position};

pub const COL_TITLE: &str = "title";
pub const COL_BODY: &str = "body";
pub const COL_TOKENS: &str = "tokenized_body";
pub const COL_OFFSETS: &str = "token_offsets";
pub const COL_POSITIONS: &str = "token_positions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    /// body + tokenized body; offsets and positions derived from the token
    /// stream
    Naive,
    /// body + tokenized body + per-term offsets (+ positions if the column
    /// exists)
    WithOffsets,
}

impl FromStr for LoaderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "naive" => Ok(LoaderKind::Naive),
            "with-offsets" => Ok(LoaderKind::WithOffsets),
            other => Err(Error::UnknownLoader(other.to_string())),
        }
    }
}

/// An open line-doc file positioned after its header.
#[derive(Debug)]
pub struct LineDocFile {
    reader: BufReader<File>,
    columns: Vec<String>,
    line_no: usize,
}

impl LineDocFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let mut reader = BufReader::new(file);

        let mut header = String::new();
        reader.read_line(&mut header)?;
        let header = header.trim_end_matches(['\n', '\r']);
        let Some(names) = header.strip_prefix('#') else {
            return Err(Error::MalformedLineDoc {
                line: 1,
                reason: "header must start with '#'".to_string(),
                accepted: 0,
            });
        };
        let columns: Vec<String> = names.split_whitespace().map(str::to_string).collect();

        Ok(Self {
            reader,
            columns,
            line_no: 1,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 1-based line number of the most recently read line.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Read the next row, split on tabs with empty fields preserved.
    pub fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let line = line.trim_end_matches(['\n', '\r']);
        Ok(Some(line.split('\t').map(str::to_string).collect()))
    }
}

/// Parse a `token_offsets` field. `None` on any malformed pair.
///
/// A term group only exists once its `.` terminator has been read, and a
/// pair only once its `;` has: an unterminated trailing group (or trailing
/// pair within a group) is dropped, not kept. Canonical fields terminate
/// every level, so nothing is lost for well-formed input.
pub fn parse_offsets(field: &str) -> Option<Vec<Vec<OffsetPair>>> {
    let mut groups = Vec::new();
    let segments: Vec<&str> = field.split('.').collect();
    for group in &segments[..segments.len() - 1] {
        if group.is_empty() {
            continue;
        }
        let mut pairs = Vec::new();
        let entries: Vec<&str> = group.split(';').collect();
        for pair in &entries[..entries.len() - 1] {
            if pair.is_empty() {
                continue;
            }
            let (start, end) = pair.split_once(',')?;
            let start: u32 = start.parse().ok()?;
            let end: u32 = end.parse().ok()?;
            if end < start {
                return None;
            }
            pairs.push(OffsetPair::new(start, end));
        }
        groups.push(pairs);
    }
    Some(groups)
}

/// Parse a `token_positions` field. `None` on any malformed value.
///
/// Unlike offsets, positions tolerate a missing trailing terminator: any
/// non-empty trailing group (or value) still counts.
pub fn parse_positions(field: &str) -> Option<Vec<Vec<Position>>> {
    let mut groups = Vec::new();
    for group in field.split('.').filter(|g| !g.is_empty()) {
        let mut positions = Vec::new();
        for value in group.split(';').filter(|p| !p.is_empty()) {
            positions.push(value.parse().ok()?);
        }
        groups.push(positions);
    }
    Some(groups)
}

/// Split a tokenized body into (token, byte span, ordinal) triples.
/// Separators are single spaces; runs of spaces are tolerated.
pub fn tokenize_with_spans(text: &str) -> Vec<(&str, OffsetPair, Position)> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    let mut ordinal: Position = 0;
    while i < bytes.len() {
        if bytes[i] == b' ' {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] != b' ' {
            i += 1;
        }
        out.push((
            &text[start..i],
            OffsetPair::new(start as u32, (i - 1) as u32),
            ordinal,
        ));
        ordinal += 1;
    }
    out
}

/// Whitespace token count of a body; the document length BM25 normalises
/// against.
pub fn count_terms(body: &str) -> usize {
    body.split_whitespace().count()
}

/// Occurrence count per distinct token.
pub fn count_tokens(tokens: &str) -> HashMap<&str, u32> {
    let mut counts = HashMap::new();
    for (token, _, _) in tokenize_with_spans(tokens) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_field_round_trip() {
        let parsed = parse_offsets("1,2;.3,4;5,6;.7,8;.").unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], vec![OffsetPair::new(1, 2)]);
        assert_eq!(
            parsed[1],
            vec![OffsetPair::new(3, 4), OffsetPair::new(5, 6)]
        );
        assert_eq!(parsed[2], vec![OffsetPair::new(7, 8)]);
    }

    #[test]
    fn malformed_offsets_are_rejected() {
        assert!(parse_offsets("1;2,3;.").is_none());
        assert!(parse_offsets("5,x;.").is_none());
        assert!(parse_offsets("9,3;.").is_none());
    }

    #[test]
    fn unterminated_offset_groups_are_dropped() {
        // the last group never sees its '.' terminator
        let parsed = parse_offsets("1,2;.3,4;").unwrap();
        assert_eq!(parsed, vec![vec![OffsetPair::new(1, 2)]]);

        // same inside a group: the pair missing its ';' is dropped
        let parsed = parse_offsets("1,2;.3,4;5,6.").unwrap();
        assert_eq!(
            parsed,
            vec![vec![OffsetPair::new(1, 2)], vec![OffsetPair::new(3, 4)]]
        );

        // no terminator at all means no groups
        assert_eq!(parse_offsets("1,2;").unwrap(), Vec::<Vec<OffsetPair>>::new());
    }

    #[test]
    fn unterminated_position_groups_are_kept() {
        // positions are lenient: the trailing group still counts
        let parsed = parse_positions("1;3.2").unwrap();
        assert_eq!(parsed, vec![vec![1, 3], vec![2]]);
    }

    #[test]
    fn positions_field_round_trip() {
        let parsed = parse_positions("1;3;8.2;.").unwrap();
        assert_eq!(parsed, vec![vec![1, 3, 8], vec![2]]);
    }

    #[test]
    fn spans_of_a_token_stream() {
        let spans = tokenize_with_spans("hello world hello");
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0], ("hello", OffsetPair::new(0, 4), 0));
        assert_eq!(spans[1], ("world", OffsetPair::new(6, 10), 1));
        assert_eq!(spans[2], ("hello", OffsetPair::new(12, 16), 2));
    }

    #[test]
    fn double_spaces_do_not_create_tokens() {
        let spans = tokenize_with_spans("h  h");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], ("h", OffsetPair::new(0, 0), 0));
        assert_eq!(spans[1], ("h", OffsetPair::new(3, 3), 1));

        assert!(tokenize_with_spans("    ").is_empty());
        assert_eq!(
            tokenize_with_spans(" h "),
            vec![("h", OffsetPair::new(1, 1), 0)]
        );
    }

    #[test]
    fn term_and_token_counts() {
        assert_eq!(count_terms("hello world"), 2);
        let counts = count_tokens("hello hello you");
        assert_eq!(counts["hello"], 2);
        assert_eq!(counts["you"], 1);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn loader_kind_parsing() {
        assert_eq!(LoaderKind::from_str("naive").unwrap(), LoaderKind::Naive);
        assert_eq!(
            LoaderKind::from_str("with-offsets").unwrap(),
            LoaderKind::WithOffsets
        );
        assert!(matches!(
            LoaderKind::from_str("fancy"),
            Err(Error::UnknownLoader(_))
        ));
    }
}
