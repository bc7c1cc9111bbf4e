//! Loader for the plain-text embedding format.
//!
//! ```text
//! <count> <dimension>
//! <keyword> <f1> <f2> ... <fD>
//! ```
//!
//! Fields are separated by single spaces. The keyword is the first field, so
//! keywords containing spaces cannot be represented.

use super::{InMemoryVectorStore, VectorStore};
use crate::core::common::WordVecError;
use crate::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

const PROGRESS_EVERY: usize = 100_000;

/// Parses text embeddings from `reader` into a new store.
///
/// # Errors
/// `InvalidInput` for a malformed header or record (the message names the
/// line), `DimensionMismatch` if the header dimension is not
/// `expected_dimension`, `Io` for read failures.
pub fn read_text_embeddings<R: BufRead>(reader: R, expected_dimension: usize) -> Result<InMemoryVectorStore> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| WordVecError::InvalidInput("embedding file is empty".to_string()))?;
    let (declared_count, dimension) = parse_header(&header)?;
    if dimension != expected_dimension {
        return Err(WordVecError::DimensionMismatch { expected: expected_dimension, actual: dimension });
    }
    info!(declared_count, dimension, "reading text embeddings");

    let mut store = InMemoryVectorStore::new(dimension)?;
    let mut vector = Vec::with_capacity(dimension);
    let mut records = 0usize;

    for (index, line) in lines.enumerate() {
        let line = line?;
        let line_number = index + 2;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.trim_end().split(' ');
        let keyword = fields.next().unwrap_or_default();
        vector.clear();
        for field in fields {
            let value: f32 = field.parse().map_err(|_| {
                WordVecError::InvalidInput(format!("line {line_number}: '{field}' is not a number"))
            })?;
            vector.push(value);
        }
        if keyword.is_empty() || vector.len() != dimension {
            return Err(WordVecError::InvalidInput(format!(
                "line {line_number}: expected a keyword and {dimension} values, found {} fields",
                vector.len() + 1
            )));
        }

        store.insert(keyword, &vector).map_err(|e| match e {
            WordVecError::InvalidInput(msg) => WordVecError::InvalidInput(format!("line {line_number}: {msg}")),
            other => other,
        })?;
        records += 1;
        if records % PROGRESS_EVERY == 0 {
            info!(records, declared_count, "ingestion progress");
        }
    }

    if records != declared_count {
        warn!(declared_count, records, "record count differs from header");
    }
    let distinct = store.len();
    if distinct != records {
        warn!(records, distinct, "duplicate keywords overwrote earlier vectors");
    }
    info!(keywords = distinct, "ingestion finished");
    Ok(store)
}

/// Opens `path` and parses it with [`read_text_embeddings`].
pub fn read_text_embeddings_file(path: impl AsRef<Path>, expected_dimension: usize) -> Result<InMemoryVectorStore> {
    let file = File::open(path.as_ref())?;
    read_text_embeddings(BufReader::new(file), expected_dimension)
}

fn parse_header(line: &str) -> Result<(usize, usize)> {
    let malformed = || WordVecError::InvalidInput(format!("line 1: malformed header '{line}'"));
    let mut fields = line.split_whitespace();
    let count = fields.next().and_then(|f| f.parse().ok()).ok_or_else(malformed)?;
    let dimension: usize = fields.next().and_then(|f| f.parse().ok()).ok_or_else(malformed)?;
    if fields.next().is_some() || dimension == 0 {
        return Err(malformed());
    }
    Ok((count, dimension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_records_in_order() {
        let text = "3 2\n的 0.5 -0.25\n苹果 1 0\nbanana 0 1\n";
        let store = read_text_embeddings(Cursor::new(text), 2).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get_id("的").unwrap(), 0);
        assert_eq!(store.get_id("banana").unwrap(), 2);
        assert_eq!(store.get_vector(1).unwrap(), &[1.0, 0.0]);
    }

    #[test]
    fn test_count_mismatch_is_not_fatal() {
        let store = read_text_embeddings(Cursor::new("10 2\na 1 0\r\nb 0 1\n\n"), 2).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_keyword_keeps_first_id() {
        let store = read_text_embeddings(Cursor::new("3 2\na 1 0\nb 0 1\na 2 2\n"), 2).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_id("a").unwrap(), 0);
        assert_eq!(store.get_vector(0).unwrap(), &[2.0, 2.0]);
    }

    #[test]
    fn test_header_dimension_must_match() {
        let result = read_text_embeddings(Cursor::new("1 3\na 1 2 3\n"), 2);
        assert!(matches!(result, Err(WordVecError::DimensionMismatch { expected: 2, actual: 3 })));
    }

    #[test]
    fn test_malformed_input_names_line() {
        for (text, needle) in [
            ("", "empty"),
            ("two 2\n", "line 1"),
            ("1 2\na 1\n", "line 2"),
            ("2 2\na 1 0\nb 1 x\n", "line 3"),
            ("1 2\na 1 0 7\n", "line 2"),
        ] {
            match read_text_embeddings(Cursor::new(text), 2) {
                Err(WordVecError::InvalidInput(msg)) => assert!(msg.contains(needle), "{msg}"),
                other => panic!("expected InvalidInput for {text:?}, got {other:?}"),
            }
        }
    }
}
