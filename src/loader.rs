//! Encoding-resolving dataset loader.
//!
//! Detection is probabilistic and runs over a bounded sample; the full parse
//! then uses the guessed encoding and falls back to ISO-8859-1, which maps
//! every byte to a code point and therefore always decodes. Only a failure of
//! the fallback parse is final.

use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use csv::ReaderBuilder;
use encoding_rs::Encoding;
use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::{is_missing, Column, Dataset};

/// Bytes fed to the encoding detector.
pub const DETECTION_SAMPLE_BYTES: usize = 10_000;

/// Delimiters considered when sniffing the sample.
const DELIMITER_CANDIDATES: &[u8] = &[b',', b';', b'\t', b'|'];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{encoding} cannot decode the file")]
    Decode { encoding: String },
    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),
}

/// Load a delimited file into a [`Dataset`].
///
/// Tries the detected encoding first; any failure there selects one fallback
/// parse as ISO-8859-1. An error from the fallback parse propagates.
pub fn load(path: &Path) -> Result<Dataset, LoadError> {
    let bytes = fs::read(path)?;
    let guess = detect_encoding(&bytes);
    info!("Detected encoding: {}", guess.name());

    match parse_bytes(&bytes, guess) {
        Ok(dataset) => Ok(dataset),
        Err(err) => {
            warn!(
                "Parse with detected encoding failed, falling back to ISO-8859-1: {}",
                err
            );
            let text = encoding_rs::mem::decode_latin1(&bytes);
            parse_text(&text)
        }
    }
}

/// Best-guess encoding from the first [`DETECTION_SAMPLE_BYTES`] bytes.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let sample_len = bytes.len().min(DETECTION_SAMPLE_BYTES);
    let mut detector = EncodingDetector::new();
    detector.feed(&bytes[..sample_len], sample_len == bytes.len());
    detector.guess(None, true)
}

/// Decode the whole buffer with `encoding` and parse it. Decoder replacement
/// counts as a failure so the caller can branch to the fallback.
pub fn parse_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<Dataset, LoadError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(LoadError::Decode {
            encoding: encoding.name().to_string(),
        });
    }
    parse_text(&text)
}

/// Parse decoded text as a delimited table with a header row.
pub fn parse_text(text: &str) -> Result<Dataset, LoadError> {
    let delimiter = detect_delimiter(text);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, field) in record.iter().enumerate() {
            cells[idx].push(if is_missing(field) {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, column_cells)| Column::infer(name.to_string(), column_cells))
        .collect();
    Ok(Dataset::new(columns))
}

/// Score candidate delimiters on the first lines of the sample: frequent and
/// consistent per-line counts win. Defaults to comma.
pub fn detect_delimiter(text: &str) -> u8 {
    let sample_lines: Vec<&str> = text.lines().take(10).collect();

    let mut best = b',';
    let mut best_score = 0.0f64;
    for &candidate in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == candidate).count())
            .collect();
        if counts.is_empty() {
            continue;
        }
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        let variance = counts
            .iter()
            .map(|&c| (c as f64 - mean).powi(2))
            .sum::<f64>()
            / counts.len() as f64;
        let score = mean / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnKind;

    #[test]
    fn comma_and_semicolon_detected() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(detect_delimiter("a\tb\n1\t2\n"), b'\t');
    }

    #[test]
    fn parses_semicolon_table() {
        let ds = parse_text("name;score\nalice;10\nbob;11\n").unwrap();
        assert_eq!(ds.column_count(), 2);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.columns()[1].kind(), ColumnKind::Numeric);
    }

    #[test]
    fn invalid_utf8_is_a_decode_failure() {
        let bytes = b"name,score\nnai\xefve,1\n";
        let err = parse_bytes(bytes, encoding_rs::UTF_8).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn ragged_rows_are_a_parse_failure() {
        let err = parse_text("a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }
}
