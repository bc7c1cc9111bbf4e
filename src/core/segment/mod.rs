//! Dictionary-driven word segmentation for phrases missing from the vocabulary.
//!
//! The text is cut into units first: a run of ASCII letters and digits is one
//! unit, every other character is a unit of its own. Segmentation then picks
//! the sequence of dictionary words (over whole units) with the highest total
//! log-probability `sum(ln(freq / total))`. A unit no dictionary word covers is
//! emitted on its own with frequency 1.

use crate::core::common::WordVecError;
use crate::Result;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Frequency assumed for a unit that is not in the dictionary.
const UNKNOWN_FREQUENCY: u64 = 1;

#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    frequencies: HashMap<String, u64>,
    total: u64,
    max_word_bytes: usize,
}

impl Segmenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a dictionary word. A frequency of 0 counts as 1.
    pub fn add_word(&mut self, word: &str, frequency: u64) {
        if word.is_empty() {
            return;
        }
        let frequency = frequency.max(1);
        if let Some(previous) = self.frequencies.insert(word.to_string(), frequency) {
            self.total = self.total.saturating_sub(previous);
        }
        self.total = self.total.saturating_add(frequency);
        self.max_word_bytes = self.max_word_bytes.max(word.len());
    }

    /// Reads a dictionary with one `word [frequency [pos]]` entry per line.
    ///
    /// # Errors
    /// `InvalidInput` naming the line for an unparsable frequency; `Io` on
    /// read failure.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut segmenter = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let frequency = match fields.next() {
                Some(f) => f.parse().map_err(|_| {
                    WordVecError::InvalidInput(format!(
                        "dictionary line {}: '{f}' is not a frequency",
                        index + 1
                    ))
                })?,
                None => 1,
            };
            segmenter.add_word(word, frequency);
        }
        Ok(segmenter)
    }

    pub fn load_dictionary(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let segmenter = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), words = segmenter.len(), "dictionary loaded");
        Ok(segmenter)
    }

    /// Number of dictionary words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Splits `text` into words, dropping whitespace-only tokens.
    #[must_use]
    pub fn segment(&self, text: &str) -> Vec<String> {
        let bounds = unit_boundaries(text);
        let units = bounds.len() - 1;
        let ln_total = (self.total.saturating_add(UNKNOWN_FREQUENCY) as f64).ln();

        // best[j]: highest score of any segmentation of the first j units,
        // with back[j] the unit index where its last word starts.
        let mut best = vec![f64::NEG_INFINITY; units + 1];
        let mut back = vec![0usize; units + 1];
        best[0] = 0.0;

        for i in 0..units {
            if best[i] == f64::NEG_INFINITY {
                continue;
            }
            for j in i + 1..=units {
                let word = &text[bounds[i]..bounds[j]];
                if j > i + 1 && word.len() > self.max_word_bytes {
                    break;
                }
                let frequency = match self.frequencies.get(word) {
                    Some(&f) => f,
                    None if j == i + 1 => UNKNOWN_FREQUENCY,
                    None => continue,
                };
                let score = best[i] + (frequency as f64).ln() - ln_total;
                if score > best[j] {
                    best[j] = score;
                    back[j] = i;
                }
            }
        }

        let mut words = Vec::new();
        let mut end = units;
        while end > 0 {
            let start = back[end];
            let word = &text[bounds[start]..bounds[end]];
            if !word.trim().is_empty() {
                words.push(word.to_string());
            }
            end = start;
        }
        words.reverse();
        words
    }
}

/// Byte offsets where a word may begin or end, including 0 and `text.len()`.
fn unit_boundaries(text: &str) -> Vec<usize> {
    let mut bounds = vec![0];
    let mut previous_alnum = false;
    for (offset, ch) in text.char_indices() {
        let alnum = ch.is_ascii_alphanumeric();
        if offset > 0 && !(alnum && previous_alnum) {
            bounds.push(offset);
        }
        previous_alnum = alnum;
    }
    if !text.is_empty() {
        bounds.push(text.len());
    }
    bounds
}
