//! Sentence and word tokenization with Unicode boundaries

use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Words excluded from frequency counting
#[derive(Debug, Clone, Default)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    /// Build a stop word set, lowercasing every entry
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Collapse whitespace runs into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into trimmed sentences on UAX #29 sentence boundaries.
///
/// Whitespace is normalized first so that hard line breaks coming out of PDF
/// extraction do not end a sentence.
pub fn sentences(text: &str) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    normalized
        .split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase word tokens, punctuation dropped
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .unicode_words()
        .map(str::to_string)
        .collect()
}

/// Word counts that remember first-occurrence order
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl FrequencyTable {
    /// Count the lowercase words of `text`, skipping stop words
    pub fn from_text(text: &str, stop_words: &StopWords) -> Self {
        let mut table = Self::default();
        for word in words(text) {
            if stop_words.contains(&word) {
                continue;
            }
            table.add(word);
        }
        table
    }

    fn add(&mut self, word: String) {
        match self.counts.get_mut(&word) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(word.clone(), 1);
                self.order.push(word);
            }
        }
    }

    /// Count for a word (0 when absent)
    pub fn get(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The `n` most frequent words; ties keep first-occurrence order
    pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .order
            .iter()
            .map(|w| (w.as_str(), self.counts[w]))
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
