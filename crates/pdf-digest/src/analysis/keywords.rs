//! Frequency-based keyword extraction
//!
//! Keywords are the most frequent lowercase words. There is no stemming and no
//! minimum length, and stop words are only dropped when configured, so short
//! function words dominate natural-language input.

use super::tokenize::{FrequencyTable, StopWords};

/// Extract keywords with a custom stop word list
pub fn extract_keywords_with(text: &str, num_keywords: usize, stop_words: &StopWords) -> Vec<String> {
    FrequencyTable::from_text(text, stop_words)
        .most_common(num_keywords)
        .into_iter()
        .map(|(word, _)| word.to_string())
        .collect()
}

/// The `num_keywords` most frequent distinct words, ties in first-seen order
pub fn extract_keywords(text: &str, num_keywords: usize) -> Vec<String> {
    extract_keywords_with(text, num_keywords, &StopWords::default())
}
