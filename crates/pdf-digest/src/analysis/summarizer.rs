//! Frequency-ranked extractive summaries

use super::tokenize::{self, FrequencyTable, StopWords};

/// A sentence with its aggregate word-frequency score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredSentence {
    pub text: String,
    pub score: usize,
    /// Index of the sentence in the document
    pub position: usize,
}

/// Score every sentence and order them by score, highest first.
///
/// A sentence scores the sum of the document-wide frequency of each of its
/// words. Equal scores keep document order.
pub fn rank_sentences(text: &str, stop_words: &StopWords) -> Vec<ScoredSentence> {
    let freq = FrequencyTable::from_text(text, stop_words);

    let mut ranked: Vec<ScoredSentence> = tokenize::sentences(text)
        .into_iter()
        .enumerate()
        .map(|(position, sentence)| {
            let score = tokenize::words(&sentence)
                .iter()
                .map(|w| freq.get(w))
                .sum();
            ScoredSentence {
                text: sentence,
                score,
                position,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Summarize with a custom stop word list
pub fn summarize_with(text: &str, num_sentences: usize, stop_words: &StopWords) -> String {
    rank_sentences(text, stop_words)
        .into_iter()
        .take(num_sentences)
        .map(|s| s.text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `num_sentences` highest scoring sentences joined by spaces, in score order
pub fn summarize(text: &str, num_sentences: usize) -> String {
    summarize_with(text, num_sentences, &StopWords::default())
}
