//! Extractive summaries and keyword lists

mod keywords;
mod summarizer;
pub mod tokenize;

pub use keywords::{extract_keywords, extract_keywords_with};
pub use summarizer::{rank_sentences, summarize, summarize_with, ScoredSentence};
pub use tokenize::{FrequencyTable, StopWords};

use crate::config::AnalysisConfig;

/// Summary and keywords computed for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Configured summarizer + keyword extractor
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    summary_sentences: usize,
    num_keywords: usize,
    stop_words: StopWords,
}

impl TextAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            summary_sentences: config.summary_sentences,
            num_keywords: config.num_keywords,
            stop_words: StopWords::new(&config.stop_words),
        }
    }

    pub fn summarize(&self, text: &str) -> String {
        summarize_with(text, self.summary_sentences, &self.stop_words)
    }

    pub fn keywords(&self, text: &str) -> Vec<String> {
        extract_keywords_with(text, self.num_keywords, &self.stop_words)
    }

    /// Run both analyses over the same text
    pub fn analyze(&self, text: &str) -> Analysis {
        Analysis {
            summary: self.summarize(text),
            keywords: self.keywords(text),
        }
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
