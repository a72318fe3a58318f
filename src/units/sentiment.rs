//! Lexicon-based sentiment scoring.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "positive",
    "wonderful",
    "amazing",
    "love",
    "best",
    "happy",
    "pleasant",
    "fantastic",
    "perfect",
    "better",
    "nice",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "negative",
    "horrible",
    "hate",
    "worst",
    "poor",
    "sad",
    "unpleasant",
    "disappointing",
    "worse",
    "problem",
];

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Negative,
    Neutral,
}

/// Sentiment verdict for a piece of text. Serialized as the unit's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub score: f64,
    pub positive_words: usize,
    pub negative_words: usize,
    pub classification: Classification,
}

/// Score `text` in [-1, 1] by counting lexicon hits.
///
/// The raw difference is divided by a tenth of the word count (at least 1)
/// so a couple of hits in a short sentence already saturate the score.
pub fn analyze(text: &str) -> SentimentReport {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let words: Vec<&str> = stripped.split_whitespace().collect();

    let positive_words = words.iter().filter(|w| POSITIVE_WORDS.contains(*w)).count();
    let negative_words = words.iter().filter(|w| NEGATIVE_WORDS.contains(*w)).count();

    let score = if words.is_empty() {
        0.0
    } else {
        let diff = positive_words as f64 - negative_words as f64;
        let scale = (words.len() as f64 * 0.1).max(1.0);
        (diff / scale).clamp(-1.0, 1.0)
    };

    let classification = if score > 0.0 {
        Classification::Positive
    } else if score < 0.0 {
        Classification::Negative
    } else {
        Classification::Neutral
    };

    SentimentReport {
        score,
        positive_words,
        negative_words,
        classification,
    }
}
