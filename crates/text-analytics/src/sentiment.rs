//! Whole-document lexicon sentiment, the fallback when a text never mentions
//! the query.

use crate::Lexicon;
use news_core::SentimentLabel;
use serde::{Deserialize, Serialize};

/// Dead zone of the lexicon scorer's own label.
pub const LEXICON_LABEL_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// -1.0 to 1.0
    pub score: f64,
}

impl SentimentScore {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }
}

/// Score `text` by which listed words it contains.
///
/// Each positive or negative word counts once if it occurs anywhere in the
/// lowercased text (substring test, so `decline` also hits `declines`).
/// Score is `(pos - neg) / max(1, pos + neg)`.
pub fn lexicon_sentiment(text: &str, lexicon: &Lexicon) -> SentimentScore {
    let lower = text.to_lowercase();
    if lower.is_empty() {
        return SentimentScore::neutral();
    }

    let pos = lexicon
        .positive_words
        .iter()
        .filter(|w| !w.is_empty() && lower.contains(w.as_str()))
        .count();
    let neg = lexicon
        .negative_words
        .iter()
        .filter(|w| !w.is_empty() && lower.contains(w.as_str()))
        .count();

    let score = (pos as f64 - neg as f64) / (pos + neg).max(1) as f64;
    SentimentScore {
        label: SentimentLabel::with_threshold(score, LEXICON_LABEL_THRESHOLD),
        score,
    }
}
