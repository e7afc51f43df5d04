//! Query-aware sentiment: only words near a mention of the query or one of
//! its aliases count, weighted by distance.

use crate::sentiment::{lexicon_sentiment, SentimentScore};
use crate::text::positional_tokens;
use crate::Lexicon;
use news_core::SentimentLabel;

/// Tokens scanned on each side of a mention.
pub const DEFAULT_WINDOW: usize = 12;
/// Shrinks raw scores away from the ±1 extremes.
const DAMPING: f64 = 0.85;

/// Sentiment of `text` as it concerns `query`.
///
/// Every token containing the query or an alias is a center. Cue words within
/// `window` tokens of a center add `±1/(1+distance)`; noise terms are ignored.
/// Text without any center falls back to [`lexicon_sentiment`].
pub fn targeted_sentiment(
    text: &str,
    query: &str,
    aliases: &[String],
    window: usize,
    lexicon: &Lexicon,
) -> SentimentScore {
    let tokens = positional_tokens(text);
    if tokens.is_empty() {
        return SentimentScore::neutral();
    }

    let keys: Vec<String> = std::iter::once(query)
        .chain(aliases.iter().map(String::as_str))
        .map(str::to_lowercase)
        .filter(|k| !k.is_empty())
        .collect();

    let centers: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, tok)| keys.iter().any(|k| tok.contains(k.as_str())))
        .map(|(i, _)| i)
        .collect();

    if centers.is_empty() {
        return lexicon_sentiment(text, lexicon);
    }

    let mut num = 0.0;
    let mut den = 0.0;
    for &center in &centers {
        let lo = center.saturating_sub(window);
        let hi = (center + window).min(tokens.len() - 1);
        for (j, tok) in tokens.iter().enumerate().take(hi + 1).skip(lo) {
            if lexicon.is_noise(tok) {
                continue;
            }
            let weight = 1.0 / (1.0 + center.abs_diff(j) as f64);
            if lexicon.is_positive_cue(tok) {
                num += weight;
                den += weight;
            } else if lexicon.is_negative_cue(tok) {
                num -= weight;
                den += weight;
            }
        }
    }

    if den == 0.0 {
        return SentimentScore::neutral();
    }

    let score = (num / den * DAMPING).clamp(-1.0, 1.0);
    SentimentScore {
        label: SentimentLabel::from_score(score),
        score,
    }
}
