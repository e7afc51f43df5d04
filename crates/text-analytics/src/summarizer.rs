//! Extractive summarizer: keeps the most informative sentences.

use crate::text::char_len;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref SENTENCE: Regex = Regex::new(r"[^.!?。！？]+[.!?。！？]?").unwrap();
    static ref DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    static ref PROPER_NOUN: Regex = Regex::new(r"[A-Z가-힣][a-z가-힣]+").unwrap();
}

pub const DEFAULT_SUMMARY_SENTENCES: usize = 2;

fn sentence_score(sentence: &str) -> f64 {
    let digit = if DIGIT.is_match(sentence) { 1.0 } else { 0.0 };
    let proper = if PROPER_NOUN.is_match(sentence) { 1.0 } else { 0.0 };
    let length = (char_len(sentence) as f64 / 80.0).min(1.0);
    digit + proper + length
}

/// Pick the `max_sentences` best sentences of `raw`.
///
/// Output follows descending score (ties keep text order), joined by a space.
pub fn summarize(raw: &str, max_sentences: usize) -> String {
    let text = WHITESPACE.replace_all(raw, " ");
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let mut sentences: Vec<(&str, f64)> = SENTENCE
        .find_iter(text)
        .map(|m| (m.as_str().trim(), sentence_score(m.as_str())))
        .collect();
    if sentences.is_empty() {
        sentences.push((text, sentence_score(text)));
    }

    sentences.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    sentences
        .into_iter()
        .take(max_sentences)
        .map(|(s, _)| s)
        .collect::<Vec<_>>()
        .join(" ")
}
