//! Tokenization helpers shared by the analyzers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Letters, digits, whitespace and the punctuation that survives inside
    // tickers, pairs and percentages (`USD/KRW`, `3.5%`).
    static ref TERM_STRIP: Regex = Regex::new(r"[^\p{L}\p{N}\s\-_.:/%]").unwrap();
    // Alias candidates: no colon.
    static ref CANDIDATE_STRIP: Regex = Regex::new(r"[^\p{L}\p{N}\s\-_./%]").unwrap();
    // Same as TERM_STRIP minus the underscore.
    static ref TARGET_STRIP: Regex = Regex::new(r"[^\p{L}\p{N}\s\-.:/%]").unwrap();
    static ref NUMERIC_ONLY: Regex = Regex::new(r"^[0-9._%]+$").unwrap();
}

/// Whitespace-split terms after replacing disallowed characters with spaces.
/// Case is preserved.
pub fn split_terms(text: &str) -> Vec<String> {
    split_with(&TERM_STRIP, text)
}

/// Like [`split_terms`] but a colon also separates.
pub fn split_candidate_terms(text: &str) -> Vec<String> {
    split_with(&CANDIDATE_STRIP, text)
}

fn split_with(strip: &Regex, text: &str) -> Vec<String> {
    strip
        .replace_all(text, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lowercase tokens in text order; a token's index in the returned vector is
/// its position.
pub fn positional_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TARGET_STRIP
        .replace_all(&lower, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// True for tokens made only of digits and `._%`.
pub fn is_numeric_only(token: &str) -> bool {
    NUMERIC_ONLY.is_match(token)
}

/// Length in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Frequency table that remembers first-seen order, so ranking ties resolve
/// to the term that appeared first.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: Vec<(String, usize)>,
    index: std::collections::HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: &str) {
        match self.index.get(term) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(term.to_string(), self.counts.len());
                self.counts.push((term.to_string(), 1));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Up to `limit` entries by descending count, ties in first-seen order.
    pub fn top(mut self, limit: usize) -> Vec<(String, usize)> {
        // stable sort keeps insertion order among equal counts
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts.truncate(limit);
        self.counts
    }
}
