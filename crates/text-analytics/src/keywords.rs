//! Title keyword extraction.

use crate::text::{char_len, is_numeric_only, split_terms, FrequencyTable};
use crate::Lexicon;

pub const DEFAULT_MAX_KEYWORDS: usize = 8;

/// Most frequent salient terms of a title, as written.
///
/// Terms shorter than two characters, stopwords, banwords and purely numeric
/// tokens are dropped; ties keep first-seen order.
pub fn extract_keywords(title: &str, max: usize, lexicon: &Lexicon) -> Vec<String> {
    let mut freq = FrequencyTable::new();
    for term in split_terms(title) {
        if char_len(&term) < 2
            || lexicon.is_stopword(&term)
            || lexicon.is_banword(&term)
            || is_numeric_only(&term)
        {
            continue;
        }
        freq.add(&term);
    }
    freq.top(max).into_iter().map(|(term, _)| term).collect()
}
