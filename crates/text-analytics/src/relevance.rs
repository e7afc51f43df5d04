//! Title relevance against the query and its aliases.

use std::collections::HashSet;

/// Fraction of match keys found in the title, saturating at 1.
///
/// Keys are `{query} ∪ aliases`, lowercased and deduplicated. Half the key
/// count (at least 1) is enough for a full score, since aliases are largely
/// redundant spellings of each other.
pub fn dynamic_relevance(title: &str, query: &str, aliases: &[String]) -> f64 {
    let title = title.to_lowercase();
    let keys: HashSet<String> = std::iter::once(query.to_lowercase())
        .chain(aliases.iter().map(|a| a.to_lowercase()))
        .collect();

    let hits = keys
        .iter()
        .filter(|k| !k.is_empty() && title.contains(k.as_str()))
        .count();
    let denom = (keys.len() / 2).max(1);
    (hits as f64 / denom as f64).min(1.0)
}
