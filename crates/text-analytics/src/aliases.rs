//! Query alias generation.
//!
//! Two stages: deterministic rewrites of the query itself (pair notation,
//! case, separators, a currency-pair dictionary), then terms mined from the
//! current article batch and ranked by pointwise mutual information with the
//! query.

use crate::text::{char_len, is_numeric_only, split_candidate_terms, truncate_chars, FrequencyTable};
use crate::Lexicon;
use lazy_static::lazy_static;
use news_core::NormalizedArticle;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_ALIAS_TOP_N: usize = 12;
/// Characters of `title summary` inspected per document when counting.
pub const DEFAULT_PMI_WINDOW: usize = 280;
pub const MAX_CANDIDATES: usize = 500;

const P_FLOOR: f64 = 1e-9;
const P_JOINT_FLOOR: f64 = 1e-12;

lazy_static! {
    static ref CURRENCY_PAIR: Regex = Regex::new(r"^[A-Z]{6}$").unwrap();
    static ref LOCAL_CODE: Regex = Regex::new(r"^[0-9]{6}$").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[-_/:\s]+").unwrap();
    static ref PROPER_LIKE: Regex = Regex::new(r"[A-Z][A-Za-z0-9._-]+").unwrap();
    static ref HANGUL_RUN: Regex = Regex::new(r"[가-힣]{2,}").unwrap();
    static ref PERCENT_FIGURE: Regex = Regex::new(r"[A-Za-z0-9]+%").unwrap();
}

/// Title and summary of one article in the alias sample.
#[derive(Debug, Clone, Copy)]
pub struct SampleDoc<'a> {
    pub title: &'a str,
    pub summary: &'a str,
}

impl<'a> SampleDoc<'a> {
    pub fn new(title: &'a str, summary: &'a str) -> Self {
        Self { title, summary }
    }

    fn text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

impl<'a> From<&'a NormalizedArticle> for SampleDoc<'a> {
    fn from(article: &'a NormalizedArticle) -> Self {
        Self::new(&article.title, &article.summary)
    }
}

/// Insertion-ordered set of alias strings (exact-match dedupe, casing kept).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl AliasSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `alias` unless empty or already present. Returns whether it was added.
    pub fn insert(&mut self, alias: impl Into<String>) -> bool {
        let alias = alias.into();
        if alias.is_empty() || self.seen.contains(&alias) {
            return false;
        }
        self.seen.insert(alias.clone());
        self.items.push(alias);
        true
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.seen.contains(alias)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        for dropped in self.items.drain(len.min(self.items.len())..) {
            self.seen.remove(&dropped);
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// A term mined from the sample with the number of documents containing it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePhrase {
    pub term: String,
    pub doc_freq: usize,
}

/// PMI ranking record for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PmiScore {
    pub term: String,
    pub pmi: f64,
    pub co_doc_count: usize,
    pub doc_freq: usize,
}

impl PmiScore {
    /// PMI plus a log bonus for absolute co-occurrence, so a pair seen once
    /// does not outrank a pair seen ten times at equal PMI.
    pub fn rank_score(&self) -> f64 {
        self.pmi + (1.0 + self.co_doc_count as f64).ln()
    }
}

fn looks_like_entity(token: &str) -> bool {
    PROPER_LIKE.is_match(token) || HANGUL_RUN.is_match(token) || PERCENT_FIGURE.is_match(token)
}

pub struct AliasGenerator {
    lexicon: Arc<Lexicon>,
    top_n: usize,
    window: usize,
    max_candidates: usize,
}

impl AliasGenerator {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            top_n: DEFAULT_ALIAS_TOP_N,
            window: DEFAULT_PMI_WINDOW,
            max_candidates: MAX_CANDIDATES,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Deterministic variants of the query, in emission order.
    pub fn rule_based(&self, query: &str) -> AliasSet {
        let mut out = AliasSet::new();
        let clean = query.trim();

        if CURRENCY_PAIR.is_match(clean) {
            let (base, quote) = clean.split_at(3);
            out.insert(format!("{}/{}", base, quote));
            out.insert(format!("{}-{}", base, quote));
            out.insert(format!("{}{}", base, quote));
            for alias in self.lexicon.currency_aliases(clean) {
                out.insert(alias.clone());
            }
        }

        if LOCAL_CODE.is_match(clean) {
            out.insert(clean);
        }

        out.insert(clean);
        out.insert(clean.to_lowercase());
        out.insert(clean.to_uppercase());
        out.insert(SEPARATORS.replace_all(clean, "").into_owned());
        out.insert(SEPARATORS.replace_all(clean, "/").into_owned());
        out
    }

    /// Entity-looking terms of the sample ranked by document frequency.
    pub fn candidate_phrases(&self, docs: &[SampleDoc<'_>]) -> Vec<CandidatePhrase> {
        let mut freq = FrequencyTable::new();
        for doc in docs {
            let mut seen_in_doc = HashSet::new();
            for token in split_candidate_terms(&doc.text()) {
                if !looks_like_entity(&token) || !self.is_candidate(&token) {
                    continue;
                }
                if seen_in_doc.insert(token.clone()) {
                    freq.add(&token);
                }
            }
        }
        freq.top(self.max_candidates)
            .into_iter()
            .map(|(term, doc_freq)| CandidatePhrase { term, doc_freq })
            .collect()
    }

    fn is_candidate(&self, token: &str) -> bool {
        let len = char_len(token);
        (2..=30).contains(&len)
            && !is_numeric_only(token)
            && !self.lexicon.is_stopword(token)
            && !self.lexicon.is_banword(token)
    }

    /// PMI of each candidate with the query over the sample, best first.
    /// Candidates never seen together with the query are dropped.
    pub fn rank_pmi(
        &self,
        query: &str,
        docs: &[SampleDoc<'_>],
        candidates: &[CandidatePhrase],
    ) -> Vec<PmiScore> {
        let n = docs.len().max(1) as f64;
        let query_lower = query.to_lowercase();
        let candidate_lower: Vec<String> =
            candidates.iter().map(|c| c.term.to_lowercase()).collect();

        let mut doc_with_query = 0usize;
        let mut cand_docs = vec![0usize; candidates.len()];
        let mut co_docs = vec![0usize; candidates.len()];

        for doc in docs {
            let text = doc.text();
            let window = truncate_chars(&text, self.window).to_lowercase();
            let has_query = window.contains(&query_lower);
            if has_query {
                doc_with_query += 1;
            }
            for (i, cand) in candidate_lower.iter().enumerate() {
                if window.contains(cand.as_str()) {
                    cand_docs[i] += 1;
                    if has_query {
                        co_docs[i] += 1;
                    }
                }
            }
        }

        let floor = |p: f64, min: f64| if p > 0.0 { p } else { min };
        let p_query = floor(doc_with_query as f64 / n, P_FLOOR);

        let mut ranked: Vec<PmiScore> = candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| co_docs[*i] >= 1)
            .map(|(i, cand)| {
                let p_cand = floor(cand_docs[i] as f64 / n, P_FLOOR);
                let p_joint = floor(co_docs[i] as f64 / n, P_JOINT_FLOOR);
                PmiScore {
                    term: cand.term.clone(),
                    pmi: (p_joint / (p_query * p_cand)).ln(),
                    co_doc_count: co_docs[i],
                    doc_freq: cand_docs[i],
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.rank_score()
                .partial_cmp(&a.rank_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Rule-based variants first, then PMI-ranked terms, capped at `top_n`.
    pub fn generate(&self, query: &str, docs: &[SampleDoc<'_>]) -> Vec<String> {
        let mut aliases = self.rule_based(query);
        let rule_count = aliases.len();

        let candidates = self.candidate_phrases(docs);
        let ranked = self.rank_pmi(query, docs, &candidates);
        let query_lower = query.to_lowercase();

        for score in &ranked {
            if aliases.len() >= self.top_n {
                break;
            }
            if score.term.to_lowercase() == query_lower {
                continue;
            }
            aliases.insert(score.term.clone());
        }
        aliases.truncate(self.top_n);

        tracing::debug!(
            "Aliases for {:?}: {} rule-based, {} candidates, {} co-occurring, {} kept",
            query,
            rule_count,
            candidates.len(),
            ranked.len(),
            aliases.len()
        );
        aliases.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> AliasGenerator {
        AliasGenerator::new(Arc::new(Lexicon::default()))
    }

    #[test]
    fn test_known_currency_pair() {
        let aliases = generator().rule_based("USDKRW").into_vec();
        assert_eq!(
            aliases,
            vec![
                "USD/KRW", "USD-KRW", "USDKRW", "달러/원", "원/달러", "원화", "달러", "환율",
                "달러-원", "usdkrw",
            ]
        );
    }

    #[test]
    fn test_unknown_currency_pair_shape() {
        let aliases = generator().rule_based("GBPUSD").into_vec();
        assert_eq!(aliases, vec!["GBP/USD", "GBP-USD", "GBPUSD", "gbpusd"]);
    }

    #[test]
    fn test_every_six_letter_query_gets_pair_notation() {
        let gen = generator();
        for pair in ["USDJPY", "EURUSD", "USDCNY", "EURKRW", "JPYKRW", "CNYKRW", "AUDNZD"] {
            let set = gen.rule_based(pair);
            let (base, quote) = pair.split_at(3);
            assert!(set.contains(&format!("{}/{}", base, quote)));
            assert!(set.contains(&format!("{}-{}", base, quote)));
            assert!(set.contains(pair));
            for alias in Lexicon::default().currency_aliases(pair) {
                assert!(set.contains(alias), "{} missing {}", pair, alias);
            }
        }
    }

    #[test]
    fn test_local_code_and_separators() {
        assert_eq!(generator().rule_based("005930").into_vec(), vec!["005930"]);
        assert_eq!(
            generator().rule_based(" usd_krw ").into_vec(),
            vec!["usd_krw", "USD_KRW", "usdkrw", "usd/krw"]
        );
        assert_eq!(
            generator().rule_based("samsung electronics").into_vec(),
            vec![
                "samsung electronics",
                "SAMSUNG ELECTRONICS",
                "samsungelectronics",
                "samsung/electronics",
            ]
        );
    }

    #[test]
    fn test_candidate_phrases_filters() {
        let docs = [
            SampleDoc::new("속보 KOSPI 2.5% 상승, 외국인 순매수", ""),
            SampleDoc::new("KOSPI KOSPI 외국인", "the Fed"),
        ];
        let cands = generator().candidate_phrases(&docs);
        let terms: Vec<(&str, usize)> =
            cands.iter().map(|c| (c.term.as_str(), c.doc_freq)).collect();
        assert_eq!(
            terms,
            vec![("KOSPI", 2), ("외국인", 2), ("상승", 1), ("순매수", 1), ("Fed", 1)]
        );
    }

    #[test]
    fn test_pmi_ranking_and_generate() {
        let docs = [
            SampleDoc::new("Tesla shares jump as Musk unveils robotaxi", ""),
            SampleDoc::new("Musk says Tesla will cut prices", ""),
            SampleDoc::new("Ford Motor earnings", ""),
            SampleDoc::new("Ford recalls trucks", ""),
        ];
        let gen = generator();
        let cands = gen.candidate_phrases(&docs);
        let ranked = gen.rank_pmi("Tesla", &docs, &cands);

        let terms: Vec<&str> = ranked.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["Tesla", "Musk"]);
        let musk = &ranked[1];
        assert_eq!(musk.co_doc_count, 2);
        assert_eq!(musk.doc_freq, 2);
        assert!((musk.pmi - 2f64.ln()).abs() < 1e-12);
        assert!((musk.rank_score() - (2f64.ln() + 3f64.ln())).abs() < 1e-12);

        let aliases = gen.generate("Tesla", &docs);
        assert_eq!(aliases, vec!["Tesla", "tesla", "TESLA", "Musk"]);
    }

    #[test]
    fn test_pmi_window_truncates_text() {
        let long_prefix = "x".repeat(300);
        let docs = [SampleDoc::new(&long_prefix, "Tesla Musk")];
        let gen = generator();
        let cands = gen.candidate_phrases(&docs);
        assert!(gen.rank_pmi("Tesla", &docs, &cands).is_empty());

        let wide = generator().with_window(400);
        let terms: Vec<String> = wide
            .rank_pmi("Tesla", &docs, &cands)
            .into_iter()
            .map(|r| r.term)
            .collect();
        assert!(terms.contains(&"Musk".to_string()));
    }

    #[test]
    fn test_empty_sample_keeps_rule_aliases() {
        let aliases = generator().generate("USDKRW", &[]);
        assert_eq!(aliases.len(), 10);
        assert_eq!(aliases[0], "USD/KRW");
    }

    #[test]
    fn test_top_n_truncates_rule_aliases() {
        let aliases = generator().with_top_n(2).generate("USDKRW", &[]);
        assert_eq!(aliases, vec!["USD/KRW", "USD-KRW"]);
    }
}
