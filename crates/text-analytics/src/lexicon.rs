//! Word-list data shared by every analyzer.
//!
//! The lists are plain data so a deployment can ship its own JSON lexicon
//! (another language, another market) without touching analyzer code.
//! [`Lexicon::default`] is the built-in `kr-en/v1` lexicon.

use news_core::NewsError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const BUILTIN_LEXICON_VERSION: &str = "kr-en/v1";

const POSITIVE_WORDS: &[&str] = &[
    "호조", "개선", "상향", "강세", "확대", "증가", "호재",
    "surge", "beat", "rally", "grow", "record", "profit",
];

const NEGATIVE_WORDS: &[&str] = &[
    "부진", "하향", "약세", "축소", "감소", "악재",
    "slump", "miss", "fall", "decline", "loss", "warning",
];

// Domain cues only used by targeted sentiment, on top of the word lists above.
const POSITIVE_CUES: &[&str] = &[
    "호실적", "사상최대", "돌파", "승인", "인상", "증익", "상향조정",
    "수주", "계약", "배당증가", "턴어라운드", "호재",
];

const NEGATIVE_CUES: &[&str] = &[
    "비판", "논란", "우려", "경고", "과열", "고발", "소송", "징계",
    "규제", "리콜", "적자", "감산", "감익", "하향조정", "부정",
];

// Banking-sector vocabulary that drags whole-article criticism into a target
// that is not about banks.
const NOISE_TERMS: &[&str] = &[
    "은행", "은행권", "금융권", "이자장사", "금리장사", "시중은행", "저축은행",
];

const STOPWORDS: &[&str] = &[
    // en
    "the", "a", "an", "and", "or", "to", "of", "for", "on", "in", "at", "by",
    "with", "from", "as", "is", "are", "was", "were", "be", "been", "it", "its",
    "this", "that", "these", "those", "over",
    // kr particles and filler
    "은", "는", "이", "가", "을", "를", "의", "에", "에서", "와", "과", "및",
    "도", "으로", "보다", "보다도", "했다", "했다는", "대해", "등", "중", "또",
    "또한", "하지만", "그러나", "그리고", "올해", "내년", "작년",
];

const BANWORDS: &[&str] = &[
    // kr newsroom boilerplate
    "속보", "단독", "종합", "영상", "포토", "기자", "앵커", "오늘", "어제",
    "내일", "현장", "사진", "인터뷰", "중계", "전문", "해설", "칼럼", "사설",
    "사설/칼럼",
    // en newsroom boilerplate
    "breaking", "exclusive", "opinion", "analysis", "column", "editorial",
    "watch", "video", "photo", "live", "update", "updates",
];

const CURRENCY_PAIRS: &[(&str, &[&str])] = &[
    ("USDKRW", &["USD/KRW", "달러/원", "원/달러", "원화", "달러", "환율", "달러-원", "USDKRW"]),
    ("USDJPY", &["USD/JPY", "달러/엔", "엔/달러", "엔화", "달러-엔", "USDJPY"]),
    ("EURUSD", &["EUR/USD", "유로/달러", "달러/유로", "유로화", "유로-달러", "EURUSD"]),
    ("USDCNY", &["USD/CNY", "달러/위안", "위안/달러", "위안화", "달러-위안", "USDCNY"]),
    ("EURKRW", &["EUR/KRW", "유로/원", "원/유로", "유로화", "유로-원", "EURKRW"]),
    ("JPYKRW", &["JPY/KRW", "엔/원", "원/엔", "엔화", "엔-원", "JPYKRW"]),
    ("CNYKRW", &["CNY/KRW", "위안/원", "원/위안", "위안화", "위안-원", "CNYKRW"]),
];

/// Versioned word lists used for sentiment, keyword filtering and aliasing.
///
/// All set members are stored lowercase; lookups lowercase their input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    pub version: String,
    /// Whole-document positive words (substring matched).
    pub positive_words: Vec<String>,
    /// Whole-document negative words (substring matched).
    pub negative_words: Vec<String>,
    /// Extra positive cues for targeted sentiment (token matched).
    #[serde(default)]
    pub positive_cues: HashSet<String>,
    /// Extra negative cues for targeted sentiment (token matched).
    #[serde(default)]
    pub negative_cues: HashSet<String>,
    /// Tokens ignored by targeted sentiment.
    #[serde(default)]
    pub noise_terms: HashSet<String>,
    #[serde(default)]
    pub stopwords: HashSet<String>,
    #[serde(default)]
    pub banwords: HashSet<String>,
    /// Natural-language equivalents keyed by `XXXYYY` pair code.
    #[serde(default)]
    pub currency_pairs: HashMap<String, Vec<String>>,
}

fn owned_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

fn owned_vec(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            version: BUILTIN_LEXICON_VERSION.to_string(),
            positive_words: owned_vec(POSITIVE_WORDS),
            negative_words: owned_vec(NEGATIVE_WORDS),
            positive_cues: owned_set(POSITIVE_CUES),
            negative_cues: owned_set(NEGATIVE_CUES),
            noise_terms: owned_set(NOISE_TERMS),
            stopwords: owned_set(STOPWORDS),
            banwords: owned_set(BANWORDS),
            currency_pairs: CURRENCY_PAIRS
                .iter()
                .map(|(pair, aliases)| {
                    (pair.to_string(), aliases.iter().map(|a| a.to_string()).collect())
                })
                .collect(),
        }
    }
}

impl Lexicon {
    /// Parse a lexicon from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, NewsError> {
        let mut lexicon: Lexicon = serde_json::from_str(json)
            .map_err(|e| NewsError::Config(format!("invalid lexicon: {}", e)))?;
        lexicon.normalize_case();
        Ok(lexicon)
    }

    /// Load a lexicon file written in the JSON representation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NewsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            NewsError::Config(format!("cannot read lexicon {}: {}", path.display(), e))
        })?;
        let lexicon = Self::from_json_str(&json)?;
        tracing::info!("Loaded lexicon {} from {}", lexicon.version, path.display());
        Ok(lexicon)
    }

    fn normalize_case(&mut self) {
        let lower_vec = |v: &mut Vec<String>| v.iter_mut().for_each(|w| *w = w.to_lowercase());
        let lower_set =
            |s: &HashSet<String>| -> HashSet<String> { s.iter().map(|w| w.to_lowercase()).collect() };
        lower_vec(&mut self.positive_words);
        lower_vec(&mut self.negative_words);
        self.positive_cues = lower_set(&self.positive_cues);
        self.negative_cues = lower_set(&self.negative_cues);
        self.noise_terms = lower_set(&self.noise_terms);
        self.stopwords = lower_set(&self.stopwords);
        self.banwords = lower_set(&self.banwords);
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    pub fn is_banword(&self, word: &str) -> bool {
        self.banwords.contains(&word.to_lowercase())
    }

    /// Expects an already-lowercased token.
    pub fn is_positive_cue(&self, token: &str) -> bool {
        self.positive_cues.contains(token) || self.positive_words.iter().any(|w| w == token)
    }

    /// Expects an already-lowercased token.
    pub fn is_negative_cue(&self, token: &str) -> bool {
        self.negative_cues.contains(token) || self.negative_words.iter().any(|w| w == token)
    }

    /// Expects an already-lowercased token.
    pub fn is_noise(&self, token: &str) -> bool {
        self.noise_terms.contains(token)
    }

    pub fn currency_aliases(&self, pair: &str) -> &[String] {
        self.currency_pairs.get(pair).map(Vec::as_slice).unwrap_or(&[])
    }
}
