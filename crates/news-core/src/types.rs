use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Score above which a targeted/final sentiment counts as positive
/// (and below the negation of which it counts as negative).
pub const SENTIMENT_LABEL_THRESHOLD: f64 = 0.15;

/// Result language requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Kr,
    En,
}

impl Lang {
    /// Anything other than an exact `en` falls back to Korean.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("en") => Lang::En,
            _ => Lang::Kr,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Kr => "kr",
            Lang::En => "en",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analytics request: what to search for, how far back, in which language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRequest {
    pub query: String,
    /// Day span, expected pre-clamped to 1..=14 by the boundary layer.
    pub days: u32,
    pub lang: Lang,
}

impl NewsRequest {
    pub fn new(query: impl Into<String>, days: u32, lang: Lang) -> Self {
        Self {
            query: query.into(),
            days,
            lang,
        }
    }

    /// Result cache key: `query|days|lang`, case-sensitive.
    pub fn cache_key(&self) -> String {
        format!("{}|{}|{}", self.query, self.days, self.lang)
    }
}

/// Article as delivered by an upstream provider, before any analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Everything one provider returned for a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderBatch {
    /// Provider identifier, used as the article id prefix.
    pub provider: String,
    /// Source name used when an article carries none.
    pub fallback_source: String,
    pub articles: Vec<RawArticle>,
}

impl ProviderBatch {
    pub fn empty(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            fallback_source: "Unknown".to_string(),
            articles: Vec::new(),
        }
    }
}

/// Three-way sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum SentimentLabel {
    #[serde(rename = "pos")]
    Positive,
    #[serde(rename = "neg")]
    Negative,
    #[serde(rename = "neu")]
    Neutral,
}

impl SentimentLabel {
    /// Sign-thresholded projection of a score with a symmetric dead zone.
    pub fn with_threshold(score: f64, threshold: f64) -> Self {
        if score > threshold {
            SentimentLabel::Positive
        } else if score < -threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Projection used for article records (±0.15).
    pub fn from_score(score: f64) -> Self {
        Self::with_threshold(score, SENTIMENT_LABEL_THRESHOLD)
    }
}

/// Fully analyzed article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NormalizedArticle {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub lang: Lang,
    pub summary: String,
    pub sentiment: SentimentLabel,
    /// -1.0 to 1.0
    pub sentiment_score: f64,
    pub keywords: Vec<String>,
    /// 0.0 to 1.0
    pub relevance: f64,
}

impl NormalizedArticle {
    /// Copy of this article with a new score and relevance; the label is
    /// always re-derived from the score.
    pub fn rescored(&self, sentiment_score: f64, relevance: f64) -> Self {
        Self {
            sentiment: SentimentLabel::from_score(sentiment_score),
            sentiment_score,
            relevance,
            ..self.clone()
        }
    }

    /// `title summary`, the text window used by targeted sentiment and aliasing.
    pub fn headline_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// One bucket of the sentiment timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// Start of the hour or day bucket (UTC).
    pub t: DateTime<Utc>,
    pub count: usize,
    pub avg_sent: f64,
}

/// Roll-up of a processed article list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub count: usize,
    pub pos_ratio: f64,
    pub neg_ratio: f64,
    pub top_keywords: Vec<KeywordCount>,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResultMeta {
    pub aliases: Vec<String>,
}

/// Query-focused summary returned for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewsResult {
    pub articles: Vec<NormalizedArticle>,
    pub agg: Aggregate,
    pub meta: ResultMeta,
}

impl NewsResult {
    /// Well-formed result for a request where no provider returned data.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Round to 3 decimal places, the precision used for every published score.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(score: f64) -> NormalizedArticle {
        NormalizedArticle {
            id: "newsapi-0-2024-01-01T00:00:00.000Z".to_string(),
            title: "Won rallies".to_string(),
            url: "https://example.com/a".to_string(),
            source: "Unknown".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            lang: Lang::En,
            summary: String::new(),
            sentiment: SentimentLabel::from_score(score),
            sentiment_score: score,
            keywords: vec![],
            relevance: 0.0,
        }
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(SentimentLabel::from_score(0.16), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(0.15), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.15), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.2), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::with_threshold(0.12, 0.1), SentimentLabel::Positive);
    }

    #[test]
    fn test_rescored_rederives_label() {
        let a = article(0.0);
        let b = a.rescored(-0.5, 0.75);
        assert_eq!(b.sentiment, SentimentLabel::Negative);
        assert_eq!(b.relevance, 0.75);
        // original untouched
        assert_eq!(a.sentiment, SentimentLabel::Neutral);
    }

    #[test]
    fn test_cache_key_and_lang() {
        let req = NewsRequest::new("USDKRW", 3, Lang::Kr);
        assert_eq!(req.cache_key(), "USDKRW|3|kr");
        assert_eq!(Lang::from_param(Some("en")), Lang::En);
        assert_eq!(Lang::from_param(Some("EN")), Lang::Kr);
        assert_eq!(Lang::from_param(None), Lang::Kr);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(article(0.4)).unwrap();
        assert_eq!(json["sentiment"], "pos");
        assert_eq!(json["sentimentScore"], 0.4);
        assert!(json.get("publishedAt").is_some());

        let agg = serde_json::to_value(Aggregate::default()).unwrap();
        assert!(agg.get("posRatio").is_some());
        assert!(agg.get("topKeywords").is_some());
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(-0.6666), -0.667);
    }
}
