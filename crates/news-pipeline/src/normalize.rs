//! First pass: raw provider articles to normalized records.

use crate::PipelineConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use news_core::{round3, Lang, NormalizedArticle, ProviderBatch, RawArticle, SentimentLabel};
use std::collections::HashSet;
use text_analytics::{extract_keywords, lexicon_sentiment, summarize, Lexicon};

/// Builds normalized articles for one request.
pub struct Normalizer<'a> {
    pub lexicon: &'a Lexicon,
    pub config: &'a PipelineConfig,
    pub lang: Lang,
    /// Publish time substituted for articles that carry none.
    pub now: DateTime<Utc>,
}

impl<'a> Normalizer<'a> {
    pub fn normalize_batch(&self, batch: &ProviderBatch) -> Vec<NormalizedArticle> {
        batch
            .articles
            .iter()
            .enumerate()
            .map(|(idx, raw)| self.normalize(raw, idx, &batch.provider, &batch.fallback_source))
            .collect()
    }

    /// Summary, whole-document sentiment and title keywords; relevance stays 0
    /// until aliases are known.
    pub fn normalize(
        &self,
        raw: &RawArticle,
        idx: usize,
        provider: &str,
        fallback_source: &str,
    ) -> NormalizedArticle {
        let title = raw.title.clone().unwrap_or_default();
        let body = [raw.description.as_deref(), raw.body.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let summary_source = if body.is_empty() { &title } else { &body };
        let summary = summarize(summary_source, self.config.summary_sentences);
        let sentiment = lexicon_sentiment(&format!("{} {}", title, body), self.lexicon);
        let sentiment_score = round3(sentiment.score);
        let keywords = extract_keywords(&title, self.config.max_keywords, self.lexicon);

        let published_at = raw.published_at.unwrap_or(self.now);
        let source = raw
            .source_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(fallback_source)
            .to_string();

        NormalizedArticle {
            id: format!(
                "{}-{}-{}",
                provider,
                idx,
                published_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            title,
            url: raw.url.clone(),
            source,
            published_at,
            lang: self.lang,
            summary,
            sentiment: SentimentLabel::from_score(sentiment_score),
            sentiment_score,
            keywords,
            relevance: 0.0,
        }
    }
}

/// Keep the first article seen for each url; articles without a url are dropped.
pub fn dedupe_by_url(articles: Vec<NormalizedArticle>) -> Vec<NormalizedArticle> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| !a.url.is_empty() && seen.insert(a.url.clone()))
        .collect()
}
