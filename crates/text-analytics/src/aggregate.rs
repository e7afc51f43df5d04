//! Roll-up of a processed article list.

use crate::text::FrequencyTable;
use chrono::{DateTime, TimeZone, Timelike, Utc};
use news_core::{round3, Aggregate, KeywordCount, NormalizedArticle, SentimentLabel, TimelinePoint};
use std::collections::BTreeMap;

pub const TOP_KEYWORDS: usize = 8;

/// Timeline granularity for a day span: hourly for a single day, daily beyond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Hour,
    Day,
}

impl Bucket {
    pub fn for_days(days: u32) -> Self {
        if days <= 1 {
            Bucket::Hour
        } else {
            Bucket::Day
        }
    }

    /// Start of the bucket containing `t`, in UTC.
    pub fn truncate(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let hour = match self {
            Bucket::Hour => t.hour(),
            Bucket::Day => 0,
        };
        t.date_naive()
            .and_hms_opt(hour, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(t)
    }
}

pub fn aggregate(articles: &[NormalizedArticle], days: u32) -> Aggregate {
    let count = articles.len();
    if count == 0 {
        return Aggregate::default();
    }

    let share = |label: SentimentLabel| {
        let n = articles.iter().filter(|a| a.sentiment == label).count();
        round3(n as f64 / count as f64)
    };

    let mut keywords = FrequencyTable::new();
    for keyword in articles.iter().flat_map(|a| a.keywords.iter()) {
        keywords.add(keyword);
    }
    let top_keywords = keywords
        .top(TOP_KEYWORDS)
        .into_iter()
        .map(|(word, count)| KeywordCount { word, count })
        .collect();

    let bucket = Bucket::for_days(days);
    let mut buckets: BTreeMap<DateTime<Utc>, (usize, f64)> = BTreeMap::new();
    for article in articles {
        let entry = buckets
            .entry(bucket.truncate(article.published_at))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += article.sentiment_score;
    }
    let timeline = buckets
        .into_iter()
        .map(|(t, (count, sum))| TimelinePoint {
            t,
            count,
            avg_sent: round3(sum / count.max(1) as f64),
        })
        .collect();

    Aggregate {
        count,
        pos_ratio: share(SentimentLabel::Positive),
        neg_ratio: share(SentimentLabel::Negative),
        top_keywords,
        timeline,
    }
}
