//! Upstream news search adapters.
//!
//! Each client implements [`NewsProvider`](news_core::NewsProvider) and turns
//! the upstream payload into a [`ProviderBatch`](news_core::ProviderBatch) of
//! raw articles. Analysis happens downstream in the pipeline.

use chrono::{DateTime, NaiveDateTime, Utc};
use news_core::NewsError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub mod bing;
pub mod newsapi;

pub use bing::BingNewsClient;
pub use newsapi::NewsApiClient;

const USER_AGENT: &str = "news-lens/0.1";
/// Articles requested from each upstream per query.
pub const PAGE_SIZE: u32 = 50;

fn http_client(timeout: Duration) -> Client {
    build_client(timeout, USER_AGENT)
}

fn build_client(timeout: Duration, user_agent: &str) -> Client {
    match Client::builder().timeout(timeout).user_agent(user_agent).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(
                "HTTP client setup failed ({}); falling back to defaults without timeout or user agent",
                e
            );
            Client::new()
        }
    }
}

/// Send a request and decode a JSON body. Non-2xx statuses are provider
/// errors; nothing is retried.
async fn send_json<T: DeserializeOwned>(
    provider: &str,
    builder: RequestBuilder,
) -> Result<T, NewsError> {
    let response = builder
        .send()
        .await
        .map_err(|e| NewsError::Http(format!("{}: {}", provider, e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NewsError::provider(
            provider,
            format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>()),
        ));
    }

    let text = response
        .text()
        .await
        .map_err(|e| NewsError::Http(format!("{}: {}", provider, e)))?;
    serde_json::from_str(&text).map_err(|e| NewsError::Decode(format!("{}: {}", provider, e)))
}

/// RFC3339 timestamp, or a zone-less one read as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Empty strings count as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
