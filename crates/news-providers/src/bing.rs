use crate::{http_client, non_empty, parse_timestamp, send_json, PAGE_SIZE};
use async_trait::async_trait;
use news_core::{Lang, NewsError, NewsProvider, NewsRequest, ProviderBatch, RawArticle};
use reqwest::Client;
use serde::Deserialize;

const BASE_URL: &str = "https://api.bing.microsoft.com/v7.0/news/search";
pub const PROVIDER: &str = "bing";
const FALLBACK_SOURCE: &str = "Bing";

/// Client for the Bing News Search v7 API.
#[derive(Clone)]
pub struct BingNewsClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl BingNewsClient {
    pub fn new(api_key: String, timeout: std::time::Duration) -> Self {
        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client: http_client(timeout),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn market(lang: Lang) -> &'static str {
        match lang {
            Lang::Kr => "ko-KR",
            Lang::En => "en-US",
        }
    }

    /// Bing only offers coarse freshness windows.
    pub fn freshness(days: u32) -> &'static str {
        match days {
            0..=1 => "Day",
            2..=3 => "Week",
            _ => "Month",
        }
    }
}

#[async_trait]
impl NewsProvider for BingNewsClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self, request: &NewsRequest) -> Result<ProviderBatch, NewsError> {
        let count = PAGE_SIZE.to_string();

        tracing::debug!(
            "Bing news search {:?} freshness {}",
            request.query,
            Self::freshness(request.days)
        );
        let response: BingResponse = send_json(
            PROVIDER,
            self.client
                .get(&self.base_url)
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .query(&[
                    ("q", request.query.as_str()),
                    ("mkt", Self::market(request.lang)),
                    ("freshness", Self::freshness(request.days)),
                    ("count", count.as_str()),
                    ("sortBy", "Date"),
                ]),
        )
        .await?;

        Ok(into_batch(response))
    }
}

/// Map a decoded Bing payload onto raw articles. Bing has no article body.
pub fn into_batch(response: BingResponse) -> ProviderBatch {
    let articles = response
        .value
        .into_iter()
        .map(|a| RawArticle {
            title: a.name,
            description: a.description,
            body: None,
            url: a.url.unwrap_or_default(),
            source_name: non_empty(a.provider.into_iter().next().and_then(|p| p.name)),
            published_at: a.date_published.as_deref().and_then(parse_timestamp),
        })
        .collect();

    ProviderBatch {
        provider: PROVIDER.to_string(),
        fallback_source: FALLBACK_SOURCE.to_string(),
        articles,
    }
}

#[derive(Debug, Deserialize)]
pub struct BingResponse {
    #[serde(default)]
    value: Vec<BingArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingArticle {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    date_published: Option<String>,
    #[serde(default)]
    provider: Vec<BingOrganization>,
}

#[derive(Debug, Deserialize)]
struct BingOrganization {
    #[serde(default)]
    name: Option<String>,
}
