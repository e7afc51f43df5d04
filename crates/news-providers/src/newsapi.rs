use crate::{http_client, non_empty, parse_timestamp, send_json, PAGE_SIZE};
use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use news_core::{Lang, NewsError, NewsProvider, NewsRequest, ProviderBatch, RawArticle};
use reqwest::Client;
use serde::Deserialize;

const BASE_URL: &str = "https://newsapi.org/v2/everything";
pub const PROVIDER: &str = "newsapi";
const FALLBACK_SOURCE: &str = "Unknown";

/// Client for the NewsAPI `everything` search.
#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl NewsApiClient {
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

    fn language(lang: Lang) -> &'static str {
        match lang {
            Lang::Kr => "ko",
            Lang::En => "en",
        }
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self, request: &NewsRequest) -> Result<ProviderBatch, NewsError> {
        let from = (Utc::now() - Duration::days(i64::from(request.days)))
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let page_size = PAGE_SIZE.to_string();

        tracing::debug!("NewsAPI search {:?} from {}", request.query, from);
        let response: NewsApiResponse = send_json(
            PROVIDER,
            self.client.get(&self.base_url).query(&[
                ("q", request.query.as_str()),
                ("language", Self::language(request.lang)),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ]),
        )
        .await?;

        Ok(into_batch(response))
    }
}

/// Map a decoded NewsAPI payload onto raw articles.
pub fn into_batch(response: NewsApiResponse) -> ProviderBatch {
    let articles = response
        .articles
        .into_iter()
        .map(|a| RawArticle {
            title: a.title,
            description: a.description,
            body: a.content,
            url: a.url.unwrap_or_default(),
            source_name: non_empty(a.source.and_then(|s| s.name)),
            published_at: a.published_at.as_deref().and_then(parse_timestamp),
        })
        .collect();

    ProviderBatch {
        provider: PROVIDER.to_string(),
        fallback_source: FALLBACK_SOURCE.to_string(),
        articles,
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve_once;
    use chrono::TimeZone;

    const PAYLOAD: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": null, "name": "Yonhap"},
                "author": null,
                "title": "달러/원 환율 1400원 돌파",
                "description": "원화 약세가 이어졌다.",
                "url": "https://example.com/1",
                "publishedAt": "2024-05-02T07:30:00Z",
                "content": "원/달러 환율이 상승했다. [+512 chars]"
            },
            {
                "source": {"id": null, "name": ""},
                "title": null,
                "url": "https://example.com/2",
                "publishedAt": "not a date"
            }
        ]
    }"#;

    #[test]
    fn test_decode_payload() {
        let response: NewsApiResponse = serde_json::from_str(PAYLOAD).unwrap();
        let batch = into_batch(response);
        assert_eq!(batch.provider, "newsapi");
        assert_eq!(batch.fallback_source, "Unknown");
        assert_eq!(batch.articles.len(), 2);

        let first = &batch.articles[0];
        assert_eq!(first.title.as_deref(), Some("달러/원 환율 1400원 돌파"));
        assert_eq!(first.body.as_deref(), Some("원/달러 환율이 상승했다. [+512 chars]"));
        assert_eq!(first.source_name.as_deref(), Some("Yonhap"));
        assert_eq!(
            first.published_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 7, 30, 0).unwrap())
        );

        let second = &batch.articles[1];
        assert_eq!(second.title, None);
        assert_eq!(second.source_name, None);
        assert_eq!(second.published_at, None);
    }

    #[test]
    fn test_missing_articles_field() {
        let response: NewsApiResponse =
            serde_json::from_str(r#"{"status":"error","code":"rateLimited"}"#).unwrap();
        assert!(into_batch(response).articles.is_empty());
    }

    fn client(base_url: String) -> NewsApiClient {
        NewsApiClient::new("key".to_string(), std::time::Duration::from_secs(5)).with_base_url(base_url)
    }

    fn request() -> NewsRequest {
        NewsRequest::new("USDKRW", 3, Lang::Kr)
    }

    #[tokio::test]
    async fn test_fetch_decodes_success_body() {
        let url = serve_once("200 OK", PAYLOAD).await;
        let batch = client(url).fetch(&request()).await.unwrap();
        assert_eq!(batch.provider, "newsapi");
        assert_eq!(batch.articles.len(), 2);
        assert_eq!(batch.articles[0].url, "https://example.com/1");
        assert_eq!(batch.articles[0].source_name.as_deref(), Some("Yonhap"));
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_provider_error() {
        let url = serve_once("500 Internal Server Error", r#"{"status":"error"}"#).await;
        let err = client(url).fetch(&request()).await.unwrap_err();
        match err {
            NewsError::Provider { provider, message } => {
                assert_eq!(provider, "newsapi");
                assert!(message.contains("500"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_decode_error() {
        let url = serve_once("200 OK", "{not json").await;
        let err = client(url).fetch(&request()).await.unwrap_err();
        assert!(matches!(err, NewsError::Decode(_)));
    }

    #[test]
    fn test_language_mapping() {
        assert_eq!(NewsApiClient::language(Lang::Kr), "ko");
        assert_eq!(NewsApiClient::language(Lang::En), "en");
    }
}
