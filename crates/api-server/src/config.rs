use news_core::{NewsError, NewsProvider};
use news_pipeline::{PipelineConfig, ALIAS_CACHE_TTL_SECS, RESULT_CACHE_TTL_SECS};
use news_providers::{BingNewsClient, NewsApiClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use text_analytics::Lexicon;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
/// Longest accepted cache lifetime (one day).
const MAX_CACHE_TTL_SECS: i64 = 86_400;

fn cache_ttl(value: Option<String>, default: i64) -> i64 {
    value
        .and_then(|v| v.parse().ok())
        .filter(|secs: &i64| (1..=MAX_CACHE_TTL_SECS).contains(secs))
        .unwrap_or(default)
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub newsapi_key: Option<String>,
    pub bing_key: Option<String>,
    pub bing_disabled: bool,
    pub result_cache_ttl_secs: i64,
    pub alias_cache_ttl_secs: i64,
    pub provider_timeout: Duration,
    /// JSON lexicon replacing the built-in word lists.
    pub lexicon_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PORT),
            newsapi_key: get("NEWSAPI_KEY"),
            bing_key: get("BING_NEWS_KEY"),
            bing_disabled: get("BING_NEWS_DISABLE")
                .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
                .unwrap_or(false),
            result_cache_ttl_secs: cache_ttl(get("RESULT_CACHE_TTL_SECS"), RESULT_CACHE_TTL_SECS),
            alias_cache_ttl_secs: cache_ttl(get("ALIAS_CACHE_TTL_SECS"), ALIAS_CACHE_TTL_SECS),
            provider_timeout: Duration::from_secs(
                get("PROVIDER_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
            ),
            lexicon_path: get("LEXICON_PATH").map(PathBuf::from),
        }
    }

    pub fn bing_enabled(&self) -> bool {
        self.bing_key.is_some() && !self.bing_disabled
    }

    pub fn has_provider(&self) -> bool {
        self.newsapi_key.is_some() || self.bing_enabled()
    }

    /// Configured providers in priority order: NewsAPI, then Bing.
    pub fn providers(&self) -> Vec<Arc<dyn NewsProvider>> {
        let mut providers: Vec<Arc<dyn NewsProvider>> = Vec::new();
        if let Some(key) = &self.newsapi_key {
            providers.push(Arc::new(NewsApiClient::new(key.clone(), self.provider_timeout)));
        }
        if let (Some(key), true) = (&self.bing_key, self.bing_enabled()) {
            providers.push(Arc::new(BingNewsClient::new(key.clone(), self.provider_timeout)));
        }
        providers
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            provider_timeout: self.provider_timeout,
            ..PipelineConfig::default()
        }
    }

    pub fn load_lexicon(&self) -> Result<Lexicon, NewsError> {
        match &self.lexicon_path {
            Some(path) => Lexicon::load(path),
            None => Ok(Lexicon::default()),
        }
    }
}
