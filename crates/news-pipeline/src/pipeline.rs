use crate::cache::{Clock, SystemClock, TtlCache, ALIAS_CACHE_TTL_SECS, RESULT_CACHE_TTL_SECS};
use crate::normalize::{dedupe_by_url, Normalizer};
use crate::PipelineConfig;
use chrono::Duration;
use futures_util::future::join_all;
use news_core::{
    round3, NewsError, NewsProvider, NewsRequest, NewsResult, NormalizedArticle, ProviderBatch,
    ResultMeta,
};
use std::sync::Arc;
use text_analytics::{
    aggregate, dynamic_relevance, targeted_sentiment, AliasGenerator, Lexicon, SampleDoc,
};

/// Turns provider batches into a cached, query-focused [`NewsResult`].
pub struct NewsPipeline {
    config: PipelineConfig,
    lexicon: Arc<Lexicon>,
    alias_generator: AliasGenerator,
    result_cache: Arc<TtlCache<NewsResult>>,
    alias_cache: Arc<TtlCache<Vec<String>>>,
    clock: Arc<dyn Clock>,
}

impl NewsPipeline {
    pub fn new(
        config: PipelineConfig,
        lexicon: Arc<Lexicon>,
        result_cache: Arc<TtlCache<NewsResult>>,
        alias_cache: Arc<TtlCache<Vec<String>>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let alias_generator = AliasGenerator::new(lexicon.clone())
            .with_top_n(config.alias_top_n)
            .with_window(config.alias_pmi_window);
        Self {
            config,
            lexicon,
            alias_generator,
            result_cache,
            alias_cache,
            clock,
        }
    }

    /// Pipeline on the system clock with the standard cache lifetimes.
    pub fn with_defaults(config: PipelineConfig, lexicon: Arc<Lexicon>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let result_cache = Arc::new(TtlCache::new(
            "result",
            Duration::seconds(RESULT_CACHE_TTL_SECS),
            clock.clone(),
        ));
        let alias_cache = Arc::new(TtlCache::new(
            "alias",
            Duration::seconds(ALIAS_CACHE_TTL_SECS),
            clock.clone(),
        ));
        Self::new(config, lexicon, result_cache, alias_cache, clock)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Cached result for this request, if still fresh.
    pub fn cached(&self, request: &NewsRequest) -> Option<NewsResult> {
        self.result_cache.get(&request.cache_key())
    }

    /// Serve from cache, or fetch from every provider and process.
    pub async fn run(
        &self,
        request: &NewsRequest,
        providers: &[Arc<dyn NewsProvider>],
    ) -> NewsResult {
        if let Some(hit) = self.cached(request) {
            tracing::info!("Serving cached news result for {}", request.cache_key());
            return hit;
        }
        let batches = self.fetch_all(request, providers).await;
        self.process(request, &batches)
    }

    /// Fetch from all providers concurrently. A provider that fails or misses
    /// its deadline contributes an empty batch.
    pub async fn fetch_all(
        &self,
        request: &NewsRequest,
        providers: &[Arc<dyn NewsProvider>],
    ) -> Vec<ProviderBatch> {
        let deadline = self.config.provider_timeout;
        let fetches = providers.iter().map(|provider| async move {
            match tokio::time::timeout(deadline, provider.fetch(request)).await {
                Ok(Ok(batch)) => {
                    tracing::info!(
                        "Provider {} returned {} articles for {:?}",
                        provider.name(),
                        batch.articles.len(),
                        request.query
                    );
                    batch
                }
                Ok(Err(e)) => {
                    tracing::warn!("{}", e);
                    ProviderBatch::empty(provider.name())
                }
                Err(_) => {
                    let err = NewsError::Timeout {
                        provider: provider.name().to_string(),
                        seconds: deadline.as_secs(),
                    };
                    tracing::warn!("{}", err);
                    ProviderBatch::empty(provider.name())
                }
            }
        });
        join_all(fetches).await
    }

    /// Run the analytics over already-fetched batches and cache the result.
    ///
    /// An input with no articles at all yields the empty result, which is not
    /// cached so the next request tries the providers again.
    pub fn process(&self, request: &NewsRequest, batches: &[ProviderBatch]) -> NewsResult {
        let normalizer = Normalizer {
            lexicon: &self.lexicon,
            config: &self.config,
            lang: request.lang,
            now: self.clock.now(),
        };
        let merged: Vec<NormalizedArticle> = batches
            .iter()
            .flat_map(|batch| normalizer.normalize_batch(batch))
            .collect();

        if merged.is_empty() {
            tracing::info!("No articles for {}, returning empty result", request.cache_key());
            return NewsResult::empty();
        }

        let merged_count = merged.len();
        let articles = dedupe_by_url(merged);
        let aliases = self.resolve_aliases(&request.query, &articles);

        let mut selected: Vec<NormalizedArticle> = articles
            .iter()
            .map(|article| self.rescore(article, &request.query, &aliases))
            .filter(|article| self.is_relevant(article, &request.query))
            .collect();
        let relevant_count = selected.len();
        selected.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        selected.truncate(self.config.max_articles);

        tracing::debug!(
            "Pipeline {}: {} merged, {} unique, {} relevant, {} kept, {} aliases",
            request.cache_key(),
            merged_count,
            articles.len(),
            relevant_count,
            selected.len(),
            aliases.len()
        );

        let agg = aggregate(&selected, request.days);
        let result = NewsResult {
            articles: selected,
            agg,
            meta: ResultMeta { aliases },
        };
        self.result_cache.put(request.cache_key(), result.clone());
        result
    }

    /// Alias set for `query`, generated from the leading sample on a cache miss.
    pub fn resolve_aliases(&self, query: &str, articles: &[NormalizedArticle]) -> Vec<String> {
        if let Some(cached) = self.alias_cache.get(query) {
            return cached;
        }
        let sample: Vec<SampleDoc<'_>> = articles
            .iter()
            .take(self.config.alias_sample_size)
            .map(SampleDoc::from)
            .collect();
        let aliases = self.alias_generator.generate(query, &sample);
        self.alias_cache.put(query, aliases.clone());
        aliases
    }

    /// Second pass: relevance and query-targeted sentiment under the alias set.
    pub fn rescore(
        &self,
        article: &NormalizedArticle,
        query: &str,
        aliases: &[String],
    ) -> NormalizedArticle {
        let relevance = dynamic_relevance(&article.title, query, aliases);
        let targeted = targeted_sentiment(
            &article.headline_text(),
            query,
            aliases,
            self.config.sentiment_window,
            &self.lexicon,
        );
        let score = if self.config.relevance_damping {
            targeted.score * (0.6 + 0.4 * relevance.clamp(0.2, 1.0))
        } else {
            targeted.score
        };
        article.rescored(round3(score), relevance)
    }

    fn is_relevant(&self, article: &NormalizedArticle, query: &str) -> bool {
        article.relevance >= self.config.min_relevance
            || article.title.to_lowercase().contains(&query.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use news_core::{Lang, RawArticle, SentimentLabel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn pipeline_with(config: PipelineConfig) -> (NewsPipeline, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let pipeline = NewsPipeline::new(
            config,
            Arc::new(Lexicon::default()),
            Arc::new(TtlCache::new(
                "result",
                Duration::seconds(RESULT_CACHE_TTL_SECS),
                dyn_clock.clone(),
            )),
            Arc::new(TtlCache::new(
                "alias",
                Duration::seconds(ALIAS_CACHE_TTL_SECS),
                dyn_clock.clone(),
            )),
            dyn_clock,
        );
        (pipeline, clock)
    }

    fn pipeline() -> (NewsPipeline, Arc<ManualClock>) {
        pipeline_with(PipelineConfig::default())
    }

    fn raw(title: &str, url: &str, hours_ago: i64) -> RawArticle {
        RawArticle {
            title: Some(title.to_string()),
            url: url.to_string(),
            published_at: Some(start() - Duration::hours(hours_ago)),
            ..Default::default()
        }
    }

    fn batch(articles: Vec<RawArticle>) -> ProviderBatch {
        ProviderBatch {
            provider: "stub".to_string(),
            fallback_source: "Stub".to_string(),
            articles,
        }
    }

    fn usdkrw() -> NewsRequest {
        NewsRequest::new("USDKRW", 1, Lang::Kr)
    }

    struct StubProvider {
        batch: ProviderBatch,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(batch: ProviderBatch) -> Self {
            Self {
                batch,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NewsProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch(&self, _request: &NewsRequest) -> Result<ProviderBatch, NewsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.batch.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl NewsProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _request: &NewsRequest) -> Result<ProviderBatch, NewsError> {
            Err(NewsError::provider("failing", "HTTP 500"))
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl NewsProvider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn fetch(&self, _request: &NewsRequest) -> Result<ProviderBatch, NewsError> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(ProviderBatch::empty("hanging"))
        }
    }

    #[test]
    fn test_currency_pair_headline() {
        let (pipeline, _) = pipeline();
        let result = pipeline.process(
            &usdkrw(),
            &[batch(vec![raw("달러/원 환율 1400원 돌파, 증시도 강세", "https://n.kr/1", 0)])],
        );

        assert_eq!(result.articles.len(), 1);
        let article = &result.articles[0];
        assert!(article.keywords.iter().any(|k| k == "달러/원"));
        assert!(article.keywords.iter().any(|k| k == "돌파"));
        assert_eq!(article.relevance, 0.75);
        assert_eq!(article.sentiment, SentimentLabel::Positive);
        assert_eq!(article.sentiment_score, 0.765);
        assert_eq!(article.source, "Stub");

        assert!(result.meta.aliases.iter().any(|a| a == "USD/KRW"));
        assert!(result.meta.aliases.iter().any(|a| a == "USD-KRW"));
        assert_eq!(result.agg.count, 1);
        assert_eq!(result.agg.pos_ratio, 1.0);
        assert_eq!(result.agg.timeline.len(), 1);
    }

    #[test]
    fn test_empty_input_is_empty_and_uncached() {
        let (pipeline, _) = pipeline();
        let result = pipeline.process(&usdkrw(), &[ProviderBatch::empty("stub")]);
        assert_eq!(result, NewsResult::empty());
        assert_eq!(result.agg.pos_ratio, 0.0);
        assert!(result.meta.aliases.is_empty());
        assert!(pipeline.cached(&usdkrw()).is_none());
    }

    #[test]
    fn test_degenerate_article_rescore() {
        let (pipeline, _) = pipeline();
        let normalizer = Normalizer {
            lexicon: pipeline.lexicon(),
            config: pipeline.config(),
            lang: Lang::Kr,
            now: start(),
        };
        let empty = normalizer.normalize(
            &RawArticle {
                title: Some(String::new()),
                description: Some(String::new()),
                url: "https://n.kr/empty".to_string(),
                ..Default::default()
            },
            0,
            "stub",
            "Stub",
        );
        let aliases = pipeline.resolve_aliases("USDKRW", &[]);
        let rescored = pipeline.rescore(&empty, "USDKRW", &aliases);
        assert_eq!(rescored.summary, "");
        assert!(rescored.keywords.is_empty());
        assert_eq!(rescored.sentiment, SentimentLabel::Neutral);
        assert_eq!(rescored.sentiment_score, 0.0);
        assert_eq!(rescored.relevance, 0.0);
    }

    #[test]
    fn test_duplicate_urls_keep_first() {
        let (pipeline, _) = pipeline();
        let result = pipeline.process(
            &usdkrw(),
            &[
                batch(vec![raw("USDKRW first", "https://n.kr/dup", 1)]),
                batch(vec![raw("USDKRW second", "https://n.kr/dup", 0)]),
            ],
        );
        assert_eq!(result.articles.len(), 1);
        assert_eq!(result.articles[0].title, "USDKRW first");
    }

    #[test]
    fn test_filter_sort_truncate() {
        let (pipeline, _) = pipeline_with(PipelineConfig {
            max_articles: 2,
            ..PipelineConfig::default()
        });
        let result = pipeline.process(
            &usdkrw(),
            &[batch(vec![
                raw("USDKRW oldest", "https://n.kr/a", 5),
                raw("Oil prices slide", "https://n.kr/off-topic", 0),
                raw("USDKRW newest", "https://n.kr/b", 1),
                raw("USDKRW middle", "https://n.kr/c", 3),
            ])],
        );
        let titles: Vec<&str> = result.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["USDKRW newest", "USDKRW middle"]);
        assert_eq!(result.agg.count, 2);
    }

    #[test]
    fn test_relevance_damping() {
        let articles = [batch(vec![raw("USDKRW rally", "https://n.kr/r", 0)])];

        let (damped, _) = pipeline();
        let result = damped.process(&usdkrw(), &articles);
        assert_eq!(result.articles[0].relevance, 0.25);
        assert_eq!(result.articles[0].sentiment_score, 0.595);

        let (raw_pipeline, _) = pipeline_with(PipelineConfig {
            relevance_damping: false,
            ..PipelineConfig::default()
        });
        let result = raw_pipeline.process(&usdkrw(), &articles);
        assert_eq!(result.articles[0].sentiment_score, 0.85);
    }

    #[test]
    fn test_alias_cache_is_reused() {
        let (pipeline, _) = pipeline();
        pipeline.alias_cache.put("USDKRW", vec!["원화".to_string()]);
        let result = pipeline.process(
            &usdkrw(),
            &[batch(vec![raw("원화 약세 지속", "https://n.kr/w", 0)])],
        );
        assert_eq!(result.meta.aliases, vec!["원화"]);
        assert_eq!(result.articles.len(), 1);
        assert_eq!(result.articles[0].sentiment, SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn test_run_caches_until_ttl() {
        let (pipeline, clock) = pipeline();
        let stub = Arc::new(StubProvider::new(batch(vec![raw(
            "USDKRW climbs",
            "https://n.kr/x",
            0,
        )])));
        let providers: Vec<Arc<dyn NewsProvider>> = vec![stub.clone()];

        let first = pipeline.run(&usdkrw(), &providers).await;
        let second = pipeline.run(&usdkrw(), &providers).await;
        assert_eq!(first, second);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

        // other parameters are a different key
        pipeline.run(&NewsRequest::new("USDKRW", 3, Lang::Kr), &providers).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);

        clock.advance(Duration::seconds(RESULT_CACHE_TTL_SECS + 1));
        pipeline.run(&usdkrw(), &providers).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failing_and_hanging_providers_contribute_nothing() {
        let (pipeline, _) = pipeline_with(PipelineConfig {
            provider_timeout: std::time::Duration::from_millis(50),
            ..PipelineConfig::default()
        });
        let providers: Vec<Arc<dyn NewsProvider>> = vec![
            Arc::new(FailingProvider),
            Arc::new(HangingProvider),
            Arc::new(StubProvider::new(batch(vec![raw(
                "USDKRW steady",
                "https://n.kr/s",
                0,
            )]))),
        ];

        let batches = pipeline.fetch_all(&usdkrw(), &providers).await;
        assert_eq!(batches.len(), 3);
        assert!(batches[0].articles.is_empty());
        assert!(batches[1].articles.is_empty());

        let result = pipeline.run(&usdkrw(), &providers).await;
        assert_eq!(result.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_all_providers_failing_yields_empty_result() {
        let (pipeline, _) = pipeline();
        let providers: Vec<Arc<dyn NewsProvider>> = vec![Arc::new(FailingProvider)];
        let result = pipeline.run(&usdkrw(), &providers).await;
        assert!(result.is_empty());
        assert_eq!(result.agg.count, 0);
    }
}
