use std::time::Duration;

/// Tunables of the analytics pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Articles kept in a result after filtering and sorting.
    pub max_articles: usize,
    /// Leading deduplicated articles fed to alias generation.
    pub alias_sample_size: usize,
    pub alias_top_n: usize,
    /// Leading characters of each sampled article scanned for co-occurrence.
    pub alias_pmi_window: usize,
    /// Token radius around each query mention for targeted sentiment.
    pub sentiment_window: usize,
    /// Articles below this relevance survive only if the title contains the query.
    pub min_relevance: f64,
    pub summary_sentences: usize,
    pub max_keywords: usize,
    /// Scale targeted sentiment by `0.6 + 0.4 * clamp(relevance, 0.2, 1)`.
    pub relevance_damping: bool,
    /// Deadline for each provider fetch.
    pub provider_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_articles: 60,
            alias_sample_size: 100,
            alias_top_n: text_analytics::aliases::DEFAULT_ALIAS_TOP_N,
            alias_pmi_window: text_analytics::aliases::DEFAULT_PMI_WINDOW,
            sentiment_window: text_analytics::targeted::DEFAULT_WINDOW,
            min_relevance: 0.2,
            summary_sentences: text_analytics::summarizer::DEFAULT_SUMMARY_SENTENCES,
            max_keywords: text_analytics::keywords::DEFAULT_MAX_KEYWORDS,
            relevance_damping: true,
            provider_timeout: Duration::from_secs(10),
        }
    }
}
