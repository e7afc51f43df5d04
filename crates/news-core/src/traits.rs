use async_trait::async_trait;
use crate::{NewsError, NewsRequest, ProviderBatch};

/// Trait for upstream news sources.
///
/// A provider either returns its whole batch or fails; the pipeline turns a
/// failure into an empty contribution and never retries.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Short identifier used in article ids and logs (e.g. `newsapi`).
    fn name(&self) -> &str;

    async fn fetch(&self, request: &NewsRequest) -> Result<ProviderBatch, NewsError>;
}
