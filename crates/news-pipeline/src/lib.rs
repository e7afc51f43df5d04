//! Request-level orchestration: fan out to news providers, run the two
//! analytics passes, and keep results and alias sets in TTL caches.

pub mod cache;
pub mod config;
pub mod normalize;
pub mod pipeline;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache, ALIAS_CACHE_TTL_SECS, RESULT_CACHE_TTL_SECS};
pub use config::PipelineConfig;
pub use normalize::{dedupe_by_url, Normalizer};
pub use pipeline::NewsPipeline;
