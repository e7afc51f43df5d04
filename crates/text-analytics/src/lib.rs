//! Query-aware text analytics for news headlines.
//!
//! Every function here is synchronous and total: degenerate input (empty
//! titles, empty samples) produces neutral or empty output, never an error.

pub mod aggregate;
pub mod aliases;
pub mod keywords;
pub mod lexicon;
pub mod relevance;
pub mod sentiment;
pub mod summarizer;
pub mod targeted;
pub mod text;

pub use aggregate::{aggregate, Bucket};
pub use aliases::{AliasGenerator, AliasSet, CandidatePhrase, PmiScore, SampleDoc};
pub use keywords::extract_keywords;
pub use lexicon::Lexicon;
pub use relevance::dynamic_relevance;
pub use sentiment::{lexicon_sentiment, SentimentScore};
pub use summarizer::summarize;
pub use targeted::targeted_sentiment;
