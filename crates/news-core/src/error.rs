use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Provider {provider} timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NewsError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        NewsError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
