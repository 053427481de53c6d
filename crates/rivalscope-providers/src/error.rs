use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider is down or returned an application-level error.
    #[error("scan provider unavailable: {0}")]
    Unavailable(String),

    /// The provider throttled us. Never retried inside the client; the
    /// refresh TTL naturally spaces out the next attempt.
    #[error("scan provider rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The request exceeded the client timeout.
    #[error("scan provider request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        source: serde_json::Error,
    },
}
