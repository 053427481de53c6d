use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub provider_base_url: String,
    pub provider_api_key: Option<String>,
    pub provider_user_agent: String,
    pub provider_request_timeout_secs: u64,
    pub provider_max_retries: u32,
    pub provider_retry_backoff_base_ms: u64,
    pub fetch_timeout_secs: u64,
    pub ttl_website_content_secs: u64,
    pub ttl_reviews_secs: u64,
    pub ttl_ad_library_secs: u64,
    pub ttl_research_secs: u64,
    pub sweep_max_concurrent: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("provider_base_url", &self.provider_base_url)
            .field(
                "provider_api_key",
                &self.provider_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("provider_user_agent", &self.provider_user_agent)
            .field(
                "provider_request_timeout_secs",
                &self.provider_request_timeout_secs,
            )
            .field("provider_max_retries", &self.provider_max_retries)
            .field(
                "provider_retry_backoff_base_ms",
                &self.provider_retry_backoff_base_ms,
            )
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("ttl_website_content_secs", &self.ttl_website_content_secs)
            .field("ttl_reviews_secs", &self.ttl_reviews_secs)
            .field("ttl_ad_library_secs", &self.ttl_ad_library_secs)
            .field("ttl_research_secs", &self.ttl_research_secs)
            .field("sweep_max_concurrent", &self.sweep_max_concurrent)
            .finish()
    }
}
