//! HTTP client for the scan provider REST API.
//!
//! Wraps `reqwest` with provider-specific error handling, API key
//! management, and typed response deserialization. Every endpoint checks
//! the `"status"` field in the JSON envelope and surfaces provider-level
//! errors as [`ProviderError::Unavailable`].

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use rivalscope_core::ScanType;

use crate::error::ProviderError;
use crate::types::{ScanBody, ScanEnvelope};

/// Client for the scan provider REST API.
///
/// Use [`ScanApiClient::new`] for production or point `base_url` at a mock
/// server in tests.
pub struct ScanApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl ScanApiClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ProviderError::Unavailable`] if
    /// `base_url` is not a valid URL.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so
        // that join() appends to the path instead of replacing the last
        // segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            ProviderError::Unavailable(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            api_key: api_key.map(ToOwned::to_owned),
            base_url,
        })
    }

    /// Runs one scan of `scan_type` against the entity identified by
    /// `domain`, returning the provider's result body.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RateLimited`] on HTTP 429.
    /// - [`ProviderError::Unavailable`] on 5xx or an error envelope.
    /// - [`ProviderError::Timeout`] when the request exceeds the client
    ///   timeout.
    /// - [`ProviderError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn run_scan(
        &self,
        domain: &str,
        scan_type: ScanType,
    ) -> Result<ScanBody, ProviderError> {
        let mut url = self
            .base_url
            .join("v1/scan")
            .map_err(|e| ProviderError::Unavailable(format!("invalid scan URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("domain", domain)
            .append_pair("type", scan_type.as_str());

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                return Err(ProviderError::RateLimited { retry_after_secs });
            }
            status if status.is_server_error() => {
                return Err(ProviderError::Unavailable(format!(
                    "provider returned {status}"
                )));
            }
            _ => {}
        }
        let response = response.error_for_status()?;

        let text = response.text().await.map_err(map_transport_error)?;
        let envelope: ScanEnvelope =
            serde_json::from_str(&text).map_err(|e| ProviderError::Deserialize {
                context: format!("scan({domain}, {scan_type})"),
                source: e,
            })?;

        if envelope.status != "ok" {
            return Err(ProviderError::Unavailable(
                envelope
                    .error
                    .unwrap_or_else(|| format!("provider status {:?}", envelope.status)),
            ));
        }

        envelope.scan.ok_or_else(|| {
            ProviderError::Unavailable("provider returned ok with no scan body".to_string())
        })
    }
}

/// A reqwest timeout becomes [`ProviderError::Timeout`]; everything else
/// stays an HTTP error.
fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Http(e)
    }
}
