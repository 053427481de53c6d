//! The scan-provider boundary consumed by the refresh path.

use async_trait::async_trait;
use rivalscope_core::{AppConfig, ScanObservation, ScanType};

use crate::client::ScanApiClient;
use crate::error::ProviderError;
use crate::extract::observation_from_body;
use crate::retry::retry_with_backoff;

/// One upstream source of scan results. Implementations must be safe to
/// share across concurrent refreshes of different keys.
#[async_trait]
pub trait ScanProvider: Send + Sync {
    /// Fetches one scan for the entity identified by its canonical domain.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on provider outage, throttling, timeout,
    /// or malformed responses.
    async fn fetch(
        &self,
        identity_key: &str,
        scan_type: ScanType,
    ) -> Result<ScanObservation, ProviderError>;
}

/// Production provider: the HTTP scan API with retry on transient errors.
pub struct HttpScanProvider {
    client: ScanApiClient,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpScanProvider {
    #[must_use]
    pub fn new(client: ScanApiClient, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            client,
            max_retries,
            backoff_base_ms,
        }
    }

    /// Builds the provider from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let client = ScanApiClient::new(
            &config.provider_base_url,
            config.provider_api_key.as_deref(),
            config.provider_request_timeout_secs,
            &config.provider_user_agent,
        )?;
        Ok(Self::new(
            client,
            config.provider_max_retries,
            config.provider_retry_backoff_base_ms,
        ))
    }
}

#[async_trait]
impl ScanProvider for HttpScanProvider {
    async fn fetch(
        &self,
        identity_key: &str,
        scan_type: ScanType,
    ) -> Result<ScanObservation, ProviderError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.client.run_scan(identity_key, scan_type)
        })
        .await?;
        Ok(observation_from_body(body))
    }
}
