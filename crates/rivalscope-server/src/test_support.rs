//! In-process fixtures for route tests: a scriptable scan provider and a
//! ready-made application state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rivalscope_core::{
    AppConfig, Environment, ExtractedSignals, ScanObservation, ScanType, TtlPolicy,
};
use rivalscope_providers::{ProviderError, ScanProvider};
use rivalscope_store::IntelStore;
use tokio::sync::Mutex;

use crate::api::AppState;
use crate::uvp::UvpRegistry;

/// Canned observation per scan type. Website and reviews share a chat
/// weakness so synthesis always has a corroborated theme to work with.
pub fn observation(scan_type: ScanType) -> ScanObservation {
    let signals = match scan_type {
        ScanType::WebsiteContent => ExtractedSignals {
            positioning: Some("The enterprise choice for revenue teams".to_string()),
            weaknesses: vec!["no live chat support".to_string()],
            strengths: vec!["large integration catalog".to_string()],
            claims: vec!["99.9% uptime".to_string()],
        },
        ScanType::Reviews => ExtractedSignals {
            positioning: None,
            weaknesses: vec![
                "no live chat support offered".to_string(),
                "slow support response times".to_string(),
            ],
            strengths: vec!["reliable reporting".to_string()],
            claims: Vec::new(),
        },
        ScanType::AdLibrary => ExtractedSignals {
            positioning: None,
            weaknesses: Vec::new(),
            strengths: Vec::new(),
            claims: vec!["live chat support on every plan".to_string()],
        },
        ScanType::Research => ExtractedSignals {
            positioning: None,
            weaknesses: vec!["expensive enterprise pricing".to_string()],
            strengths: Vec::new(),
            claims: Vec::new(),
        },
    };
    ScanObservation {
        payload: serde_json::json!({"scan_type": scan_type.as_str()}),
        signals,
        quality: 0.8,
        sample_size: 10,
        source_url: Some("https://provider.example.com/result".to_string()),
    }
}

/// A provider that serves canned observations, counts invocations, and can
/// be scripted to change its answers after the first fetch per scan type
/// or to fail outright.
pub struct StaticProvider {
    fetches: AtomicU32,
    failing: AtomicBool,
    per_type_calls: Mutex<HashMap<ScanType, u32>>,
    later: Mutex<HashMap<ScanType, ScanObservation>>,
}

impl StaticProvider {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self {
            fetches: AtomicU32::new(0),
            failing: AtomicBool::new(false),
            per_type_calls: Mutex::new(HashMap::new()),
            later: Mutex::new(HashMap::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        let provider = Self::healthy();
        provider.set_failing(true);
        provider
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// From the second fetch of `scan_type` onward, serve `observation`
    /// instead of the default.
    pub async fn script_later_observation(&self, scan_type: ScanType, observation: ScanObservation) {
        self.later.lock().await.insert(scan_type, observation);
    }
}

#[async_trait]
impl ScanProvider for StaticProvider {
    async fn fetch(
        &self,
        _identity_key: &str,
        scan_type: ScanType,
    ) -> Result<ScanObservation, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("scripted outage".to_string()));
        }

        let call = {
            let mut calls = self.per_type_calls.lock().await;
            let entry = calls.entry(scan_type).or_insert(0);
            *entry += 1;
            *entry
        };
        if call > 1 {
            if let Some(scripted) = self.later.lock().await.get(&scan_type) {
                return Ok(scripted.clone());
            }
        }
        Ok(observation(scan_type))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("test bind addr"),
        log_level: "info".to_string(),
        provider_base_url: "http://127.0.0.1:0/".to_string(),
        provider_api_key: None,
        provider_user_agent: "rivalscope-test/0.1".to_string(),
        provider_request_timeout_secs: 5,
        provider_max_retries: 0,
        provider_retry_backoff_base_ms: 0,
        fetch_timeout_secs: 5,
        ttl_website_content_secs: 3_600,
        ttl_reviews_secs: 3_600,
        ttl_ad_library_secs: 3_600,
        ttl_research_secs: 3_600,
        sweep_max_concurrent: 4,
    }
}

pub fn state_with_provider(provider: Arc<StaticProvider>) -> AppState {
    let config = Arc::new(test_config());
    AppState {
        store: Arc::new(IntelStore::new(TtlPolicy::from_app_config(&config))),
        provider,
        uvp: Arc::new(UvpRegistry::new()),
        config,
    }
}
