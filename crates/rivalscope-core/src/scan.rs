//! Scan taxonomy and the per-scan-type freshness policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app_config::AppConfig;

/// The closed set of scan kinds a provider can run against an entity.
///
/// The cache key is (entity, scan type); wire names are stable
/// lowercase-snake strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    WebsiteContent,
    Reviews,
    AdLibrary,
    Research,
}

impl ScanType {
    pub const ALL: [ScanType; 4] = [
        ScanType::WebsiteContent,
        ScanType::Reviews,
        ScanType::AdLibrary,
        ScanType::Research,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScanType::WebsiteContent => "website_content",
            ScanType::Reviews => "reviews",
            ScanType::AdLibrary => "ad_library",
            ScanType::Research => "research",
        }
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields extracted from a raw scan payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSignals {
    pub positioning: Option<String>,
    pub weaknesses: Vec<String>,
    pub strengths: Vec<String>,
    pub claims: Vec<String>,
}

impl ExtractedSignals {
    /// True when the scan produced no usable signal at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positioning.is_none()
            && self.weaknesses.is_empty()
            && self.strengths.is_empty()
            && self.claims.is_empty()
    }
}

/// One provider result for one (entity, scan type) pair, before it is
/// recorded into the scan store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanObservation {
    pub payload: serde_json::Value,
    pub signals: ExtractedSignals,
    /// Provider-reported result quality in `[0, 1]`.
    pub quality: f64,
    /// Number of underlying samples (pages, reviews, ads) behind the result.
    pub sample_size: u32,
    pub source_url: Option<String>,
}

/// Time-to-live per scan type.
///
/// TTLs are configuration, not store behavior: website content is far
/// longer-lived than an ad-library pull, and operators tune both.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    website_content: Duration,
    reviews: Duration,
    ad_library: Duration,
    research: Duration,
}

impl TtlPolicy {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            website_content: Duration::from_secs(config.ttl_website_content_secs),
            reviews: Duration::from_secs(config.ttl_reviews_secs),
            ad_library: Duration::from_secs(config.ttl_ad_library_secs),
            research: Duration::from_secs(config.ttl_research_secs),
        }
    }

    #[must_use]
    pub fn ttl_for(&self, scan_type: ScanType) -> Duration {
        match scan_type {
            ScanType::WebsiteContent => self.website_content,
            ScanType::Reviews => self.reviews,
            ScanType::AdLibrary => self.ad_library,
            ScanType::Research => self.research,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            website_content: Duration::from_secs(604_800),
            reviews: Duration::from_secs(259_200),
            ad_library: Duration::from_secs(86_400),
            research: Duration::from_secs(1_209_600),
        }
    }
}
