//! Wire types for the scan provider API.

use serde::Deserialize;

/// Top-level JSON envelope every provider response uses. `status` is
/// `"ok"` on success; anything else carries a message in `error`.
#[derive(Debug, Deserialize)]
pub struct ScanEnvelope {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub scan: Option<ScanBody>,
}

/// The provider's scan result body. Signal lists are optional on the
/// wire; absent fields deserialize to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanBody {
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub quality: f64,
    #[serde(default)]
    pub sample_size: u32,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub positioning: Option<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub claims: Vec<String>,
}
