//! Canonical domain identity for competitor entities.
//!
//! Every externally observed competitor is keyed by the canonical form of its
//! website domain, so the same real-world business reported by unrelated
//! tenants under different names and URLs collapses onto one directory row.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The input carries no usable domain identity. Never mapped to an
    /// empty-string key: that would silently merge unrelated entities.
    #[error("no usable domain identity in input: {input:?}")]
    NoIdentity { input: String },
}

/// Normalizes a raw URL or free-text website string into a canonical
/// identity key: the lowercase hostname with scheme, `www.` prefix, path,
/// query, port, and trailing dot stripped.
///
/// Idempotent: `normalize_domain(&normalize_domain(x)?)` yields the same key.
///
/// # Errors
///
/// Returns [`NormalizeError::NoIdentity`] for empty input, input that does
/// not parse as a URL or hostname, or a single-label host (free text like
/// `"acme"` is not a domain and must not become a shared identity key).
pub fn normalize_domain(raw: &str) -> Result<String, NormalizeError> {
    let no_identity = || NormalizeError::NoIdentity {
        input: raw.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(no_identity());
    }

    // Accept bare hostnames by prepending a scheme before parsing.
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).map_err(|_| no_identity())?;
    let host = parsed.host_str().ok_or_else(no_identity)?;

    let host = host
        .to_ascii_lowercase()
        .trim_end_matches('.')
        .trim_start_matches("www.")
        .to_string();

    // A key must look like a domain: at least two labels.
    if host.is_empty() || !host.contains('.') || host.starts_with('.') || host.ends_with('.') {
        return Err(no_identity());
    }

    Ok(host)
}
