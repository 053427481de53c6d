//! Conversion from raw provider scan bodies to normalized observations.
//!
//! Providers are sloppy about whitespace, casing, and repeated phrases;
//! the scan store should only ever see cleaned signal lists.

use rivalscope_core::{ExtractedSignals, ScanObservation};

use crate::types::ScanBody;

/// Normalizes a raw [`ScanBody`] into a [`ScanObservation`] ready for the
/// scan store: signals trimmed and deduplicated, quality clamped to [0, 1].
#[must_use]
pub fn observation_from_body(body: ScanBody) -> ScanObservation {
    let signals = ExtractedSignals {
        positioning: clean_text(body.positioning),
        weaknesses: clean_list(body.weaknesses),
        strengths: clean_list(body.strengths),
        claims: clean_list(body.claims),
    };
    ScanObservation {
        payload: body.payload,
        signals,
        quality: body.quality.clamp(0.0, 1.0),
        sample_size: body.sample_size,
        source_url: clean_text(body.source_url),
    }
}

/// Trims the text and treats empty as absent.
fn clean_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Trims entries, drops empties, and deduplicates case-insensitively while
/// preserving first-seen order and casing.
fn clean_list(entries: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .filter(|e| seen.insert(e.to_lowercase()))
        .collect()
}
