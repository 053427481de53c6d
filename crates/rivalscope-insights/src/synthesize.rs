//! Gap synthesis: turn the freshest scans across entities and scan types
//! into confidence-scored, evidence-backed insights.
//!
//! Themes come from competitor weaknesses; demand evidence comes from
//! claims and strengths that overlap the theme; the tenant's own UVP
//! claims supply the differentiating angle. Near-identical themes across
//! competitors merge into one gap instead of near-duplicate rows.

use chrono::Utc;
use rivalscope_core::{Gap, GapKind, Provenance, ScanRecord, ScanType};
use uuid::Uuid;

use crate::similarity::token_similarity;

/// Two weakness phrasings at or above this similarity are one theme.
const THEME_SIMILARITY_THRESHOLD: f64 = 0.5;
/// Claims/strengths at or above this similarity corroborate a theme.
const DEMAND_SIMILARITY_THRESHOLD: f64 = 0.2;
/// Minimum similarity for a UVP claim to be offered as the angle.
const ANGLE_SIMILARITY_THRESHOLD: f64 = 0.15;
/// Confidence bonus when two or more scan types corroborate a theme.
const CORROBORATION_BOOST: f64 = 0.1;

/// Tenant-side correlation input: the tenant's own value-proposition
/// claims, used to phrase the differentiating angle.
#[derive(Debug, Clone, Default)]
pub struct CorrelationData {
    pub uvp_claims: Vec<String>,
}

struct ThemeQuote {
    quote: String,
    scan_id: Uuid,
    scan_type: ScanType,
    source_url: Option<String>,
    entity_id: Uuid,
    quality: f64,
    sample_size: u32,
}

impl ThemeQuote {
    fn from_scan(quote: &str, scan: &ScanRecord) -> Self {
        Self {
            quote: quote.to_string(),
            scan_id: scan.id,
            scan_type: scan.scan_type,
            source_url: scan.source_url.clone(),
            entity_id: scan.entity_id,
            quality: scan.quality,
            sample_size: scan.sample_size,
        }
    }
}

struct ThemeGroup {
    representative: String,
    absences: Vec<ThemeQuote>,
}

/// Synthesizes gaps for one tenant from the given scans.
///
/// Scans should be the freshest available records across the requested
/// entities and scan types; partially stale input degrades confidence via
/// quality, it does not abort synthesis. A theme with no extractable
/// quotes yields nothing rather than a gap with synthetic evidence.
#[must_use]
pub fn synthesize(
    tenant_id: Uuid,
    scans: &[ScanRecord],
    correlation: &CorrelationData,
) -> Vec<Gap> {
    let mut groups: Vec<ThemeGroup> = Vec::new();
    for scan in scans {
        for weakness in &scan.signals.weaknesses {
            if let Some(group) = groups.iter_mut().find(|g| {
                token_similarity(&g.representative, weakness) >= THEME_SIMILARITY_THRESHOLD
            }) {
                group.absences.push(ThemeQuote::from_scan(weakness, scan));
            } else {
                groups.push(ThemeGroup {
                    representative: weakness.clone(),
                    absences: vec![ThemeQuote::from_scan(weakness, scan)],
                });
            }
        }
    }

    let mut gaps: Vec<Gap> = groups
        .into_iter()
        .filter_map(|group| build_gap(tenant_id, &group, scans, correlation))
        .collect();
    gaps.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    tracing::debug!(tenant = %tenant_id, gaps = gaps.len(), "synthesis complete");
    gaps
}

fn build_gap(
    tenant_id: Uuid,
    group: &ThemeGroup,
    scans: &[ScanRecord],
    correlation: &CorrelationData,
) -> Option<Gap> {
    let demand = demand_quotes(&group.representative, scans);

    let mut provenance: Vec<Provenance> = Vec::new();
    let mut contributors: Vec<&ThemeQuote> = Vec::new();
    for quote in group.absences.iter().chain(demand.iter()) {
        provenance.push(Provenance {
            quote: quote.quote.clone(),
            scan_id: quote.scan_id,
            scan_type: quote.scan_type,
            source_url: quote.source_url.clone(),
        });
        contributors.push(quote);
    }
    if provenance.is_empty() {
        return None;
    }

    let confidence = confidence_for(&contributors);

    let mut entity_ids: Vec<Uuid> = group.absences.iter().map(|q| q.entity_id).collect();
    entity_ids.sort_unstable();
    entity_ids.dedup();

    let observed_absence = if entity_ids.len() > 1 {
        format!(
            "{} tracked competitors show the same gap: {}",
            entity_ids.len(),
            group.representative
        )
    } else {
        group.representative.clone()
    };

    let observed_demand = if demand.is_empty() {
        format!(
            "No direct demand quotes yet; inferred from the weakness appearing in {} scan(s).",
            group.absences.len()
        )
    } else {
        demand
            .iter()
            .map(|q| q.quote.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    };

    Some(Gap {
        id: Uuid::new_v4(),
        tenant_id,
        entity_ids,
        kind: classify_theme(&group.representative),
        observed_absence,
        observed_demand,
        suggested_angle: suggest_angle(&group.representative, correlation),
        confidence,
        provenance,
        created_at: Utc::now(),
    })
}

/// Claims and strengths from any scan that overlap the theme: evidence
/// that the market cares about the missing capability.
fn demand_quotes(theme: &str, scans: &[ScanRecord]) -> Vec<ThemeQuote> {
    let mut quotes = Vec::new();
    for scan in scans {
        for text in scan
            .signals
            .claims
            .iter()
            .chain(scan.signals.strengths.iter())
        {
            if token_similarity(theme, text) >= DEMAND_SIMILARITY_THRESHOLD {
                quotes.push(ThemeQuote::from_scan(text, scan));
            }
        }
    }
    quotes
}

/// Confidence: sample-weighted average of contributing scan qualities.
/// A single contributing scan type caps the score at the weakest
/// contributor; corroboration across two or more types lifts that ceiling.
fn confidence_for(contributors: &[&ThemeQuote]) -> f64 {
    let mut distinct_types: Vec<ScanType> = contributors.iter().map(|q| q.scan_type).collect();
    distinct_types.sort_by_key(|t| t.as_str());
    distinct_types.dedup();

    let total_weight: f64 = contributors
        .iter()
        .map(|q| f64::from(q.sample_size.max(1)))
        .sum();
    let weighted_avg: f64 = contributors
        .iter()
        .map(|q| q.quality * f64::from(q.sample_size.max(1)))
        .sum::<f64>()
        / total_weight;
    let min_quality = contributors
        .iter()
        .map(|q| q.quality)
        .fold(f64::INFINITY, f64::min);

    if distinct_types.len() >= 2 {
        (weighted_avg + CORROBORATION_BOOST).min(1.0)
    } else {
        weighted_avg.min(min_quality)
    }
}

fn classify_theme(theme: &str) -> GapKind {
    const PRICING: &[&str] = &["price", "pricing", "cost", "costs", "expensive", "fee", "fees"];
    const SERVICE: &[&str] = &[
        "support",
        "service",
        "onboarding",
        "response",
        "help",
        "training",
        "chat",
    ];
    const MESSAGING: &[&str] = &[
        "brand",
        "message",
        "messaging",
        "tone",
        "positioning",
        "story",
        "voice",
    ];

    let lowered = theme.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lowered.contains(w));
    if has(PRICING) {
        GapKind::Pricing
    } else if has(SERVICE) {
        GapKind::Service
    } else if has(MESSAGING) {
        GapKind::Messaging
    } else {
        GapKind::Feature
    }
}

/// The tenant's best-matching UVP claim becomes the angle; with nothing on
/// file that fits, the theme itself is offered as ground to claim.
fn suggest_angle(theme: &str, correlation: &CorrelationData) -> String {
    let best = correlation
        .uvp_claims
        .iter()
        .map(|claim| (claim, token_similarity(theme, claim)))
        .filter(|(_, similarity)| *similarity >= ANGLE_SIMILARITY_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    match best {
        Some((claim, _)) => format!(
            "Lead with \"{claim}\"; the scanned competitors leave this need unanswered."
        ),
        None => format!(
            "No matching value proposition on file; consider claiming \"{theme}\" first."
        ),
    }
}
