//! Change detection between successive scans of the same key.
//!
//! Pure over its inputs: the same (entity, previous, current) triple always
//! yields the same drafts with the same fingerprints, so a retried run
//! dedupes to nothing at the alert store.

use rivalscope_core::{AlertDraft, AlertKind, Entity, ScanRecord, Severity};
use uuid::Uuid;

use crate::tone::tone_score;

/// Minimum tone delta that counts as a messaging shift.
const TONE_SHIFT_THRESHOLD: f32 = 0.3;
/// Tone delta considered a major repositioning.
const TONE_SHIFT_MAJOR: f32 = 0.6;
/// Entities referenced by this many tenants escalate alert severity.
const WIDELY_TRACKED_USAGE: u64 = 5;
/// This many changed claims in one scan counts as a major shift.
const MANY_CLAIMS: usize = 3;

/// Compares the current scan against the record it superseded and drafts
/// alerts for significant deltas.
///
/// The comparison only runs forward in time and only within one
/// (entity, scan type) key; anything else returns no drafts.
#[must_use]
pub fn detect_changes(
    entity: &Entity,
    previous: &ScanRecord,
    current: &ScanRecord,
) -> Vec<AlertDraft> {
    if previous.entity_id != current.entity_id
        || previous.scan_type != current.scan_type
        || previous.scanned_at > current.scanned_at
    {
        return Vec::new();
    }

    let mut drafts = Vec::new();

    let new_claims = missing_from(&current.signals.claims, &previous.signals.claims);
    if !new_claims.is_empty() {
        let severity = severity_for(
            Severity::Low,
            new_claims.len() >= MANY_CLAIMS,
            entity.usage_count,
        );
        drafts.push(AlertDraft {
            entity_id: entity.id,
            kind: AlertKind::ClaimAdded,
            severity,
            description: format!(
                "{} started making {} new claim(s) in its {} scan",
                entity.display_name,
                new_claims.len(),
                current.scan_type
            ),
            evidence: new_claims,
            fingerprint: fingerprint(entity.id, previous.id, current.id, "claim_added"),
        });
    }

    let resolved = missing_from(&previous.signals.weaknesses, &current.signals.weaknesses);
    if !resolved.is_empty() {
        let severity = severity_for(
            Severity::Medium,
            resolved.len() >= MANY_CLAIMS,
            entity.usage_count,
        );
        drafts.push(AlertDraft {
            entity_id: entity.id,
            kind: AlertKind::WeaknessResolved,
            severity,
            description: format!(
                "{} no longer shows {} previously observed weakness(es)",
                entity.display_name,
                resolved.len()
            ),
            evidence: resolved,
            fingerprint: fingerprint(entity.id, previous.id, current.id, "weakness_resolved"),
        });
    }

    if let (Some(before), Some(after)) = (
        previous.signals.positioning.as_deref(),
        current.signals.positioning.as_deref(),
    ) {
        let delta = tone_score(after) - tone_score(before);
        if delta.abs() >= TONE_SHIFT_THRESHOLD {
            let direction = if delta > 0.0 {
                "more assertive"
            } else {
                "more hedged"
            };
            let severity = severity_for(
                Severity::Low,
                delta.abs() >= TONE_SHIFT_MAJOR,
                entity.usage_count,
            );
            drafts.push(AlertDraft {
                entity_id: entity.id,
                kind: AlertKind::ToneShift,
                severity,
                description: format!(
                    "{} repositioned its messaging ({direction})",
                    entity.display_name
                ),
                evidence: vec![before.to_string(), after.to_string()],
                fingerprint: fingerprint(entity.id, previous.id, current.id, "tone_shift"),
            });
        }
    }

    drafts
}

/// Entries of `haystack` absent from `reference`, case-insensitively,
/// preserving order.
fn missing_from(haystack: &[String], reference: &[String]) -> Vec<String> {
    let known: std::collections::HashSet<String> =
        reference.iter().map(|s| s.to_lowercase()).collect();
    haystack
        .iter()
        .filter(|entry| !known.contains(&entry.to_lowercase()))
        .cloned()
        .collect()
}

/// Base severity per kind, bumped once for a large magnitude and once for
/// a widely tracked entity (more tenants affected).
fn severity_for(base: Severity, major_magnitude: bool, usage_count: u64) -> Severity {
    let mut severity = base;
    if major_magnitude {
        severity = severity.escalate();
    }
    if usage_count >= WIDELY_TRACKED_USAGE {
        severity = severity.escalate();
    }
    severity
}

fn fingerprint(entity_id: Uuid, previous_id: Uuid, current_id: Uuid, kind: &str) -> String {
    format!("{entity_id}:{previous_id}:{current_id}:{kind}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rivalscope_core::{ExtractedSignals, ScanType};

    fn entity(usage_count: u64) -> Entity {
        let now = Utc::now();
        Entity {
            id: Uuid::new_v4(),
            identity_key: "acme.com".to_string(),
            display_name: "Acme".to_string(),
            industry: None,
            size_class: None,
            business_model: None,
            usage_count,
            scan_count: 2,
            last_scanned_at: Some(now),
            data_confidence: 0.6,
            created_at: now,
            updated_at: now,
        }
    }

    fn scan_pair(
        entity: &Entity,
        before: ExtractedSignals,
        after: ExtractedSignals,
    ) -> (ScanRecord, ScanRecord) {
        let now = Utc::now();
        let base = ScanRecord {
            id: Uuid::new_v4(),
            entity_id: entity.id,
            scan_type: ScanType::WebsiteContent,
            payload: serde_json::json!({}),
            signals: before,
            quality: 0.8,
            sample_size: 10,
            scanned_at: now - Duration::days(7),
            expires_at: now - Duration::days(6),
            is_stale: false,
            access_count: 0,
            last_accessed_at: None,
            source_url: None,
        };
        let current = ScanRecord {
            id: Uuid::new_v4(),
            signals: after,
            scanned_at: now,
            expires_at: now + Duration::days(7),
            ..base.clone()
        };
        (base, current)
    }

    fn with_claims(claims: &[&str]) -> ExtractedSignals {
        ExtractedSignals {
            claims: claims.iter().map(|c| (*c).to_string()).collect(),
            ..ExtractedSignals::default()
        }
    }

    #[test]
    fn identical_scans_raise_nothing() {
        let entity = entity(1);
        let signals = with_claims(&["99.9% uptime"]);
        let (previous, current) = scan_pair(&entity, signals.clone(), signals);
        assert!(detect_changes(&entity, &previous, &current).is_empty());
    }

    #[test]
    fn new_claim_raises_claim_added_with_evidence() {
        let entity = entity(1);
        let (previous, current) = scan_pair(
            &entity,
            with_claims(&["99.9% uptime"]),
            with_claims(&["99.9% uptime", "fastest onboarding in the market"]),
        );
        let drafts = detect_changes(&entity, &previous, &current);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, AlertKind::ClaimAdded);
        assert_eq!(drafts[0].severity, Severity::Low);
        assert_eq!(
            drafts[0].evidence,
            vec!["fastest onboarding in the market".to_string()]
        );
    }

    #[test]
    fn rerun_on_same_pair_is_byte_identical() {
        let entity = entity(2);
        let (previous, current) = scan_pair(
            &entity,
            with_claims(&["99.9% uptime"]),
            with_claims(&["99.9% uptime", "soc2 certified"]),
        );
        let first = detect_changes(&entity, &previous, &current);
        let second = detect_changes(&entity, &previous, &current);
        assert_eq!(first, second, "detection must be idempotent per scan pair");
    }

    #[test]
    fn resolved_weakness_raises_medium() {
        let entity = entity(1);
        let before = ExtractedSignals {
            weaknesses: vec!["no mobile app".to_string()],
            ..ExtractedSignals::default()
        };
        let (previous, current) = scan_pair(&entity, before, ExtractedSignals::default());
        let drafts = detect_changes(&entity, &previous, &current);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, AlertKind::WeaknessResolved);
        assert_eq!(drafts[0].severity, Severity::Medium);
        assert_eq!(drafts[0].evidence, vec!["no mobile app".to_string()]);
    }

    #[test]
    fn tone_shift_requires_threshold_delta() {
        let entity = entity(1);
        let before = ExtractedSignals {
            positioning: Some("a simple affordable helper for small teams".to_string()),
            ..ExtractedSignals::default()
        };
        let after = ExtractedSignals {
            positioning: Some("the unmatched dominant leader, guaranteed".to_string()),
            ..ExtractedSignals::default()
        };
        let (previous, current) = scan_pair(&entity, before, after);
        let drafts = detect_changes(&entity, &previous, &current);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, AlertKind::ToneShift);
        // Delta well past the major threshold escalates low -> medium.
        assert_eq!(drafts[0].severity, Severity::Medium);
        assert!(drafts[0].description.contains("more assertive"));
    }

    #[test]
    fn small_tone_wobble_is_ignored() {
        let entity = entity(1);
        let before = ExtractedSignals {
            positioning: Some("analytics for revenue teams".to_string()),
            ..ExtractedSignals::default()
        };
        let after = ExtractedSignals {
            positioning: Some("revenue analytics for go-to-market teams".to_string()),
            ..ExtractedSignals::default()
        };
        let (previous, current) = scan_pair(&entity, before, after);
        assert!(detect_changes(&entity, &previous, &current).is_empty());
    }

    #[test]
    fn widely_tracked_entity_escalates_severity() {
        let entity = entity(WIDELY_TRACKED_USAGE);
        let (previous, current) = scan_pair(
            &entity,
            with_claims(&[]),
            with_claims(&["fastest onboarding"]),
        );
        let drafts = detect_changes(&entity, &previous, &current);
        assert_eq!(drafts[0].severity, Severity::Medium);
    }

    #[test]
    fn many_new_claims_and_wide_tracking_reach_high() {
        let entity = entity(WIDELY_TRACKED_USAGE);
        let (previous, current) = scan_pair(
            &entity,
            with_claims(&[]),
            with_claims(&["claim one", "claim two", "claim three"]),
        );
        let drafts = detect_changes(&entity, &previous, &current);
        assert_eq!(drafts[0].severity, Severity::High);
    }

    #[test]
    fn never_compares_against_a_newer_previous() {
        let entity = entity(1);
        let (previous, current) = scan_pair(
            &entity,
            with_claims(&["99.9% uptime"]),
            with_claims(&["99.9% uptime", "soc2 certified"]),
        );
        // Swap the pair: "previous" is now newer than "current".
        assert!(detect_changes(&entity, &current, &previous).is_empty());
    }

    #[test]
    fn mismatched_keys_are_refused() {
        let entity = entity(1);
        let (previous, mut current) = scan_pair(
            &entity,
            with_claims(&[]),
            with_claims(&["fastest onboarding"]),
        );
        current.scan_type = ScanType::Reviews;
        assert!(detect_changes(&entity, &previous, &current).is_empty());
    }
}
