//! Shared row types for the competitor-intelligence cache.
//!
//! Entities and scan records are cross-tenant shared infrastructure; tenant
//! links, gaps, and alerts are tenant-exclusive. The stores in
//! `rivalscope-store` own all mutation; these types are plain data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scan::{ExtractedSignals, ScanType};

/// A canonical, cross-tenant record of one real-world competitor, keyed by
/// normalized domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    /// Canonical domain key. Exactly one entity exists per key.
    pub identity_key: String,
    pub display_name: String,
    pub industry: Option<String>,
    pub size_class: Option<String>,
    pub business_model: Option<String>,
    /// Number of distinct tenants referencing this entity. Monotonically
    /// non-decreasing.
    pub usage_count: u64,
    pub scan_count: u64,
    pub last_scanned_at: Option<DateTime<Utc>>,
    /// How well independent sources corroborate this entity, in `[0, 1]`.
    pub data_confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One cached provider result for one (entity, scan type) key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub scan_type: ScanType,
    pub payload: serde_json::Value,
    pub signals: ExtractedSignals,
    /// Provider-reported quality in `[0, 1]`.
    pub quality: f64,
    pub sample_size: u32,
    pub scanned_at: DateTime<Utc>,
    /// Always strictly later than `scanned_at`.
    pub expires_at: DateTime<Utc>,
    /// Explicit staleness override, independent of the TTL.
    pub is_stale: bool,
    pub access_count: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub source_url: Option<String>,
}

impl ScanRecord {
    /// A scan is fresh if unexpired and not explicitly marked stale.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at && !self.is_stale
    }
}

/// A tenant's association to a shared directory entity, with tenant-local
/// overrides that never leak into the shared [`Entity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantLink {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub entity_id: Uuid,
    /// The competitor name as this tenant first reported it.
    pub label: String,
    pub custom_name: Option<String>,
    pub pinned: bool,
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    Feature,
    Messaging,
    Service,
    Pricing,
}

/// One evidence entry backing a gap: a verbatim quote tied to the scan it
/// came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub quote: String,
    pub scan_id: Uuid,
    pub scan_type: ScanType,
    pub source_url: Option<String>,
}

/// A synthesized, confidence-scored, evidence-backed competitive insight.
///
/// Invariant: `confidence` never exceeds the minimum quality of the
/// contributing scans unless at least two distinct scan types corroborate
/// the theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub entity_ids: Vec<Uuid>,
    pub kind: GapKind,
    pub observed_absence: String,
    pub observed_demand: String,
    pub suggested_angle: String,
    pub confidence: f64,
    /// Never empty: a theme without extractable evidence is dropped, not
    /// emitted with synthetic quotes.
    pub provenance: Vec<Provenance>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ClaimAdded,
    WeaknessResolved,
    ToneShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// The next severity up the ladder; saturates at `High`.
    #[must_use]
    pub fn escalate(self) -> Severity {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium | Severity::High => Severity::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Unread,
    Read,
    Dismissed,
}

/// A change-detector finding before it is fanned out to the tenants
/// tracking the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub entity_id: Uuid,
    pub kind: AlertKind,
    pub severity: Severity,
    pub description: String,
    pub evidence: Vec<String>,
    /// Deterministic for a given (entity, scan pair, kind, subject), so
    /// retried detection runs dedupe to nothing.
    pub fingerprint: String,
}

/// A tenant-scoped alert raised by the change detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub entity_id: Uuid,
    pub gap_id: Option<Uuid>,
    pub kind: AlertKind,
    pub severity: Severity,
    pub description: String,
    pub evidence: Vec<String>,
    pub fingerprint: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_in: i64, is_stale: bool) -> ScanRecord {
        let now = Utc::now();
        ScanRecord {
            id: Uuid::new_v4(),
            entity_id: Uuid::new_v4(),
            scan_type: ScanType::WebsiteContent,
            payload: serde_json::json!({}),
            signals: ExtractedSignals::default(),
            quality: 0.8,
            sample_size: 10,
            scanned_at: now - Duration::seconds(60),
            expires_at: now + Duration::seconds(expires_in),
            is_stale,
            access_count: 0,
            last_accessed_at: None,
            source_url: None,
        }
    }

    #[test]
    fn unexpired_unmarked_record_is_fresh() {
        assert!(record(300, false).is_fresh(Utc::now()));
    }

    #[test]
    fn expired_record_is_not_fresh() {
        assert!(!record(-1, false).is_fresh(Utc::now()));
    }

    #[test]
    fn stale_override_beats_future_expiry() {
        assert!(!record(300, true).is_fresh(Utc::now()));
    }

    #[test]
    fn severity_escalation_saturates() {
        assert_eq!(Severity::Low.escalate(), Severity::Medium);
        assert_eq!(Severity::Medium.escalate(), Severity::High);
        assert_eq!(Severity::High.escalate(), Severity::High);
    }

    #[test]
    fn severity_orders_low_to_high() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }
}
