//! Tenant-scoped change alerts with fingerprint deduplication.
//!
//! The change detector may legitimately run twice over the same scan pair
//! (interactive request racing the weekly sweep); the store refuses
//! duplicate fingerprints so retries insert nothing.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rivalscope_core::{Alert, AlertDraft, AlertStatus};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Default)]
struct TenantAlerts {
    alerts: Vec<Alert>,
    seen_fingerprints: HashSet<String>,
}

#[derive(Default)]
pub struct AlertStore {
    inner: RwLock<HashMap<Uuid, TenantAlerts>>,
}

impl AlertStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts drafts for one tenant, skipping any whose fingerprint was
    /// already recorded. Returns the number actually inserted.
    pub async fn insert_drafts(&self, tenant_id: Uuid, drafts: &[AlertDraft]) -> usize {
        let mut inner = self.inner.write().await;
        let tenant_alerts = inner.entry(tenant_id).or_default();
        let mut inserted = 0;
        for draft in drafts {
            if !tenant_alerts
                .seen_fingerprints
                .insert(draft.fingerprint.clone())
            {
                continue;
            }
            tenant_alerts.alerts.push(Alert {
                id: Uuid::new_v4(),
                tenant_id,
                entity_id: draft.entity_id,
                gap_id: None,
                kind: draft.kind,
                severity: draft.severity,
                description: draft.description.clone(),
                evidence: draft.evidence.clone(),
                fingerprint: draft.fingerprint.clone(),
                status: AlertStatus::Unread,
                created_at: Utc::now(),
            });
            inserted += 1;
        }
        if inserted > 0 {
            tracing::info!(tenant = %tenant_id, inserted, "alert store: new alerts");
        }
        inserted
    }

    /// The tenant's alerts, newest first. Dismissed alerts are excluded
    /// unless `include_dismissed` is set.
    pub async fn list(&self, tenant_id: Uuid, include_dismissed: bool) -> Vec<Alert> {
        let inner = self.inner.read().await;
        let mut alerts: Vec<Alert> = inner
            .get(&tenant_id)
            .map(|tenant_alerts| {
                tenant_alerts
                    .alerts
                    .iter()
                    .filter(|alert| include_dismissed || alert.status != AlertStatus::Dismissed)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts
    }

    /// Alerts for one entity, for the insight bundle.
    pub async fn list_for_entity(&self, tenant_id: Uuid, entity_id: Uuid) -> Vec<Alert> {
        self.list(tenant_id, false)
            .await
            .into_iter()
            .filter(|alert| alert.entity_id == entity_id)
            .collect()
    }

    /// Marks an alert read.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlertNotFound`] if the tenant has no such alert.
    pub async fn mark_read(&self, tenant_id: Uuid, alert_id: Uuid) -> Result<Alert, StoreError> {
        self.set_status(tenant_id, alert_id, AlertStatus::Read).await
    }

    /// Dismisses an alert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlertNotFound`] if the tenant has no such alert.
    pub async fn dismiss(&self, tenant_id: Uuid, alert_id: Uuid) -> Result<Alert, StoreError> {
        self.set_status(tenant_id, alert_id, AlertStatus::Dismissed)
            .await
    }

    async fn set_status(
        &self,
        tenant_id: Uuid,
        alert_id: Uuid,
        status: AlertStatus,
    ) -> Result<Alert, StoreError> {
        let mut inner = self.inner.write().await;
        let alert = inner
            .get_mut(&tenant_id)
            .and_then(|tenant_alerts| {
                tenant_alerts
                    .alerts
                    .iter_mut()
                    .find(|alert| alert.id == alert_id)
            })
            .ok_or(StoreError::AlertNotFound(alert_id))?;
        alert.status = status;
        Ok(alert.clone())
    }

    /// Drops the tenant's alerts for an entity when tracking is removed.
    /// Fingerprints for that entity are forgotten too, so re-tracking
    /// later starts a clean alert history.
    pub async fn remove_for_entity(&self, tenant_id: Uuid, entity_id: Uuid) -> usize {
        let mut inner = self.inner.write().await;
        let Some(tenant_alerts) = inner.get_mut(&tenant_id) else {
            return 0;
        };
        let dropped: Vec<String> = tenant_alerts
            .alerts
            .iter()
            .filter(|alert| alert.entity_id == entity_id)
            .map(|alert| alert.fingerprint.clone())
            .collect();
        tenant_alerts.alerts.retain(|alert| alert.entity_id != entity_id);
        for fingerprint in &dropped {
            tenant_alerts.seen_fingerprints.remove(fingerprint);
        }
        dropped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivalscope_core::{AlertKind, Severity};

    fn draft(entity_id: Uuid, fingerprint: &str) -> AlertDraft {
        AlertDraft {
            entity_id,
            kind: AlertKind::ClaimAdded,
            severity: Severity::Medium,
            description: "new claim: fastest onboarding".to_string(),
            evidence: vec!["fastest onboarding".to_string()],
            fingerprint: fingerprint.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_fingerprints_insert_nothing() {
        let store = AlertStore::new();
        let tenant = Uuid::new_v4();
        let entity = Uuid::new_v4();
        let drafts = vec![draft(entity, "fp-1"), draft(entity, "fp-2")];

        assert_eq!(store.insert_drafts(tenant, &drafts).await, 2);
        assert_eq!(store.insert_drafts(tenant, &drafts).await, 0);
        assert_eq!(store.list(tenant, false).await.len(), 2);
    }

    #[tokio::test]
    async fn dismiss_hides_from_default_listing() {
        let store = AlertStore::new();
        let tenant = Uuid::new_v4();
        let entity = Uuid::new_v4();
        store.insert_drafts(tenant, &[draft(entity, "fp-1")]).await;

        let alert_id = store.list(tenant, false).await[0].id;
        let dismissed = store.dismiss(tenant, alert_id).await.unwrap();
        assert_eq!(dismissed.status, AlertStatus::Dismissed);

        assert!(store.list(tenant, false).await.is_empty());
        assert_eq!(store.list(tenant, true).await.len(), 1);
    }

    #[tokio::test]
    async fn dismiss_is_tenant_scoped() {
        let store = AlertStore::new();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let entity = Uuid::new_v4();
        store
            .insert_drafts(tenant_a, &[draft(entity, "fp-1")])
            .await;
        let alert_id = store.list(tenant_a, false).await[0].id;

        let result = store.dismiss(tenant_b, alert_id).await;
        assert!(matches!(result, Err(StoreError::AlertNotFound(_))));
    }

    #[tokio::test]
    async fn remove_for_entity_forgets_fingerprints() {
        let store = AlertStore::new();
        let tenant = Uuid::new_v4();
        let entity = Uuid::new_v4();
        let drafts = [draft(entity, "fp-1")];

        store.insert_drafts(tenant, &drafts).await;
        assert_eq!(store.remove_for_entity(tenant, entity).await, 1);
        // After untracking, a re-track may raise the same alert again.
        assert_eq!(store.insert_drafts(tenant, &drafts).await, 1);
    }
}
