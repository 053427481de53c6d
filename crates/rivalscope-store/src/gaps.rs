//! Tenant-scoped storage for synthesized gaps.
//!
//! Gaps are regenerated per insight request; the store keeps the latest
//! synthesis per (tenant, entity) so removal and listing stay cheap.

use std::collections::HashMap;

use rivalscope_core::Gap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct GapStore {
    inner: RwLock<HashMap<Uuid, Vec<Gap>>>,
}

impl GapStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tenant's gaps that reference `entity_id` with the new
    /// synthesis output. Gaps referencing other entities are untouched.
    pub async fn replace_for_entity(&self, tenant_id: Uuid, entity_id: Uuid, gaps: Vec<Gap>) {
        let mut inner = self.inner.write().await;
        let tenant_gaps = inner.entry(tenant_id).or_default();
        tenant_gaps.retain(|gap| !gap.entity_ids.contains(&entity_id));
        tenant_gaps.extend(gaps);
    }

    /// The tenant's gaps referencing the entity, highest confidence first.
    pub async fn list_for_entity(&self, tenant_id: Uuid, entity_id: Uuid) -> Vec<Gap> {
        let inner = self.inner.read().await;
        let mut gaps: Vec<Gap> = inner
            .get(&tenant_id)
            .map(|gaps| {
                gaps.iter()
                    .filter(|gap| gap.entity_ids.contains(&entity_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        gaps.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        gaps
    }

    /// Drops the tenant's gaps referencing the entity, as part of removing
    /// a competitor from tracking. Shared rows are never touched.
    pub async fn remove_for_entity(&self, tenant_id: Uuid, entity_id: Uuid) -> usize {
        let mut inner = self.inner.write().await;
        let Some(tenant_gaps) = inner.get_mut(&tenant_id) else {
            return 0;
        };
        let before = tenant_gaps.len();
        tenant_gaps.retain(|gap| !gap.entity_ids.contains(&entity_id));
        before - tenant_gaps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rivalscope_core::{GapKind, Provenance, ScanType};

    fn gap(tenant_id: Uuid, entity_id: Uuid, confidence: f64) -> Gap {
        Gap {
            id: Uuid::new_v4(),
            tenant_id,
            entity_ids: vec![entity_id],
            kind: GapKind::Feature,
            observed_absence: "no self-serve onboarding".to_string(),
            observed_demand: "reviewers ask for instant setup".to_string(),
            suggested_angle: "lead with setup time".to_string(),
            confidence,
            provenance: vec![Provenance {
                quote: "setup took weeks".to_string(),
                scan_id: Uuid::new_v4(),
                scan_type: ScanType::Reviews,
                source_url: None,
            }],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn replace_swaps_only_the_entity_in_question() {
        let store = GapStore::new();
        let tenant = Uuid::new_v4();
        let entity_a = Uuid::new_v4();
        let entity_b = Uuid::new_v4();

        store
            .replace_for_entity(tenant, entity_a, vec![gap(tenant, entity_a, 0.6)])
            .await;
        store
            .replace_for_entity(tenant, entity_b, vec![gap(tenant, entity_b, 0.7)])
            .await;
        store
            .replace_for_entity(tenant, entity_a, vec![gap(tenant, entity_a, 0.9)])
            .await;

        let for_a = store.list_for_entity(tenant, entity_a).await;
        assert_eq!(for_a.len(), 1);
        assert!((for_a[0].confidence - 0.9).abs() < 1e-9);
        assert_eq!(store.list_for_entity(tenant, entity_b).await.len(), 1);
    }

    #[tokio::test]
    async fn list_orders_by_confidence_descending() {
        let store = GapStore::new();
        let tenant = Uuid::new_v4();
        let entity = Uuid::new_v4();
        store
            .replace_for_entity(
                tenant,
                entity,
                vec![gap(tenant, entity, 0.4), gap(tenant, entity, 0.8)],
            )
            .await;

        let gaps = store.list_for_entity(tenant, entity).await;
        assert!((gaps[0].confidence - 0.8).abs() < 1e-9);
        assert!((gaps[1].confidence - 0.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn remove_is_tenant_scoped() {
        let store = GapStore::new();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let entity = Uuid::new_v4();
        store
            .replace_for_entity(tenant_a, entity, vec![gap(tenant_a, entity, 0.5)])
            .await;
        store
            .replace_for_entity(tenant_b, entity, vec![gap(tenant_b, entity, 0.5)])
            .await;

        assert_eq!(store.remove_for_entity(tenant_a, entity).await, 1);
        assert!(store.list_for_entity(tenant_a, entity).await.is_empty());
        assert_eq!(store.list_for_entity(tenant_b, entity).await.len(), 1);
    }
}
