//! In-process shared state for the competitor-intelligence cache: the
//! entity directory, the TTL scan cache with single-flight refresh, and the
//! tenant-scoped link/gap/alert stores.

pub mod alerts;
pub mod entities;
pub mod error;
pub mod gaps;
pub mod refresh;
pub mod scans;
pub mod tenants;

use std::sync::Arc;

use rivalscope_core::{NormalizeError, TtlPolicy};
use uuid::Uuid;

pub use alerts::AlertStore;
pub use entities::{ClassificationHint, EntityDirectory, Resolution};
pub use error::{RefreshError, StoreError};
pub use gaps::GapStore;
pub use refresh::{RefreshCoordinator, RefreshOutcome, Refreshed};
pub use scans::ScanStore;
pub use tenants::{LinkUpdate, TenantLinkStore};

/// The full cache state, wired together. One per process.
pub struct IntelStore {
    directory: Arc<EntityDirectory>,
    scans: Arc<ScanStore>,
    links: TenantLinkStore,
    gaps: GapStore,
    alerts: AlertStore,
    coordinator: RefreshCoordinator,
}

impl IntelStore {
    #[must_use]
    pub fn new(ttl_policy: TtlPolicy) -> Self {
        let directory = Arc::new(EntityDirectory::new());
        let scans = Arc::new(ScanStore::new());
        let coordinator =
            RefreshCoordinator::new(Arc::clone(&directory), Arc::clone(&scans), ttl_policy);
        Self {
            directory,
            scans,
            links: TenantLinkStore::new(),
            gaps: GapStore::new(),
            alerts: AlertStore::new(),
            coordinator,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &EntityDirectory {
        &self.directory
    }

    #[must_use]
    pub fn scans(&self) -> &ScanStore {
        &self.scans
    }

    #[must_use]
    pub fn links(&self) -> &TenantLinkStore {
        &self.links
    }

    #[must_use]
    pub fn gaps(&self) -> &GapStore {
        &self.gaps
    }

    #[must_use]
    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    #[must_use]
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Resolves a tenant-reported competitor to a directory entity and
    /// records the tenant link. The directory side is atomic; the link
    /// side is idempotent per (tenant, entity).
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::NoIdentity`] when the URL carries no
    /// usable domain identity.
    pub async fn resolve_competitor(
        &self,
        tenant_id: Uuid,
        name: &str,
        url: &str,
        hint: &ClassificationHint,
    ) -> Result<Resolution, NormalizeError> {
        let resolution = self.directory.resolve(tenant_id, name, url, hint).await?;
        self.links
            .ensure_link(tenant_id, resolution.entity.id, name)
            .await;
        Ok(resolution)
    }

    /// Removes a competitor from a tenant's tracking: drops the link and
    /// the tenant's gaps and alerts for the entity. The shared entity and
    /// its scan records are deliberately left alone.
    pub async fn remove_competitor(&self, tenant_id: Uuid, entity_id: Uuid) -> bool {
        let removed = self.links.remove(tenant_id, entity_id).await;
        if removed {
            let gaps = self.gaps.remove_for_entity(tenant_id, entity_id).await;
            let alerts = self.alerts.remove_for_entity(tenant_id, entity_id).await;
            tracing::info!(
                tenant = %tenant_id,
                entity = %entity_id,
                gaps,
                alerts,
                "store: competitor untracked"
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_competitor_links_the_tenant() {
        let store = IntelStore::new(TtlPolicy::default());
        let tenant = Uuid::new_v4();
        let resolution = store
            .resolve_competitor(tenant, "Acme", "acme.com", &ClassificationHint::default())
            .await
            .unwrap();

        let links = store.links().list(tenant).await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].entity_id, resolution.entity.id);
    }

    #[tokio::test]
    async fn remove_competitor_never_cascades_into_shared_rows() {
        let store = IntelStore::new(TtlPolicy::default());
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let entity_id = store
            .resolve_competitor(tenant_a, "Acme", "acme.com", &ClassificationHint::default())
            .await
            .unwrap()
            .entity
            .id;
        store
            .resolve_competitor(tenant_b, "Acme", "acme.com", &ClassificationHint::default())
            .await
            .unwrap();

        assert!(store.remove_competitor(tenant_a, entity_id).await);

        // The shared entity survives with its usage history intact.
        let entity = store.directory().get(entity_id).await.unwrap();
        assert_eq!(entity.usage_count, 2);
        assert_eq!(store.links().tenants_tracking(entity_id).await, vec![tenant_b]);
    }
}
