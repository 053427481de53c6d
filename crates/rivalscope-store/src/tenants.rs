//! Tenant-scoped links from locally-named competitors to shared entities.

use std::collections::HashMap;

use chrono::Utc;
use rivalscope_core::TenantLink;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

/// Partial update for a link's tenant-local overrides. `None` fields keep
/// the existing value.
#[derive(Debug, Clone, Default)]
pub struct LinkUpdate {
    pub custom_name: Option<String>,
    pub pinned: Option<bool>,
    pub dismissed: Option<bool>,
}

#[derive(Default)]
pub struct TenantLinkStore {
    inner: RwLock<HashMap<(Uuid, Uuid), TenantLink>>,
}

impl TenantLinkStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the (tenant, entity) link on first observation; later calls
    /// return the existing link untouched.
    pub async fn ensure_link(&self, tenant_id: Uuid, entity_id: Uuid, label: &str) -> TenantLink {
        let mut inner = self.inner.write().await;
        inner
            .entry((tenant_id, entity_id))
            .or_insert_with(|| TenantLink {
                id: Uuid::new_v4(),
                tenant_id,
                entity_id,
                label: label.trim().to_string(),
                custom_name: None,
                pinned: false,
                dismissed: false,
                created_at: Utc::now(),
            })
            .clone()
    }

    pub async fn get(&self, tenant_id: Uuid, entity_id: Uuid) -> Option<TenantLink> {
        self.inner
            .read()
            .await
            .get(&(tenant_id, entity_id))
            .cloned()
    }

    /// All links for one tenant, pinned first, then by label.
    pub async fn list(&self, tenant_id: Uuid) -> Vec<TenantLink> {
        let mut links: Vec<TenantLink> = self
            .inner
            .read()
            .await
            .values()
            .filter(|link| link.tenant_id == tenant_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| a.label.cmp(&b.label))
        });
        links
    }

    /// Applies tenant-local overrides. These never touch the shared entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LinkNotFound`] when the tenant does not track
    /// the entity.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        entity_id: Uuid,
        update: LinkUpdate,
    ) -> Result<TenantLink, StoreError> {
        let mut inner = self.inner.write().await;
        let link = inner
            .get_mut(&(tenant_id, entity_id))
            .ok_or(StoreError::LinkNotFound {
                tenant_id,
                entity_id,
            })?;
        if let Some(custom_name) = update.custom_name {
            link.custom_name = Some(custom_name);
        }
        if let Some(pinned) = update.pinned {
            link.pinned = pinned;
        }
        if let Some(dismissed) = update.dismissed {
            link.dismissed = dismissed;
        }
        Ok(link.clone())
    }

    /// Removes the tenant's link. Returns false when no link existed.
    /// Never cascades into the shared entity or its scans.
    pub async fn remove(&self, tenant_id: Uuid, entity_id: Uuid) -> bool {
        self.inner
            .write()
            .await
            .remove(&(tenant_id, entity_id))
            .is_some()
    }

    /// Distinct entities tracked by at least one tenant, for the sweep.
    /// Links a tenant has dismissed do not keep an entity in the sweep set
    /// on their own.
    pub async fn tracked_entities(&self) -> Vec<Uuid> {
        let inner = self.inner.read().await;
        let mut ids: Vec<Uuid> = inner
            .values()
            .filter(|link| !link.dismissed)
            .map(|link| link.entity_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Tenants tracking the given entity, for alert fan-out.
    pub async fn tenants_tracking(&self, entity_id: Uuid) -> Vec<Uuid> {
        let inner = self.inner.read().await;
        let mut ids: Vec<Uuid> = inner
            .values()
            .filter(|link| link.entity_id == entity_id && !link.dismissed)
            .map(|link| link.tenant_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
