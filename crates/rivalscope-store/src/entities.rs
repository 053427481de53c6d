//! Canonical directory of competitor entities.
//!
//! One row per normalized domain key, shared across every tenant. All
//! mutation goes through the get-or-create path or the refresh
//! coordinator's scan bookkeeping; nothing else writes entity rows.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rivalscope_core::{normalize_domain, Entity, NormalizeError};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

/// Confidence assigned to an entity known from a single validation source.
const BASE_CONFIDENCE: f64 = 0.5;
/// Per-corroborating-source confidence step.
const CORROBORATION_STEP: f64 = 0.1;
/// Automated sources alone never push confidence past this.
const MAX_AUTOMATED_CONFIDENCE: f64 = 0.9;

/// Classification hints a tenant may supply alongside a competitor.
#[derive(Debug, Clone, Default)]
pub struct ClassificationHint {
    pub industry: Option<String>,
    pub size_class: Option<String>,
    pub business_model: Option<String>,
}

#[derive(Default)]
struct DirectoryInner {
    by_id: HashMap<Uuid, Entity>,
    by_key: HashMap<String, Uuid>,
    /// Distinct tenants that have referenced each entity; `usage_count`
    /// is the size of this set.
    referencing_tenants: HashMap<Uuid, HashSet<Uuid>>,
}

/// The result of a get-or-create resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub entity: Entity,
    /// True when this call created the entity (first tenant to observe it).
    pub created: bool,
}

pub struct EntityDirectory {
    inner: RwLock<DirectoryInner>,
}

impl Default for EntityDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(DirectoryInner::default()),
        }
    }

    /// Get-or-create for the entity identified by `url`.
    ///
    /// Atomic under concurrent callers racing on the same key: the whole
    /// decision (lookup, create-or-increment, hint backfill) happens
    /// inside one write-lock critical section, so the loser of a race
    /// observes the winner's row and a correctly incremented counter.
    ///
    /// `usage_count` counts distinct tenants: a repeat resolve from an
    /// already-linked tenant returns the entity unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::NoIdentity`] when `url` carries no usable
    /// domain identity.
    pub async fn resolve(
        &self,
        tenant_id: Uuid,
        name: &str,
        url: &str,
        hint: &ClassificationHint,
    ) -> Result<Resolution, NormalizeError> {
        let key = normalize_domain(url)?;
        let now = Utc::now();

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        if let Some(&id) = inner.by_key.get(&key) {
            let newly_referencing = inner
                .referencing_tenants
                .entry(id)
                .or_default()
                .insert(tenant_id);
            let usage = inner.referencing_tenants[&id].len() as u64;
            let entity = inner
                .by_id
                .get_mut(&id)
                .expect("by_key and by_id are maintained together");
            if newly_referencing {
                entity.usage_count = usage;
                entity.updated_at = now;
            }
            backfill_hints(entity, hint, now);
            return Ok(Resolution {
                entity: entity.clone(),
                created: false,
            });
        }

        let id = Uuid::new_v4();
        let mut entity = Entity {
            id,
            identity_key: key.clone(),
            display_name: name.trim().to_string(),
            industry: None,
            size_class: None,
            business_model: None,
            usage_count: 1,
            scan_count: 0,
            last_scanned_at: None,
            data_confidence: BASE_CONFIDENCE,
            created_at: now,
            updated_at: now,
        };
        backfill_hints(&mut entity, hint, now);

        inner.by_key.insert(key, id);
        inner
            .referencing_tenants
            .entry(id)
            .or_default()
            .insert(tenant_id);
        inner.by_id.insert(id, entity.clone());

        tracing::info!(entity = %entity.identity_key, "directory: created entity");
        Ok(Resolution {
            entity,
            created: true,
        })
    }

    pub async fn get(&self, entity_id: Uuid) -> Result<Entity, StoreError> {
        self.inner
            .read()
            .await
            .by_id
            .get(&entity_id)
            .cloned()
            .ok_or(StoreError::UnknownEntity(entity_id))
    }

    pub async fn get_by_key(&self, identity_key: &str) -> Option<Entity> {
        let inner = self.inner.read().await;
        let id = inner.by_key.get(identity_key)?;
        inner.by_id.get(id).cloned()
    }

    /// Scan bookkeeping, called by the refresh coordinator after a
    /// successful `record`: bumps `scan_count`/`last_scanned_at` and
    /// recomputes `data_confidence` from the number of distinct scan
    /// types with recorded data.
    pub async fn note_scan(
        &self,
        entity_id: Uuid,
        scanned_at: DateTime<Utc>,
        corroborating_sources: usize,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let entity = inner
            .by_id
            .get_mut(&entity_id)
            .ok_or(StoreError::UnknownEntity(entity_id))?;
        entity.scan_count += 1;
        entity.last_scanned_at = Some(scanned_at);
        entity.data_confidence = confidence_for_sources(corroborating_sources);
        entity.updated_at = scanned_at;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Fill classification tags from a hint only where currently unknown;
/// established tags are never overwritten by later hints.
fn backfill_hints(entity: &mut Entity, hint: &ClassificationHint, now: DateTime<Utc>) {
    let mut changed = false;
    if entity.industry.is_none() && hint.industry.is_some() {
        entity.industry.clone_from(&hint.industry);
        changed = true;
    }
    if entity.size_class.is_none() && hint.size_class.is_some() {
        entity.size_class.clone_from(&hint.size_class);
        changed = true;
    }
    if entity.business_model.is_none() && hint.business_model.is_some() {
        entity.business_model.clone_from(&hint.business_model);
        changed = true;
    }
    if changed {
        entity.updated_at = now;
    }
}

#[allow(clippy::cast_precision_loss)]
fn confidence_for_sources(corroborating_sources: usize) -> f64 {
    if corroborating_sources == 0 {
        return BASE_CONFIDENCE;
    }
    (BASE_CONFIDENCE + CORROBORATION_STEP * (corroborating_sources - 1) as f64)
        .min(MAX_AUTOMATED_CONFIDENCE)
}
