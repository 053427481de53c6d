//! TTL-cached scan results, keyed by (entity, scan type).
//!
//! Upsert semantics: the latest scan supersedes the prior as "current", and
//! the superseded record is retained so the change detector can compare
//! against it. Records are never deleted; they expire logically.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use rivalscope_core::{ScanObservation, ScanRecord, ScanType};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

type ScanKey = (Uuid, ScanType);

struct ScanSlot {
    current: ScanRecord,
    previous: Option<ScanRecord>,
}

#[derive(Default)]
pub struct ScanStore {
    inner: RwLock<HashMap<ScanKey, ScanSlot>>,
}

impl ScanStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current record for the key only if it is fresh
    /// (`now < expires_at` and not explicitly marked stale), bumping its
    /// access statistics on the hit.
    pub async fn get_fresh(&self, entity_id: Uuid, scan_type: ScanType) -> Option<ScanRecord> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let slot = inner.get_mut(&(entity_id, scan_type))?;
        if !slot.current.is_fresh(now) {
            return None;
        }
        slot.current.access_count += 1;
        slot.current.last_accessed_at = Some(now);
        Some(slot.current.clone())
    }

    /// The current record regardless of freshness, for graceful
    /// degradation when a refresh fails. Does not touch access stats.
    pub async fn last_known(&self, entity_id: Uuid, scan_type: ScanType) -> Option<ScanRecord> {
        self.inner
            .read()
            .await
            .get(&(entity_id, scan_type))
            .map(|slot| slot.current.clone())
    }

    /// Records a new observation as the current scan for the key. The
    /// superseded record (if any) is retained as `previous`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTtl`] for a zero TTL, which would
    /// violate `expires_at > scanned_at`.
    pub async fn record(
        &self,
        entity_id: Uuid,
        scan_type: ScanType,
        observation: ScanObservation,
        ttl: Duration,
    ) -> Result<ScanRecord, StoreError> {
        if ttl.is_zero() {
            return Err(StoreError::InvalidTtl);
        }
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(ttl).map_err(|_| StoreError::InvalidTtl)?;

        let record = ScanRecord {
            id: Uuid::new_v4(),
            entity_id,
            scan_type,
            payload: observation.payload,
            signals: observation.signals,
            quality: observation.quality.clamp(0.0, 1.0),
            sample_size: observation.sample_size,
            scanned_at: now,
            expires_at,
            is_stale: false,
            access_count: 0,
            last_accessed_at: None,
            source_url: observation.source_url,
        };

        let mut inner = self.inner.write().await;
        match inner.entry((entity_id, scan_type)) {
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                let slot = slot.get_mut();
                slot.previous = Some(std::mem::replace(&mut slot.current, record.clone()));
            }
            std::collections::hash_map::Entry::Vacant(vacant) => {
                vacant.insert(ScanSlot {
                    current: record.clone(),
                    previous: None,
                });
            }
        }
        tracing::debug!(entity = %entity_id, scan_type = %scan_type, "scan store: recorded scan");
        Ok(record)
    }

    /// The (current, previous) pair for change detection. Ordered by
    /// `scanned_at`: `previous` is always the record the current one
    /// superseded, never anything newer.
    pub async fn current_and_previous(
        &self,
        entity_id: Uuid,
        scan_type: ScanType,
    ) -> Option<(ScanRecord, Option<ScanRecord>)> {
        self.inner
            .read()
            .await
            .get(&(entity_id, scan_type))
            .map(|slot| (slot.current.clone(), slot.previous.clone()))
    }

    /// Forces the staleness override on the current record for the key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEntity`] when the key has no record.
    pub async fn mark_stale(&self, entity_id: Uuid, scan_type: ScanType) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .get_mut(&(entity_id, scan_type))
            .ok_or(StoreError::UnknownEntity(entity_id))?;
        slot.current.is_stale = true;
        Ok(())
    }

    /// Number of distinct scan types with any recorded data for the
    /// entity; feeds the directory's confidence recompute.
    pub async fn source_count(&self, entity_id: Uuid) -> usize {
        self.inner
            .read()
            .await
            .keys()
            .filter(|(id, _)| *id == entity_id)
            .count()
    }
}
