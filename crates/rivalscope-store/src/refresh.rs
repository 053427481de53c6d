//! Refresh coordination: freshness check, single-flight fetch, record.
//!
//! At most one fetch per (entity, scan type) key is in flight process-wide.
//! Concurrent callers for the same key queue on a per-key guard and are
//! handed the winner's result from cache; callers for different keys never
//! block each other. The guard is held only for the duration of one fetch
//! and is never taken across unrelated store operations.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rivalscope_core::{ScanObservation, ScanRecord, ScanType, TtlPolicy};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::entities::EntityDirectory;
use crate::error::RefreshError;
use crate::scans::ScanStore;

type ScanKey = (Uuid, ScanType);

/// Whether `ensure_fresh` served from cache or ran a live fetch. Change
/// detection only makes sense after a genuine fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Served an already-fresh record; no fetch ran on this call's behalf.
    Hit,
    /// This call (or the in-flight fetch it queued on) recorded new data.
    Fetched,
}

#[derive(Debug, Clone)]
pub struct Refreshed {
    pub record: ScanRecord,
    pub outcome: RefreshOutcome,
}

pub struct RefreshCoordinator {
    directory: Arc<EntityDirectory>,
    scans: Arc<ScanStore>,
    ttl_policy: TtlPolicy,
    in_flight: Mutex<HashMap<ScanKey, Arc<Mutex<()>>>>,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(
        directory: Arc<EntityDirectory>,
        scans: Arc<ScanStore>,
        ttl_policy: TtlPolicy,
    ) -> Self {
        Self {
            directory,
            scans,
            ttl_policy,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Serves a fresh scan for the key, fetching at most once.
    ///
    /// Fast path: a fresh record returns immediately with no locking beyond
    /// the store read. Slow path: the caller takes the key's guard, re-checks
    /// freshness (the previous guard holder may have already refreshed), and
    /// only then invokes `fetcher`, bounded by `timeout`.
    ///
    /// On failure the existing record, stale or not, is left untouched and
    /// remains servable through the store's `last_known` accessor.
    ///
    /// # Errors
    ///
    /// - [`RefreshError::Store`] if the entity is unknown.
    /// - [`RefreshError::Timeout`] if `fetcher` exceeded `timeout`; the key's
    ///   guard is released so a later caller may retry.
    /// - [`RefreshError::FetchFailed`] for a fetcher error.
    pub async fn ensure_fresh<F, Fut, E>(
        &self,
        entity_id: Uuid,
        scan_type: ScanType,
        timeout: Duration,
        fetcher: F,
    ) -> Result<Refreshed, RefreshError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ScanObservation, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if let Some(record) = self.scans.get_fresh(entity_id, scan_type).await {
            return Ok(Refreshed {
                record,
                outcome: RefreshOutcome::Hit,
            });
        }

        // Reject unknown entities before queueing on the key guard.
        self.directory.get(entity_id).await?;

        let guard = self.key_guard(entity_id, scan_type).await;
        let _held = guard.lock().await;

        // Double-check: the guard holder ahead of us may have refreshed.
        if let Some(record) = self.scans.get_fresh(entity_id, scan_type).await {
            return Ok(Refreshed {
                record,
                outcome: RefreshOutcome::Fetched,
            });
        }

        let observation = match tokio::time::timeout(timeout, fetcher()).await {
            Ok(Ok(observation)) => observation,
            Ok(Err(e)) => {
                tracing::warn!(
                    entity = %entity_id,
                    scan_type = %scan_type,
                    error = %e,
                    "refresh: fetch failed; keeping prior record"
                );
                return Err(RefreshError::FetchFailed(e));
            }
            Err(_) => {
                tracing::warn!(
                    entity = %entity_id,
                    scan_type = %scan_type,
                    timeout = ?timeout,
                    "refresh: fetch timed out; releasing in-flight slot"
                );
                return Err(RefreshError::Timeout(timeout));
            }
        };

        let ttl = self.ttl_policy.ttl_for(scan_type);
        let record = self
            .scans
            .record(entity_id, scan_type, observation, ttl)
            .await?;
        let sources = self.scans.source_count(entity_id).await;
        self.directory
            .note_scan(entity_id, record.scanned_at, sources)
            .await?;

        tracing::info!(
            entity = %entity_id,
            scan_type = %scan_type,
            quality = record.quality,
            "refresh: recorded new scan"
        );
        Ok(Refreshed {
            record,
            outcome: RefreshOutcome::Fetched,
        })
    }

    async fn key_guard(&self, entity_id: Uuid, scan_type: ScanType) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        Arc::clone(
            in_flight
                .entry((entity_id, scan_type))
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}
