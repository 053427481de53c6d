//! The refresh flow shared by interactive insight requests and the weekly
//! sweep: single-flight fetch through the coordinator, change detection on
//! genuinely new data, and graceful degradation to the last-known record.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rivalscope_core::{ScanRecord, ScanType};
use rivalscope_insights::detect_changes;
use rivalscope_store::{RefreshError, RefreshOutcome};
use serde::Serialize;
use uuid::Uuid;

use crate::api::AppState;

/// Outcome of one scan fetch attempt for the serving path.
#[derive(Debug, Clone)]
pub enum ScanFetch {
    /// Fresh data, served from cache or a successful fetch.
    Fresh(ScanRecord),
    /// The provider failed; this is the last-known (stale) record.
    Degraded(ScanRecord),
    /// The provider failed and nothing was ever cached for the key.
    Unavailable,
}

/// Ensures a fresh scan for the key, falling back to the last-known record
/// when the provider fails. When the call genuinely fetched new data, runs
/// change detection and fans alerts out to every tenant tracking the
/// entity.
pub async fn fetch_scan_with_fallback(
    state: &AppState,
    entity_id: Uuid,
    scan_type: ScanType,
) -> ScanFetch {
    let entity = match state.store.directory().get(entity_id).await {
        Ok(entity) => entity,
        Err(e) => {
            tracing::warn!(entity = %entity_id, error = %e, "refresh flow: unknown entity");
            return ScanFetch::Unavailable;
        }
    };

    let provider = Arc::clone(&state.provider);
    let identity = entity.identity_key.clone();
    let timeout = Duration::from_secs(state.config.fetch_timeout_secs);

    let result = state
        .store
        .coordinator()
        .ensure_fresh(entity_id, scan_type, timeout, move || async move {
            provider.fetch(&identity, scan_type).await
        })
        .await;

    match result {
        Ok(refreshed) => {
            if refreshed.outcome == RefreshOutcome::Fetched {
                detect_and_fan_out(state, entity_id, scan_type).await;
            }
            ScanFetch::Fresh(refreshed.record)
        }
        Err(RefreshError::Store(e)) => {
            tracing::warn!(entity = %entity_id, scan_type = %scan_type, error = %e, "refresh flow: store error");
            ScanFetch::Unavailable
        }
        Err(e) => {
            tracing::warn!(
                entity = %entity_id,
                scan_type = %scan_type,
                error = %e,
                "refresh flow: fetch failed; serving last-known if present"
            );
            match state.store.scans().last_known(entity_id, scan_type).await {
                Some(record) => ScanFetch::Degraded(record),
                None => ScanFetch::Unavailable,
            }
        }
    }
}

/// Compares the newly recorded scan against the record it superseded and
/// fans any alert drafts out to the tenants tracking the entity.
async fn detect_and_fan_out(state: &AppState, entity_id: Uuid, scan_type: ScanType) {
    let Ok(entity) = state.store.directory().get(entity_id).await else {
        return;
    };
    let Some((current, Some(previous))) = state
        .store
        .scans()
        .current_and_previous(entity_id, scan_type)
        .await
    else {
        return;
    };

    let drafts = detect_changes(&entity, &previous, &current);
    if drafts.is_empty() {
        return;
    }

    let tenants = state.store.links().tenants_tracking(entity_id).await;
    for tenant_id in tenants {
        state.store.alerts().insert_drafts(tenant_id, &drafts).await;
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct SweepSummary {
    pub entities: usize,
    pub fresh: usize,
    pub degraded: usize,
    pub unavailable: usize,
}

/// Proactively refreshes every scan type for every tracked entity,
/// bounded by the configured fan-out. Failures are isolated per key;
/// a dead provider degrades the sweep, it never aborts it.
pub async fn run_sweep(state: &AppState) -> SweepSummary {
    let entities = state.store.links().tracked_entities().await;
    let mut summary = SweepSummary {
        entities: entities.len(),
        ..SweepSummary::default()
    };
    if entities.is_empty() {
        tracing::info!("sweep: no tracked entities; skipping");
        return summary;
    }

    let keys: Vec<(Uuid, ScanType)> = entities
        .iter()
        .flat_map(|&entity_id| ScanType::ALL.map(|scan_type| (entity_id, scan_type)))
        .collect();

    let concurrency = state.config.sweep_max_concurrent.max(1);
    let results: Vec<ScanFetch> = futures::stream::iter(keys.into_iter().map(
        |(entity_id, scan_type)| {
            let state = state.clone();
            async move { fetch_scan_with_fallback(&state, entity_id, scan_type).await }
        },
    ))
    .buffer_unordered(concurrency)
    .collect()
    .await;

    for result in results {
        match result {
            ScanFetch::Fresh(_) => summary.fresh += 1,
            ScanFetch::Degraded(_) => summary.degraded += 1,
            ScanFetch::Unavailable => summary.unavailable += 1,
        }
    }

    tracing::info!(
        entities = summary.entities,
        fresh = summary.fresh,
        degraded = summary.degraded,
        unavailable = summary.unavailable,
        "sweep complete"
    );
    summary
}
