//! The insight bundle: freshest scans, synthesized gaps, and open alerts
//! for one competitor, degrading gracefully when providers fail.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use rivalscope_core::{Alert, Gap, ScanRecord, ScanType};
use rivalscope_insights::synthesize;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::{RequestId, TenantId};
use crate::sweep::{fetch_scan_with_fallback, ScanFetch};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(in crate::api) struct InsightsData {
    entity_id: Uuid,
    display_name: String,
    identity_key: String,
    data_confidence: f64,
    /// `"ok"` or `"gathering"` while no scan data exists yet.
    status: &'static str,
    positioning: Option<String>,
    gaps: Vec<Gap>,
    alerts: Vec<Alert>,
    /// True when at least one scan type is being served stale because its
    /// refresh failed.
    degraded: bool,
    degraded_scan_types: Vec<ScanType>,
}

pub(in crate::api) async fn get_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Path(entity_id): Path<Uuid>,
) -> Result<Json<ApiResponse<InsightsData>>, ApiError> {
    if state.store.links().get(tenant_id, entity_id).await.is_none() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "competitor is not tracked by this tenant",
        ));
    }

    let mut records: Vec<ScanRecord> = Vec::new();
    let mut degraded_scan_types: Vec<ScanType> = Vec::new();
    for scan_type in ScanType::ALL {
        match fetch_scan_with_fallback(&state, entity_id, scan_type).await {
            ScanFetch::Fresh(record) => records.push(record),
            ScanFetch::Degraded(record) => {
                degraded_scan_types.push(scan_type);
                records.push(record);
            }
            ScanFetch::Unavailable => {}
        }
    }

    // Refetch after the refresh pass so counters and confidence are current.
    let entity = state
        .store
        .directory()
        .get(entity_id)
        .await
        .map_err(|_| ApiError::new(req_id.0.clone(), "not_found", "unknown competitor"))?;

    if records.is_empty() {
        // Nothing cached and the provider is down: not an error, the
        // directory entry simply has no intelligence yet.
        return Ok(Json(ApiResponse {
            data: InsightsData {
                entity_id: entity.id,
                display_name: entity.display_name,
                identity_key: entity.identity_key,
                data_confidence: entity.data_confidence,
                status: "gathering",
                positioning: None,
                gaps: Vec::new(),
                alerts: Vec::new(),
                degraded: false,
                degraded_scan_types: Vec::new(),
            },
            meta: ResponseMeta::new(req_id.0),
        }));
    }

    let correlation = state.uvp.correlation_for(tenant_id).await;
    let gaps = synthesize(tenant_id, &records, &correlation);
    state
        .store
        .gaps()
        .replace_for_entity(tenant_id, entity_id, gaps.clone())
        .await;

    let alerts = state.store.alerts().list_for_entity(tenant_id, entity_id).await;

    let positioning = records
        .iter()
        .find(|record| record.scan_type == ScanType::WebsiteContent)
        .and_then(|record| record.signals.positioning.clone());

    Ok(Json(ApiResponse {
        data: InsightsData {
            entity_id: entity.id,
            display_name: entity.display_name,
            identity_key: entity.identity_key,
            data_confidence: entity.data_confidence,
            status: "ok",
            positioning,
            gaps,
            alerts,
            degraded: !degraded_scan_types.is_empty(),
            degraded_scan_types,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Portfolio-wide gap view across every competitor the tenant tracks.
/// Cache-only: serves whatever is recorded (fresh or stale) and never
/// triggers fetches, so it stays cheap to poll.
pub(in crate::api) async fn list_portfolio_gaps(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> Result<Json<ApiResponse<Vec<Gap>>>, ApiError> {
    let links = state.store.links().list(tenant_id).await;

    let mut records: Vec<ScanRecord> = Vec::new();
    for link in links.iter().filter(|link| !link.dismissed) {
        for scan_type in ScanType::ALL {
            if let Some(record) = state.store.scans().last_known(link.entity_id, scan_type).await
            {
                records.push(record);
            }
        }
    }

    let correlation = state.uvp.correlation_for(tenant_id).await;
    let gaps = synthesize(tenant_id, &records, &correlation);

    Ok(Json(ApiResponse {
        data: gaps,
        meta: ResponseMeta::new(req_id.0),
    }))
}
