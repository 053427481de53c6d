//! Tenant alert listing and read/dismiss lifecycle.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use rivalscope_core::Alert;
use rivalscope_store::StoreError;
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{RequestId, TenantId};

use super::competitors::map_store_error;
use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListAlertsQuery {
    #[serde(default)]
    include_dismissed: bool,
}

pub(in crate::api) async fn list_alerts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<ApiResponse<Vec<Alert>>>, ApiError> {
    let alerts = state
        .store
        .alerts()
        .list(tenant_id, query.include_dismissed)
        .await;

    Ok(Json(ApiResponse {
        data: alerts,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(in crate::api) async fn mark_read(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Path(alert_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Alert>>, ApiError> {
    let alert = state
        .store
        .alerts()
        .mark_read(tenant_id, alert_id)
        .await
        .map_err(|e| alert_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: alert,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(in crate::api) async fn dismiss_alert(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Path(alert_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Alert>>, ApiError> {
    let alert = state
        .store
        .alerts()
        .dismiss(tenant_id, alert_id)
        .await
        .map_err(|e| alert_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: alert,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn alert_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::AlertNotFound(_) => {
            ApiError::new(request_id, "not_found", "no such alert for this tenant")
        }
        other => map_store_error(request_id, other),
    }
}
