//! Tenant UVP claims: the correlation input consumed by gap synthesis.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::{RequestId, TenantId};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct PutUvpBody {
    claims: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct UvpStoredItem {
    stored_claims: usize,
}

pub(in crate::api) async fn put_uvp(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(body): Json<PutUvpBody>,
) -> Result<Json<ApiResponse<UvpStoredItem>>, ApiError> {
    let stored_claims = state.uvp.set_claims(tenant_id, body.claims).await;

    Ok(Json(ApiResponse {
        data: UvpStoredItem { stored_claims },
        meta: ResponseMeta::new(req_id.0),
    }))
}
