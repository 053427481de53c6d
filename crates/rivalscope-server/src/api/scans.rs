//! Manual sweep trigger for external schedulers.

use axum::{extract::State, Extension, Json};

use crate::middleware::RequestId;
use crate::sweep::{run_sweep, SweepSummary};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

pub(in crate::api) async fn trigger_sweep(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SweepSummary>>, ApiError> {
    tracing::info!("sweep: manual trigger");
    let summary = run_sweep(&state).await;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}
