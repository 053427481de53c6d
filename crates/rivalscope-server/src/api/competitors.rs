//! Tenant-facing competitor tracking: resolve, list, override, untrack.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rivalscope_core::NormalizeError;
use rivalscope_store::{ClassificationHint, LinkUpdate, StoreError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::{RequestId, TenantId};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ResolveCompetitorBody {
    name: String,
    url: String,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    size_class: Option<String>,
    #[serde(default)]
    business_model: Option<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CompetitorResolvedItem {
    entity_id: Uuid,
    identity_key: String,
    created: bool,
    usage_count: u64,
    data_confidence: f64,
}

pub(in crate::api) async fn resolve_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(body): Json<ResolveCompetitorBody>,
) -> Result<(StatusCode, Json<ApiResponse<CompetitorResolvedItem>>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "competitor name must not be empty",
        ));
    }

    let hint = ClassificationHint {
        industry: body.industry,
        size_class: body.size_class,
        business_model: body.business_model,
    };

    let resolution = state
        .store
        .resolve_competitor(tenant_id, &body.name, &body.url, &hint)
        .await
        .map_err(|e| match e {
            NormalizeError::NoIdentity { .. } => ApiError::new(
                req_id.0.clone(),
                "no_identity",
                "could not derive a domain identity from the supplied URL; please supply the competitor's website",
            ),
        })?;

    let status = if resolution.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ApiResponse {
            data: CompetitorResolvedItem {
                entity_id: resolution.entity.id,
                identity_key: resolution.entity.identity_key,
                created: resolution.created,
                usage_count: resolution.entity.usage_count,
                data_confidence: resolution.entity.data_confidence,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CompetitorItem {
    entity_id: Uuid,
    label: String,
    custom_name: Option<String>,
    pinned: bool,
    dismissed: bool,
    identity_key: String,
    display_name: String,
    industry: Option<String>,
    usage_count: u64,
    data_confidence: f64,
    last_scanned_at: Option<DateTime<Utc>>,
    tracked_since: DateTime<Utc>,
}

pub(in crate::api) async fn list_competitors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> Result<Json<ApiResponse<Vec<CompetitorItem>>>, ApiError> {
    let links = state.store.links().list(tenant_id).await;

    let mut data = Vec::with_capacity(links.len());
    for link in links {
        // A link without its entity means the store is inconsistent; skip
        // the row rather than failing the whole listing.
        let Ok(entity) = state.store.directory().get(link.entity_id).await else {
            tracing::error!(entity = %link.entity_id, "list: link references missing entity");
            continue;
        };
        data.push(CompetitorItem {
            entity_id: entity.id,
            label: link.label,
            custom_name: link.custom_name,
            pinned: link.pinned,
            dismissed: link.dismissed,
            identity_key: entity.identity_key,
            display_name: entity.display_name,
            industry: entity.industry,
            usage_count: entity.usage_count,
            data_confidence: entity.data_confidence,
            last_scanned_at: entity.last_scanned_at,
            tracked_since: link.created_at,
        });
    }

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateCompetitorBody {
    #[serde(default)]
    custom_name: Option<String>,
    #[serde(default)]
    pinned: Option<bool>,
    #[serde(default)]
    dismissed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CompetitorLinkItem {
    entity_id: Uuid,
    custom_name: Option<String>,
    pinned: bool,
    dismissed: bool,
}

pub(in crate::api) async fn update_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Path(entity_id): Path<Uuid>,
    Json(body): Json<UpdateCompetitorBody>,
) -> Result<Json<ApiResponse<CompetitorLinkItem>>, ApiError> {
    let update = LinkUpdate {
        custom_name: body.custom_name,
        pinned: body.pinned,
        dismissed: body.dismissed,
    };

    let link = state
        .store
        .links()
        .update(tenant_id, entity_id, update)
        .await
        .map_err(|e| match e {
            StoreError::LinkNotFound { .. } => ApiError::new(
                req_id.0.clone(),
                "not_found",
                "competitor is not tracked by this tenant",
            ),
            other => map_store_error(req_id.0.clone(), &other),
        })?;

    Ok(Json(ApiResponse {
        data: CompetitorLinkItem {
            entity_id: link.entity_id,
            custom_name: link.custom_name,
            pinned: link.pinned,
            dismissed: link.dismissed,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CompetitorRemovedItem {
    entity_id: Uuid,
    removed: bool,
}

pub(in crate::api) async fn remove_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Path(entity_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CompetitorRemovedItem>>, ApiError> {
    if !state.store.remove_competitor(tenant_id, entity_id).await {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "competitor is not tracked by this tenant",
        ));
    }

    Ok(Json(ApiResponse {
        data: CompetitorRemovedItem {
            entity_id,
            removed: true,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(in crate::api) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    tracing::error!(error = %error, "store operation failed");
    ApiError::new(request_id, "internal_error", "store operation failed")
}
