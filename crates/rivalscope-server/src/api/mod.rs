mod alerts;
mod competitors;
mod insights;
mod scans;
mod uvp;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use rivalscope_core::AppConfig;
use rivalscope_providers::ScanProvider;
use rivalscope_store::IntelStore;
use serde::Serialize;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, require_tenant, AuthState,
    RateLimitState, RequestId,
};
use crate::uvp::UvpRegistry;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<IntelStore>,
    pub provider: Arc<dyn ScanProvider>,
    pub uvp: Arc<UvpRegistry>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    tracked_entities: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" | "no_identity" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("x-tenant-id"),
        ])
}

fn tenant_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/competitors",
            get(competitors::list_competitors).post(competitors::resolve_competitor),
        )
        .route(
            "/api/v1/competitors/{entity_id}",
            axum::routing::patch(competitors::update_competitor)
                .delete(competitors::remove_competitor),
        )
        .route(
            "/api/v1/competitors/{entity_id}/insights",
            get(insights::get_insights),
        )
        .route("/api/v1/gaps", get(insights::list_portfolio_gaps))
        .route("/api/v1/alerts", get(alerts::list_alerts))
        .route("/api/v1/alerts/{alert_id}/read", post(alerts::mark_read))
        .route(
            "/api/v1/alerts/{alert_id}/dismiss",
            post(alerts::dismiss_alert),
        )
        .route("/api/v1/uvp", put(uvp::put_uvp))
        .layer(axum::middleware::from_fn(require_tenant))
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/scans/sweep", post(scans::trigger_sweep))
        .merge(tenant_router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let tracked_entities = state.store.directory().len().await;

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                tracked_entities,
            },
            meta,
        }),
    )
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{state_with_provider, StaticProvider};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(state: AppState) -> Router {
        let auth = AuthState::from_env(true).expect("auth");
        build_app(state, auth, default_rate_limit_state())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    #[test]
    fn api_error_no_identity_maps_to_bad_request() {
        let response = ApiError::new("req-1", "no_identity", "unusable url").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "nope").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_is_public_and_reports_directory_size() {
        let state = state_with_provider(StaticProvider::healthy());
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["tracked_entities"], 0);
    }

    #[tokio::test]
    async fn tenant_routes_reject_missing_tenant_header() {
        let state = state_with_provider(StaticProvider::healthy());
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/competitors")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "missing_tenant");
    }

    #[tokio::test]
    async fn resolve_rejects_unusable_url_with_no_identity() {
        let state = state_with_provider(StaticProvider::healthy());
        let tenant = Uuid::new_v4();
        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/competitors")
                    .header("content-type", "application/json")
                    .header("x-tenant-id", tenant.to_string())
                    .body(Body::from(
                        serde_json::json!({"name": "Mystery", "url": "not a url"}).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "no_identity");
    }

    #[tokio::test]
    async fn resolve_then_list_round_trips() {
        let state = state_with_provider(StaticProvider::healthy());
        let app = app(state);
        let tenant = Uuid::new_v4();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/competitors")
                    .header("content-type", "application/json")
                    .header("x-tenant-id", tenant.to_string())
                    .body(Body::from(
                        serde_json::json!({"name": "Acme", "url": "https://www.acme.com/"})
                            .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["data"]["identity_key"], "acme.com");
        assert_eq!(created["data"]["created"], true);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/competitors")
                    .header("x-tenant-id", tenant.to_string())
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        let items = listed["data"].as_array().expect("data array");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["label"], "Acme");
        assert_eq!(items[0]["identity_key"], "acme.com");
    }

    #[tokio::test]
    async fn insights_for_untracked_competitor_is_404() {
        let state = state_with_provider(StaticProvider::healthy());
        let tenant = Uuid::new_v4();
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri(format!(
                        "/api/v1/competitors/{}/insights",
                        Uuid::new_v4()
                    ))
                    .header("x-tenant-id", tenant.to_string())
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sweep_endpoint_reports_summary() {
        let state = state_with_provider(StaticProvider::healthy());
        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/scans/sweep")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["entities"], 0);
    }
}
