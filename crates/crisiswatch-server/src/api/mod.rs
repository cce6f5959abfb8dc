mod alerts;
mod competitive;
mod influencers;
mod stats;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
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
    database: &'static str,
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
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &crisiswatch_db::DbError) -> ApiError {
    if let crisiswatch_db::DbError::InvalidAlertTransition { .. } = error {
        return ApiError::new(request_id, "conflict", error.to_string());
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/alerts", get(alerts::list_alerts))
        .route("/api/v1/alerts/active", get(alerts::list_active_alerts))
        .route(
            "/api/v1/alerts/{alert_id}/acknowledge",
            post(alerts::acknowledge_alert),
        )
        .route(
            "/api/v1/alerts/{alert_id}/resolve",
            post(alerts::resolve_alert),
        )
        .route(
            "/api/v1/brands/{brand}/window-stats",
            get(stats::list_window_stats),
        )
        .route("/api/v1/influencers", get(influencers::list_influencers))
        .route(
            "/api/v1/competitive",
            get(competitive::list_competitive_metrics),
        )
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

    match crisiswatch_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::alerts::AlertItem;
    use super::competitive::CompetitiveMetricItem;
    use super::stats::WindowStatsItem;
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use tower::ServiceExt;

    #[test]
    fn alert_item_is_serializable() {
        // Proves the type compiles and serde works — no DB needed.
        let item = AlertItem {
            id: 3,
            brand: "Apple".to_string(),
            description: "Potential brand crisis: negativity spike".to_string(),
            severity: 0.92,
            detected_at: Utc::now(),
            status: "new".to_string(),
            resolved_at: None,
            resolution_notes: None,
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(json.contains("\"brand\":\"Apple\""));
        assert!(json.contains("\"status\":\"new\""));
    }

    #[test]
    fn window_stats_item_keeps_null_for_no_data() {
        let item = WindowStatsItem {
            brand: "Apple".to_string(),
            window_start: Utc::now(),
            window_end: Utc::now(),
            mention_count: 0,
            mean_compound: None,
            negative_fraction: None,
            total_engagement: 0,
            unscored_count: 2,
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(json.contains("\"mean_compound\":null"));
    }

    #[test]
    fn competitive_item_keeps_null_for_undefined_ratio() {
        let item = CompetitiveMetricItem {
            brand: "Apple".to_string(),
            competitor: "Samsung".to_string(),
            sentiment_ratio: None,
            mention_count: 12,
            engagement_rate: Some(3.5),
            period_start: Utc::now(),
            period_end: Utc::now(),
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(json.contains("\"sentiment_ratio\":null"));
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_conflict_maps_to_409() {
        let response = ApiError::new("req-1", "conflict", "already resolved").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_transition_maps_to_conflict() {
        let err = crisiswatch_db::DbError::InvalidAlertTransition {
            id: 4,
            expected_status: "new",
        };
        let api_err = map_db_error("req-2".to_string(), &err);
        assert_eq!(api_err.error.code, "conflict");
    }

    // -------------------------------------------------------------------------
    // Route integration tests (with DB)
    // -------------------------------------------------------------------------

    async fn seed_alert(pool: &sqlx::PgPool, brand: &str, status: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO crisis_alerts (brand, description, severity, detected_at, status) \
             VALUES ($1, 'Potential brand crisis: negativity spike', 0.9, NOW(), $2) \
             RETURNING id",
        )
        .bind(brand)
        .bind(status)
        .fetch_one(pool)
        .await
        .expect("seed alert")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn alerts_list_returns_seeded_alert(pool: sqlx::PgPool) {
        seed_alert(&pool, "alerts-list-brand", "new").await;

        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(AppState { pool }, auth, default_rate_limit_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/alerts?brand=alerts-list-brand")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["brand"].as_str(), Some("alerts-list-brand"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn acknowledge_promotes_new_alert(pool: sqlx::PgPool) {
        let id = seed_alert(&pool, "ack-brand", "new").await;

        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(
            AppState { pool: pool.clone() },
            auth,
            default_rate_limit_state(),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/alerts/{id}/acknowledge"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let status: String =
            sqlx::query_scalar("SELECT status FROM crisis_alerts WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await
                .expect("status query");
        assert_eq!(status, "investigating");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn resolving_twice_returns_conflict(pool: sqlx::PgPool) {
        let id = seed_alert(&pool, "resolve-brand", "investigating").await;

        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(
            AppState { pool: pool.clone() },
            auth,
            default_rate_limit_state(),
        );

        let request = || {
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/alerts/{id}/resolve"))
                .header("content-type", "application/json")
                .body(Body::from("{\"notes\":\"sentiment recovered\"}"))
                .expect("request")
        };

        let first = app.clone().oneshot(request()).await.expect("response");
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.expect("response");
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }
}
