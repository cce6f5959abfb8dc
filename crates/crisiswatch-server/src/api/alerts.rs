use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crisiswatch_core::AlertStatus;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct AlertItem {
    pub id: i64,
    pub brand: String,
    pub description: String,
    pub severity: f64,
    pub detected_at: DateTime<Utc>,
    pub status: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
}

impl From<crisiswatch_db::CrisisAlertRow> for AlertItem {
    fn from(row: crisiswatch_db::CrisisAlertRow) -> Self {
        Self {
            id: row.id,
            brand: row.brand,
            description: row.description,
            severity: row.severity,
            detected_at: row.detected_at,
            status: row.status,
            resolved_at: row.resolved_at,
            resolution_notes: row.resolution_notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AlertsQuery {
    pub brand: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ActiveAlertsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ResolveBody {
    pub notes: Option<String>,
}

pub(super) async fn list_alerts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<ApiResponse<Vec<AlertItem>>>, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(raw.parse::<AlertStatus>().map_err(|e| {
            ApiError::new(req_id.0.clone(), "validation_error", e)
        })?),
        None => None,
    };

    let rows = crisiswatch_db::list_alerts(
        &state.pool,
        query.brand.as_deref(),
        status,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(AlertItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_active_alerts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ActiveAlertsQuery>,
) -> Result<Json<ApiResponse<Vec<AlertItem>>>, ApiError> {
    let rows = crisiswatch_db::list_all_active_alerts(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(AlertItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Operator action: promote a `new` alert to `investigating`. The
/// automatic evaluation loop never performs this transition.
pub(super) async fn acknowledge_alert(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(alert_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    crisiswatch_db::acknowledge_alert(&state.pool, alert_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "id": alert_id, "status": "investigating" }),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Operator action: resolve an active alert with optional notes.
pub(super) async fn resolve_alert(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(alert_id): Path<i64>,
    body: Option<Json<ResolveBody>>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let notes = body.and_then(|Json(b)| b.notes);

    crisiswatch_db::resolve_alert(&state.pool, alert_id, Utc::now(), notes.as_deref())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "id": alert_id, "status": "resolved" }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
