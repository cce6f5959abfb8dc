use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

/// Current and historical window statistics for charting. "No data"
/// windows keep their statistics as `null` rather than zero.
#[derive(Debug, Serialize)]
pub(super) struct WindowStatsItem {
    pub brand: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub mention_count: i64,
    pub mean_compound: Option<f64>,
    pub negative_fraction: Option<f64>,
    pub total_engagement: i64,
    pub unscored_count: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct WindowStatsQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_window_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(brand): Path<String>,
    Query(query): Query<WindowStatsQuery>,
) -> Result<Json<ApiResponse<Vec<WindowStatsItem>>>, ApiError> {
    let rows =
        crisiswatch_db::list_window_stats(&state.pool, &brand, None, normalize_limit(query.limit))
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| WindowStatsItem {
            brand: row.brand,
            window_start: row.window_start,
            window_end: row.window_end,
            mention_count: row.mention_count,
            mean_compound: row.mean_compound,
            negative_fraction: row.negative_fraction,
            total_engagement: row.total_engagement,
            unscored_count: row.unscored_count,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
