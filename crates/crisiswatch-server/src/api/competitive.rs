use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

/// `sentiment_ratio` is `null` when the metric was recorded as undefined
/// (competitor silent in the period).
#[derive(Debug, Serialize)]
pub(super) struct CompetitiveMetricItem {
    pub brand: String,
    pub competitor: String,
    pub sentiment_ratio: Option<f64>,
    pub mention_count: i64,
    pub engagement_rate: Option<f64>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompetitiveQuery {
    pub brand: Option<String>,
    pub limit: Option<i64>,
}

pub(super) async fn list_competitive_metrics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CompetitiveQuery>,
) -> Result<Json<ApiResponse<Vec<CompetitiveMetricItem>>>, ApiError> {
    let rows = crisiswatch_db::list_competitive_metrics(
        &state.pool,
        query.brand.as_deref(),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| CompetitiveMetricItem {
            brand: row.brand,
            competitor: row.competitor,
            sentiment_ratio: row.sentiment_ratio,
            mention_count: row.mention_count,
            engagement_rate: row.engagement_rate,
            period_start: row.period_start,
            period_end: row.period_end,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
