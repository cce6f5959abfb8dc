use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct InfluencerItem {
    pub username: String,
    pub platform: String,
    pub followers: i64,
    pub impact_score: f64,
    pub brand_affinity: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InfluencersQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_influencers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<InfluencersQuery>,
) -> Result<Json<ApiResponse<Vec<InfluencerItem>>>, ApiError> {
    let rows = crisiswatch_db::list_influencers(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| InfluencerItem {
            username: row.username,
            platform: row.platform,
            followers: row.followers,
            impact_score: row.impact_score,
            brand_affinity: row.brand_affinity,
            last_updated: row.last_updated,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
