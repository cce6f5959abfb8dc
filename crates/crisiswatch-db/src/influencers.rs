//! Database operations for the `influencers` table.
//!
//! Identity is the (username, platform) pair enforced by a unique
//! constraint; sightings update the row in place.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crisiswatch_core::Influencer;

use crate::DbError;

/// A row from the `influencers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InfluencerRow {
    pub id: i64,
    pub username: String,
    pub platform: String,
    pub followers: i64,
    pub impact_score: f64,
    pub brand_affinity: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl InfluencerRow {
    #[must_use]
    pub fn into_domain(self) -> Influencer {
        Influencer {
            username: self.username,
            platform: self.platform,
            followers: self.followers,
            impact_score: self.impact_score,
            brand_affinity: self.brand_affinity,
            last_updated: self.last_updated,
        }
    }
}

/// Load one influencer by (username, platform), or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_influencer(
    pool: &PgPool,
    username: &str,
    platform: &str,
) -> Result<Option<InfluencerRow>, DbError> {
    let row = sqlx::query_as::<_, InfluencerRow>(
        "SELECT id, username, platform, followers, impact_score, brand_affinity, last_updated \
         FROM influencers \
         WHERE username = $1 AND platform = $2",
    )
    .bind(username)
    .bind(platform)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert on first sighting, update in place on every subsequent one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_influencer(pool: &PgPool, influencer: &Influencer) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO influencers \
           (username, platform, followers, impact_score, brand_affinity, last_updated) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (username, platform) DO UPDATE SET \
           followers = EXCLUDED.followers, \
           impact_score = EXCLUDED.impact_score, \
           brand_affinity = EXCLUDED.brand_affinity, \
           last_updated = EXCLUDED.last_updated",
    )
    .bind(&influencer.username)
    .bind(&influencer.platform)
    .bind(influencer.followers)
    .bind(influencer.impact_score)
    .bind(&influencer.brand_affinity)
    .bind(influencer.last_updated)
    .execute(pool)
    .await?;

    Ok(())
}

/// List influencers ordered by impact, highest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_influencers(pool: &PgPool, limit: i64) -> Result<Vec<InfluencerRow>, DbError> {
    let rows = sqlx::query_as::<_, InfluencerRow>(
        "SELECT id, username, platform, followers, impact_score, brand_affinity, last_updated \
         FROM influencers \
         ORDER BY impact_score DESC, followers DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
