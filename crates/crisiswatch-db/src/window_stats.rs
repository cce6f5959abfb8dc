//! Database operations for the `window_stats` table.
//!
//! Persisted window statistics serve two consumers: the baseline
//! estimator (the K most recent windows before the one under test) and
//! the dashboard charting endpoints.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crisiswatch_core::{TimeWindow, WindowStats};

use crate::DbError;

/// A row from the `window_stats` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WindowStatsRow {
    pub id: i64,
    pub brand: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub mention_count: i64,
    pub mean_compound: Option<f64>,
    pub negative_fraction: Option<f64>,
    pub total_engagement: i64,
    pub unscored_count: i64,
    pub created_at: DateTime<Utc>,
}

impl WindowStatsRow {
    #[must_use]
    pub fn into_domain(self) -> WindowStats {
        WindowStats {
            brand: self.brand,
            window: TimeWindow {
                start: self.window_start,
                end: self.window_end,
            },
            mention_count: self.mention_count,
            mean_compound: self.mean_compound,
            negative_fraction: self.negative_fraction,
            total_engagement: self.total_engagement,
            unscored_count: self.unscored_count,
        }
    }
}

/// Insert the stats for one (brand, window start).
///
/// Window statistics are never mutated after computation: a conflicting
/// insert (an overlapping cycle re-evaluating the same window from an
/// already-advanced watermark) is a no-op, so the first computation wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_window_stats(pool: &PgPool, stats: &WindowStats) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO window_stats \
           (brand, window_start, window_end, mention_count, mean_compound, \
            negative_fraction, total_engagement, unscored_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (brand, window_start) DO NOTHING",
    )
    .bind(&stats.brand)
    .bind(stats.window.start)
    .bind(stats.window.end)
    .bind(stats.mention_count)
    .bind(stats.mean_compound)
    .bind(stats.negative_fraction)
    .bind(stats.total_engagement)
    .bind(stats.unscored_count)
    .execute(pool)
    .await?;

    Ok(())
}

/// Up to `limit` most recent windows for a brand starting strictly before
/// `before`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_window_stats(
    pool: &PgPool,
    brand: &str,
    before: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<WindowStatsRow>, DbError> {
    let rows = sqlx::query_as::<_, WindowStatsRow>(
        "SELECT id, brand, window_start, window_end, mention_count, mean_compound, \
                negative_fraction, total_engagement, unscored_count, created_at \
         FROM window_stats \
         WHERE brand = $1 AND ($2::timestamptz IS NULL OR window_start < $2) \
         ORDER BY window_start DESC \
         LIMIT $3",
    )
    .bind(brand)
    .bind(before)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
