//! Database operations for the `competitive_metrics` table and the
//! period-aggregate query backing the benchmarker.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crisiswatch_core::{CompetitiveMetric, TimeWindow};

use crate::DbError;

/// A row from the `competitive_metrics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompetitiveMetricRow {
    pub id: i64,
    pub brand: String,
    pub competitor: String,
    pub sentiment_ratio: Option<f64>,
    pub mention_count: i64,
    pub engagement_rate: Option<f64>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl CompetitiveMetricRow {
    #[must_use]
    pub fn into_domain(self) -> CompetitiveMetric {
        CompetitiveMetric {
            brand: self.brand,
            competitor: self.competitor,
            sentiment_ratio: self.sentiment_ratio,
            mention_count: self.mention_count,
            engagement_rate: self.engagement_rate,
            period: TimeWindow {
                start: self.period_start,
                end: self.period_end,
            },
        }
    }
}

/// Aggregates over a brand's scored mentions within `[start, end)`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PeriodAggregatesRow {
    pub mention_count: i64,
    pub mean_sentiment: Option<f64>,
    pub total_engagement: Option<i64>,
}

/// Mention count, mean compound sentiment, and total engagement for one
/// brand over a period. Only scored mentions are counted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn load_period_aggregates(
    pool: &PgPool,
    brand: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<PeriodAggregatesRow, DbError> {
    let row = sqlx::query_as::<_, PeriodAggregatesRow>(
        "SELECT COUNT(*) AS mention_count, \
                AVG(s.compound) AS mean_sentiment, \
                SUM(m.engagement)::bigint AS total_engagement \
         FROM mentions m \
         JOIN sentiment_scores s ON s.mention_id = m.id \
         WHERE m.brand = $1 AND m.created_at >= $2 AND m.created_at < $3",
    )
    .bind(brand)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Insert or overwrite the metric for its (brand, competitor, period).
/// Recomputation is idempotent, never additive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_competitive_metric(
    pool: &PgPool,
    metric: &CompetitiveMetric,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO competitive_metrics \
           (brand, competitor, sentiment_ratio, mention_count, engagement_rate, \
            period_start, period_end) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (brand, competitor, period_start, period_end) DO UPDATE SET \
           sentiment_ratio = EXCLUDED.sentiment_ratio, \
           mention_count = EXCLUDED.mention_count, \
           engagement_rate = EXCLUDED.engagement_rate",
    )
    .bind(&metric.brand)
    .bind(&metric.competitor)
    .bind(metric.sentiment_ratio)
    .bind(metric.mention_count)
    .bind(metric.engagement_rate)
    .bind(metric.period.start)
    .bind(metric.period.end)
    .execute(pool)
    .await?;

    Ok(())
}

/// List metrics, optionally filtered by brand, newest period first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_competitive_metrics(
    pool: &PgPool,
    brand: Option<&str>,
    limit: i64,
) -> Result<Vec<CompetitiveMetricRow>, DbError> {
    let rows = sqlx::query_as::<_, CompetitiveMetricRow>(
        "SELECT id, brand, competitor, sentiment_ratio, mention_count, engagement_rate, \
                period_start, period_end \
         FROM competitive_metrics \
         WHERE ($1::text IS NULL OR brand = $1) \
         ORDER BY period_end DESC, id DESC \
         LIMIT $2",
    )
    .bind(brand)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
