//! Postgres adapter for the engine's [`Repository`] trait.
//!
//! Thin delegation to the query modules with row-to-domain conversion;
//! every database failure maps to [`EngineError::Repository`] so the
//! engine treats the whole layer as one fallible collaborator.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crisiswatch_core::{
    CompetitiveMetric, CrisisAlert, Influencer, Mention, SentimentScore, WindowStats,
};
use crisiswatch_engine::{EngineError, NewAlert, PeriodAggregates, Repository};

use crate::DbError;

/// [`Repository`] backed by a Postgres pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn repo_err(e: DbError) -> EngineError {
    EngineError::Repository(e.to_string())
}

impl Repository for PgRepository {
    async fn fetch_new(
        &self,
        brand: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(Mention, Option<SentimentScore>)>, EngineError> {
        let rows = crate::mentions::fetch_new_scored(&self.pool, brand, since)
            .await
            .map_err(repo_err)?;
        Ok(rows
            .into_iter()
            .map(crate::mentions::MentionWithSentimentRow::into_pair)
            .collect())
    }

    async fn load_baseline_history(
        &self,
        brand: &str,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<WindowStats>, EngineError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = crate::window_stats::list_window_stats(&self.pool, brand, Some(before), limit)
            .await
            .map_err(repo_err)?;
        Ok(rows
            .into_iter()
            .map(crate::window_stats::WindowStatsRow::into_domain)
            .collect())
    }

    async fn store_window_stats(&self, stats: &WindowStats) -> Result<(), EngineError> {
        crate::window_stats::insert_window_stats(&self.pool, stats)
            .await
            .map_err(repo_err)
    }

    async fn active_alerts(&self, brand: &str) -> Result<Vec<CrisisAlert>, EngineError> {
        let rows = crate::alerts::list_active_alerts(&self.pool, brand)
            .await
            .map_err(repo_err)?;
        rows.into_iter()
            .map(|row| row.into_domain().map_err(repo_err))
            .collect()
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<CrisisAlert, EngineError> {
        let row = crate::alerts::insert_alert(
            &self.pool,
            &alert.brand,
            &alert.description,
            alert.severity,
            alert.detected_at,
        )
        .await
        .map_err(repo_err)?;
        row.into_domain().map_err(repo_err)
    }

    async fn update_alert(&self, alert: &CrisisAlert) -> Result<(), EngineError> {
        crate::alerts::update_alert(&self.pool, alert)
            .await
            .map_err(repo_err)
    }

    async fn load_influencer(
        &self,
        username: &str,
        platform: &str,
    ) -> Result<Option<Influencer>, EngineError> {
        let row = crate::influencers::get_influencer(&self.pool, username, platform)
            .await
            .map_err(repo_err)?;
        Ok(row.map(crate::influencers::InfluencerRow::into_domain))
    }

    async fn upsert_influencer(&self, influencer: &Influencer) -> Result<(), EngineError> {
        crate::influencers::upsert_influencer(&self.pool, influencer)
            .await
            .map_err(repo_err)
    }

    async fn load_period_aggregates(
        &self,
        brand: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PeriodAggregates, EngineError> {
        let row = crate::competitive::load_period_aggregates(&self.pool, brand, start, end)
            .await
            .map_err(repo_err)?;
        Ok(PeriodAggregates {
            mention_count: row.mention_count,
            mean_sentiment: row.mean_sentiment,
            total_engagement: row.total_engagement.unwrap_or(0),
        })
    }

    async fn upsert_competitive_metric(
        &self,
        metric: &CompetitiveMetric,
    ) -> Result<(), EngineError> {
        crate::competitive::upsert_competitive_metric(&self.pool, metric)
            .await
            .map_err(repo_err)
    }

    async fn load_watermark(&self, brand: &str) -> Result<Option<DateTime<Utc>>, EngineError> {
        crate::watermarks::load_watermark(&self.pool, brand)
            .await
            .map_err(repo_err)
    }

    async fn store_watermark(&self, brand: &str, at: DateTime<Utc>) -> Result<(), EngineError> {
        crate::watermarks::store_watermark(&self.pool, brand, at)
            .await
            .map_err(repo_err)
    }
}
