//! The storage boundary of the engine.
//!
//! A cycle receives an immutable input batch from the repository and
//! returns immutable results to it; the engine never holds references
//! into the storage layer. Production code implements this trait over
//! Postgres; tests implement it in memory.

use chrono::{DateTime, Utc};

use crisiswatch_core::{
    CompetitiveMetric, CrisisAlert, Influencer, Mention, SentimentScore, WindowStats,
};

use crate::error::EngineError;

/// Aggregates over one brand's mentions within a period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodAggregates {
    pub mention_count: i64,
    /// Mean compound sentiment over scored mentions; `None` when there
    /// were none.
    pub mean_sentiment: Option<f64>,
    pub total_engagement: i64,
}

/// Fields for a crisis alert about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub brand: String,
    pub description: String,
    pub severity: f64,
    pub detected_at: DateTime<Utc>,
}

/// Storage collaborator consumed by the engine.
///
/// Implementations are expected to be cheap to clone or share by
/// reference; all methods take `&self`. The engine provides its own
/// per-brand serialization (see [`crate::state::BrandStateStore`]) — the
/// repository needs no internal concurrency control beyond ordinary
/// connection safety.
#[allow(async_fn_in_trait)]
pub trait Repository {
    /// Mentions (with their sentiment score, when present) newer than the
    /// watermark for one brand, ordered by creation time.
    async fn fetch_new(
        &self,
        brand: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(Mention, Option<SentimentScore>)>, EngineError>;

    /// Up to `limit` most recent window stats for a brand whose window
    /// start is strictly before `before`, newest first. This is the
    /// baseline sample: it never includes the window under test.
    async fn load_baseline_history(
        &self,
        brand: &str,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<WindowStats>, EngineError>;

    /// Persist the stats for one brand window. Stats are never mutated
    /// after computation: if a record for the window already exists, the
    /// store keeps the first computation.
    async fn store_window_stats(&self, stats: &WindowStats) -> Result<(), EngineError>;

    /// All non-resolved alerts for a brand. More than one element is an
    /// invariant violation the caller must surface.
    async fn active_alerts(&self, brand: &str) -> Result<Vec<CrisisAlert>, EngineError>;

    async fn insert_alert(&self, alert: &NewAlert) -> Result<CrisisAlert, EngineError>;

    /// Persist an updated alert (escalation or resolution) by id.
    async fn update_alert(&self, alert: &CrisisAlert) -> Result<(), EngineError>;

    async fn load_influencer(
        &self,
        username: &str,
        platform: &str,
    ) -> Result<Option<Influencer>, EngineError>;

    /// Insert or update in place, keyed by (username, platform).
    async fn upsert_influencer(&self, influencer: &Influencer) -> Result<(), EngineError>;

    async fn load_period_aggregates(
        &self,
        brand: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PeriodAggregates, EngineError>;

    /// Insert or overwrite the metric for its (brand, competitor, period).
    async fn upsert_competitive_metric(
        &self,
        metric: &CompetitiveMetric,
    ) -> Result<(), EngineError>;

    async fn load_watermark(&self, brand: &str) -> Result<Option<DateTime<Utc>>, EngineError>;

    async fn store_watermark(&self, brand: &str, at: DateTime<Utc>) -> Result<(), EngineError>;
}
