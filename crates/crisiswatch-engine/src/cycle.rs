//! One evaluation cycle across all configured brands.
//!
//! The cycle is batch-in, batch-out: it pulls each brand's new mentions
//! from the repository, runs aggregation → baseline → anomaly scoring →
//! alert lifecycle, then the influencer and competitive passes, and
//! returns an immutable [`CycleOutcome`]. Brands are processed with
//! bounded concurrency; per-brand failures are isolated and leave that
//! brand's watermark untouched so the batch is retried next cycle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crisiswatch_core::{BrandConfig, CrisisAlert, DetectionConfig, Mention, SentimentScore, TimeWindow};

use crate::aggregate::aggregate_window;
use crate::alerts::{apply_cycle_verdict, AlertChange};
use crate::anomaly::score_window;
use crate::baseline::BaselineState;
use crate::benchmark::run_benchmark;
use crate::error::EngineError;
use crate::influence::score_influencer;
use crate::repo::Repository;
use crate::state::BrandStateStore;

/// Immutable result batch of one evaluation cycle.
///
/// `opened` and `resolved` are the transitions downstream notifiers fire
/// on; `escalated` is exposed for dashboards but intentionally excluded
/// from notification to avoid storms.
#[derive(Debug, Default)]
pub struct CycleOutcome {
    pub evaluated_brands: usize,
    /// Brands whose work was abandoned this cycle; their watermarks were
    /// not advanced.
    pub failed_brands: Vec<String>,
    pub opened: Vec<CrisisAlert>,
    pub escalated: Vec<CrisisAlert>,
    pub resolved: Vec<CrisisAlert>,
    pub influencers_updated: usize,
    pub metrics_upserted: usize,
}

struct BrandCycleResult {
    change: AlertChange,
    influencers_updated: usize,
    metrics_upserted: usize,
}

/// Run one evaluation cycle over `brands` as of `now`.
///
/// Returns the merged outcome; individual brand failures are logged and
/// recorded in [`CycleOutcome::failed_brands`] rather than aborting the
/// batch.
pub async fn run_cycle<R: Repository>(
    repo: &R,
    brands: &[BrandConfig],
    config: &DetectionConfig,
    store: &BrandStateStore,
    now: DateTime<Utc>,
) -> CycleOutcome {
    let mut outcome = CycleOutcome {
        evaluated_brands: brands.len(),
        ..CycleOutcome::default()
    };

    let brand_futures: Vec<_> = brands
        .iter()
        .map(|brand| process_brand_named(repo, brand, config, store, now))
        .collect();
    let results: Vec<(String, Result<BrandCycleResult, EngineError>)> = stream::iter(brand_futures)
        .buffer_unordered(config.max_concurrent_brands)
        .collect()
        .await;

    for (brand, result) in results {
        match result {
            Ok(r) => {
                match r.change {
                    AlertChange::Opened(alert) => outcome.opened.push(alert),
                    AlertChange::Escalated(alert) => outcome.escalated.push(alert),
                    AlertChange::Resolved(alert) => outcome.resolved.push(alert),
                    AlertChange::Unchanged => {}
                }
                outcome.influencers_updated += r.influencers_updated;
                outcome.metrics_upserted += r.metrics_upserted;
            }
            Err(e) => {
                tracing::error!(brand = %brand, error = %e, "cycle: brand evaluation failed");
                outcome.failed_brands.push(brand);
            }
        }
    }

    outcome
}

/// Evaluate one brand and tag the result with the brand name for merging.
async fn process_brand_named<R: Repository>(
    repo: &R,
    brand: &BrandConfig,
    config: &DetectionConfig,
    store: &BrandStateStore,
    now: DateTime<Utc>,
) -> (String, Result<BrandCycleResult, EngineError>) {
    let result = process_brand(repo, brand, config, store, now).await;
    (brand.name.clone(), result)
}

/// Run the full pipeline for one brand. Holds the brand's advisory lock
/// for the duration, serializing against overlapping cycles.
async fn process_brand<R: Repository>(
    repo: &R,
    brand: &BrandConfig,
    config: &DetectionConfig,
    store: &BrandStateStore,
    now: DateTime<Utc>,
) -> Result<BrandCycleResult, EngineError> {
    let name = brand.name.as_str();
    let mut state = store.lock_brand(name).await;

    let watermark = repo.load_watermark(name).await?;
    let batch = repo.fetch_new(name, watermark).await?;

    let window = TimeWindow::ending_at(now, config.window_minutes);
    let stats = aggregate_window(name, window, &batch, config.negativity_cutoff);
    if stats.unscored_count > 0 {
        tracing::debug!(
            brand = name,
            unscored = stats.unscored_count,
            "mentions without sentiment excluded from aggregation"
        );
    }

    let history = repo
        .load_baseline_history(name, window.start, config.baseline_window_count)
        .await?;
    let baseline = BaselineState::from_history(config.baseline_window_count, history)
        .reading(config.min_baseline_windows);

    let verdict = score_window(&stats, &baseline, config);
    let change = apply_cycle_verdict(repo, name, verdict.as_ref(), &mut state, now, config).await?;

    repo.store_window_stats(&stats).await?;

    let influencers_updated = update_influencers(repo, &batch, now, config).await?;

    let mut metrics_upserted = 0;
    for competitor in &brand.competitors {
        run_benchmark(repo, name, competitor, window, config.epsilon).await?;
        metrics_upserted += 1;
    }

    // Advance the watermark only after every write for this brand
    // committed, so a failed cycle re-reads the same batch.
    if let Some(max_created) = batch.iter().map(|(m, _)| m.created_at).max() {
        repo.store_watermark(name, max_created).await?;
    }

    Ok(BrandCycleResult {
        change,
        influencers_updated,
        metrics_upserted,
    })
}

/// Score every account sighted in the batch. Accounts are keyed by
/// (username, platform); unscored mentions contribute nothing.
async fn update_influencers<R: Repository>(
    repo: &R,
    batch: &[(Mention, Option<SentimentScore>)],
    now: DateTime<Utc>,
    config: &DetectionConfig,
) -> Result<usize, EngineError> {
    let mut by_account: HashMap<(String, String), Vec<(Mention, SentimentScore)>> = HashMap::new();
    for (mention, score) in batch {
        let (Some(author), Some(score)) = (mention.author.as_ref(), score) else {
            continue;
        };
        by_account
            .entry((author.clone(), mention.source.platform().to_string()))
            .or_default()
            .push((mention.clone(), *score));
    }

    let mut updated = 0;
    for ((username, platform), sightings) in &by_account {
        if score_influencer(repo, username, platform, sightings, now, config)
            .await?
            .is_some()
        {
            updated += 1;
        }
    }
    Ok(updated)
}
