//! The recurring evaluation cycle job.
//!
//! Each firing runs one full detection cycle over the configured brands.
//! The per-brand state store is shared across firings, so the quiet-cycle
//! streaks and advisory locks survive between intervals — an overlapping
//! firing serializes per brand instead of racing.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crisiswatch_engine::{run_cycle, BrandStateStore, CycleOutcome};

/// Register the recurring evaluation job using the configured cron
/// expression (`CRISISWATCH_EVALUATION_CRON`, every 15 minutes by default).
pub(super) async fn register_evaluation_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<crisiswatch_core::AppConfig>,
    detection: Arc<crisiswatch_core::DetectionConfig>,
    brands: Arc<Vec<crisiswatch_core::BrandConfig>>,
) -> Result<(), JobSchedulerError> {
    let cron = config.evaluation_cron.clone();
    let repo = Arc::new(crisiswatch_db::PgRepository::new(pool));
    let store = Arc::new(BrandStateStore::new());

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let repo = Arc::clone(&repo);
        let detection = Arc::clone(&detection);
        let brands = Arc::clone(&brands);
        let store = Arc::clone(&store);

        Box::pin(async move {
            tracing::info!(brand_count = brands.len(), "scheduler: starting evaluation cycle");
            let outcome = run_cycle(repo.as_ref(), &brands, &detection, &store, Utc::now()).await;
            report_outcome(&outcome);
            tracing::info!("scheduler: evaluation cycle complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered evaluation job");
    Ok(())
}

/// Log the cycle result. Opened and resolved alerts are the notifier
/// hook; severity-only escalations stay at info level so downstream
/// notification does not storm.
fn report_outcome(outcome: &CycleOutcome) {
    for alert in &outcome.opened {
        tracing::warn!(
            brand = %alert.brand,
            severity = alert.severity,
            alert_id = alert.id,
            description = %alert.description,
            "notifier: new crisis alert"
        );
    }
    for alert in &outcome.resolved {
        tracing::warn!(
            brand = %alert.brand,
            alert_id = alert.id,
            "notifier: crisis alert resolved"
        );
    }

    if !outcome.failed_brands.is_empty() {
        tracing::error!(
            failed = ?outcome.failed_brands,
            "scheduler: some brands failed and will retry next cycle"
        );
    }

    tracing::info!(
        evaluated = outcome.evaluated_brands,
        opened = outcome.opened.len(),
        escalated = outcome.escalated.len(),
        resolved = outcome.resolved.len(),
        influencers = outcome.influencers_updated,
        metrics = outcome.metrics_upserted,
        "scheduler: cycle outcome"
    );
}
