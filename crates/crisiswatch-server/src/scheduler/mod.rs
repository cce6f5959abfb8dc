//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring evaluation cycle.

mod evaluation;

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Registers the evaluation cycle job and starts the scheduler. Returns
/// the running [`JobScheduler`] handle, which must be kept alive for the
/// lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<crisiswatch_core::AppConfig>,
    detection: Arc<crisiswatch_core::DetectionConfig>,
    brands: Arc<Vec<crisiswatch_core::BrandConfig>>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    evaluation::register_evaluation_job(&scheduler, pool, config, detection, brands).await?;

    scheduler.start().await?;
    Ok(scheduler)
}
