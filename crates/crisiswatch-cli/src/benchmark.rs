//! `benchmark` command: one competitive comparison on demand.

use chrono::Utc;

use crisiswatch_core::{DetectionConfig, TimeWindow};
use crisiswatch_engine::run_benchmark;

pub(crate) async fn run(brand: &str, competitor: &str, days: i64) -> anyhow::Result<()> {
    anyhow::ensure!(days > 0, "days must be positive");

    let config = crisiswatch_core::load_app_config()?;
    let detection = DetectionConfig::from_env()?;

    let pool_config = crisiswatch_db::PoolConfig::from_app_config(&config);
    let pool = crisiswatch_db::connect_pool(&config.database_url, pool_config).await?;
    crisiswatch_db::run_migrations(&pool).await?;

    let repo = crisiswatch_db::PgRepository::new(pool);
    let period = TimeWindow::ending_at(Utc::now(), days * 24 * 60);

    let metric = run_benchmark(&repo, brand, competitor, period, detection.epsilon)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    println!("{brand} vs {competitor} over the last {days} day(s):");
    println!("  mentions:        {}", metric.mention_count);
    match metric.sentiment_ratio {
        Some(ratio) => println!("  sentiment ratio: {ratio:.3}"),
        None => println!("  sentiment ratio: undefined (competitor had no signal)"),
    }
    match metric.engagement_rate {
        Some(rate) => println!("  engagement rate: {rate:.2} per mention"),
        None => println!("  engagement rate: undefined (no brand mentions)"),
    }

    Ok(())
}
