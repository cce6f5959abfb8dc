//! `cycle` command: run one evaluation cycle on demand.
//!
//! Shares the scheduled job's engine path exactly — same repository
//! adapter, same per-brand locks — so a manual run racing the scheduler
//! still honors the one-active-alert invariant.

use chrono::Utc;

use crisiswatch_engine::{run_cycle, BrandStateStore};

pub(crate) async fn run(brand_filter: Option<&str>) -> anyhow::Result<()> {
    let config = crisiswatch_core::load_app_config()?;
    let detection = crisiswatch_core::DetectionConfig::from_env()?;
    let brands_file = crisiswatch_core::load_brands(&config.brands_path)?;

    let brands: Vec<_> = match brand_filter {
        Some(name) => {
            let brand = brands_file
                .brands
                .into_iter()
                .find(|b| b.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| anyhow::anyhow!("brand '{name}' not found in brand registry"))?;
            vec![brand]
        }
        None => brands_file.brands,
    };

    let pool_config = crisiswatch_db::PoolConfig::from_app_config(&config);
    let pool = crisiswatch_db::connect_pool(&config.database_url, pool_config).await?;
    crisiswatch_db::run_migrations(&pool).await?;

    let repo = crisiswatch_db::PgRepository::new(pool);
    let store = BrandStateStore::new();

    let outcome = run_cycle(&repo, &brands, &detection, &store, Utc::now()).await;

    println!(
        "evaluated {} brand(s): {} opened, {} escalated, {} resolved, {} influencer(s) updated, {} metric(s) upserted",
        outcome.evaluated_brands,
        outcome.opened.len(),
        outcome.escalated.len(),
        outcome.resolved.len(),
        outcome.influencers_updated,
        outcome.metrics_upserted,
    );
    for alert in &outcome.opened {
        println!(
            "  NEW   [{:.2}] {} — {}",
            alert.severity, alert.brand, alert.description
        );
    }
    for alert in &outcome.resolved {
        println!("  RESOLVED      {} (alert #{})", alert.brand, alert.id);
    }
    if !outcome.failed_brands.is_empty() {
        anyhow::bail!(
            "cycle failed for brand(s): {} — they will retry from the same watermark",
            outcome.failed_brands.join(", ")
        );
    }

    Ok(())
}
