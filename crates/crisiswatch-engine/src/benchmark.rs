//! Competitive benchmarking: relative sentiment, volume, and engagement
//! between a brand and one named competitor over a period.

use crisiswatch_core::{CompetitiveMetric, TimeWindow};

use crate::error::EngineError;
use crate::repo::{PeriodAggregates, Repository};

/// Compute and persist the metric for (brand, competitor, period).
///
/// The sentiment ratio is brand mean sentiment over competitor mean
/// sentiment. When the competitor has no mentions in the period, or its
/// mean is zero in magnitude, the ratio is recorded as undefined (`None`)
/// rather than approximated. Recomputation for the same triple overwrites
/// the stored record — idempotent, not additive.
///
/// # Errors
///
/// Propagates repository failures as [`EngineError::Repository`].
pub async fn run_benchmark<R: Repository>(
    repo: &R,
    brand: &str,
    competitor: &str,
    period: TimeWindow,
    epsilon: f64,
) -> Result<CompetitiveMetric, EngineError> {
    let brand_aggregates = repo
        .load_period_aggregates(brand, period.start, period.end)
        .await?;
    let competitor_aggregates = repo
        .load_period_aggregates(competitor, period.start, period.end)
        .await?;

    let metric = CompetitiveMetric {
        brand: brand.to_string(),
        competitor: competitor.to_string(),
        sentiment_ratio: sentiment_ratio(&brand_aggregates, &competitor_aggregates, epsilon),
        mention_count: brand_aggregates.mention_count,
        engagement_rate: engagement_rate(&brand_aggregates),
        period,
    };

    repo.upsert_competitive_metric(&metric).await?;
    Ok(metric)
}

fn sentiment_ratio(
    brand: &PeriodAggregates,
    competitor: &PeriodAggregates,
    epsilon: f64,
) -> Option<f64> {
    if competitor.mention_count == 0 {
        return None;
    }
    let brand_mean = brand.mean_sentiment?;
    let competitor_mean = competitor.mean_sentiment?;
    if competitor_mean.abs() <= epsilon {
        return None;
    }
    Some(brand_mean / competitor_mean)
}

fn engagement_rate(aggregates: &PeriodAggregates) -> Option<f64> {
    if aggregates.mention_count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(aggregates.total_engagement as f64 / aggregates.mention_count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregates(count: i64, mean: Option<f64>, engagement: i64) -> PeriodAggregates {
        PeriodAggregates {
            mention_count: count,
            mean_sentiment: mean,
            total_engagement: engagement,
        }
    }

    #[test]
    fn ratio_defined_for_active_competitor() {
        let brand = aggregates(10, Some(0.6), 120);
        let competitor = aggregates(8, Some(0.3), 40);
        let ratio = sentiment_ratio(&brand, &competitor, 1e-6).expect("defined");
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn ratio_undefined_for_silent_competitor() {
        let brand = aggregates(10, Some(0.6), 120);
        let competitor = aggregates(0, None, 0);
        assert_eq!(sentiment_ratio(&brand, &competitor, 1e-6), None);
    }

    #[test]
    fn ratio_undefined_for_zero_magnitude_competitor_mean() {
        let brand = aggregates(10, Some(0.6), 120);
        let competitor = aggregates(5, Some(0.0), 10);
        assert_eq!(sentiment_ratio(&brand, &competitor, 1e-6), None);
    }

    #[test]
    fn engagement_rate_per_mention() {
        let rate = engagement_rate(&aggregates(4, Some(0.1), 100)).expect("defined");
        assert!((rate - 25.0).abs() < 1e-9);
        assert_eq!(engagement_rate(&aggregates(0, None, 0)), None);
    }
}
