//! Anomaly scoring: current window statistics against the baseline.

use crisiswatch_core::{DetectionConfig, WindowStats};

use crate::baseline::BaselineReading;

/// A factor that crossed its configured trigger threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    VolumeSpike,
    NegativitySpike,
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cause::VolumeSpike => write!(f, "volume spike"),
            Cause::NegativitySpike => write!(f, "negativity spike"),
        }
    }
}

/// Severity verdict for one brand window.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyVerdict {
    pub brand: String,
    /// Bounded severity in [0, 1].
    pub severity: f64,
    pub volume_z: f64,
    pub negativity_z: f64,
    /// Factors that crossed their per-factor trigger thresholds.
    pub causes: Vec<Cause>,
}

impl AnomalyVerdict {
    /// Whether this verdict passes the single admission gate into alerting.
    #[must_use]
    pub fn is_crisis(&self, config: &DetectionConfig) -> bool {
        self.severity >= config.alert_threshold
    }

    /// Human-readable cause description for the alert record.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.causes.is_empty() {
            format!("Potential brand crisis: severity {:.2}", self.severity)
        } else {
            let causes: Vec<String> = self.causes.iter().map(ToString::to_string).collect();
            format!("Potential brand crisis: {}", causes.join(", "))
        }
    }
}

/// Score one window against its baseline.
///
/// Returns `None` when no verdict can be produced: insufficient history
/// (cold start), a window with no scored mentions, or fewer scored
/// mentions than the configured minimum. Only positive deviations (worse
/// than normal) contribute to severity — a drop in volume or negativity
/// is not a crisis signal.
#[must_use]
pub fn score_window(
    stats: &WindowStats,
    baseline: &BaselineReading,
    config: &DetectionConfig,
) -> Option<AnomalyVerdict> {
    let BaselineReading::Ready(baseline) = baseline else {
        return None;
    };

    let negative_fraction = stats.negative_fraction?;
    if stats.mention_count < config.min_window_mentions {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let volume = stats.mention_count as f64;

    let volume_z =
        (volume - baseline.mean_volume) / baseline.std_volume.max(config.epsilon);
    let negativity_z = (negative_fraction - baseline.mean_negative_fraction)
        / baseline.std_negative_fraction.max(config.epsilon);

    let severity = (config.volume_weight * volume_z.max(0.0)
        + config.negativity_weight * negativity_z.max(0.0))
    .clamp(0.0, 1.0);

    let mut causes = Vec::new();
    if volume_z >= config.volume_z_trigger {
        causes.push(Cause::VolumeSpike);
    }
    if negativity_z >= config.negativity_z_trigger {
        causes.push(Cause::NegativitySpike);
    }

    Some(AnomalyVerdict {
        brand: stats.brand.clone(),
        severity,
        volume_z,
        negativity_z,
        causes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineStats;
    use chrono::Utc;
    use crisiswatch_core::TimeWindow;

    fn stats(brand: &str, count: i64, neg_fraction: f64) -> WindowStats {
        WindowStats {
            brand: brand.to_string(),
            window: TimeWindow::ending_at(Utc::now(), 60),
            mention_count: count,
            mean_compound: Some(-0.2),
            negative_fraction: Some(neg_fraction),
            total_engagement: count * 4,
            unscored_count: 0,
        }
    }

    fn baseline(mean_volume: f64, std_volume: f64, mean_neg: f64, std_neg: f64) -> BaselineReading {
        BaselineReading::Ready(BaselineStats {
            mean_volume,
            std_volume,
            mean_negative_fraction: mean_neg,
            std_negative_fraction: std_neg,
            sample_count: 12,
        })
    }

    #[test]
    fn insufficient_history_yields_no_verdict() {
        let config = DetectionConfig::default();
        let reading = BaselineReading::InsufficientHistory { have: 2, need: 6 };
        assert_eq!(score_window(&stats("acme", 50, 0.9), &reading, &config), None);
    }

    #[test]
    fn window_below_minimum_mentions_yields_no_verdict() {
        let config = DetectionConfig::default();
        let reading = baseline(5.0, 1.0, 0.1, 0.05);
        assert_eq!(score_window(&stats("acme", 3, 1.0), &reading, &config), None);
    }

    #[test]
    fn negativity_spike_worked_example() {
        // 5 mentions, 2 negative; baseline neg-fraction mean 0.1 std 0.05:
        // neg_z = (0.4 - 0.1) / 0.05 = 6.0; volume within normal range;
        // with negativity weight 0.2, severity clamps to 1.0.
        let config = DetectionConfig::default();
        let reading = baseline(5.0, 2.0, 0.1, 0.05);
        let verdict = score_window(&stats("Apple", 5, 0.4), &reading, &config)
            .expect("baseline ready, window populated");

        assert!((verdict.negativity_z - 6.0).abs() < 1e-9);
        assert!(verdict.volume_z <= 0.0 + 1e-9);
        assert!((verdict.severity - 1.0).abs() < f64::EPSILON);
        assert!(verdict.is_crisis(&config));
        assert_eq!(verdict.causes, vec![Cause::NegativitySpike]);
        assert_eq!(
            verdict.describe(),
            "Potential brand crisis: negativity spike"
        );
    }

    #[test]
    fn negative_deviations_do_not_contribute() {
        // Quieter and less negative than baseline: severity must be zero.
        let config = DetectionConfig::default();
        let reading = baseline(50.0, 5.0, 0.4, 0.1);
        let verdict = score_window(&stats("acme", 10, 0.1), &reading, &config)
            .expect("verdict");
        assert!(verdict.volume_z < 0.0);
        assert!(verdict.negativity_z < 0.0);
        assert!((verdict.severity - 0.0).abs() < f64::EPSILON);
        assert!(!verdict.is_crisis(&config));
    }

    #[test]
    fn both_factors_named_when_both_trigger() {
        let config = DetectionConfig::default();
        let reading = baseline(5.0, 1.0, 0.1, 0.05);
        let verdict = score_window(&stats("acme", 30, 0.8), &reading, &config)
            .expect("verdict");
        assert_eq!(verdict.causes, vec![Cause::VolumeSpike, Cause::NegativitySpike]);
        assert_eq!(
            verdict.describe(),
            "Potential brand crisis: volume spike, negativity spike"
        );
    }

    #[test]
    fn elevated_z_below_gate_is_not_a_crisis() {
        // neg_z of 2.5 crosses the per-factor trigger but severity
        // 0.2 * 2.5 = 0.5 stays below the 0.75 admission gate.
        let config = DetectionConfig::default();
        let reading = baseline(10.0, 5.0, 0.1, 0.1);
        let verdict = score_window(&stats("acme", 10, 0.35), &reading, &config)
            .expect("verdict");
        assert_eq!(verdict.causes, vec![Cause::NegativitySpike]);
        assert!(!verdict.is_crisis(&config));
    }

    #[test]
    fn zero_variance_baseline_does_not_divide_by_zero() {
        let config = DetectionConfig::default();
        let reading = baseline(5.0, 0.0, 0.1, 0.0);
        let verdict = score_window(&stats("acme", 6, 0.2), &reading, &config)
            .expect("verdict");
        assert!(verdict.volume_z.is_finite());
        assert!(verdict.negativity_z.is_finite());
    }
}
