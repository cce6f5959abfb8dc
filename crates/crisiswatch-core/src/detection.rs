//! Tunables for the crisis detection engine.
//!
//! Every threshold, weight, and history length the engine consumes lives
//! here as configuration, not constants. All values are env-overridable
//! with the `CRISISWATCH_` prefix and validated on load.

use crate::ConfigError;

/// Configuration surface consumed by the detection engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Length of one aggregation window, in minutes.
    pub window_minutes: i64,
    /// Minimum scored mentions in a window before a verdict is attempted.
    pub min_window_mentions: i64,
    /// Severity admission gate into alerting, in (0, 1].
    pub alert_threshold: f64,
    /// Per-factor z-score trigger for naming "volume spike" as a cause.
    pub volume_z_trigger: f64,
    /// Per-factor z-score trigger for naming "negativity spike" as a cause.
    pub negativity_z_trigger: f64,
    /// Rolling baseline history length K (windows retained per brand).
    pub baseline_window_count: usize,
    /// Minimum historical windows before a baseline is usable (cold start).
    pub min_baseline_windows: usize,
    /// Consecutive below-threshold cycles required to resolve an alert.
    pub quiet_cycles_to_resolve: u32,
    /// Severity weight on the positive volume deviation.
    pub volume_weight: f64,
    /// Severity weight on the positive negativity deviation. Defaults
    /// favor sentiment deterioration over raw volume.
    pub negativity_weight: f64,
    /// Compound-score cutoff below which a mention counts as negative.
    pub negativity_cutoff: f64,
    /// Reference follower count for log-scaled influencer reach.
    pub follower_reference: f64,
    /// Influencer impact component weights (reach, engagement, alignment).
    pub reach_weight: f64,
    pub engagement_weight: f64,
    pub alignment_weight: f64,
    /// Guard against division by near-zero variance.
    pub epsilon: f64,
    /// Per-cycle fan-out limit across brands.
    pub max_concurrent_brands: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_minutes: 60,
            min_window_mentions: 5,
            alert_threshold: 0.75,
            volume_z_trigger: 2.0,
            negativity_z_trigger: 2.0,
            baseline_window_count: 24,
            min_baseline_windows: 6,
            quiet_cycles_to_resolve: 3,
            volume_weight: 0.1,
            negativity_weight: 0.2,
            negativity_cutoff: -0.3,
            follower_reference: 100_000.0,
            reach_weight: 0.5,
            engagement_weight: 0.3,
            alignment_weight: 0.2,
            epsilon: 1e-6,
            max_concurrent_brands: 4,
        }
    }
}

impl DetectionConfig {
    /// Load detection tunables from the process environment, falling back
    /// to defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse or the
    /// resulting configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        build_detection_config(|key| std::env::var(key))
    }
}

fn build_detection_config<F>(lookup: F) -> Result<DetectionConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = DetectionConfig::default();

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_i64 = |var: &str, default: i64| -> Result<i64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let config = DetectionConfig {
        window_minutes: parse_i64("CRISISWATCH_WINDOW_MINUTES", defaults.window_minutes)?,
        min_window_mentions: parse_i64(
            "CRISISWATCH_MIN_WINDOW_MENTIONS",
            defaults.min_window_mentions,
        )?,
        alert_threshold: parse_f64("CRISISWATCH_ALERT_THRESHOLD", defaults.alert_threshold)?,
        volume_z_trigger: parse_f64("CRISISWATCH_VOLUME_Z_TRIGGER", defaults.volume_z_trigger)?,
        negativity_z_trigger: parse_f64(
            "CRISISWATCH_NEGATIVITY_Z_TRIGGER",
            defaults.negativity_z_trigger,
        )?,
        baseline_window_count: parse_usize(
            "CRISISWATCH_BASELINE_WINDOW_COUNT",
            defaults.baseline_window_count,
        )?,
        min_baseline_windows: parse_usize(
            "CRISISWATCH_MIN_BASELINE_WINDOWS",
            defaults.min_baseline_windows,
        )?,
        quiet_cycles_to_resolve: parse_u32(
            "CRISISWATCH_QUIET_CYCLES_TO_RESOLVE",
            defaults.quiet_cycles_to_resolve,
        )?,
        volume_weight: parse_f64("CRISISWATCH_VOLUME_WEIGHT", defaults.volume_weight)?,
        negativity_weight: parse_f64("CRISISWATCH_NEGATIVITY_WEIGHT", defaults.negativity_weight)?,
        negativity_cutoff: parse_f64("CRISISWATCH_NEGATIVITY_CUTOFF", defaults.negativity_cutoff)?,
        follower_reference: parse_f64(
            "CRISISWATCH_FOLLOWER_REFERENCE",
            defaults.follower_reference,
        )?,
        reach_weight: parse_f64("CRISISWATCH_REACH_WEIGHT", defaults.reach_weight)?,
        engagement_weight: parse_f64("CRISISWATCH_ENGAGEMENT_WEIGHT", defaults.engagement_weight)?,
        alignment_weight: parse_f64("CRISISWATCH_ALIGNMENT_WEIGHT", defaults.alignment_weight)?,
        epsilon: parse_f64("CRISISWATCH_EPSILON", defaults.epsilon)?,
        max_concurrent_brands: parse_usize(
            "CRISISWATCH_MAX_CONCURRENT_BRANDS",
            defaults.max_concurrent_brands,
        )?,
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &DetectionConfig) -> Result<(), ConfigError> {
    if !(config.alert_threshold > 0.0 && config.alert_threshold <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "alert_threshold must be in (0, 1], got {}",
            config.alert_threshold
        )));
    }
    if config.window_minutes <= 0 {
        return Err(ConfigError::Validation(format!(
            "window_minutes must be positive, got {}",
            config.window_minutes
        )));
    }
    if config.min_baseline_windows == 0 || config.min_baseline_windows > config.baseline_window_count
    {
        return Err(ConfigError::Validation(format!(
            "min_baseline_windows must be in 1..={}, got {}",
            config.baseline_window_count, config.min_baseline_windows
        )));
    }
    if config.quiet_cycles_to_resolve == 0 {
        return Err(ConfigError::Validation(
            "quiet_cycles_to_resolve must be at least 1".to_string(),
        ));
    }
    if config.volume_weight < 0.0 || config.negativity_weight < 0.0 {
        return Err(ConfigError::Validation(
            "severity weights must be non-negative".to_string(),
        ));
    }
    if config.epsilon <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "epsilon must be positive, got {}",
            config.epsilon
        )));
    }
    if config.follower_reference <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "follower_reference must be positive, got {}",
            config.follower_reference
        )));
    }
    if config.max_concurrent_brands == 0 {
        return Err(ConfigError::Validation(
            "max_concurrent_brands must be at least 1".to_string(),
        ));
    }
    Ok(())
}
