use serde::{Deserialize, Serialize};

use crate::windows::TimeWindow;

/// Relative sentiment/volume/engagement comparison between a brand and a
/// named competitor over a period.
///
/// One record exists per (brand, competitor, period); recomputation for
/// the same period overwrites rather than duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveMetric {
    pub brand: String,
    pub competitor: String,
    /// Brand mean sentiment / competitor mean sentiment. `None` when the
    /// competitor had no mentions in the period or its mean is zero in
    /// magnitude — undefined is recorded, never approximated.
    pub sentiment_ratio: Option<f64>,
    /// Brand mention count in the period.
    pub mention_count: i64,
    /// Brand total engagement divided by brand mention count. `None` when
    /// the brand had no mentions in the period.
    pub engagement_rate: Option<f64>,
    pub period: TimeWindow,
}
