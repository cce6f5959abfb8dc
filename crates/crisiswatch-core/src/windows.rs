use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A fixed-length, half-open time bucket `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build the window of `minutes` length ending at `end`.
    #[must_use]
    pub fn ending_at(end: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            start: end - Duration::minutes(minutes),
            end,
        }
    }

    /// Half-open containment: `start <= ts < end`.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// Aggregated statistics for one brand over one window.
///
/// `mean_compound` and `negative_fraction` are `None` when the window had
/// no scored mentions, so downstream comparison never mistakes silence for
/// calm sentiment. Never mutated after computation for a given window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub brand: String,
    pub window: TimeWindow,
    /// Count of mentions with a sentiment score falling in the window.
    pub mention_count: i64,
    pub mean_compound: Option<f64>,
    pub negative_fraction: Option<f64>,
    pub total_engagement: i64,
    /// Mentions in the window that lacked a sentiment score and were
    /// excluded from aggregation. Observability only.
    pub unscored_count: i64,
}

impl WindowStats {
    /// A "no data" stats record for a window with zero scored mentions.
    #[must_use]
    pub fn empty(brand: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            brand: brand.into(),
            window,
            mention_count: 0,
            mean_compound: None,
            negative_fraction: None,
            total_engagement: 0,
            unscored_count: 0,
        }
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.mention_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_half_open() {
        let end = Utc::now();
        let w = TimeWindow::ending_at(end, 60);
        assert!(w.contains(w.start));
        assert!(!w.contains(w.end));
        assert!(w.contains(end - Duration::minutes(30)));
        assert!(!w.contains(end - Duration::minutes(61)));
    }

    #[test]
    fn empty_stats_report_no_data() {
        let w = TimeWindow::ending_at(Utc::now(), 60);
        let stats = WindowStats::empty("acme", w);
        assert!(!stats.has_data());
        assert_eq!(stats.mean_compound, None);
        assert_eq!(stats.negative_fraction, None);
    }
}
