//! Per-brand rolling baseline over past window statistics.
//!
//! The baseline answers "what is normal volume and negative-fraction for
//! this brand" using only windows prior to the one being evaluated — the
//! window under test is never part of its own reference.

use std::collections::VecDeque;

use crisiswatch_core::WindowStats;

/// Derived mean/standard-deviation reference for one brand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineStats {
    pub mean_volume: f64,
    pub std_volume: f64,
    pub mean_negative_fraction: f64,
    pub std_negative_fraction: f64,
    /// Windows the statistics were derived from.
    pub sample_count: usize,
}

/// Outcome of asking the baseline for a reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaselineReading {
    Ready(BaselineStats),
    /// Cold start: not enough history to evaluate. Not an error — the
    /// scorer must treat this as "cannot evaluate" and emit no verdict.
    InsufficientHistory { have: usize, need: usize },
}

/// Fixed-capacity rolling sample of past window statistics, oldest first.
#[derive(Debug, Clone)]
pub struct BaselineState {
    capacity: usize,
    samples: VecDeque<WindowStats>,
}

impl BaselineState {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Build from repository history returned newest-first, keeping at
    /// most `capacity` windows.
    #[must_use]
    pub fn from_history(capacity: usize, newest_first: Vec<WindowStats>) -> Self {
        let mut state = Self::with_capacity(capacity);
        for stats in newest_first.into_iter().take(capacity).rev() {
            state.push(stats);
        }
        state
    }

    /// Append the newest completed window, evicting the oldest when over
    /// capacity.
    pub fn push(&mut self, stats: WindowStats) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(stats);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean and standard deviation of volume and negative-fraction across
    /// the retained history.
    ///
    /// Volume statistics cover every retained window (a silent window is
    /// genuine volume data). Negative-fraction statistics cover only
    /// windows that had scored mentions; if fewer than `min_windows` of
    /// those exist, the reading is still insufficient — "no data" windows
    /// cannot stand in for observed sentiment.
    #[must_use]
    pub fn reading(&self, min_windows: usize) -> BaselineReading {
        if self.samples.len() < min_windows {
            return BaselineReading::InsufficientHistory {
                have: self.samples.len(),
                need: min_windows,
            };
        }

        let volumes: Vec<f64> = self
            .samples
            .iter()
            .map(|s| {
                #[allow(clippy::cast_precision_loss)]
                let v = s.mention_count as f64;
                v
            })
            .collect();

        let fractions: Vec<f64> = self
            .samples
            .iter()
            .filter_map(|s| s.negative_fraction)
            .collect();

        if fractions.len() < min_windows {
            return BaselineReading::InsufficientHistory {
                have: fractions.len(),
                need: min_windows,
            };
        }

        let (mean_volume, std_volume) = mean_and_std(&volumes);
        let (mean_negative_fraction, std_negative_fraction) = mean_and_std(&fractions);

        BaselineReading::Ready(BaselineStats {
            mean_volume,
            std_volume,
            mean_negative_fraction,
            std_negative_fraction,
            sample_count: self.samples.len(),
        })
    }
}

/// Population mean and standard deviation. Assumes a non-empty slice.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crisiswatch_core::TimeWindow;

    fn stats(count: i64, neg_fraction: Option<f64>, windows_ago: i64) -> WindowStats {
        let end = Utc::now() - Duration::hours(windows_ago);
        WindowStats {
            brand: "acme".to_string(),
            window: TimeWindow::ending_at(end, 60),
            mention_count: count,
            mean_compound: neg_fraction.map(|_| 0.1),
            negative_fraction: neg_fraction,
            total_engagement: count * 3,
            unscored_count: 0,
        }
    }

    #[test]
    fn reports_insufficient_history_below_minimum() {
        let mut state = BaselineState::with_capacity(10);
        state.push(stats(5, Some(0.1), 2));
        state.push(stats(6, Some(0.2), 1));

        assert_eq!(
            state.reading(3),
            BaselineReading::InsufficientHistory { have: 2, need: 3 }
        );
    }

    #[test]
    fn no_data_windows_do_not_satisfy_negativity_minimum() {
        let mut state = BaselineState::with_capacity(10);
        state.push(stats(0, None, 3));
        state.push(stats(0, None, 2));
        state.push(stats(4, Some(0.25), 1));

        // Three windows retained, but only one carries sentiment data.
        assert_eq!(
            state.reading(3),
            BaselineReading::InsufficientHistory { have: 1, need: 3 }
        );
    }

    #[test]
    fn computes_mean_and_std() {
        let mut state = BaselineState::with_capacity(10);
        state.push(stats(4, Some(0.0), 3));
        state.push(stats(6, Some(0.1), 2));
        state.push(stats(8, Some(0.2), 1));

        let BaselineReading::Ready(b) = state.reading(3) else {
            panic!("expected a ready baseline");
        };
        assert!((b.mean_volume - 6.0).abs() < 1e-9);
        assert!((b.std_volume - (8.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((b.mean_negative_fraction - 0.1).abs() < 1e-9);
        assert_eq!(b.sample_count, 3);
    }

    #[test]
    fn push_evicts_oldest_at_capacity() {
        let mut state = BaselineState::with_capacity(2);
        state.push(stats(1, Some(0.1), 3));
        state.push(stats(2, Some(0.1), 2));
        state.push(stats(3, Some(0.1), 1));

        assert_eq!(state.len(), 2);
        let BaselineReading::Ready(b) = state.reading(2) else {
            panic!("expected a ready baseline");
        };
        // Window with count 1 was evicted.
        assert!((b.mean_volume - 2.5).abs() < 1e-9);
    }

    #[test]
    fn from_history_keeps_newest_windows() {
        let newest_first = vec![
            stats(9, Some(0.1), 1),
            stats(8, Some(0.1), 2),
            stats(7, Some(0.1), 3),
        ];
        let state = BaselineState::from_history(2, newest_first);
        assert_eq!(state.len(), 2);
        let BaselineReading::Ready(b) = state.reading(2) else {
            panic!("expected a ready baseline");
        };
        assert!((b.mean_volume - 8.5).abs() < 1e-9);
    }
}
