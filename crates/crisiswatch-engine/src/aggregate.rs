//! Time-window aggregation: raw mention+sentiment pairs in, one
//! [`WindowStats`] out.

use crisiswatch_core::{Mention, SentimentScore, TimeWindow, WindowStats};

/// Reduce one brand's mention batch to the statistics of one window.
///
/// Only mentions falling in `[window.start, window.end)` are considered.
/// Mentions without a sentiment score are excluded from every statistic
/// and counted in `unscored_count` instead — they are never treated as
/// neutral. Zero qualifying mentions yields a "no data" record with
/// `None` statistics, so silence is distinguishable from calm sentiment.
#[must_use]
pub fn aggregate_window(
    brand: &str,
    window: TimeWindow,
    batch: &[(Mention, Option<SentimentScore>)],
    negativity_cutoff: f64,
) -> WindowStats {
    let mut scored = 0_i64;
    let mut unscored = 0_i64;
    let mut negative = 0_i64;
    let mut compound_sum = 0.0_f64;
    let mut engagement = 0_i64;

    for (mention, score) in batch {
        if !window.contains(mention.created_at) {
            continue;
        }
        match score {
            Some(score) => {
                scored += 1;
                compound_sum += score.compound;
                engagement += mention.engagement;
                if score.is_negative(negativity_cutoff) {
                    negative += 1;
                }
            }
            None => unscored += 1,
        }
    }

    if scored == 0 {
        let mut stats = WindowStats::empty(brand, window);
        stats.unscored_count = unscored;
        return stats;
    }

    #[allow(clippy::cast_precision_loss)]
    let denom = scored as f64;
    #[allow(clippy::cast_precision_loss)]
    let negative_fraction = negative as f64 / denom;

    WindowStats {
        brand: brand.to_string(),
        window,
        mention_count: scored,
        mean_compound: Some(compound_sum / denom),
        negative_fraction: Some(negative_fraction),
        total_engagement: engagement,
        unscored_count: unscored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crisiswatch_core::SourceDetails;
    use uuid::Uuid;

    fn mention(brand: &str, minutes_ago: i64, engagement: i64) -> Mention {
        Mention {
            id: Uuid::new_v4(),
            brand: brand.to_string(),
            content: "some mention text".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            author: Some("someone".to_string()),
            url: None,
            engagement,
            source: SourceDetails::SocialPost {
                community: None,
                post_id: None,
                author_followers: None,
            },
        }
    }

    fn score(compound: f64) -> SentimentScore {
        SentimentScore {
            polarity: compound,
            subjectivity: 0.5,
            compound,
            positive: 0.3,
            negative: 0.3,
            neutral: 0.4,
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn aggregates_scored_mentions_only() {
        let window = TimeWindow::ending_at(Utc::now(), 60);
        let batch = vec![
            (mention("acme", 10, 5), Some(score(0.8))),
            (mention("acme", 20, 3), Some(score(-0.6))),
            (mention("acme", 30, 100), None), // unscored, excluded
        ];

        let stats = aggregate_window("acme", window, &batch, -0.3);
        assert_eq!(stats.mention_count, 2);
        assert_eq!(stats.unscored_count, 1);
        assert_eq!(stats.total_engagement, 8);
        let mean = stats.mean_compound.expect("has data");
        assert!((mean - 0.1).abs() < 1e-9);
        let neg = stats.negative_fraction.expect("has data");
        assert!((neg - 0.5).abs() < 1e-9);
    }

    #[test]
    fn mentions_outside_window_are_ignored() {
        let window = TimeWindow::ending_at(Utc::now(), 60);
        let batch = vec![(mention("acme", 90, 5), Some(score(0.5)))];

        let stats = aggregate_window("acme", window, &batch, -0.3);
        assert_eq!(stats.mention_count, 0);
        assert_eq!(stats.unscored_count, 0);
    }

    #[test]
    fn empty_window_reports_no_data_not_zero() {
        let window = TimeWindow::ending_at(Utc::now(), 60);
        let batch = vec![(mention("acme", 15, 5), None)];

        let stats = aggregate_window("acme", window, &batch, -0.3);
        assert!(!stats.has_data());
        assert_eq!(stats.mean_compound, None);
        assert_eq!(stats.negative_fraction, None);
        assert_eq!(stats.unscored_count, 1);
    }
}
