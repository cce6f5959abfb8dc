use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Component scores (positive + negative + neutral) must sum to 1 within
/// this tolerance for a [`SentimentScore`] to be considered well-formed.
pub const COMPONENT_SUM_TOLERANCE: f64 = 0.01;

/// Source-specific payload of a mention.
///
/// Every mention carries the shared required fields on [`Mention`]; the
/// variant holds only what the originating source kind can supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDetails {
    /// A post on a social platform (forum, subreddit, etc.).
    SocialPost {
        /// Forum or community name the post appeared in.
        community: Option<String>,
        /// Platform-native post identifier.
        post_id: Option<String>,
        /// Author follower count at collection time, when the platform
        /// exposes it.
        author_followers: Option<i64>,
    },
    /// An article published by a news outlet.
    NewsArticle {
        title: Option<String>,
        /// Originating-source name (the outlet).
        outlet: Option<String>,
    },
}

impl SourceDetails {
    /// Stable discriminator string, used as the `source` column value.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SourceDetails::SocialPost { .. } => "social_post",
            SourceDetails::NewsArticle { .. } => "news_article",
        }
    }

    /// Platform label used to key influencer identity alongside username.
    #[must_use]
    pub fn platform(&self) -> &'static str {
        match self {
            SourceDetails::SocialPost { .. } => "social",
            SourceDetails::NewsArticle { .. } => "news",
        }
    }

    /// Follower count attached to the mention, when the source supplied one.
    #[must_use]
    pub fn author_followers(&self) -> Option<i64> {
        match self {
            SourceDetails::SocialPost {
                author_followers, ..
            } => *author_followers,
            SourceDetails::NewsArticle { .. } => None,
        }
    }
}

/// An immutable brand-mention fact produced by ingestion.
///
/// Never mutated after creation; retained indefinitely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub id: Uuid,
    /// Brand label this mention was collected for.
    pub brand: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
    pub url: Option<String>,
    /// Engagement count (likes, upvotes, shares). Always >= 0.
    pub engagement: i64,
    pub source: SourceDetails,
}

/// Sentiment attached 1:1 to a mention. Immutable once written.
///
/// A mention may exist without a score; the engine excludes it from
/// aggregation until one arrives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Polarity in [-1, 1].
    pub polarity: f64,
    /// Subjectivity in [0, 1].
    pub subjectivity: f64,
    /// Compound score in [-1, 1]; the primary signal for classification.
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl SentimentScore {
    /// Whether positive + negative + neutral sum to 1 within tolerance.
    #[must_use]
    pub fn components_sum_to_one(&self) -> bool {
        ((self.positive + self.negative + self.neutral) - 1.0).abs() <= COMPONENT_SUM_TOLERANCE
    }

    /// Classify this score as negative using the configured compound cutoff.
    #[must_use]
    pub fn is_negative(&self, negativity_cutoff: f64) -> bool {
        self.compound < negativity_cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn score(compound: f64) -> SentimentScore {
        SentimentScore {
            polarity: compound,
            subjectivity: 0.5,
            compound,
            positive: 0.2,
            negative: 0.3,
            neutral: 0.5,
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn components_sum_within_tolerance() {
        assert!(score(0.0).components_sum_to_one());
    }

    #[test]
    fn components_sum_outside_tolerance() {
        let mut s = score(0.0);
        s.neutral = 0.9;
        assert!(!s.components_sum_to_one());
    }

    #[test]
    fn negative_classification_uses_cutoff() {
        assert!(score(-0.5).is_negative(-0.3));
        assert!(!score(-0.2).is_negative(-0.3));
        // The cutoff itself is not negative: classification is strictly below.
        assert!(!score(-0.3).is_negative(-0.3));
    }

    #[test]
    fn source_kind_discriminators() {
        let post = SourceDetails::SocialPost {
            community: Some("r/gadgets".to_string()),
            post_id: None,
            author_followers: Some(1200),
        };
        let article = SourceDetails::NewsArticle {
            title: Some("Recall announced".to_string()),
            outlet: Some("Example Daily".to_string()),
        };
        assert_eq!(post.kind(), "social_post");
        assert_eq!(article.kind(), "news_article");
        assert_eq!(post.author_followers(), Some(1200));
        assert_eq!(article.author_followers(), None);
    }

    #[test]
    fn source_details_serde_round_trip() {
        let post = SourceDetails::SocialPost {
            community: Some("audio".to_string()),
            post_id: Some("t3_abc".to_string()),
            author_followers: None,
        };
        let json = serde_json::to_string(&post).expect("serialize");
        assert!(json.contains("\"kind\":\"social_post\""));
        let back: SourceDetails = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, post);
    }
}
