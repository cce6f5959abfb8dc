//! Influencer impact scoring.
//!
//! Impact combines three bounded components: log-scaled reach (so
//! mega-accounts do not dominate unboundedly), engagement on the latest
//! mention relative to the account's observed average, and agreement
//! between the account's declared brand affinity and the polarity of its
//! mentions.

use chrono::{DateTime, Utc};

use crisiswatch_core::{DetectionConfig, Influencer, Mention, SentimentScore};

use crate::error::EngineError;
use crate::repo::Repository;

/// Log-scaled follower weight in [0, 1] against the configured reference
/// count. An account at the reference scores 1; anything beyond is capped.
#[must_use]
pub fn follower_weight(followers: i64, reference: f64) -> f64 {
    if followers <= 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let f = followers as f64;
    (f.ln_1p() / reference.ln_1p()).clamp(0.0, 1.0)
}

/// Saturating engagement weight in [0, 1): the latest observation
/// relative to the account's average. A ratio of 1 (typical engagement)
/// maps to 0.5; outsized engagement asymptotically approaches 1.
#[must_use]
pub fn engagement_weight(observed: i64, average: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let observed = (observed.max(0)) as f64;
    let ratio = observed / average.max(1.0);
    ratio / (1.0 + ratio)
}

/// Agreement between the account's declared affinity and one mention's
/// polarity, in [0, 1]. Positive polarity toward the affinity brand is
/// alignment; mentions of other brands are neutral (0.5).
#[must_use]
pub fn alignment_factor(
    polarity: f64,
    affinity: Option<&str>,
    mention_brand: &str,
) -> f64 {
    match affinity {
        Some(affinity) if affinity.eq_ignore_ascii_case(mention_brand) => {
            ((polarity + 1.0) / 2.0).clamp(0.0, 1.0)
        }
        _ => 0.5,
    }
}

/// Compute the impact score for one account from its batch of scored
/// mentions, then create or update its [`Influencer`] record in place.
///
/// Identity is (username, platform). The batch must be non-empty and all
/// pairs must belong to the account. On first sighting the record is
/// created with the follower count the source supplied (if any) and an
/// affinity of the brand the account mentioned most; later sightings
/// keep the declared affinity and refresh followers when the source
/// provides a newer count.
///
/// # Errors
///
/// Propagates repository failures as [`EngineError::Repository`].
pub async fn score_influencer<R: Repository>(
    repo: &R,
    username: &str,
    platform: &str,
    batch: &[(Mention, SentimentScore)],
    now: DateTime<Utc>,
    config: &DetectionConfig,
) -> Result<Option<Influencer>, EngineError> {
    let Some((latest, _)) = batch.iter().max_by_key(|(m, _)| m.created_at) else {
        return Ok(None);
    };

    let existing = repo.load_influencer(username, platform).await?;

    let followers = latest
        .source
        .author_followers()
        .or(existing.as_ref().map(|i| i.followers))
        .unwrap_or(0);

    let affinity = existing
        .as_ref()
        .and_then(|i| i.brand_affinity.clone())
        .or_else(|| dominant_brand(batch));

    #[allow(clippy::cast_precision_loss)]
    let avg_engagement =
        batch.iter().map(|(m, _)| m.engagement).sum::<i64>() as f64 / batch.len() as f64;

    let reach = follower_weight(followers, config.follower_reference);
    let engagement = engagement_weight(latest.engagement, avg_engagement);
    #[allow(clippy::cast_precision_loss)]
    let alignment = batch
        .iter()
        .map(|(m, s)| alignment_factor(s.polarity, affinity.as_deref(), &m.brand))
        .sum::<f64>()
        / batch.len() as f64;

    let impact_score = (config.reach_weight * reach
        + config.engagement_weight * engagement
        + config.alignment_weight * alignment)
        .clamp(0.0, 1.0);

    let influencer = Influencer {
        username: username.to_string(),
        platform: platform.to_string(),
        followers,
        impact_score,
        brand_affinity: affinity,
        last_updated: now,
    };
    repo.upsert_influencer(&influencer).await?;

    Ok(Some(influencer))
}

/// The brand this account mentioned most in the batch.
fn dominant_brand(batch: &[(Mention, SentimentScore)]) -> Option<String> {
    use std::collections::HashMap;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (mention, _) in batch {
        *counts.entry(mention.brand.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(brand, _)| brand.to_string())
}
