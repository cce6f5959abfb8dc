use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked account and its current impact score.
///
/// Identity is the (username, platform) pair, never username alone.
/// Created on first sighting, updated in place afterwards, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Influencer {
    pub username: String,
    pub platform: String,
    pub followers: i64,
    /// Normalized impact score in [0, 1].
    pub impact_score: f64,
    /// Declared brand-affinity label, when known.
    pub brand_affinity: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influencer_serializes_identity_fields() {
        let inf = Influencer {
            username: "tech_reviewer_01".to_string(),
            platform: "social".to_string(),
            followers: 125_000,
            impact_score: 0.62,
            brand_affinity: Some("Apple".to_string()),
            last_updated: Utc::now(),
        };
        let json = serde_json::to_string(&inf).expect("serialize");
        assert!(json.contains("\"username\":\"tech_reviewer_01\""));
        assert!(json.contains("\"platform\":\"social\""));
    }
}
