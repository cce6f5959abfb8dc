//! Offline unit tests for crisiswatch-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use chrono::Utc;
use crisiswatch_core::{AlertStatus, AppConfig, Environment};
use crisiswatch_db::{CrisisAlertRow, MentionWithSentimentRow, PoolConfig, WindowStatsRow};
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        brands_path: PathBuf::from("./config/brands.yaml"),
        evaluation_cron: "0 */15 * * * *".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm the left-joined mention row converts
/// to a (Mention, Some(score)) pair when all sentiment columns are set.
#[test]
fn mention_row_with_sentiment_converts_to_scored_pair() {
    let row = MentionWithSentimentRow {
        id: Uuid::new_v4(),
        brand: "Apple".to_string(),
        source: "social_post".to_string(),
        content: "battery drains fast".to_string(),
        created_at: Utc::now(),
        author: Some("tech_reviewer_01".to_string()),
        url: Some("https://example.com/p/1".to_string()),
        engagement: 42,
        title: None,
        community: Some("gadgets".to_string()),
        post_id: Some("t3_abc".to_string()),
        outlet: None,
        author_followers: Some(125_000),
        polarity: Some(-0.4),
        subjectivity: Some(0.6),
        compound: Some(-0.5),
        positive: Some(0.1),
        negative: Some(0.6),
        neutral: Some(0.3),
        analyzed_at: Some(Utc::now()),
    };

    let (mention, score) = row.into_pair();
    assert_eq!(mention.brand, "Apple");
    assert_eq!(mention.source.kind(), "social_post");
    assert_eq!(mention.source.author_followers(), Some(125_000));
    let score = score.expect("all sentiment columns set");
    assert!((score.compound - (-0.5)).abs() < f64::EPSILON);
}

/// A row with NULL sentiment columns yields an unscored pair — the
/// mention is retained, the score is absent.
#[test]
fn mention_row_without_sentiment_converts_to_unscored_pair() {
    let row = MentionWithSentimentRow {
        id: Uuid::new_v4(),
        brand: "Apple".to_string(),
        source: "news_article".to_string(),
        content: "product launch coverage".to_string(),
        created_at: Utc::now(),
        author: None,
        url: None,
        engagement: 0,
        title: Some("Launch day".to_string()),
        community: None,
        post_id: None,
        outlet: Some("Example Daily".to_string()),
        author_followers: None,
        polarity: None,
        subjectivity: None,
        compound: None,
        positive: None,
        negative: None,
        neutral: None,
        analyzed_at: None,
    };

    let (mention, score) = row.into_pair();
    assert_eq!(mention.source.kind(), "news_article");
    assert!(score.is_none());
}

#[test]
fn alert_row_converts_status_string() {
    let row = CrisisAlertRow {
        id: 7,
        brand: "Apple".to_string(),
        description: "Potential brand crisis: negativity spike".to_string(),
        severity: 0.9,
        detected_at: Utc::now(),
        status: "investigating".to_string(),
        resolved_at: None,
        resolution_notes: None,
    };

    let alert = row.into_domain().expect("valid status");
    assert_eq!(alert.status, AlertStatus::Investigating);
    assert!(alert.is_active());
}

#[test]
fn alert_row_rejects_unknown_status() {
    let row = CrisisAlertRow {
        id: 8,
        brand: "Apple".to_string(),
        description: "desc".to_string(),
        severity: 0.5,
        detected_at: Utc::now(),
        status: "escalated".to_string(),
        resolved_at: None,
        resolution_notes: None,
    };

    assert!(row.into_domain().is_err());
}

#[test]
fn window_stats_row_round_trips_no_data_markers() {
    let now = Utc::now();
    let row = WindowStatsRow {
        id: 1,
        brand: "Apple".to_string(),
        window_start: now - chrono::Duration::hours(1),
        window_end: now,
        mention_count: 0,
        mean_compound: None,
        negative_fraction: None,
        total_engagement: 0,
        unscored_count: 3,
        created_at: now,
    };

    let stats = row.into_domain();
    assert!(!stats.has_data());
    assert_eq!(stats.mean_compound, None);
    assert_eq!(stats.unscored_count, 3);
}
