//! `seed` command: synthetic mentions and sentiment for local demos.
//!
//! Spreads plausible social-post and news-article mentions over the past
//! N hours for every brand in the registry, and can stack a negativity
//! spike into the most recent hour so a following `cycle` run opens an
//! alert.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use sqlx::PgPool;
use uuid::Uuid;

use crisiswatch_core::{Mention, SentimentScore, SourceDetails};

const AUTHORS: &[(&str, i64)] = &[
    ("tech_reviewer_01", 125_000),
    ("daily_gadget", 40_000),
    ("casual_user_9", 300),
    ("deal_hunter", 8_500),
    ("firmware_fan", 2_100),
];

const COMMUNITIES: &[&str] = &["gadgets", "technology", "deals", "android", "apple"];
const OUTLETS: &[&str] = &["Example Daily", "Tech Wire", "Market Watcher"];

pub(crate) async fn run(
    hours: i64,
    mentions_per_hour: i64,
    crisis_brand: Option<&str>,
) -> anyhow::Result<()> {
    anyhow::ensure!(hours > 0, "hours must be positive");
    anyhow::ensure!(mentions_per_hour > 0, "mentions-per-hour must be positive");

    let config = crisiswatch_core::load_app_config()?;
    let brands_file = crisiswatch_core::load_brands(&config.brands_path)?;

    if let Some(name) = crisis_brand {
        anyhow::ensure!(
            brands_file
                .brands
                .iter()
                .any(|b| b.name.eq_ignore_ascii_case(name)),
            "crisis brand '{name}' not found in brand registry"
        );
    }

    let pool_config = crisiswatch_db::PoolConfig::from_app_config(&config);
    let pool = crisiswatch_db::connect_pool(&config.database_url, pool_config).await?;
    crisiswatch_db::run_migrations(&pool).await?;

    let now = Utc::now();
    let mut total = 0_usize;
    let mut rng = StdRng::from_os_rng();

    for brand in &brands_file.brands {
        for hour in 0..hours {
            let count = rng.random_range(1..=mentions_per_hour * 2);
            for _ in 0..count {
                let at = now
                    - Duration::hours(hour)
                    - Duration::seconds(rng.random_range(0..3600));
                // Mildly positive steady state.
                let compound = rng.random_range(-0.3..0.6);
                insert_seeded_mention(&pool, &brand.name, at, compound, &mut rng).await?;
                total += 1;
            }
        }

        if crisis_brand.is_some_and(|name| brand.name.eq_ignore_ascii_case(name)) {
            // A burst of sharply negative mentions inside the last hour.
            for _ in 0..(mentions_per_hour * 4) {
                let at = now - Duration::seconds(rng.random_range(0..3000));
                let compound = rng.random_range(-0.95..-0.5);
                insert_seeded_mention(&pool, &brand.name, at, compound, &mut rng).await?;
                total += 1;
            }
            tracing::info!(brand = %brand.name, "seeded negativity spike in the last hour");
        }
    }

    println!(
        "seeded {total} mention(s) across {} brand(s) over the past {hours}h",
        brands_file.brands.len()
    );
    Ok(())
}

async fn insert_seeded_mention(
    pool: &PgPool,
    brand: &str,
    at: DateTime<Utc>,
    compound: f64,
    rng: &mut impl Rng,
) -> anyhow::Result<()> {
    let (author, followers) = *AUTHORS.choose(rng).expect("author pool is non-empty");

    let source = if rng.random_bool(0.8) {
        SourceDetails::SocialPost {
            community: COMMUNITIES.choose(rng).map(ToString::to_string),
            post_id: Some(format!("t3_{}", rng.random_range(10_000..99_999))),
            author_followers: Some(followers),
        }
    } else {
        SourceDetails::NewsArticle {
            title: Some(format!("{brand} in the news")),
            outlet: OUTLETS.choose(rng).map(ToString::to_string),
        }
    };

    let mention = Mention {
        id: Uuid::new_v4(),
        brand: brand.to_string(),
        content: format!("seeded mention about {brand}"),
        created_at: at,
        author: Some(author.to_string()),
        url: Some(format!("https://example.com/m/{}", rng.random_range(0..u32::MAX))),
        engagement: rng.random_range(0..80),
        source,
    };

    crisiswatch_db::insert_mention(pool, &mention).await?;

    // Component scores: split the non-dominant mass between the poles.
    let negative = if compound < 0.0 { -compound * 0.6 } else { 0.1 };
    let positive = if compound > 0.0 { compound * 0.6 } else { 0.1 };
    let neutral = (1.0 - negative - positive).max(0.0);

    let score = SentimentScore {
        polarity: compound,
        subjectivity: rng.random_range(0.2..0.9),
        compound,
        positive,
        negative,
        neutral,
        analyzed_at: at,
    };

    crisiswatch_db::insert_sentiment_score(pool, mention.id, &score).await?;
    Ok(())
}
