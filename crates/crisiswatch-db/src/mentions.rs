//! Database operations for the `mentions` and `sentiment_scores` tables.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crisiswatch_core::{Mention, SentimentScore, SourceDetails};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A mention row left-joined with its sentiment score, when present.
///
/// All sentiment columns are nullable as a block: `compound` being `NULL`
/// means the mention is still unscored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MentionWithSentimentRow {
    pub id: Uuid,
    pub brand: String,
    pub source: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub engagement: i64,
    pub title: Option<String>,
    pub community: Option<String>,
    pub post_id: Option<String>,
    pub outlet: Option<String>,
    pub author_followers: Option<i64>,
    pub polarity: Option<f64>,
    pub subjectivity: Option<f64>,
    pub compound: Option<f64>,
    pub positive: Option<f64>,
    pub negative: Option<f64>,
    pub neutral: Option<f64>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl MentionWithSentimentRow {
    /// Split into the domain pair. Unknown `source` discriminators map to
    /// a social post with no extras rather than failing the whole batch.
    #[must_use]
    pub fn into_pair(self) -> (Mention, Option<SentimentScore>) {
        let source = match self.source.as_str() {
            "news_article" => SourceDetails::NewsArticle {
                title: self.title,
                outlet: self.outlet,
            },
            _ => SourceDetails::SocialPost {
                community: self.community,
                post_id: self.post_id,
                author_followers: self.author_followers,
            },
        };

        let score = match (
            self.polarity,
            self.subjectivity,
            self.compound,
            self.positive,
            self.negative,
            self.neutral,
            self.analyzed_at,
        ) {
            (
                Some(polarity),
                Some(subjectivity),
                Some(compound),
                Some(positive),
                Some(negative),
                Some(neutral),
                Some(analyzed_at),
            ) => Some(SentimentScore {
                polarity,
                subjectivity,
                compound,
                positive,
                negative,
                neutral,
                analyzed_at,
            }),
            _ => None,
        };

        let mention = Mention {
            id: self.id,
            brand: self.brand,
            content: self.content,
            created_at: self.created_at,
            author: self.author,
            url: self.url,
            engagement: self.engagement,
            source,
        };

        (mention, score)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Mentions for one brand newer than the watermark, each with its
/// sentiment score when one has been written. Ordered by creation time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_new_scored(
    pool: &PgPool,
    brand: &str,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<MentionWithSentimentRow>, DbError> {
    let rows = sqlx::query_as::<_, MentionWithSentimentRow>(
        "SELECT m.id, m.brand, m.source, m.content, m.created_at, m.author, m.url, \
                m.engagement, m.title, m.community, m.post_id, m.outlet, m.author_followers, \
                s.polarity, s.subjectivity, s.compound, s.positive, s.negative, s.neutral, \
                s.analyzed_at \
         FROM mentions m \
         LEFT JOIN sentiment_scores s ON s.mention_id = m.id \
         WHERE m.brand = $1 AND ($2::timestamptz IS NULL OR m.created_at > $2) \
         ORDER BY m.created_at ASC, m.id ASC",
    )
    .bind(brand)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Insert a mention. Used by ingestion collaborators and demo seeding.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_mention(pool: &PgPool, mention: &Mention) -> Result<(), DbError> {
    let (title, community, post_id, outlet, author_followers) = match &mention.source {
        SourceDetails::SocialPost {
            community,
            post_id,
            author_followers,
        } => (
            None,
            community.as_deref(),
            post_id.as_deref(),
            None,
            *author_followers,
        ),
        SourceDetails::NewsArticle { title, outlet } => {
            (title.as_deref(), None, None, outlet.as_deref(), None)
        }
    };

    sqlx::query(
        "INSERT INTO mentions \
           (id, brand, source, content, created_at, author, url, engagement, \
            title, community, post_id, outlet, author_followers) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(mention.id)
    .bind(&mention.brand)
    .bind(mention.source.kind())
    .bind(&mention.content)
    .bind(mention.created_at)
    .bind(&mention.author)
    .bind(&mention.url)
    .bind(mention.engagement)
    .bind(title)
    .bind(community)
    .bind(post_id)
    .bind(outlet)
    .bind(author_followers)
    .execute(pool)
    .await?;

    Ok(())
}

/// Attach a sentiment score to a mention. The `UNIQUE (mention_id)`
/// constraint enforces the 1:1 invariant; scores are never overwritten.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a second
/// score for the same mention).
pub async fn insert_sentiment_score(
    pool: &PgPool,
    mention_id: Uuid,
    score: &SentimentScore,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO sentiment_scores \
           (mention_id, polarity, subjectivity, compound, positive, negative, neutral, analyzed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(mention_id)
    .bind(score.polarity)
    .bind(score.subjectivity)
    .bind(score.compound)
    .bind(score.positive)
    .bind(score.negative)
    .bind(score.neutral)
    .bind(score.analyzed_at)
    .execute(pool)
    .await?;

    Ok(())
}
