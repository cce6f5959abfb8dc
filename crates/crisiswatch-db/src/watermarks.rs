//! Database operations for the `evaluation_watermarks` table.
//!
//! The watermark is the last mention timestamp a brand's evaluation
//! committed. It only advances after a brand's cycle work fully
//! persists, so a failed cycle re-reads the same batch.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// The stored watermark for a brand, or `None` before the first cycle.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn load_watermark(
    pool: &PgPool,
    brand: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
    let row: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT watermark FROM evaluation_watermarks WHERE brand = $1")
            .bind(brand)
            .fetch_optional(pool)
            .await?;

    Ok(row)
}

/// Upsert the watermark for a brand.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn store_watermark(
    pool: &PgPool,
    brand: &str,
    watermark: DateTime<Utc>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO evaluation_watermarks (brand, watermark, updated_at) \
         VALUES ($1, $2, NOW()) \
         ON CONFLICT (brand) DO UPDATE SET \
           watermark = EXCLUDED.watermark, \
           updated_at = NOW()",
    )
    .bind(brand)
    .bind(watermark)
    .execute(pool)
    .await?;

    Ok(())
}
