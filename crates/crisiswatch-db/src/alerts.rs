//! Database operations for the `crisis_alerts` table.
//!
//! Status strings are constrained by a `CHECK` in the schema, and a
//! partial unique index backs the one-active-alert-per-brand invariant.
//! Transition updates guard on the expected current status and report a
//! typed error when zero rows match, mirroring the state machine in
//! `crisiswatch_core::alerts`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crisiswatch_core::{AlertStatus, CrisisAlert};

use crate::DbError;

/// A row from the `crisis_alerts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrisisAlertRow {
    pub id: i64,
    pub brand: String,
    pub description: String,
    pub severity: f64,
    pub detected_at: DateTime<Utc>,
    pub status: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
}

impl CrisisAlertRow {
    /// Convert to the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for an unknown status string. The
    /// schema `CHECK` constraint makes that unreachable in practice.
    pub fn into_domain(self) -> Result<CrisisAlert, DbError> {
        let status: AlertStatus = self.status.parse().map_err(|_| DbError::NotFound)?;
        Ok(CrisisAlert {
            id: self.id,
            brand: self.brand,
            description: self.description,
            severity: self.severity,
            detected_at: self.detected_at,
            status,
            resolved_at: self.resolved_at,
            resolution_notes: self.resolution_notes,
        })
    }
}

/// All non-resolved alerts for a brand. The partial unique index keeps
/// this at most one row; callers treat more as an invariant violation.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_alerts(pool: &PgPool, brand: &str) -> Result<Vec<CrisisAlertRow>, DbError> {
    let rows = sqlx::query_as::<_, CrisisAlertRow>(
        "SELECT id, brand, description, severity, detected_at, status, resolved_at, resolution_notes \
         FROM crisis_alerts \
         WHERE brand = $1 AND status <> 'resolved' \
         ORDER BY detected_at DESC, id DESC",
    )
    .bind(brand)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// All non-resolved alerts across every brand, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_all_active_alerts(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CrisisAlertRow>, DbError> {
    let rows = sqlx::query_as::<_, CrisisAlertRow>(
        "SELECT id, brand, description, severity, detected_at, status, resolved_at, resolution_notes \
         FROM crisis_alerts \
         WHERE status <> 'resolved' \
         ORDER BY detected_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count non-resolved alerts for a brand. Invariant probe.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_active_alerts(pool: &PgPool, brand: &str) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM crisis_alerts WHERE brand = $1 AND status <> 'resolved'",
    )
    .bind(brand)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Insert a new alert in `new` status and return the created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails — including the unique
/// partial index rejecting a second active alert for the brand.
pub async fn insert_alert(
    pool: &PgPool,
    brand: &str,
    description: &str,
    severity: f64,
    detected_at: DateTime<Utc>,
) -> Result<CrisisAlertRow, DbError> {
    let row = sqlx::query_as::<_, CrisisAlertRow>(
        "INSERT INTO crisis_alerts (brand, description, severity, detected_at, status) \
         VALUES ($1, $2, $3, $4, 'new') \
         RETURNING id, brand, description, severity, detected_at, status, resolved_at, resolution_notes",
    )
    .bind(brand)
    .bind(description)
    .bind(severity)
    .bind(detected_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Persist a full alert update (escalation or resolution) by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row with that id exists.
pub async fn update_alert(pool: &PgPool, alert: &CrisisAlert) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crisis_alerts \
         SET description = $1, severity = $2, status = $3, resolved_at = $4, resolution_notes = $5 \
         WHERE id = $6",
    )
    .bind(&alert.description)
    .bind(alert.severity)
    .bind(alert.status.to_string())
    .bind(alert.resolved_at)
    .bind(&alert.resolution_notes)
    .bind(alert.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Operator action: promote a `new` alert to `investigating`.
///
/// # Errors
///
/// Returns [`DbError::InvalidAlertTransition`] if the alert is not `new`.
pub async fn acknowledge_alert(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crisis_alerts SET status = 'investigating' WHERE id = $1 AND status = 'new'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidAlertTransition {
            id,
            expected_status: "new",
        });
    }

    Ok(())
}

/// Operator action: resolve an active alert with optional notes.
///
/// # Errors
///
/// Returns [`DbError::InvalidAlertTransition`] if the alert is already
/// resolved (or does not exist).
pub async fn resolve_alert(
    pool: &PgPool,
    id: i64,
    resolved_at: DateTime<Utc>,
    notes: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crisis_alerts \
         SET status = 'resolved', resolved_at = $1, resolution_notes = $2 \
         WHERE id = $3 AND status <> 'resolved'",
    )
    .bind(resolved_at)
    .bind(notes)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidAlertTransition {
            id,
            expected_status: "new or investigating",
        });
    }

    Ok(())
}

/// List alerts, optionally filtered by brand and status, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_alerts(
    pool: &PgPool,
    brand: Option<&str>,
    status: Option<AlertStatus>,
    limit: i64,
) -> Result<Vec<CrisisAlertRow>, DbError> {
    let rows = sqlx::query_as::<_, CrisisAlertRow>(
        "SELECT id, brand, description, severity, detected_at, status, resolved_at, resolution_notes \
         FROM crisis_alerts \
         WHERE ($1::text IS NULL OR brand = $1) \
           AND ($2::text IS NULL OR status = $2) \
         ORDER BY detected_at DESC, id DESC \
         LIMIT $3",
    )
    .bind(brand)
    .bind(status.map(|s| s.to_string()))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
