use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a crisis alert.
///
/// The only legal transitions are `New -> Investigating`,
/// `New -> Resolved`, and `Investigating -> Resolved`. A resolved alert
/// never re-opens; a re-spike creates a new alert instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    New,
    Investigating,
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::New => write!(f, "new"),
            AlertStatus::Investigating => write!(f, "investigating"),
            AlertStatus::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(AlertStatus::New),
            "investigating" => Ok(AlertStatus::Investigating),
            "resolved" => Ok(AlertStatus::Resolved),
            other => Err(format!("unknown alert status: {other}")),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusTransitionError {
    #[error("alert is already resolved")]
    AlreadyResolved,

    #[error("only a new alert can be acknowledged (current status: {0})")]
    NotNew(AlertStatus),
}

/// A crisis alert record for one brand.
///
/// Created and mutated exclusively by the alert lifecycle manager (and
/// operator actions via [`CrisisAlert::acknowledge`] /
/// [`CrisisAlert::resolve`]); never deleted. At most one non-resolved
/// alert exists per brand at any instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisAlert {
    pub id: i64,
    pub brand: String,
    pub description: String,
    /// Severity in [0, 1]. Monotonically the maximum observed since
    /// creation until resolution.
    pub severity: f64,
    pub detected_at: DateTime<Utc>,
    pub status: AlertStatus,
    /// Set only on transition to resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
}

impl CrisisAlert {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != AlertStatus::Resolved
    }

    /// Raise severity to `max(current, severity)` and append `cause` to the
    /// description if not already present. Severity never decreases.
    pub fn escalate(&mut self, severity: f64, cause: &str) {
        if severity > self.severity {
            self.severity = severity;
        }
        if !cause.is_empty() && !self.description.contains(cause) {
            self.description.push_str("; ");
            self.description.push_str(cause);
        }
    }

    /// Operator action: promote a new alert to investigating.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::NotNew`] unless the alert is `new`.
    pub fn acknowledge(&mut self) -> Result<(), StatusTransitionError> {
        match self.status {
            AlertStatus::New => {
                self.status = AlertStatus::Investigating;
                Ok(())
            }
            other => Err(StatusTransitionError::NotNew(other)),
        }
    }

    /// Transition to resolved, setting `resolved_at` and optional notes.
    ///
    /// Reachable from both `new` and `investigating`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::AlreadyResolved`] if the alert has
    /// already been resolved.
    pub fn resolve(
        &mut self,
        at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<(), StatusTransitionError> {
        if self.status == AlertStatus::Resolved {
            return Err(StatusTransitionError::AlreadyResolved);
        }
        self.status = AlertStatus::Resolved;
        self.resolved_at = Some(at);
        self.resolution_notes = notes;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert() -> CrisisAlert {
        CrisisAlert {
            id: 1,
            brand: "acme".to_string(),
            description: "Potential brand crisis: negativity spike".to_string(),
            severity: 0.8,
            detected_at: Utc::now(),
            status: AlertStatus::New,
            resolved_at: None,
            resolution_notes: None,
        }
    }

    #[test]
    fn escalate_never_lowers_severity() {
        let mut a = alert();
        a.escalate(0.5, "volume spike");
        assert!((a.severity - 0.8).abs() < f64::EPSILON);
        a.escalate(0.95, "volume spike");
        assert!((a.severity - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn escalate_appends_distinct_cause_once() {
        let mut a = alert();
        a.escalate(0.9, "volume spike");
        a.escalate(0.9, "volume spike");
        assert_eq!(
            a.description,
            "Potential brand crisis: negativity spike; volume spike"
        );
    }

    #[test]
    fn escalate_skips_duplicate_cause() {
        let mut a = alert();
        a.escalate(0.9, "negativity spike");
        assert_eq!(a.description, "Potential brand crisis: negativity spike");
    }

    #[test]
    fn acknowledge_requires_new() {
        let mut a = alert();
        a.acknowledge().expect("new -> investigating");
        assert_eq!(a.status, AlertStatus::Investigating);
        assert_eq!(
            a.acknowledge(),
            Err(StatusTransitionError::NotNew(AlertStatus::Investigating))
        );
    }

    #[test]
    fn resolve_from_either_active_state() {
        let now = Utc::now();

        let mut from_new = alert();
        from_new.resolve(now, None).expect("new -> resolved");
        assert_eq!(from_new.status, AlertStatus::Resolved);
        assert_eq!(from_new.resolved_at, Some(now));

        let mut from_inv = alert();
        from_inv.acknowledge().expect("acknowledge");
        from_inv
            .resolve(now, Some("subsided".to_string()))
            .expect("investigating -> resolved");
        assert_eq!(from_inv.resolution_notes.as_deref(), Some("subsided"));
    }

    #[test]
    fn resolved_alert_cannot_resolve_again() {
        let mut a = alert();
        a.resolve(Utc::now(), None).expect("first resolve");
        assert_eq!(
            a.resolve(Utc::now(), None),
            Err(StatusTransitionError::AlreadyResolved)
        );
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            AlertStatus::New,
            AlertStatus::Investigating,
            AlertStatus::Resolved,
        ] {
            let parsed: AlertStatus = status.to_string().parse().expect("parse");
            assert_eq!(parsed, status);
        }
        assert!("escalated".parse::<AlertStatus>().is_err());
    }
}
