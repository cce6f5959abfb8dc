//! Alert lifecycle: one state machine per brand, at most one active alert.
//!
//! The decision logic is a pure function over (active alert, verdict,
//! quiet streak); the async applier wraps it in the repository
//! read-modify-write, which callers must run under the brand's advisory
//! lock so "check active alert, then create/update" is effectively atomic.

use chrono::{DateTime, Utc};

use crisiswatch_core::{CrisisAlert, DetectionConfig};

use crate::anomaly::AnomalyVerdict;
use crate::error::EngineError;
use crate::repo::{NewAlert, Repository};
use crate::state::BrandState;

/// Planned transition for one brand in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertAction {
    /// No active alert and nothing to open.
    Stand,
    /// Open a new alert; the brand enters `active(new)`.
    Open { severity: f64, description: String },
    /// Raise the active alert to `max(current, severity)` and append the
    /// cause if distinct. Status is untouched — promotion to
    /// `investigating` is an operator action outside this loop.
    Escalate { severity: f64, cause: String },
    /// A quiet cycle, but not enough of them yet: hold the alert open.
    Hold { quiet_streak: u32 },
    /// The configured number of consecutive quiet cycles was reached.
    Resolve,
}

/// What actually happened to a brand's alert this cycle. `Opened` and
/// `Resolved` are the transitions a notifier collaborator fires on;
/// severity-only escalations stay quiet to avoid notification storms.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertChange {
    Unchanged,
    Opened(CrisisAlert),
    Escalated(CrisisAlert),
    Resolved(CrisisAlert),
}

/// Decide this cycle's transition for one brand.
///
/// A missing verdict (cold start or an empty window) counts as a quiet
/// cycle for an already-active alert: sustained silence is the crisis
/// subsiding, and the consecutive-quiet counter — not any single quiet
/// window — is what gates resolution.
#[must_use]
pub fn plan_transition(
    active: Option<&CrisisAlert>,
    verdict: Option<&AnomalyVerdict>,
    quiet_streak: u32,
    config: &DetectionConfig,
) -> AlertAction {
    let crisis = verdict.filter(|v| v.is_crisis(config));

    match (active, crisis) {
        (None, None) => AlertAction::Stand,
        (None, Some(v)) => AlertAction::Open {
            severity: v.severity,
            description: v.describe(),
        },
        (Some(_), Some(v)) => AlertAction::Escalate {
            severity: v.severity,
            cause: v
                .causes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        },
        (Some(_), None) => {
            let streak = quiet_streak + 1;
            if streak >= config.quiet_cycles_to_resolve {
                AlertAction::Resolve
            } else {
                AlertAction::Hold {
                    quiet_streak: streak,
                }
            }
        }
    }
}

/// Apply one cycle's verdict to a brand's alert state.
///
/// Must be called while holding the brand's advisory lock (the caller
/// owns the [`BrandState`] guard). Loads the active alert, plans the
/// transition, persists it, and updates the quiet streak.
///
/// # Errors
///
/// Returns [`EngineError::InvariantViolation`] if more than one active
/// alert exists for the brand — that must never happen and is surfaced
/// loudly rather than reconciled. Repository failures propagate as
/// [`EngineError::Repository`].
pub async fn apply_cycle_verdict<R: Repository>(
    repo: &R,
    brand: &str,
    verdict: Option<&AnomalyVerdict>,
    state: &mut BrandState,
    now: DateTime<Utc>,
    config: &DetectionConfig,
) -> Result<AlertChange, EngineError> {
    let mut active = repo.active_alerts(brand).await?;
    if active.len() > 1 {
        return Err(EngineError::InvariantViolation {
            brand: brand.to_string(),
            detail: format!("{} active alerts found, expected at most 1", active.len()),
        });
    }
    let active = active.pop();

    match plan_transition(active.as_ref(), verdict, state.quiet_streak, config) {
        AlertAction::Stand => {
            state.quiet_streak = 0;
            Ok(AlertChange::Unchanged)
        }
        AlertAction::Open {
            severity,
            description,
        } => {
            state.quiet_streak = 0;
            let alert = repo
                .insert_alert(&NewAlert {
                    brand: brand.to_string(),
                    description,
                    severity,
                    detected_at: now,
                })
                .await?;
            tracing::warn!(
                brand,
                severity,
                alert_id = alert.id,
                "crisis alert opened"
            );
            Ok(AlertChange::Opened(alert))
        }
        AlertAction::Escalate { severity, cause } => {
            state.quiet_streak = 0;
            let Some(mut alert) = active else {
                return Err(EngineError::InvariantViolation {
                    brand: brand.to_string(),
                    detail: "escalation planned without an active alert".to_string(),
                });
            };
            alert.escalate(severity, &cause);
            repo.update_alert(&alert).await?;
            tracing::info!(
                brand,
                severity = alert.severity,
                alert_id = alert.id,
                "crisis alert escalated"
            );
            Ok(AlertChange::Escalated(alert))
        }
        AlertAction::Hold { quiet_streak } => {
            state.quiet_streak = quiet_streak;
            tracing::debug!(brand, quiet_streak, "quiet cycle, alert held open");
            Ok(AlertChange::Unchanged)
        }
        AlertAction::Resolve => {
            state.quiet_streak = 0;
            let Some(mut alert) = active else {
                return Err(EngineError::InvariantViolation {
                    brand: brand.to_string(),
                    detail: "resolution planned without an active alert".to_string(),
                });
            };
            alert
                .resolve(now, None)
                .map_err(|e| EngineError::InvariantViolation {
                    brand: brand.to_string(),
                    detail: e.to_string(),
                })?;
            repo.update_alert(&alert).await?;
            tracing::info!(brand, alert_id = alert.id, "crisis alert resolved");
            Ok(AlertChange::Resolved(alert))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::Cause;
    use crisiswatch_core::AlertStatus;

    fn verdict(severity: f64) -> AnomalyVerdict {
        AnomalyVerdict {
            brand: "acme".to_string(),
            severity,
            volume_z: 0.5,
            negativity_z: 4.0,
            causes: vec![Cause::NegativitySpike],
        }
    }

    fn active_alert() -> CrisisAlert {
        CrisisAlert {
            id: 7,
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
    fn no_alert_and_quiet_verdict_stands() {
        let config = DetectionConfig::default();
        let action = plan_transition(None, Some(&verdict(0.2)), 0, &config);
        assert_eq!(action, AlertAction::Stand);
    }

    #[test]
    fn no_alert_and_crisis_opens() {
        let config = DetectionConfig::default();
        let action = plan_transition(None, Some(&verdict(0.9)), 0, &config);
        let AlertAction::Open {
            severity,
            description,
        } = action
        else {
            panic!("expected Open, got {action:?}");
        };
        assert!((severity - 0.9).abs() < f64::EPSILON);
        assert_eq!(description, "Potential brand crisis: negativity spike");
    }

    #[test]
    fn active_alert_and_crisis_escalates() {
        let config = DetectionConfig::default();
        let alert = active_alert();
        let action = plan_transition(Some(&alert), Some(&verdict(0.95)), 1, &config);
        assert!(matches!(action, AlertAction::Escalate { .. }));
    }

    #[test]
    fn single_quiet_cycle_holds() {
        let config = DetectionConfig::default(); // resolves after 3
        let alert = active_alert();
        let action = plan_transition(Some(&alert), Some(&verdict(0.1)), 0, &config);
        assert_eq!(action, AlertAction::Hold { quiet_streak: 1 });
    }

    #[test]
    fn resolves_only_after_configured_quiet_cycles() {
        let config = DetectionConfig::default();
        let alert = active_alert();

        // Streak of N-2 quiet cycles observed: one more quiet cycle is
        // still a hold (that makes N-1).
        let action = plan_transition(Some(&alert), None, 1, &config);
        assert_eq!(action, AlertAction::Hold { quiet_streak: 2 });

        // Streak of N-1: this quiet cycle is the Nth consecutive one.
        let action = plan_transition(Some(&alert), None, 2, &config);
        assert_eq!(action, AlertAction::Resolve);
    }

    #[test]
    fn missing_verdict_counts_as_quiet_for_active_alert() {
        let config = DetectionConfig::default();
        let alert = active_alert();
        let action = plan_transition(Some(&alert), None, 0, &config);
        assert_eq!(action, AlertAction::Hold { quiet_streak: 1 });
    }

    #[test]
    fn respike_resets_the_quiet_streak_via_escalate() {
        let config = DetectionConfig::default();
        let alert = active_alert();
        // Even with a long quiet streak, an above-threshold verdict
        // escalates rather than resolving.
        let action = plan_transition(Some(&alert), Some(&verdict(0.8)), 2, &config);
        assert!(matches!(action, AlertAction::Escalate { .. }));
    }
}
