//! Crisis detection and scoring engine for crisiswatch.
//!
//! One evaluation cycle per brand: bucket newly ingested mentions into the
//! current window, compare against the rolling baseline, score the anomaly,
//! and advance the alert lifecycle. Influencer impact scoring and
//! competitive benchmarking run on the same batch independently.
//!
//! The engine holds no storage of its own — everything durable goes
//! through the [`Repository`] trait, so the whole cycle is testable
//! against an in-memory fake.

pub mod aggregate;
pub mod alerts;
pub mod anomaly;
pub mod baseline;
pub mod benchmark;
pub mod cycle;
pub mod error;
pub mod influence;
pub mod repo;
pub mod state;

pub use aggregate::aggregate_window;
pub use alerts::{apply_cycle_verdict, plan_transition, AlertAction, AlertChange};
pub use anomaly::{score_window, AnomalyVerdict, Cause};
pub use baseline::{BaselineReading, BaselineState, BaselineStats};
pub use benchmark::run_benchmark;
pub use cycle::{run_cycle, CycleOutcome};
pub use error::EngineError;
pub use influence::score_influencer;
pub use repo::{NewAlert, PeriodAggregates, Repository};
pub use state::{BrandState, BrandStateStore};
