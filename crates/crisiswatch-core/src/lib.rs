//! Shared configuration and domain model for crisiswatch.
//!
//! Holds the env-driven application config, the detection tunables, the
//! YAML brand registry, and the record types shared by the engine, the
//! database layer, and the server: mentions, sentiment scores, window
//! statistics, crisis alerts, influencers, and competitive metrics.

use thiserror::Error;

pub mod alerts;
pub mod app_config;
pub mod brands;
pub mod competitive;
pub mod config;
pub mod detection;
pub mod influencers;
pub mod mentions;
pub mod windows;

pub use alerts::{AlertStatus, CrisisAlert, StatusTransitionError};
pub use app_config::{AppConfig, Environment};
pub use brands::{load_brands, BrandConfig, BrandsFile};
pub use competitive::CompetitiveMetric;
pub use config::{load_app_config, load_app_config_from_env};
pub use detection::DetectionConfig;
pub use influencers::Influencer;
pub use mentions::{Mention, SentimentScore, SourceDetails};
pub use windows::{TimeWindow, WindowStats};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
