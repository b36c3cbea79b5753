//! Wall-Harvester: a rate-limit tolerant wall and comment collector
//!
//! This crate walks public group walls on a VK-style JSON API, collects posts,
//! keeps the ones that read like questions, and enriches their comment threads
//! with author profiles and like counts before writing everything to CSV.

pub mod api;
pub mod config;
pub mod harvest;
pub mod output;
pub mod predictor;
pub mod records;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] api::ApiError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid group handle: {0}")]
    InvalidHandle(String),

    #[error("Invalid date '{0}', expected DD-MM-YYYY")]
    InvalidDate(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{ApiClient, RetryPolicy};
pub use config::Config;
pub use harvest::{HarvestReport, Harvester, LikeLookup, PostLimit};
pub use predictor::{AcceptAll, HeuristicPredictor, QuestionPredictor};
pub use records::{Comment, Post, Sex};
