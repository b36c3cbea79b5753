//! Configuration module for Wall-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wall_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvesting {} groups", config.harvest.groups.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, HarvestConfig, LikeLookupKind, OutputConfig, PredictorConfig, RetryConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_env,
    load_config_with_hash, normalize_group_handle, parse_config, parse_group_list, GROUPS_ENV, TOKEN_ENV,
};

pub use validation::validate;
