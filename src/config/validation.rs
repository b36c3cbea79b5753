use crate::config::types::{ApiConfig, Config, HarvestConfig, OutputConfig, PredictorConfig, RetryConfig};
use crate::harvest::normalize::parse_cutoff_date;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_harvest_config(&config.harvest)?;
    validate_retry_config(&config.retry)?;
    validate_predictor_config(&config.predictor)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API access configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "token cannot be empty (set [api] token or VK_TOKEN)".to_string(),
        ));
    }

    let url = Url::parse(&config.api_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "api-url '{}' must use http or https",
            config.api_url
        )));
    }

    if config.version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates harvest scope and pacing
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.groups.is_empty() {
        return Err(ConfigError::Validation(
            "at least one group is required (set [harvest] groups or VK_GROUPS)".to_string(),
        ));
    }

    for group in &config.groups {
        validate_group_handle(group)?;
    }

    if let Some(raw) = &config.until_date {
        if parse_cutoff_date(raw).is_none() {
            return Err(ConfigError::InvalidDate(raw.clone()));
        }
    }

    if config.max_comments < 1 {
        return Err(ConfigError::Validation(format!(
            "max-comments must be >= 1, got {}",
            config.max_comments
        )));
    }

    if !(-12..=14).contains(&config.utc_offset_hours) {
        return Err(ConfigError::Validation(format!(
            "utc-offset-hours must be between -12 and 14, got {}",
            config.utc_offset_hours
        )));
    }

    if config.like_batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "like-batch-size must be >= 1, got {}",
            config.like_batch_size
        )));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if !config.multiplier.is_finite() || config.multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "multiplier must be >= 1.0, got {}",
            config.multiplier
        )));
    }

    if config.base_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "base-delay-ms ({}) cannot exceed max-delay-ms ({})",
            config.base_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates question filter configuration
fn validate_predictor_config(config: &PredictorConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.threshold) {
        return Err(ConfigError::Validation(format!(
            "threshold must be between 0.0 and 1.0, got {}",
            config.threshold
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "directory cannot be empty".to_string(),
        ));
    }

    if config.posts_file.is_empty() {
        return Err(ConfigError::Validation(
            "posts-file cannot be empty".to_string(),
        ));
    }

    if config.comments_file.is_empty() {
        return Err(ConfigError::Validation(
            "comments-file cannot be empty".to_string(),
        ));
    }

    if config.posts_file == config.comments_file {
        return Err(ConfigError::Validation(format!(
            "posts-file and comments-file cannot both be '{}'",
            config.posts_file
        )));
    }

    Ok(())
}

/// Validates a bare group handle
///
/// Handles are short names such as `apiclub` or numeric aliases such as
/// `club1`: ASCII letters, digits, underscores and dots.
fn validate_group_handle(handle: &str) -> Result<(), ConfigError> {
    if handle.is_empty() {
        return Err(ConfigError::InvalidHandle(
            "Group handle cannot be empty".to_string(),
        ));
    }

    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(ConfigError::InvalidHandle(format!(
            "Group handle '{}' contains invalid characters",
            handle
        )));
    }

    if handle.starts_with('.') || handle.ends_with('.') {
        return Err(ConfigError::InvalidHandle(format!(
            "Group handle '{}' cannot start or end with '.'",
            handle
        )));
    }

    Ok(())
}
