use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use url::Url;

/// Environment variable holding the access token
pub const TOKEN_ENV: &str = "VK_TOKEN";

/// Environment variable holding a comma separated list of group handles
pub const GROUPS_ENV: &str = "VK_GROUPS";

/// Loads and parses a configuration file from the given path
///
/// `VK_TOKEN` and `VK_GROUPS` from the process environment override the file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wall_harvester::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Groups: {:?}", config.harvest.groups);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Loads a configuration file using `lookup` in place of the process environment
pub fn load_config_with_env<F>(path: &Path, lookup: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;

    apply_env_overrides(&mut config, lookup);

    validate(&config)?;

    Ok(config)
}

/// Parses TOML content without validating it
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let mut config: Config = toml::from_str(content)?;
    config.harvest.groups = config
        .harvest
        .groups
        .iter()
        .map(|g| normalize_group_handle(g))
        .collect();
    Ok(config)
}

/// Applies token and group overrides from an environment lookup
///
/// Empty values are ignored so that a blank variable does not wipe out the
/// file's settings.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        config.api.token = token.trim().to_string();
    }

    if let Some(groups) = lookup(GROUPS_ENV) {
        let groups = parse_group_list(&groups);
        if !groups.is_empty() {
            config.harvest.groups = groups;
        }
    }
}

/// Splits a comma separated group list into normalized handles
pub fn parse_group_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_group_handle)
        .filter(|g| !g.is_empty())
        .collect()
}

/// Reduces a group reference to its bare handle
///
/// Accepts `apiclub`, `@apiclub`, `vk.com/apiclub` and full URLs such as
/// `https://vk.com/apiclub?w=wall-1_1`.
pub fn normalize_group_handle(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('@');

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else if trimmed.contains('/') {
        format!("https://{}", trimmed)
    } else {
        return trimmed.to_string();
    };

    match Url::parse(&with_scheme) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.find(|s| !s.is_empty()))
            .unwrap_or_default()
            .to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so that runs can be matched to the configuration that
/// produced them.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
