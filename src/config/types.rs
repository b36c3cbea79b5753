use crate::api::{RetryPolicy, DEFAULT_API_URL, DEFAULT_API_VERSION};
use crate::harvest::normalize::{parse_cutoff_date, DateNormalizer, DEFAULT_UTC_OFFSET_HOURS};
use crate::harvest::{HarvestSettings, LikeLookup, PostLimit, MAX_EXECUTE_CALLS};
use crate::predictor::DEFAULT_THRESHOLD;
use crate::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Wall-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// API access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Access token (the `VK_TOKEN` environment variable takes precedence)
    #[serde(default)]
    pub token: String,

    /// Root URL that method names are appended to
    #[serde(rename = "api-url", default = "default_api_url")]
    pub api_url: String,

    /// Protocol version sent with every call
    #[serde(default = "default_api_version")]
    pub version: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            version: default_api_version(),
        }
    }
}

/// How like counts are looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LikeLookupKind {
    #[default]
    PerItem,
    Batched,
    Inline,
}

/// Harvest scope and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Group handles to walk (the `VK_GROUPS` environment variable takes precedence)
    #[serde(default)]
    pub groups: Vec<String>,

    /// Posts collected per group when no cutoff date is set
    #[serde(rename = "max-posts", default = "default_max_posts")]
    pub max_posts: usize,

    /// Collect posts published on or after this day (`DD-MM-YYYY`)
    #[serde(rename = "until-date", default)]
    pub until_date: Option<String>,

    /// Comments requested per post (at most one page)
    #[serde(rename = "max-comments", default = "default_max_comments")]
    pub max_comments: usize,

    /// Pause between wall pages (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Offset of displayed dates from UTC, in hours
    #[serde(rename = "utc-offset-hours", default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Pass over pinned posts older than `until-date` instead of stopping there
    #[serde(rename = "skip-old-pinned", default)]
    pub skip_old_pinned: bool,

    #[serde(rename = "like-lookup", default)]
    pub like_lookup: LikeLookupKind,

    /// Lookups per `execute` call for the batched strategy
    #[serde(rename = "like-batch-size", default = "default_like_batch_size")]
    pub like_batch_size: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            max_posts: default_max_posts(),
            until_date: None,
            max_comments: default_max_comments(),
            page_delay_ms: default_page_delay_ms(),
            utc_offset_hours: default_utc_offset_hours(),
            skip_old_pinned: false,
            like_lookup: LikeLookupKind::default(),
            like_batch_size: default_like_batch_size(),
        }
    }
}

impl HarvestConfig {
    /// The pager mode: a cutoff date when set, otherwise the post count
    pub fn post_limit(&self) -> Result<PostLimit, ConfigError> {
        match &self.until_date {
            Some(raw) => parse_cutoff_date(raw)
                .map(PostLimit::Since)
                .ok_or_else(|| ConfigError::InvalidDate(raw.clone())),
            None => Ok(PostLimit::Count(self.max_posts)),
        }
    }

    pub fn like_lookup(&self) -> LikeLookup {
        match self.like_lookup {
            LikeLookupKind::PerItem => LikeLookup::PerItem,
            LikeLookupKind::Batched => LikeLookup::Batched {
                batch_size: self.like_batch_size,
            },
            LikeLookupKind::Inline => LikeLookup::Inline,
        }
    }

    /// Converts this section into run settings
    pub fn settings(&self) -> Result<HarvestSettings, ConfigError> {
        Ok(HarvestSettings {
            limit: self.post_limit()?,
            max_comments: self.max_comments,
            page_delay: Duration::from_millis(self.page_delay_ms),
            likes: self.like_lookup(),
            dates: DateNormalizer::with_offset_hours(self.utc_offset_hours),
            skip_old_pinned: self.skip_old_pinned,
        })
    }
}

/// Retry behavior for rate-limited calls
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Requests per call including the first (0 retries forever)
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_jitter")]
    pub jitter: bool,

    /// Deadline for one call including retries (0 disables it)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
            jitter: self.jitter,
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

/// Question filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PredictorConfig {
    /// Minimum score for a post to count as a question
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the CSV files are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,

    #[serde(rename = "posts-file", default = "default_posts_file")]
    pub posts_file: String,

    #[serde(rename = "comments-file", default = "default_comments_file")]
    pub comments_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            posts_file: default_posts_file(),
            comments_file: default_comments_file(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_max_posts() -> usize {
    100
}

fn default_max_comments() -> usize {
    100
}

fn default_page_delay_ms() -> u64 {
    100
}

fn default_utc_offset_hours() -> i32 {
    DEFAULT_UTC_OFFSET_HOURS
}

fn default_like_batch_size() -> usize {
    MAX_EXECUTE_CALLS
}

fn default_max_attempts() -> u32 {
    10
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_posts_file() -> String {
    "questions.csv".to_string()
}

fn default_comments_file() -> String {
    "comments.csv".to_string()
}
