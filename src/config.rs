use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str =
    "https://draw.ar-lottery01.com/WinGo/WinGo_1M/GetHistoryIssuePage.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// History endpoint of the draw feed
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Hard request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Newest entries requested per poll
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Append a `ts=<unix millis>` query parameter to defeat caches
    #[serde(default = "default_true")]
    pub cache_bust: bool,
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: default_timeout_secs(),
            fetch_limit: default_fetch_limit(),
            user_agent: default_user_agent(),
            cache_bust: true,
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_fetch_limit() -> usize {
    10
}

fn default_user_agent() -> String {
    concat!("wingo/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// JSON file holding the persisted history
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
    /// Maximum number of draws retained
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
            capacity: default_capacity(),
        }
    }
}

fn default_history_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("wingo"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("results_history.json")
}

fn default_capacity() -> usize {
    5000
}

/// Thresholds and weights of the trend scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Numbers at or above this are Big
    #[serde(default = "default_big_threshold")]
    pub big_threshold: u8,
    /// Mean absolute gap at or above this votes Big
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: f64,
    /// Newest records considered per prediction
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_alternation_min_records")]
    pub alternation_min_records: usize,
    #[serde(default)]
    pub weights: HintWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            big_threshold: default_big_threshold(),
            gap_threshold: default_gap_threshold(),
            window: default_window(),
            alternation_min_records: default_alternation_min_records(),
            weights: HintWeights::default(),
        }
    }
}

fn default_big_threshold() -> u8 {
    crate::domain::DEFAULT_BIG_THRESHOLD
}

fn default_gap_threshold() -> f64 {
    5.0
}

fn default_window() -> usize {
    10
}

fn default_alternation_min_records() -> usize {
    4
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintWeights {
    #[serde(default = "weight_two")]
    pub color_cycle: u32,
    #[serde(default = "weight_one")]
    pub alternation: u32,
    #[serde(default = "weight_two")]
    pub issue_parity: u32,
    #[serde(default = "weight_one")]
    pub gap: u32,
}

impl Default for HintWeights {
    fn default() -> Self {
        Self {
            color_cycle: 2,
            alternation: 1,
            issue_parity: 2,
            gap: 1,
        }
    }
}

fn weight_one() -> u32 {
    1
}

fn weight_two() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Delay between successful polls
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Delay after a failed poll
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_backoff_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Draws included in the dashboard snapshot
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_recent_limit() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rotated log files
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("WINGO_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (WINGO_FEED__URL, etc.)
            .add_source(
                Environment::with_prefix("WINGO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.feed.url.trim().is_empty() {
            errors.push("feed.url must not be empty".to_string());
        }

        if self.feed.fetch_limit == 0 {
            errors.push("feed.fetch_limit must be positive".to_string());
        }

        if self.feed.timeout_secs == 0 {
            errors.push("feed.timeout_secs must be positive".to_string());
        }

        if self.history.capacity == 0 {
            errors.push("history.capacity must be positive".to_string());
        }

        if !(1..=9).contains(&self.scoring.big_threshold) {
            errors.push(format!(
                "scoring.big_threshold must be within 1..=9, got {}",
                self.scoring.big_threshold
            ));
        }

        if self.scoring.window == 0 {
            errors.push("scoring.window must be positive".to_string());
        }

        if !self.scoring.gap_threshold.is_finite() || self.scoring.gap_threshold < 0.0 {
            errors.push("scoring.gap_threshold must be a non-negative number".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
