//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// LeetCode adapter settings
    #[serde(default)]
    pub leetcode: LeetCodeConfig,

    /// Codeforces adapter settings
    #[serde(default)]
    pub codeforces: CodeforcesConfig,

    /// AtCoder adapter settings
    #[serde(default)]
    pub atcoder: AtCoderConfig,

    /// Output and index document settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Could not read config at {:?}: {}. Falling back to defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.leetcode.enabled && self.leetcode.username.trim().is_empty() {
            return Err(AppError::validation(
                "leetcode.username is required when leetcode is enabled",
            ));
        }
        if self.codeforces.enabled && self.codeforces.handle.trim().is_empty() {
            return Err(AppError::validation(
                "codeforces.handle is required when codeforces is enabled",
            ));
        }
        if self.atcoder.enabled && self.atcoder.username.trim().is_empty() {
            return Err(AppError::validation(
                "atcoder.username is required when atcoder is enabled",
            ));
        }
        if self.atcoder.lookback_secs == 0 {
            return Err(AppError::validation("atcoder.lookback_secs must be > 0"));
        }
        if self.output.root_dir.trim().is_empty() {
            return Err(AppError::validation("output.root_dir is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings shared by all adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between sequential problem-group fetches, in milliseconds
    #[serde(default = "defaults::request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout_secs(),
            request_delay_ms: defaults::request_delay_ms(),
        }
    }
}

/// LeetCode adapter settings.
///
/// The session cookie is read from the `LEETCODE_SESSION` environment
/// variable, never from this file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeetCodeConfig {
    #[serde(default)]
    pub enabled: bool,

    /// LeetCode username whose recent accepted submissions are listed
    #[serde(default)]
    pub username: String,

    /// Maximum recent submissions requested per run
    #[serde(default = "defaults::leetcode_limit")]
    pub recent_limit: u32,
}

/// Codeforces adapter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeforcesConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Codeforces handle whose status listing is fetched
    #[serde(default)]
    pub handle: String,

    /// Maximum submissions requested from user.status per run
    #[serde(default = "defaults::codeforces_count")]
    pub status_count: u32,
}

/// AtCoder adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtCoderConfig {
    #[serde(default)]
    pub enabled: bool,

    /// AtCoder username passed to the public submissions API
    #[serde(default)]
    pub username: String,

    /// Server-side trailing bound handed to the API (seconds before now)
    #[serde(default = "defaults::atcoder_lookback_secs")]
    pub lookback_secs: i64,
}

impl Default for AtCoderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            username: String::new(),
            lookback_secs: defaults::atcoder_lookback_secs(),
        }
    }
}

/// Output destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for rendered records and the index document
    #[serde(default = "defaults::root_dir")]
    pub root_dir: String,

    /// Index document file name relative to root_dir
    #[serde(default = "defaults::index_file")]
    pub index_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::root_dir(),
            index_file: defaults::index_file(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level: debug, info, warn, error
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Show per-platform progress details
    #[serde(default = "defaults::show_progress")]
    pub show_progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            show_progress: defaults::show_progress(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        format!("archiver/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout_secs() -> u64 {
        30
    }

    pub fn request_delay_ms() -> u64 {
        250
    }

    pub fn leetcode_limit() -> u32 {
        50
    }

    pub fn codeforces_count() -> u32 {
        100
    }

    pub fn atcoder_lookback_secs() -> i64 {
        24 * 60 * 60
    }

    pub fn root_dir() -> String {
        "archive".to_string()
    }

    pub fn index_file() -> String {
        "README.md".to_string()
    }

    pub fn log_level() -> String {
        "info".to_string()
    }

    pub fn show_progress() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enabled_platform_requires_identity() {
        let mut config = Config::default();
        config.leetcode.enabled = true;
        assert!(config.validate().is_err());

        config.leetcode.username = "someone".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [codeforces]
            enabled = true
            handle = "tourist"
            "#,
        )
        .unwrap();
        assert!(config.codeforces.enabled);
        assert_eq!(config.codeforces.handle, "tourist");
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.codeforces.status_count, 100);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
