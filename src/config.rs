// src/config.rs

//! Configuration loading utilities.
//!
//! TOML configuration lives in `data/config.toml` (see
//! [`crate::models::Config`]); credentials come from the environment and
//! are read here so no secret ever lands in a config file.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Environment variable holding the LeetCode session cookie.
pub const LEETCODE_SESSION_VAR: &str = "LEETCODE_SESSION";

/// Environment variable holding base64-encoded browser cookies for the
/// Codeforces source-fetching session.
pub const CODEFORCES_COOKIES_VAR: &str = "CODEFORCES_COOKIES_B64";

/// LeetCode session cookie, if configured.
pub fn leetcode_session() -> Option<String> {
    non_empty_env(LEETCODE_SESSION_VAR)
}

/// Base64-encoded Codeforces browser cookies, if configured.
pub fn codeforces_cookies() -> Option<String> {
    non_empty_env(CODEFORCES_COOKIES_VAR)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load configuration strictly (no default fallback) and validate it.
pub fn load_validated(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;
    Ok(config)
}
