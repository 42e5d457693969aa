// src/error.rs

//! Error type shared across adapters, pipeline and storage.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// One judge's listing or detail call failed.
    #[error("Fetch error for {platform}: {message}")]
    Fetch { platform: String, message: String },

    /// The archive index changed underneath us (stale version token).
    #[error("Index write conflict: {0}")]
    WriteConflict(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn fetch(platform: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            platform: platform.into(),
            message: message.to_string(),
        }
    }

    pub fn write_conflict(message: impl Into<String>) -> Self {
        Self::WriteConflict(message.into())
    }
}
