// src/models/mod.rs

//! Domain models for the archiver application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod platform;
mod submission;

// Re-export all public types
pub use config::{
    AtCoderConfig, CodeforcesConfig, Config, HttpConfig, LeetCodeConfig, LoggingConfig,
    OutputConfig,
};
pub use platform::Platform;
pub use submission::{CandidateSubmission, SubmissionRecord};
