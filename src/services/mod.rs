// src/services/mod.rs

//! Platform adapter services.
//!
//! One adapter per judge, all behind the [`PlatformAdapter`] trait. Adapters
//! absorb their own failures: a broken detail fetch drops one submission, a
//! broken statement fetch degrades to a placeholder, and a broken listing
//! call empties the whole platform without touching the others.

pub mod atcoder;
pub mod browser;
pub mod codeforces;
pub mod leetcode;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CandidateSubmission, Platform};
use crate::pipeline::window::TimeWindow;

pub use atcoder::AtCoderAdapter;
pub use browser::{NoSession, SourceSession, SOURCE_UNAVAILABLE};
pub use codeforces::CodeforcesAdapter;
pub use leetcode::LeetCodeAdapter;

/// A source of accepted submissions for one judge.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// The judge this adapter talks to.
    fn platform(&self) -> Platform;

    /// Fetch detailed accepted submissions inside the target window.
    ///
    /// Returns an empty vec (after logging) when the top-level listing call
    /// fails or credentials are missing; errors are reserved for conditions
    /// the caller could meaningfully act on.
    async fn fetch_accepted(&self, window: &TimeWindow) -> Result<Vec<CandidateSubmission>>;
}
