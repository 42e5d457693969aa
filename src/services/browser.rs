// src/services/browser.rs

//! Browser-automation collaborator interface.
//!
//! Some judges only expose submitted source behind an authenticated,
//! JavaScript-heavy page. Driving such a page is the job of an external
//! browser-automation session; the adapters only depend on this trait and
//! treat every failure as "source unavailable".

use async_trait::async_trait;

use crate::error::Result;

/// Placeholder emitted when the literal source could not be retrieved.
pub const SOURCE_UNAVAILABLE: &str = "(Source unavailable: login required)";

/// An authenticated page session able to extract submitted source code.
#[async_trait]
pub trait SourceSession: Send + Sync {
    /// Load a submission page and return its source text.
    ///
    /// `Ok(None)` means the session could not authenticate or the source
    /// element never appeared before the timeout; both are soft failures.
    async fn fetch_source(&self, submission_url: &str) -> Result<Option<String>>;
}

/// Session that never authenticates.
///
/// Used when no browser cookies are configured; every record gets the
/// source-unavailable placeholder instead of failing.
#[derive(Debug, Default)]
pub struct NoSession;

#[async_trait]
impl SourceSession for NoSession {
    async fn fetch_source(&self, _submission_url: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_session_yields_nothing() {
        let session = NoSession;
        let source = session
            .fetch_source("https://codeforces.com/contest/1/submission/1")
            .await
            .unwrap();
        assert!(source.is_none());
    }
}
