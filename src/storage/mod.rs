// src/storage/mod.rs

//! Storage abstractions for rendered records and the archive index.
//!
//! Rendered records are write-once documents; the archive index is the only
//! read-modify-write entity and is guarded by an optimistic version token
//! (content hash supplied at read time, required at write time). Concrete
//! remote destinations (a version-controlled file host, a document-database
//! page creator) implement these traits outside the core.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SubmissionRecord;

// Re-export for convenience
pub use local::LocalStorage;

/// A previously published archive index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDocument {
    /// Full document text
    pub content: String,
    /// Version token (content hash) required for the next write
    pub token: String,
}

/// Destination for finished submission records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one rendered record at its destination path.
    async fn publish(&self, record: &SubmissionRecord) -> Result<()>;
}

/// Versioned store for the archive index document.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Fetch the current index document, or `None` if never published.
    async fn fetch_index(&self) -> Result<Option<IndexDocument>>;

    /// Write the index document.
    ///
    /// `token` must match the version read by `fetch_index` (`None` when the
    /// document did not exist); a stale token fails with
    /// [`crate::error::AppError::WriteConflict`].
    async fn write_index(&self, content: &str, token: Option<&str>) -> Result<()>;
}

/// Compute the version token for an index document body.
pub fn content_token(content: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_token_is_stable() {
        assert_eq!(content_token("abc"), content_token("abc"));
        assert_ne!(content_token("abc"), content_token("abd"));
        assert_eq!(content_token("abc").len(), 64);
    }
}
