// src/storage/local.rs

//! Local filesystem storage implementation.
//!
//! Records land under `<root>/<platform>/<problem_key>.md`; the archive
//! index lives at `<root>/<index_file>`. The index write enforces the same
//! optimistic version-token contract a remote host would, so conflict
//! handling is exercised identically in local runs and tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{AppError, Result};
use crate::models::SubmissionRecord;
use crate::storage::{content_token, IndexDocument, IndexStore, RecordSink};
use crate::utils::log;

/// Filesystem-backed record sink and index store.
pub struct LocalStorage {
    root: PathBuf,
    index_file: String,
}

impl LocalStorage {
    /// Create local storage rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.into(),
        }
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    async fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl RecordSink for LocalStorage {
    async fn publish(&self, record: &SubmissionRecord) -> Result<()> {
        let path = self.root.join(&record.destination_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &record.body).await?;
        log::debug(&format!("Wrote record to {}", path.display()));
        Ok(())
    }
}

#[async_trait]
impl IndexStore for LocalStorage {
    async fn fetch_index(&self) -> Result<Option<IndexDocument>> {
        let content = self.read_optional(&self.index_path()).await?;
        Ok(content.map(|content| {
            let token = content_token(&content);
            IndexDocument { content, token }
        }))
    }

    async fn write_index(&self, content: &str, token: Option<&str>) -> Result<()> {
        let path = self.index_path();
        let current = self.read_optional(&path).await?;

        match (&current, token) {
            (Some(existing), Some(token)) => {
                if content_token(existing) != token {
                    return Err(AppError::write_conflict(
                        "index document changed since it was read",
                    ));
                }
            }
            (Some(_), None) => {
                return Err(AppError::write_conflict(
                    "index document was created since it was read",
                ));
            }
            (None, Some(_)) => {
                return Err(AppError::write_conflict(
                    "index document was deleted since it was read",
                ));
            }
            (None, None) => {}
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn record(path: &str) -> SubmissionRecord {
        SubmissionRecord {
            platform: Platform::LeetCode,
            problem_key: "1-two-sum".to_string(),
            title: "Two Sum".to_string(),
            difficulty: "Easy".to_string(),
            metric_ms: 2,
            tags: vec![],
            problem_url: String::new(),
            submission_url: String::new(),
            destination_path: path.to_string(),
            body: "# Two Sum\n".to_string(),
            summary: String::new(),
        }
    }

    #[tokio::test]
    async fn test_publish_creates_nested_folders() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "README.md");

        storage.publish(&record("leetcode/1-two-sum.md")).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("leetcode/1-two-sum.md")).unwrap();
        assert_eq!(written, "# Two Sum\n");
    }

    #[tokio::test]
    async fn test_index_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "README.md");

        assert!(storage.fetch_index().await.unwrap().is_none());

        storage.write_index("# Coding Submissions\n", None).await.unwrap();

        let doc = storage.fetch_index().await.unwrap().unwrap();
        assert_eq!(doc.content, "# Coding Submissions\n");

        // A write with the fresh token succeeds
        storage
            .write_index("# Coding Submissions\n\nmore\n", Some(&doc.token))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stale_token_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "README.md");

        storage.write_index("v1\n", None).await.unwrap();
        let doc = storage.fetch_index().await.unwrap().unwrap();

        // Concurrent writer sneaks in
        storage.write_index("v2\n", Some(&doc.token)).await.unwrap();

        let result = storage.write_index("v3\n", Some(&doc.token)).await;
        assert!(matches!(result, Err(AppError::WriteConflict(_))));
    }

    #[tokio::test]
    async fn test_missing_token_for_existing_index_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "README.md");

        storage.write_index("v1\n", None).await.unwrap();
        let result = storage.write_index("v2\n", None).await;
        assert!(matches!(result, Err(AppError::WriteConflict(_))));
    }
}
