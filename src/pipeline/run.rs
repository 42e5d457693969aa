// src/pipeline/run.rs

//! Full archiving pipeline.
//!
//! Platforms are processed sequentially (third-party rate limits, and the
//! browser-automation session handles one page at a time); within each
//! platform the adapter's own group-level concurrency applies. The index
//! merge runs last and is the only stage allowed to fail the run.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{Config, Platform, SubmissionRecord};
use crate::pipeline::window::TimeWindow;
use crate::pipeline::{index, render, select};
use crate::services::{
    AtCoderAdapter, CodeforcesAdapter, LeetCodeAdapter, PlatformAdapter, SourceSession,
};
use crate::storage::{IndexStore, LocalStorage, RecordSink};
use crate::utils::log;

/// Attempts for the optimistic index write before the conflict is fatal.
const MAX_INDEX_WRITE_ATTEMPTS: usize = 3;

/// What one run produced.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub records: Vec<SubmissionRecord>,
    pub platform_counts: Vec<(Platform, usize)>,
}

/// Run the full pipeline: fetch, select, render, publish, merge index.
pub async fn run_pipeline(
    config: &Config,
    source_session: Arc<dyn SourceSession>,
    dry_run: bool,
) -> Result<RunOutcome> {
    log::header("Submission archiver");

    let window = TimeWindow::yesterday();
    log::info(&format!("Target day: {}", window.day()));

    let adapters = build_adapters(config, source_session)?;
    if adapters.is_empty() {
        log::warn("No platforms enabled, nothing to do");
        return Ok(RunOutcome::default());
    }

    let total_steps = if dry_run { 1 } else { 3 };
    log::step(1, total_steps, "Fetch - Collecting accepted submissions");

    let delay = Duration::from_millis(config.http.request_delay_ms);
    let mut outcome = RunOutcome::default();
    for adapter in &adapters {
        let records = run_platform(adapter.as_ref(), &window).await;
        outcome
            .platform_counts
            .push((adapter.platform(), records.len()));
        outcome.records.extend(records);

        if delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }
    }

    let summary_items: Vec<(&str, String)> = outcome
        .platform_counts
        .iter()
        .map(|(platform, count)| (platform.section_name(), count.to_string()))
        .collect();
    log::summary("Records per platform", &summary_items);

    if dry_run {
        log::success("Dry run: skipping publish and index merge");
        return Ok(outcome);
    }

    let storage = LocalStorage::new(
        config.output.root_dir.as_str(),
        config.output.index_file.clone(),
    );

    log::step(2, total_steps, "Publish - Writing rendered records");
    for record in &outcome.records {
        storage.publish(record).await?;
        if config.logging.show_progress {
            log::sub_item(&record.destination_path);
        }
    }

    log::step(3, total_steps, "Index - Merging archive index");
    publish_index(&storage, &outcome.records).await?;

    log::success(&format!(
        "Archived {} submission(s)",
        outcome.records.len()
    ));
    Ok(outcome)
}

/// Fetch, select and render one platform's records.
///
/// Any failure here is scoped to the platform: it logs and contributes
/// zero records instead of aborting the run.
pub async fn run_platform(
    adapter: &dyn PlatformAdapter,
    window: &TimeWindow,
) -> Vec<SubmissionRecord> {
    let candidates = match adapter.fetch_accepted(window).await {
        Ok(candidates) => candidates,
        Err(error) => {
            log::error(&format!(
                "{} fetch failed: {}",
                adapter.platform(),
                error
            ));
            return Vec::new();
        }
    };

    select::select_best(candidates)
        .into_iter()
        .map(render::render)
        .collect()
}

/// Merge records into the stored index with a bounded retry on conflict.
///
/// Each attempt re-reads the document and re-runs the merge from fresh
/// state; after the final attempt the conflict surfaces as the run's error.
pub async fn publish_index(
    store: &dyn IndexStore,
    records: &[SubmissionRecord],
) -> Result<String> {
    let mut last_conflict = String::new();

    for attempt in 1..=MAX_INDEX_WRITE_ATTEMPTS {
        let existing = store.fetch_index().await?;
        let (old_content, token) = match &existing {
            Some(doc) => (doc.content.as_str(), Some(doc.token.as_str())),
            None => ("", None),
        };

        let merged = index::merge(old_content, records);
        match store.write_index(&merged, token).await {
            Ok(()) => return Ok(merged),
            Err(AppError::WriteConflict(message)) => {
                log::warn(&format!(
                    "Index write conflict (attempt {}/{}): {}",
                    attempt, MAX_INDEX_WRITE_ATTEMPTS, message
                ));
                last_conflict = message;
            }
            Err(error) => return Err(error),
        }
    }

    Err(AppError::write_conflict(last_conflict))
}

/// Instantiate adapters for every enabled platform.
fn build_adapters(
    config: &Config,
    source_session: Arc<dyn SourceSession>,
) -> Result<Vec<Box<dyn PlatformAdapter>>> {
    let mut adapters: Vec<Box<dyn PlatformAdapter>> = Vec::new();

    if config.leetcode.enabled {
        adapters.push(Box::new(LeetCodeAdapter::new(
            config.leetcode.clone(),
            &config.http,
            crate::config::leetcode_session(),
        )?));
    }
    if config.codeforces.enabled {
        if crate::config::codeforces_cookies().is_none() {
            log::warn("Codeforces browser cookies not set, submitted source will be unavailable");
        }
        adapters.push(Box::new(CodeforcesAdapter::new(
            config.codeforces.clone(),
            &config.http,
            source_session,
        )?));
    }
    if config.atcoder.enabled {
        adapters.push(Box::new(AtCoderAdapter::new(
            config.atcoder.clone(),
            &config.http,
        )?));
    }

    Ok(adapters)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::Platform;
    use crate::storage::{content_token, IndexDocument};

    /// In-memory index store that simulates a concurrent writer for the
    /// first `conflicts` write attempts.
    struct FlakyStore {
        state: Mutex<FlakyState>,
    }

    struct FlakyState {
        content: Option<String>,
        conflicts: usize,
        writes: usize,
    }

    impl FlakyStore {
        fn new(conflicts: usize) -> Self {
            Self {
                state: Mutex::new(FlakyState {
                    content: None,
                    conflicts,
                    writes: 0,
                }),
            }
        }
    }

    #[async_trait]
    impl IndexStore for FlakyStore {
        async fn fetch_index(&self) -> Result<Option<IndexDocument>> {
            let state = self.state.lock().unwrap();
            Ok(state.content.clone().map(|content| {
                let token = content_token(&content);
                IndexDocument { content, token }
            }))
        }

        async fn write_index(&self, content: &str, _token: Option<&str>) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.writes += 1;
            if state.conflicts > 0 {
                state.conflicts -= 1;
                return Err(AppError::write_conflict("simulated concurrent writer"));
            }
            state.content = Some(content.to_string());
            Ok(())
        }
    }

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            platform: Platform::LeetCode,
            problem_key: "1-two-sum".to_string(),
            title: "Two Sum".to_string(),
            difficulty: "Easy".to_string(),
            metric_ms: 2,
            tags: vec!["array".to_string()],
            problem_url: String::new(),
            submission_url: String::new(),
            destination_path: "leetcode/1-two-sum.md".to_string(),
            body: String::new(),
            summary: String::new(),
        }
    }

    #[tokio::test]
    async fn test_publish_index_retries_then_succeeds() {
        let store = FlakyStore::new(2);
        let merged = publish_index(&store, &[record()]).await.unwrap();

        assert!(merged.contains("[Two Sum](leetcode/1-two-sum.md)"));
        assert_eq!(store.state.lock().unwrap().writes, 3);
    }

    #[tokio::test]
    async fn test_publish_index_conflict_is_fatal_after_retries() {
        let store = FlakyStore::new(MAX_INDEX_WRITE_ATTEMPTS);
        let result = publish_index(&store, &[record()]).await;

        assert!(matches!(result, Err(AppError::WriteConflict(_))));
        assert!(store.state.lock().unwrap().content.is_none());
    }
}
