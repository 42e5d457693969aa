//! Submission data structures.

use serde::{Deserialize, Serialize};

use super::Platform;

/// A detailed accepted submission emitted by a platform adapter.
///
/// Carries everything the renderer needs; adapters are responsible for
/// filling degraded fields (placeholder statement, unknown difficulty,
/// empty tags) rather than dropping an otherwise valid submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateSubmission {
    /// Source judge
    pub platform: Platform,

    /// Platform-scoped problem identifier (contest+index, or id+slug)
    pub problem_key: String,

    /// Problem title
    pub title: String,

    /// Difficulty label or numeric rating ("Unknown" if unavailable)
    pub difficulty: String,

    /// Execution time in milliseconds, used as the dedup tie-break metric
    pub metric_ms: u64,

    /// Problem topic tags (may be empty)
    pub tags: Vec<String>,

    /// Absolute URL of the problem page
    pub problem_url: String,

    /// Absolute URL of the submission page
    pub submission_url: String,

    /// Handle of the submitting user
    pub author: String,

    /// Language name as reported by the judge
    pub language: String,

    /// Runtime display string (e.g. "12 ms")
    pub runtime: String,

    /// Memory display string (e.g. "41.2 MB")
    pub memory: String,

    /// Submission time, epoch seconds
    pub submitted_at: i64,

    /// Problem statement, already converted to markdown-ish text
    pub statement: String,

    /// Submitted source code (placeholder if unavailable)
    pub code: String,
}

/// A fully rendered submission, ready for downstream publishers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub platform: Platform,
    pub problem_key: String,
    pub title: String,
    pub difficulty: String,
    pub metric_ms: u64,
    pub tags: Vec<String>,
    pub problem_url: String,
    pub submission_url: String,

    /// Platform-scoped relative path: `<platform>/<problem_key>.md`
    pub destination_path: String,

    /// The complete markdown document
    pub body: String,

    /// Compact metadata string (e.g. "Time: 12 ms, Memory: 41.2 MB")
    pub summary: String,
}

impl SubmissionRecord {
    /// Rendered index link for this record.
    pub fn index_link(&self) -> String {
        format!("[{}]({})", self.title, self.destination_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_link() {
        let record = SubmissionRecord {
            platform: Platform::LeetCode,
            problem_key: "1-two-sum".to_string(),
            title: "Two Sum".to_string(),
            difficulty: "Easy".to_string(),
            metric_ms: 2,
            tags: vec!["array".to_string()],
            problem_url: "https://leetcode.com/problems/two-sum/".to_string(),
            submission_url: "https://leetcode.com/submissions/detail/1/".to_string(),
            destination_path: "leetcode/1-two-sum.md".to_string(),
            body: String::new(),
            summary: String::new(),
        };
        assert_eq!(record.index_link(), "[Two Sum](leetcode/1-two-sum.md)");
    }
}
