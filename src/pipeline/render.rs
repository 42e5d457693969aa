// src/pipeline/render.rs

//! Record rendering.
//!
//! Turns a selected candidate into the final markdown document and the
//! compact metadata summary handed to downstream publishers. Pure: no
//! network access, no mutable state.

use chrono::{Local, TimeZone};

use crate::models::{CandidateSubmission, SubmissionRecord};

/// Render a candidate into a finished submission record.
pub fn render(candidate: CandidateSubmission) -> SubmissionRecord {
    let submitted_at = format_timestamp(candidate.submitted_at);
    let fence = fence_language(&candidate.language);
    let destination_path = format!("{}/{}.md", candidate.platform.slug(), candidate.problem_key);

    let body = format!(
        "# {title} ({difficulty})\n\
         \n\
         **Platform:** {platform}\n\
         \n\
         **Author:** {author}\n\
         \n\
         **Submitted at:** {submitted_at}\n\
         \n\
         **Language:** {language}\n\
         \n\
         **Runtime:** {runtime}\n\
         \n\
         **Memory:** {memory}\n\
         \n\
         **Problem URL:** [{problem_url}]({problem_url})\n\
         \n\
         **Submission URL:** [{submission_url}]({submission_url})\n\
         \n\
         ---\n\
         \n\
         ## Problem Statement\n\
         {statement}\n\
         \n\
         ---\n\
         \n\
         ## Submitted Code\n\
         ```{fence}\n\
         {code}\n\
         ```\n",
        title = candidate.title,
        difficulty = candidate.difficulty,
        platform = candidate.platform,
        author = candidate.author,
        submitted_at = submitted_at,
        language = candidate.language,
        runtime = candidate.runtime,
        memory = candidate.memory,
        problem_url = candidate.problem_url,
        submission_url = candidate.submission_url,
        statement = candidate.statement,
        fence = fence,
        code = candidate.code,
    );

    let summary = format!("Time: {}, Memory: {}", candidate.runtime, candidate.memory);

    SubmissionRecord {
        platform: candidate.platform,
        problem_key: candidate.problem_key,
        title: candidate.title,
        difficulty: candidate.difficulty,
        metric_ms: candidate.metric_ms,
        tags: candidate.tags,
        problem_url: candidate.problem_url,
        submission_url: candidate.submission_url,
        destination_path,
        body,
        summary,
    }
}

/// Format an epoch-seconds timestamp as `YYYY-MM-DD HH:MM:SS` local time.
fn format_timestamp(epoch_seconds: i64) -> String {
    match Local.timestamp_opt(epoch_seconds, 0).single() {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch_seconds.to_string(),
    }
}

/// Derive the code-fence language tag from a judge's language name.
///
/// Lowercases the name and strips trailing version digits, so `Java24`
/// becomes `java` and `Python 3` becomes `python`. Any C++ dialect maps to
/// `cpp` since `c++` is not a valid fence tag on most renderers.
fn fence_language(language: &str) -> String {
    let lowered = language.to_lowercase();
    let stripped = lowered.trim_end_matches(|c: char| c.is_ascii_digit()).trim();

    if stripped.contains("c++") {
        return "cpp".to_string();
    }

    stripped
        .split_whitespace()
        .last()
        .unwrap_or(stripped)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn candidate() -> CandidateSubmission {
        CandidateSubmission {
            platform: Platform::LeetCode,
            problem_key: "1-two-sum".to_string(),
            title: "Two Sum".to_string(),
            difficulty: "Easy".to_string(),
            metric_ms: 2,
            tags: vec!["array".to_string(), "hash-table".to_string()],
            problem_url: "https://leetcode.com/problems/two-sum/".to_string(),
            submission_url: "https://leetcode.com/submissions/detail/42/".to_string(),
            author: "someone".to_string(),
            language: "Java24".to_string(),
            runtime: "2 ms".to_string(),
            memory: "41.2 MB".to_string(),
            submitted_at: 1_700_000_000,
            statement: "Given an array of integers...".to_string(),
            code: "class Solution {}".to_string(),
        }
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(fence_language("Java24"), "java");
        assert_eq!(fence_language("Python 3"), "python");
        assert_eq!(fence_language("GNU C++17"), "cpp");
        assert_eq!(fence_language("C++23"), "cpp");
        assert_eq!(fence_language("Rust"), "rust");
    }

    #[test]
    fn test_destination_path() {
        let record = render(candidate());
        assert_eq!(record.destination_path, "leetcode/1-two-sum.md");
    }

    #[test]
    fn test_destination_path_preserves_nesting() {
        let mut c = candidate();
        c.platform = Platform::AtCoder;
        c.problem_key = "abc321/abc321_a".to_string();
        let record = render(c);
        assert_eq!(record.destination_path, "atcoder/abc321/abc321_a.md");
    }

    #[test]
    fn test_body_structure() {
        let record = render(candidate());
        assert!(record.body.starts_with("# Two Sum (Easy)\n"));
        assert!(record.body.contains("**Platform:** LeetCode\n"));
        assert!(record.body.contains("## Problem Statement\n"));
        assert!(record.body.contains("## Submitted Code\n```java\n"));
        assert!(record.body.ends_with("```\n"));
    }

    #[test]
    fn test_summary() {
        let record = render(candidate());
        assert_eq!(record.summary, "Time: 2 ms, Memory: 41.2 MB");
    }
}
