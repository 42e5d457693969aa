// src/services/atcoder.rs

//! AtCoder adapter.
//!
//! Listing comes from the kenkoooo public submissions API with a server-side
//! trailing time bound; only `AC` results are kept. Each submission then
//! scrapes the problem page (preferring the English statement block) and the
//! submission page for the literal source. AtCoder appends a FastScanner
//! scaffold to submitted Java source; it is stripped by a fixed marker.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{AtCoderConfig, CandidateSubmission, HttpConfig, Platform};
use crate::pipeline::window::TimeWindow;
use crate::services::browser::SOURCE_UNAVAILABLE;
use crate::services::PlatformAdapter;
use crate::utils::{http, log, static_regex, static_selector};

const API_BASE: &str = "https://kenkoooo.com/atcoder/atcoder-api/v3";
const SITE_BASE: &str = "https://atcoder.jp";

/// Marker preceding the scaffold AtCoder appends to submitted Java source.
const SCAFFOLD_MARKER: &str = "// ======== FastScanner ========";

/// Adapter for the AtCoder public API + HTML pages.
pub struct AtCoderAdapter {
    config: AtCoderConfig,
    client: Client,
}

impl AtCoderAdapter {
    pub fn new(config: AtCoderConfig, http_config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: http::create_async_client(http_config)?,
        })
    }

    async fn fetch_submissions(&self) -> Result<Vec<AcSubmission>> {
        let from_second = chrono::Utc::now().timestamp() - self.config.lookback_secs;
        let url = format!(
            "{}/user/submissions?user={}&from_second={}",
            API_BASE, self.config.username, from_second
        );
        let submissions: Vec<AcSubmission> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(submissions)
    }

    /// Scrape title and statement from the problem page.
    async fn fetch_problem(&self, problem_url: &str) -> (Option<String>, Option<String>) {
        let html = match http::fetch_text(&self.client, problem_url).await {
            Ok(html) => html,
            Err(error) => {
                log::warn(&format!("Problem fetch failed at {}: {}", problem_url, error));
                return (None, None);
            }
        };
        parse_problem_page(&html)
    }

    /// Scrape the literal source from the submission page.
    async fn fetch_code(&self, submission_url: &str) -> String {
        let html = match http::fetch_text(&self.client, submission_url).await {
            Ok(html) => html,
            Err(error) => {
                log::warn(&format!(
                    "Submission fetch failed at {}: {}",
                    submission_url, error
                ));
                return SOURCE_UNAVAILABLE.to_string();
            }
        };
        parse_submission_code(&html)
            .map(|code| strip_scaffold(&code))
            .unwrap_or_else(|| SOURCE_UNAVAILABLE.to_string())
    }

    fn build_candidate(
        &self,
        submission: &AcSubmission,
        problem_url: String,
        submission_url: String,
        title: Option<String>,
        statement: Option<String>,
        code: String,
    ) -> CandidateSubmission {
        let runtime = submission
            .execution_time
            .map(|ms| format!("{} ms", ms))
            .unwrap_or_else(|| "N/A".to_string());
        let memory = submission
            .memory
            .map(|bytes| format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0))
            .unwrap_or_else(|| "N/A".to_string());

        CandidateSubmission {
            platform: Platform::AtCoder,
            problem_key: format!("{}-{}", submission.contest_id, submission.problem_id),
            title: title.unwrap_or_else(|| submission.problem_id.clone()),
            difficulty: submission
                .difficulty
                .map(|d| format!("{:.0}", d))
                .unwrap_or_else(|| "N/A".to_string()),
            metric_ms: submission.execution_time.unwrap_or_default(),
            tags: Vec::new(),
            problem_url,
            submission_url,
            author: self.config.username.clone(),
            language: language_name(&submission.language),
            runtime,
            memory,
            submitted_at: submission.epoch_second,
            statement: statement
                .unwrap_or_else(|| "Problem statement could not be scraped".to_string()),
            code,
        }
    }
}

#[async_trait]
impl PlatformAdapter for AtCoderAdapter {
    fn platform(&self) -> Platform {
        Platform::AtCoder
    }

    // The public API already applies the trailing time bound server-side,
    // so the calendar-day window is not re-applied here.
    async fn fetch_accepted(&self, _window: &TimeWindow) -> Result<Vec<CandidateSubmission>> {
        let all = match self.fetch_submissions().await {
            Ok(all) => all,
            Err(error) => {
                log::warn(&format!("AtCoder listing failed: {}", error));
                return Ok(Vec::new());
            }
        };

        let accepted: Vec<AcSubmission> =
            all.into_iter().filter(|sub| sub.result == "AC").collect();

        let mut candidates = Vec::new();
        for submission in &accepted {
            let problem_url = format!(
                "{}/contests/{}/tasks/{}",
                SITE_BASE, submission.contest_id, submission.problem_id
            );
            let submission_url = format!(
                "{}/contests/{}/submissions/{}",
                SITE_BASE, submission.contest_id, submission.id
            );

            let (title, statement) = self.fetch_problem(&problem_url).await;
            let code = self.fetch_code(&submission_url).await;

            candidates.push(self.build_candidate(
                submission,
                problem_url,
                submission_url,
                title,
                statement,
                code,
            ));
        }

        Ok(candidates)
    }
}

/// Extract title and statement markdown from a problem page.
fn parse_problem_page(html: &str) -> (Option<String>, Option<String>) {
    static TITLE_SEL: OnceLock<Selector> = OnceLock::new();
    static EN_SEL: OnceLock<Selector> = OnceLock::new();
    static ANY_SEL: OnceLock<Selector> = OnceLock::new();

    let document = Html::parse_document(html);

    let title = document
        .select(static_selector(&TITLE_SEL, ".h2"))
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    // Prefer the English statement block when localized variants exist.
    let statement_html = document
        .select(static_selector(&EN_SEL, "#task-statement .lang-en"))
        .next()
        .or_else(|| {
            document
                .select(static_selector(&ANY_SEL, "#task-statement"))
                .next()
        })
        .map(|el| el.inner_html());

    let statement = statement_html.map(|html| clean_statement(&html));
    (title, statement)
}

/// Extract the submitted source from a submission page.
fn parse_submission_code(html: &str) -> Option<String> {
    static CODE_SEL: OnceLock<Selector> = OnceLock::new();

    let document = Html::parse_document(html);
    document
        .select(static_selector(&CODE_SEL, "#submission-code"))
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|code| !code.is_empty())
}

/// Convert statement HTML into markdown-ish text.
///
/// Part divs become `##` headings; the `<h3>` titles inside them collapse
/// into the heading line, remaining tags are stripped, and the divider
/// artifacts left behind by the conversion are removed.
pub fn clean_statement(html: &str) -> String {
    static PART_RE: OnceLock<Regex> = OnceLock::new();
    static H3_RE: OnceLock<Regex> = OnceLock::new();
    static IO_STYLE_RE: OnceLock<Regex> = OnceLock::new();
    static VAR_RE: OnceLock<Regex> = OnceLock::new();
    static PRE_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    static HEADING_ARTIFACT_RE: OnceLock<Regex> = OnceLock::new();
    static BLANK_RE: OnceLock<Regex> = OnceLock::new();

    let text = static_regex(
        &PART_RE,
        r#"(?i)<div class="part">\s*<section>\s*<h3>(.*?)</h3>"#,
    )
    .replace_all(html, |caps: &regex::Captures<'_>| {
        format!("## {}\n", caps[1].trim())
    });
    let text = static_regex(&H3_RE, r"(?is)<h3>(.*?)</h3>")
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            format!("## {}\n", caps[1].trim())
        });
    let text = static_regex(&IO_STYLE_RE, r#"(?i)<div\s+class="io-style">"#).replace_all(&text, "");
    let text = static_regex(&VAR_RE, r"(?s)<var>(.*?)</var>")
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            format!("${}$", caps[1].trim())
        });
    let text = static_regex(&PRE_RE, r"(?is)<pre[^>]*>(.*?)</pre>")
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            format!("\n```\n{}\n```\n", caps[1].trim())
        });
    let text = static_regex(&TAG_RE, r"<[^>]+>").replace_all(&text, "");
    let text = static_regex(&HEADING_ARTIFACT_RE, r"(?m)^\s*##\s*$").replace_all(&text, "");
    let text = static_regex(&BLANK_RE, r"\n{3,}").replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Drop the FastScanner scaffold appended after the submitted code.
///
/// The scaffold sits inside the submitted class, so the closing brace it
/// carried is restored after truncation.
pub fn strip_scaffold(code: &str) -> String {
    match code.find(SCAFFOLD_MARKER) {
        Some(pos) => {
            let core = code[..pos].trim_end();
            format!("{}\n}}", core)
        }
        None => code.to_string(),
    }
}

/// Language name without the trailing compiler parenthetical,
/// e.g. `Java (OpenJDK 17.0.6)` becomes `Java`.
fn language_name(language: &str) -> String {
    language
        .split('(')
        .next()
        .unwrap_or(language)
        .trim()
        .to_string()
}

// --- API response model ---

/// One entry of the kenkoooo `/user/submissions` response.
#[derive(Debug, Clone, Deserialize)]
struct AcSubmission {
    id: u64,
    epoch_second: i64,
    problem_id: String,
    contest_id: String,
    language: String,
    result: String,
    #[serde(default)]
    execution_time: Option<u64>,
    #[serde(default)]
    memory: Option<u64>,
    #[serde(default)]
    difficulty: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_response() {
        let body = r#"[{
            "id": 12345,
            "epoch_second": 1700000000,
            "problem_id": "abc321_a",
            "contest_id": "abc321",
            "user_id": "someone",
            "language": "Java (OpenJDK 17.0.6)",
            "point": 100.0,
            "length": 400,
            "result": "AC",
            "execution_time": 120
        }]"#;
        let parsed: Vec<AcSubmission> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed[0].contest_id, "abc321");
        assert_eq!(parsed[0].result, "AC");
        assert_eq!(parsed[0].execution_time, Some(120));
        assert!(parsed[0].memory.is_none());
    }

    #[test]
    fn test_build_candidate_keeps_given_urls() {
        let adapter =
            AtCoderAdapter::new(AtCoderConfig::default(), &HttpConfig::default()).unwrap();
        let submission = AcSubmission {
            id: 12345,
            epoch_second: 1_700_000_000,
            problem_id: "abc321_a".to_string(),
            contest_id: "abc321".to_string(),
            language: "Java (OpenJDK 17.0.6)".to_string(),
            result: "AC".to_string(),
            execution_time: Some(120),
            memory: None,
            difficulty: None,
        };

        let candidate = adapter.build_candidate(
            &submission,
            "https://atcoder.jp/contests/abc321/tasks/abc321_a".to_string(),
            "https://atcoder.jp/contests/abc321/submissions/12345".to_string(),
            Some("A - Greetings".to_string()),
            None,
            "fn main() {}".to_string(),
        );

        assert_eq!(
            candidate.problem_url,
            "https://atcoder.jp/contests/abc321/tasks/abc321_a"
        );
        assert_eq!(
            candidate.submission_url,
            "https://atcoder.jp/contests/abc321/submissions/12345"
        );
        assert_eq!(candidate.problem_key, "abc321-abc321_a");
        assert_eq!(candidate.language, "Java");
        assert_eq!(candidate.runtime, "120 ms");
        assert_eq!(candidate.memory, "N/A");
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("Java (OpenJDK 17.0.6)"), "Java");
        assert_eq!(language_name("C++ 20 (gcc 12.2)"), "C++ 20");
        assert_eq!(language_name("Rust"), "Rust");
    }

    #[test]
    fn test_parse_problem_page_prefers_english() {
        let html = r#"<html><body>
            <span class="h2">A - Greetings</span>
            <div id="task-statement">
              <span class="lang-ja"><p>こんにちは</p></span>
              <span class="lang-en"><div class="part"><section><h3>Problem Statement</h3>
                <p>Print hello.</p></section></div></span>
            </div>
        </body></html>"#;

        let (title, statement) = parse_problem_page(html);
        assert_eq!(title.as_deref(), Some("A - Greetings"));
        let statement = statement.unwrap();
        assert!(statement.contains("## Problem Statement"));
        assert!(statement.contains("Print hello."));
        assert!(!statement.contains("こんにちは"));
    }

    #[test]
    fn test_parse_problem_page_falls_back_to_full_statement() {
        let html = r#"<html><body>
            <div id="task-statement"><p>日本語のみ</p></div>
        </body></html>"#;

        let (_, statement) = parse_problem_page(html);
        assert!(statement.unwrap().contains("日本語のみ"));
    }

    #[test]
    fn test_parse_submission_code() {
        let html = r#"<html><body>
            <pre id="submission-code">public class Main {}</pre>
        </body></html>"#;
        assert_eq!(
            parse_submission_code(html).as_deref(),
            Some("public class Main {}")
        );
        assert!(parse_submission_code("<html><body>Login required</body></html>").is_none());
    }

    #[test]
    fn test_strip_scaffold() {
        let code = "public class Main {\n    void solve() {}\n\n// ======== FastScanner ========\nstatic class FastScanner {}\n}";
        assert_eq!(
            strip_scaffold(code),
            "public class Main {\n    void solve() {}\n}"
        );
    }

    #[test]
    fn test_strip_scaffold_without_marker() {
        let code = "fn main() {}";
        assert_eq!(strip_scaffold(code), code);
    }

    #[test]
    fn test_clean_statement_collapses_artifacts() {
        let html = r#"<div class="io-style"><div class="part"><section><h3>Input</h3>
<p>Input is given in the following format:</p><pre>N M</pre></section></div></div>"#;

        let cleaned = clean_statement(html);
        assert!(cleaned.starts_with("## Input"));
        assert!(cleaned.contains("```\nN M\n```"));
        assert!(!cleaned.contains("<div"));
        assert!(!cleaned.contains("io-style"));
    }
}
