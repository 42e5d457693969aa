// src/services/codeforces.rs

//! Codeforces adapter.
//!
//! Listing comes from the `user.status` REST endpoint (verdict and window
//! filtering happen client-side). Problem statements are scraped from the
//! problemset page, retrying the contest-scoped URL when the canonical page
//! yields nothing. Submitted source lives behind an authenticated page and
//! is fetched through the browser-automation collaborator.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CandidateSubmission, CodeforcesConfig, HttpConfig, Platform};
use crate::pipeline::window::TimeWindow;
use crate::services::browser::{SourceSession, SOURCE_UNAVAILABLE};
use crate::services::PlatformAdapter;
use crate::utils::{http, log, resolve_url, static_regex, static_selector};

const API_BASE: &str = "https://codeforces.com/api";
const SITE_BASE: &str = "https://codeforces.com";

/// Placeholder statement when both scrape attempts fail.
pub const STATEMENT_UNAVAILABLE: &str = "(Could not fetch problem statement)";

/// Adapter for the Codeforces REST API + HTML pages.
pub struct CodeforcesAdapter {
    config: CodeforcesConfig,
    client: Client,
    source_session: Arc<dyn SourceSession>,
}

impl CodeforcesAdapter {
    pub fn new(
        config: CodeforcesConfig,
        http_config: &HttpConfig,
        source_session: Arc<dyn SourceSession>,
    ) -> Result<Self> {
        Ok(Self {
            config,
            client: http::create_async_client(http_config)?,
            source_session,
        })
    }

    async fn fetch_status(&self) -> Result<Vec<CfSubmission>> {
        let url = format!(
            "{}/user.status?handle={}&from=1&count={}",
            API_BASE, self.config.handle, self.config.status_count
        );
        let response: CfApiResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "OK" {
            return Err(AppError::fetch(
                "Codeforces",
                response
                    .comment
                    .unwrap_or_else(|| "API returned non-OK status".to_string()),
            ));
        }
        Ok(response.result.unwrap_or_default())
    }

    /// Fetch the problem statement, falling back to the contest-scoped URL
    /// when the problemset page does not carry a usable statement.
    async fn fetch_statement(&self, contest_id: u64, index: &str) -> String {
        let primary = format!("{}/problemset/problem/{}/{}", SITE_BASE, contest_id, index);
        let fallback = format!("{}/contest/{}/problem/{}", SITE_BASE, contest_id, index);

        let client = self.client.clone();
        statement_with_fallback([primary, fallback], move |url| {
            let client = client.clone();
            async move { http::fetch_text(&client, &url).await }
        })
        .await
    }

    async fn fetch_source(&self, submission_url: &str) -> String {
        match self.source_session.fetch_source(submission_url).await {
            Ok(Some(code)) if !code.trim().is_empty() => code,
            Ok(_) => SOURCE_UNAVAILABLE.to_string(),
            Err(error) => {
                log::warn(&format!(
                    "Source fetch failed for {}: {}",
                    submission_url, error
                ));
                SOURCE_UNAVAILABLE.to_string()
            }
        }
    }
}

#[async_trait]
impl PlatformAdapter for CodeforcesAdapter {
    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    async fn fetch_accepted(&self, window: &TimeWindow) -> Result<Vec<CandidateSubmission>> {
        let all = match self.fetch_status().await {
            Ok(all) => all,
            Err(error) => {
                log::warn(&format!("Codeforces listing failed: {}", error));
                return Ok(Vec::new());
            }
        };

        let accepted: Vec<CfSubmission> = all
            .into_iter()
            .filter(|sub| {
                sub.verdict.as_deref() == Some("OK") && window.contains(sub.creation_time_seconds)
            })
            .collect();
        if accepted.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();

        for (key, group) in group_by_problem(accepted) {
            let Some(contest_id) = group[0].problem.contest_id else {
                log::warn(&format!("Skipping {}: no contest id", key));
                continue;
            };
            let index = group[0].problem.index.clone();

            // One statement per problem, shared by the whole group.
            let statement = self.fetch_statement(contest_id, &index).await;

            for submission in &group {
                let problem = &submission.problem;
                let problem_url =
                    format!("{}/problemset/problem/{}/{}", SITE_BASE, contest_id, index);
                let submission_url = format!(
                    "{}/contest/{}/submission/{}",
                    SITE_BASE, contest_id, submission.id
                );
                let code = self.fetch_source(&submission_url).await;

                candidates.push(CandidateSubmission {
                    platform: Platform::Codeforces,
                    problem_key: key.clone(),
                    title: problem.name.clone(),
                    difficulty: problem
                        .rating
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "Unrated".to_string()),
                    metric_ms: submission.time_consumed_millis,
                    tags: problem.tags.clone(),
                    problem_url,
                    submission_url,
                    author: self.config.handle.clone(),
                    language: submission.programming_language.clone(),
                    runtime: format!("{} ms", submission.time_consumed_millis),
                    memory: format!(
                        "{:.1} KB",
                        submission.memory_consumed_bytes as f64 / 1024.0
                    ),
                    submitted_at: submission.creation_time_seconds,
                    statement: statement.clone(),
                    code,
                });
            }
        }

        Ok(candidates)
    }
}

/// Group submissions by `<contestId>-<index>`, preserving first-encounter order.
fn group_by_problem(submissions: Vec<CfSubmission>) -> Vec<(String, Vec<CfSubmission>)> {
    let mut groups: Vec<(String, Vec<CfSubmission>)> = Vec::new();
    for submission in submissions {
        let key = submission.problem.key();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(submission),
            None => groups.push((key, vec![submission])),
        }
    }
    groups
}

/// Request each candidate statement page in order and return the first one
/// that parses. The fallback page is only requested when the primary yields
/// nothing usable; the placeholder is returned once both attempts fail.
async fn statement_with_fallback<F, Fut>(urls: [String; 2], fetch: F) -> String
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    for url in urls {
        match fetch(url.clone()).await {
            Ok(html) => {
                if let Some(statement) = parse_statement(&html) {
                    return statement;
                }
                log::warn(&format!("No statement block at {}", url));
            }
            Err(error) => {
                log::warn(&format!("Statement fetch failed at {}: {}", url, error));
            }
        }
    }

    STATEMENT_UNAVAILABLE.to_string()
}

// --- Statement scraping ---

/// Extract the statement from a problem page and convert it to markdown,
/// appending the sample tests as fenced blocks. Returns `None` when the
/// page has no statement block (error page, layout drift).
pub fn parse_statement(html: &str) -> Option<String> {
    static STATEMENT_SEL: OnceLock<Selector> = OnceLock::new();

    let document = Html::parse_document(html);
    let statement = document
        .select(static_selector(&STATEMENT_SEL, "div.problem-statement"))
        .next()?;

    let samples = extract_samples(&statement);
    let body = clean_statement_body(&statement);

    let mut out = if body.is_empty() {
        "(No problem statement)".to_string()
    } else {
        body
    };
    if !samples.is_empty() {
        out.push_str("\n\n");
        out.push_str(&format_samples(&samples));
    }
    Some(out)
}

/// One sample input/output pair from the statement page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub input: String,
    pub output: String,
}

fn extract_samples(statement: &ElementRef<'_>) -> Vec<Sample> {
    static TEST_SEL: OnceLock<Selector> = OnceLock::new();
    static INPUT_SEL: OnceLock<Selector> = OnceLock::new();
    static OUTPUT_SEL: OnceLock<Selector> = OnceLock::new();

    let mut samples = Vec::new();
    for test in statement.select(static_selector(&TEST_SEL, ".sample-test")) {
        let inputs: Vec<String> = test
            .select(static_selector(&INPUT_SEL, ".input pre"))
            .map(|el| collect_text(&el))
            .collect();
        let outputs: Vec<String> = test
            .select(static_selector(&OUTPUT_SEL, ".output pre"))
            .map(|el| collect_text(&el))
            .collect();

        for i in 0..inputs.len().max(outputs.len()) {
            samples.push(Sample {
                input: inputs.get(i).cloned().unwrap_or_default(),
                output: outputs.get(i).cloned().unwrap_or_default(),
            });
        }
    }
    samples
}

/// Sample pre blocks carry per-line divs; join their text with newlines.
fn collect_text(element: &ElementRef<'_>) -> String {
    let mut lines: Vec<String> = Vec::new();
    for text in element.text() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    lines.join("\n")
}

/// Sections of the statement div dropped from the rendered body.
const DROPPED_CLASSES: [&str; 4] = [
    "header",
    "input-specification",
    "output-specification",
    "sample-tests",
];

fn clean_statement_body(statement: &ElementRef<'_>) -> String {
    let mut html = String::new();
    for child in statement.children().filter_map(ElementRef::wrap) {
        let classes: Vec<&str> = child.value().classes().collect();
        if classes.iter().any(|c| DROPPED_CLASSES.contains(c)) {
            continue;
        }
        html.push_str(&child.inner_html());
    }
    html_to_markdown(&html)
}

/// Normalize scraped statement HTML into markdown-ish text: images become
/// markdown links, display math collapses to inline math, paragraph and
/// list tags become line breaks, and everything else is stripped.
pub fn html_to_markdown(html: &str) -> String {
    static IMG_RE: OnceLock<Regex> = OnceLock::new();
    static MATH_RE: OnceLock<Regex> = OnceLock::new();
    static BR_RE: OnceLock<Regex> = OnceLock::new();
    static LI_OPEN_RE: OnceLock<Regex> = OnceLock::new();
    static LI_CLOSE_RE: OnceLock<Regex> = OnceLock::new();
    static P_CLOSE_RE: OnceLock<Regex> = OnceLock::new();
    static P_OPEN_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    static BLANK_RE: OnceLock<Regex> = OnceLock::new();

    let text = static_regex(&IMG_RE, r#"<img[^>]*src="([^"]*)"[^>]*/?>"#)
        .replace_all(html, |caps: &regex::Captures<'_>| {
            format!("![Image]({})", resolve_url(site_base(), &caps[1]))
        });
    let text = static_regex(&MATH_RE, r"(?s)\$\$+(.*?)\$\$+")
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            format!("${}$", caps[1].trim())
        });
    let text = static_regex(&BR_RE, r"(?i)<br\s*/?>").replace_all(&text, "\n");
    let text = static_regex(&LI_OPEN_RE, r"(?i)<li>").replace_all(&text, "\n* ");
    let text = static_regex(&LI_CLOSE_RE, r"(?i)</li>").replace_all(&text, "");
    let text = static_regex(&P_CLOSE_RE, r"(?i)</p>").replace_all(&text, "\n\n");
    let text = static_regex(&P_OPEN_RE, r"(?i)<p[^>]*>").replace_all(&text, "");
    let text = static_regex(&TAG_RE, r"<[^>]+>").replace_all(&text, "");
    let text = static_regex(&BLANK_RE, r"\n{3,}").replace_all(&text, "\n\n");
    text.trim().to_string()
}

fn site_base() -> &'static Url {
    static BASE: OnceLock<Url> = OnceLock::new();
    BASE.get_or_init(|| Url::parse(SITE_BASE).expect("hard-coded url"))
}

/// Render sample pairs as `### Sample Input/Output` fenced blocks.
pub fn format_samples(samples: &[Sample]) -> String {
    let multi = samples.len() > 1;
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let suffix = if multi {
                format!(" {}", i + 1)
            } else {
                String::new()
            };
            format!(
                "### Sample Input{suffix}\n```\n{}\n```\n\n### Sample Output{suffix}\n```\n{}\n```",
                sample.input.trim(),
                sample.output.trim(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// --- API response models ---

#[derive(Debug, Deserialize)]
struct CfApiResponse {
    status: String,
    comment: Option<String>,
    result: Option<Vec<CfSubmission>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CfSubmission {
    id: u64,
    creation_time_seconds: i64,
    problem: CfProblem,
    programming_language: String,
    verdict: Option<String>,
    #[serde(default)]
    time_consumed_millis: u64,
    #[serde(default)]
    memory_consumed_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CfProblem {
    contest_id: Option<u64>,
    index: String,
    name: String,
    rating: Option<u32>,
    #[serde(default)]
    tags: Vec<String>,
}

impl CfProblem {
    fn key(&self) -> String {
        match self.contest_id {
            Some(contest_id) => format!("{}-{}", contest_id, self.index),
            None => self.index.clone(),
        }
    }
}
