// src/services/leetcode.rs

//! LeetCode adapter.
//!
//! Talks to the LeetCode GraphQL endpoint: one listing query for recent
//! accepted submissions, one detail query per submission (runtime, memory,
//! code, language) and one question query per problem (statement,
//! difficulty, topic tags). Detail fetches inside a problem group run
//! concurrently; a failed detail drops only that submission, a failed
//! question query degrades to a placeholder statement.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{CandidateSubmission, HttpConfig, LeetCodeConfig, Platform};
use crate::pipeline::window::TimeWindow;
use crate::services::PlatformAdapter;
use crate::utils::{http, log};

const GRAPHQL_URL: &str = "https://leetcode.com/graphql";

const QUERY_RECENT: &str = "\
query recentACSubmissions($username: String!, $limit: Int!) {
  recentAcSubmissionList(username: $username, limit: $limit) {
    id title titleSlug timestamp lang
  }
}";

const QUERY_DETAIL: &str = "\
query submissionDetails($id: Int!) {
  submissionDetails(submissionId: $id) {
    id runtime runtimeDisplay memory memoryDisplay code
    lang { name verboseName }
  }
}";

const QUERY_QUESTION: &str = "\
query questionContent($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    content difficulty questionFrontendId
    topicTags { name slug }
  }
}";

/// Adapter for LeetCode's GraphQL API.
pub struct LeetCodeAdapter {
    config: LeetCodeConfig,
    client: Client,
    session_cookie: Option<String>,
}

impl LeetCodeAdapter {
    pub fn new(
        config: LeetCodeConfig,
        http_config: &HttpConfig,
        session_cookie: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            config,
            client: http::create_async_client(http_config)?,
            session_cookie,
        })
    }

    /// Execute a GraphQL query and unwrap the `data` envelope.
    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let mut request = self
            .client
            .post(GRAPHQL_URL)
            .json(&json!({ "query": query, "variables": variables }));

        if let Some(cookie) = &self.session_cookie {
            request = request.header(
                reqwest::header::COOKIE,
                format!("LEETCODE_SESSION={}", cookie),
            );
        }

        let response: GraphQlResponse<T> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .data
            .ok_or_else(|| AppError::fetch("LeetCode", "GraphQL response carried no data"))
    }

    async fn fetch_recent(&self) -> Result<Vec<RecentSubmission>> {
        let data: RecentData = self
            .graphql(
                QUERY_RECENT,
                json!({
                    "username": self.config.username,
                    "limit": self.config.recent_limit,
                }),
            )
            .await?;
        Ok(data.recent_ac_submission_list.unwrap_or_default())
    }

    async fn fetch_detail(&self, id: i64) -> Result<SubmissionDetails> {
        let data: DetailData = self
            .graphql(QUERY_DETAIL, json!({ "id": id }))
            .await?;
        data.submission_details
            .ok_or_else(|| AppError::fetch("LeetCode", format!("no detail for submission {}", id)))
    }

    async fn fetch_question(&self, title_slug: &str) -> Result<Question> {
        let data: QuestionData = self
            .graphql(QUERY_QUESTION, json!({ "titleSlug": title_slug }))
            .await?;
        data.question
            .ok_or_else(|| AppError::fetch("LeetCode", format!("no question for {}", title_slug)))
    }

    fn build_candidate(
        &self,
        submission: &RecentSubmission,
        detail: &SubmissionDetails,
        question: &Question,
    ) -> CandidateSubmission {
        let title_slug = &submission.title_slug;
        let problem_url = format!("https://leetcode.com/problems/{}/", title_slug);
        let submission_url =
            format!("https://leetcode.com/submissions/detail/{}/", submission.id);

        let language = detail
            .lang
            .as_ref()
            .map(|l| l.verbose_name.clone().unwrap_or_else(|| l.name.clone()))
            .unwrap_or_else(|| submission.lang.clone());

        let runtime = detail
            .runtime_display
            .clone()
            .unwrap_or_else(|| format!("{} ms", detail.runtime));
        let memory = detail
            .memory_display
            .clone()
            .unwrap_or_else(|| format!("{} B", detail.memory));

        let frontend_id = question
            .question_frontend_id
            .clone()
            .unwrap_or_else(|| "NA".to_string());

        CandidateSubmission {
            platform: Platform::LeetCode,
            problem_key: format!("{}-{}", frontend_id, title_slug),
            title: submission.title.clone(),
            difficulty: question
                .difficulty
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            metric_ms: detail.runtime,
            tags: question
                .topic_tags
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|t| t.name.clone())
                .collect(),
            problem_url,
            submission_url,
            author: self.config.username.clone(),
            language,
            runtime,
            memory,
            submitted_at: submission.epoch_timestamp(),
            statement: question
                .content
                .clone()
                .unwrap_or_else(|| "Problem statement unavailable".to_string()),
            code: detail.code.clone(),
        }
    }
}

#[async_trait]
impl PlatformAdapter for LeetCodeAdapter {
    fn platform(&self) -> Platform {
        Platform::LeetCode
    }

    async fn fetch_accepted(&self, window: &TimeWindow) -> Result<Vec<CandidateSubmission>> {
        if self.session_cookie.is_none() {
            log::warn("LeetCode session cookie not set, skipping platform");
            return Ok(Vec::new());
        }

        let recent = match self.fetch_recent().await {
            Ok(recent) => recent,
            Err(error) => {
                log::warn(&format!("LeetCode listing failed: {}", error));
                return Ok(Vec::new());
            }
        };

        let in_window: Vec<RecentSubmission> = recent
            .into_iter()
            .filter(|sub| window.contains(sub.epoch_timestamp()))
            .collect();
        if in_window.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();

        for (title_slug, group) in group_by_slug(in_window) {
            // Detail fetches for sibling submissions are independent reads;
            // run them concurrently, bounded by the group size.
            let details =
                futures::future::join_all(group.iter().map(|sub| async move {
                    match sub.numeric_id() {
                        Some(id) => self.fetch_detail(id).await,
                        None => Err(AppError::fetch(
                            "LeetCode",
                            format!("non-numeric submission id {}", sub.id),
                        )),
                    }
                }))
                .await;

            let detailed: Vec<(&RecentSubmission, SubmissionDetails)> = group
                .iter()
                .zip(details)
                .filter_map(|(sub, result)| match result {
                    Ok(detail) => Some((sub, detail)),
                    Err(error) => {
                        log::warn(&format!(
                            "LeetCode detail fetch failed for {}: {}",
                            title_slug, error
                        ));
                        None
                    }
                })
                .collect();

            if detailed.is_empty() {
                continue;
            }

            let question = match self.fetch_question(&title_slug).await {
                Ok(question) => question,
                Err(error) => {
                    log::warn(&format!(
                        "LeetCode question fetch failed for {}, tags unknown: {}",
                        title_slug, error
                    ));
                    Question::placeholder()
                }
            };

            for (submission, detail) in &detailed {
                candidates.push(self.build_candidate(submission, detail, &question));
            }
        }

        Ok(candidates)
    }
}

/// Group submissions by title slug, preserving first-encounter order.
fn group_by_slug(submissions: Vec<RecentSubmission>) -> Vec<(String, Vec<RecentSubmission>)> {
    let mut groups: Vec<(String, Vec<RecentSubmission>)> = Vec::new();
    for submission in submissions {
        match groups
            .iter_mut()
            .find(|(slug, _)| *slug == submission.title_slug)
        {
            Some((_, members)) => members.push(submission),
            None => groups.push((submission.title_slug.clone(), vec![submission])),
        }
    }
    groups
}

// --- GraphQL response models ---

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentData {
    recent_ac_submission_list: Option<Vec<RecentSubmission>>,
}

/// One entry of `recentAcSubmissionList`. Ids and timestamps arrive as
/// strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentSubmission {
    id: String,
    title: String,
    title_slug: String,
    timestamp: String,
    lang: String,
}

impl RecentSubmission {
    fn epoch_timestamp(&self) -> i64 {
        self.timestamp.parse().unwrap_or_default()
    }

    fn numeric_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailData {
    submission_details: Option<SubmissionDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionDetails {
    #[serde(default)]
    runtime: u64,
    runtime_display: Option<String>,
    #[serde(default)]
    memory: u64,
    memory_display: Option<String>,
    #[serde(default)]
    code: String,
    lang: Option<LangInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LangInfo {
    name: String,
    verbose_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionData {
    question: Option<Question>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Question {
    content: Option<String>,
    difficulty: Option<String>,
    question_frontend_id: Option<String>,
    topic_tags: Option<Vec<TopicTag>>,
}

impl Question {
    /// Fallback when the question query fails: record survives with a
    /// placeholder statement, unknown difficulty and no tags.
    fn placeholder() -> Self {
        Self {
            content: Some("Problem statement unavailable".to_string()),
            difficulty: Some("Unknown".to_string()),
            question_frontend_id: Some("NA".to_string()),
            topic_tags: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TopicTag {
    name: String,
    #[allow(dead_code)]
    slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recent(id: &str, slug: &str, timestamp: &str) -> RecentSubmission {
        RecentSubmission {
            id: id.to_string(),
            title: slug.to_string(),
            title_slug: slug.to_string(),
            timestamp: timestamp.to_string(),
            lang: "java".to_string(),
        }
    }

    #[test]
    fn test_parse_recent_response() {
        let body = r#"{
            "data": {
                "recentAcSubmissionList": [
                    {"id": "123", "title": "Two Sum", "titleSlug": "two-sum",
                     "timestamp": "1700000000", "lang": "java"}
                ]
            }
        }"#;
        let parsed: GraphQlResponse<RecentData> = serde_json::from_str(body).unwrap();
        let list = parsed.data.unwrap().recent_ac_submission_list.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title_slug, "two-sum");
        assert_eq!(list[0].epoch_timestamp(), 1_700_000_000);
        assert_eq!(list[0].numeric_id(), Some(123));
    }

    #[test]
    fn test_parse_detail_response() {
        let body = r#"{
            "data": {
                "submissionDetails": {
                    "id": 123, "runtime": 2, "runtimeDisplay": "2 ms",
                    "memory": 43200000, "memoryDisplay": "41.2 MB",
                    "code": "class Solution {}",
                    "lang": {"name": "java", "verboseName": "Java"}
                }
            }
        }"#;
        let parsed: GraphQlResponse<DetailData> = serde_json::from_str(body).unwrap();
        let detail = parsed.data.unwrap().submission_details.unwrap();
        assert_eq!(detail.runtime, 2);
        assert_eq!(detail.runtime_display.as_deref(), Some("2 ms"));
        assert_eq!(detail.lang.unwrap().verbose_name.as_deref(), Some("Java"));
    }

    #[test]
    fn test_parse_question_with_null_fields() {
        let body = r#"{"data": {"question": {"content": null, "difficulty": "Medium",
            "questionFrontendId": "15", "topicTags": [{"name": "Array", "slug": "array"}]}}}"#;
        let parsed: GraphQlResponse<QuestionData> = serde_json::from_str(body).unwrap();
        let question = parsed.data.unwrap().question.unwrap();
        assert!(question.content.is_none());
        assert_eq!(question.question_frontend_id.as_deref(), Some("15"));
        assert_eq!(question.topic_tags.unwrap()[0].name, "Array");
    }

    #[test]
    fn test_group_by_slug_preserves_order() {
        let groups = group_by_slug(vec![
            recent("1", "two-sum", "100"),
            recent("2", "add-two-numbers", "200"),
            recent("3", "two-sum", "300"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "two-sum");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "add-two-numbers");
    }
}
