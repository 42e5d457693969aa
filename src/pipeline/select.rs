// src/pipeline/select.rs

//! Best-submission selection.
//!
//! A user may have several accepted attempts at the same problem in one day;
//! only the fastest one is archived.

use std::collections::HashMap;

use crate::models::CandidateSubmission;

/// Reduce candidates to at most one per problem key.
///
/// Groups by `problem_key` preserving first-encounter order, then keeps the
/// member of each group with the minimum `metric_ms`. Ties keep the first
/// encountered candidate (stable).
pub fn select_best(candidates: Vec<CandidateSubmission>) -> Vec<CandidateSubmission> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, CandidateSubmission> = HashMap::new();

    for candidate in candidates {
        match best.get(&candidate.problem_key).map(|c| c.metric_ms) {
            Some(current) if current <= candidate.metric_ms => {}
            Some(_) => {
                best.insert(candidate.problem_key.clone(), candidate);
            }
            None => {
                order.push(candidate.problem_key.clone());
                best.insert(candidate.problem_key.clone(), candidate);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| best.remove(&key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn candidate(key: &str, submission_url: &str, metric_ms: u64) -> CandidateSubmission {
        CandidateSubmission {
            platform: Platform::Codeforces,
            problem_key: key.to_string(),
            title: key.to_string(),
            difficulty: "800".to_string(),
            metric_ms,
            tags: vec![],
            problem_url: String::new(),
            submission_url: submission_url.to_string(),
            author: "handle".to_string(),
            language: "GNU C++17".to_string(),
            runtime: format!("{} ms", metric_ms),
            memory: "0 KB".to_string(),
            submitted_at: 0,
            statement: String::new(),
            code: String::new(),
        }
    }

    #[test]
    fn test_single_survivor_with_minimum_metric() {
        let selected = select_best(vec![
            candidate("4-A", "s1", 150),
            candidate("4-A", "s2", 60),
            candidate("4-A", "s3", 90),
        ]);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].metric_ms, 60);
        assert_eq!(selected[0].submission_url, "s2");
    }

    #[test]
    fn test_tie_keeps_first_encountered() {
        let selected = select_best(vec![
            candidate("4-A", "first", 60),
            candidate("4-A", "second", 60),
        ]);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].submission_url, "first");
    }

    #[test]
    fn test_group_order_preserved() {
        let selected = select_best(vec![
            candidate("4-B", "b1", 100),
            candidate("4-A", "a1", 50),
            candidate("4-B", "b2", 40),
        ]);

        let keys: Vec<&str> = selected.iter().map(|c| c.problem_key.as_str()).collect();
        assert_eq!(keys, ["4-B", "4-A"]);
        assert_eq!(selected[0].submission_url, "b2");
    }

    #[test]
    fn test_empty_input() {
        assert!(select_best(vec![]).is_empty());
    }
}
