use serde::Serialize;
use serde_json::Value;

use super::accessors::{
    boolean, first_of, non_empty_array, non_empty_strings, string, CLARIFYING_QUESTION_PATHS,
    CONTENT_PATHS, MATCH_PATHS, NEEDS_MORE_INFO_PATHS, PROVIDER_PATHS,
};
use crate::catalog::{normalize_results, FreelancerRecord};
use crate::provider::Provider;

/// A reply envelope reduced to one canonical shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReply {
    /// Sequence number of the dispatch that produced this reply.
    pub sequence: u64,
    pub content: String,
    pub clarifying_questions: Vec<String>,
    pub needs_more_info: bool,
    pub freelancer_matches: Vec<FreelancerRecord>,
    /// Provider the backend says served the reply.
    pub reported_provider: Option<Provider>,
    /// The reported provider differs from the one the client believed active.
    pub implicit_fallback: bool,
}

/// Normalise a raw `/message` reply.
pub fn normalize_reply(raw: &Value, sequence: u64, active: Option<Provider>) -> NormalizedReply {
    let content = first_of(raw, CONTENT_PATHS, string)
        .unwrap_or_default()
        .to_string();

    let clarifying_questions =
        first_of(raw, CLARIFYING_QUESTION_PATHS, non_empty_strings).unwrap_or_default();

    let needs_more_info = first_of(raw, NEEDS_MORE_INFO_PATHS, boolean).unwrap_or(false);

    let freelancer_matches = first_of(raw, MATCH_PATHS, non_empty_array)
        .map(Vec::as_slice)
        .map(normalize_results)
        .unwrap_or_default();

    let reported_provider = first_of(raw, PROVIDER_PATHS, string).and_then(Provider::parse);
    let implicit_fallback = reported_provider.is_some() && reported_provider != active;

    NormalizedReply {
        sequence,
        content,
        clarifying_questions,
        needs_more_info,
        freelancer_matches,
        reported_provider,
        implicit_fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn match_ids(raw: &Value) -> Vec<u64> {
        normalize_reply(raw, 1, None)
            .freelancer_matches
            .iter()
            .map(|r| r.id)
            .collect()
    }

    #[test]
    fn test_match_precedence_table() {
        let cases = [
            (
                "all four present",
                json!({
                    "metadata": { "matches": [{"id": 1}], "freelancerMatches": [{"id": 2}] },
                    "matches": [{"id": 3}],
                    "freelancerMatches": [{"id": 4}]
                }),
                vec![1],
            ),
            (
                "metadata.freelancerMatches over top level",
                json!({
                    "metadata": { "freelancerMatches": [{"id": 2}] },
                    "matches": [{"id": 3}],
                    "freelancerMatches": [{"id": 4}]
                }),
                vec![2],
            ),
            (
                "top-level matches over freelancerMatches",
                json!({ "matches": [{"id": 3}], "freelancerMatches": [{"id": 4}] }),
                vec![3],
            ),
            (
                "only top-level freelancerMatches",
                json!({ "freelancerMatches": [{"id": 4}, {"id": 5}] }),
                vec![4, 5],
            ),
            (
                "empty arrays are skipped",
                json!({
                    "metadata": { "matches": [], "freelancerMatches": [] },
                    "matches": [{"freelancerId": 6, "freelancer": {"displayName": "Ada"}}]
                }),
                vec![6],
            ),
            ("none present", json!({ "content": "hi" }), vec![]),
        ];

        for (name, raw, expected) in cases {
            assert_eq!(match_ids(&raw), expected, "case: {}", name);
        }
    }

    #[test]
    fn test_matches_are_not_merged() {
        let raw = json!({
            "metadata": { "matches": [{"id": 1}] },
            "freelancerMatches": [{"id": 2}]
        });
        assert_eq!(match_ids(&raw), vec![1]);
    }

    #[test]
    fn test_content_prefers_content_over_response() {
        let reply = normalize_reply(&json!({ "content": "new", "response": "old" }), 1, None);
        assert_eq!(reply.content, "new");

        let reply = normalize_reply(&json!({ "response": "old" }), 1, None);
        assert_eq!(reply.content, "old");

        let reply = normalize_reply(&json!({}), 1, None);
        assert_eq!(reply.content, "");
    }

    #[test]
    fn test_clarifying_questions_top_level_wins() {
        let raw = json!({
            "clarifyingQuestions": ["What is your budget?"],
            "metadata": { "clarifyingQuestions": ["Remote or on-site?"] }
        });
        let reply = normalize_reply(&raw, 1, None);
        assert_eq!(reply.clarifying_questions, vec!["What is your budget?"]);

        let raw = json!({ "metadata": { "clarifyingQuestions": ["Remote or on-site?"] } });
        let reply = normalize_reply(&raw, 1, None);
        assert_eq!(reply.clarifying_questions, vec!["Remote or on-site?"]);
    }

    #[test]
    fn test_needs_more_info_prefers_metadata() {
        let raw = json!({ "needsMoreInfo": false, "metadata": { "needsMoreInfo": true } });
        assert!(normalize_reply(&raw, 1, None).needs_more_info);

        let raw = json!({ "needsMoreInfo": true });
        assert!(normalize_reply(&raw, 1, None).needs_more_info);

        assert!(!normalize_reply(&json!({}), 1, None).needs_more_info);
    }

    #[test]
    fn test_reported_provider_flags_implicit_fallback() {
        let raw = json!({ "content": "hi", "metadata": { "provider": "ollama" } });

        let reply = normalize_reply(&raw, 4, Some(Provider::Deepseek));
        assert_eq!(reply.sequence, 4);
        assert_eq!(reply.reported_provider, Some(Provider::Ollama));
        assert!(reply.implicit_fallback);

        let reply = normalize_reply(&raw, 4, Some(Provider::Ollama));
        assert!(!reply.implicit_fallback);

        let reply = normalize_reply(&json!({ "metadata": { "provider": "none" } }), 4, None);
        assert_eq!(reply.reported_provider, None);
        assert!(!reply.implicit_fallback);
    }
}
