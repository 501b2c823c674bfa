//! Strict decoding of model replies into domain types.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{AdvisorError, AdvisorResult};

/// Pull the JSON object out of a reply that may wrap it in a Markdown fence.
pub fn extract_json(content: &str) -> &str {
    if let Some(start) = content.find("```json") {
        let body = &content[start + 7..];
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    if let Some(start) = content.find("```\n{") {
        let body = &content[start + 4..];
        if let Some(end) = body.find("\n```") {
            return body[..end].trim();
        }
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if start < end {
            return &content[start..=end];
        }
    }

    content.trim()
}

/// Decode a reply as `T`. Anything that does not deserialize is an error.
pub fn parse_reply<T: DeserializeOwned>(operation: &'static str, content: &str) -> AdvisorResult<T> {
    let json = extract_json(content);

    serde_json::from_str(json).map_err(|e| {
        warn!(
            operation,
            error = %e,
            content_preview = %content.chars().take(500).collect::<String>(),
            "Failed to parse advisor reply"
        );
        AdvisorError::MalformedResponse {
            operation,
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use updater_core::{ImplementationPlan, ReviewDecision};

    #[test]
    fn test_extract_json_from_markdown() {
        let content = "Here you go\n```json\n{\"success\": true}\n```\nDone";
        assert_eq!(extract_json(content), "{\"success\": true}");
    }

    #[test]
    fn test_extract_json_from_plain_fence() {
        let content = "```\n{\"steps\": []}\n```";
        assert_eq!(extract_json(content), "{\"steps\": []}");
    }

    #[test]
    fn test_extract_json_raw() {
        let content = "  {\"a\": {\"b\": 1}} trailing";
        assert_eq!(extract_json(content), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_parse_plan_reply() {
        let reply = r#"```json
{"steps": [{"kind": "modify_file", "file_path": "pkg/a.go",
  "modifications": [{"start_line": 2, "end_line": 2, "new_content": "x"}]}]}
```"#;
        let plan: ImplementationPlan = parse_reply("plan_implementation", reply).unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert!(plan.modifications()[0].is_insertion());
    }

    #[test]
    fn test_unknown_step_kind_is_malformed() {
        let reply = r#"{"steps": [{"kind": "rewrite_repo", "file_path": "x"}]}"#;
        let err = parse_reply::<ImplementationPlan>("plan_implementation", reply).unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::MalformedResponse {
                operation: "plan_implementation",
                ..
            }
        ));
    }

    #[test]
    fn test_prose_reply_is_malformed() {
        let err = parse_reply::<ReviewDecision>("review_validation_result", "Looks like success!")
            .unwrap_err();
        assert!(err.to_string().starts_with("Malformed review_validation_result response"));
    }
}
