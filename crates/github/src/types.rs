use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Pull Request
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: PrState,
    pub head_branch: String,
    pub base_branch: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

#[derive(Debug, Clone)]
pub struct CreatePrRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    /// Target branch; the repository default when `None`
    pub base: Option<String>,
    pub draft: bool,
}

impl CreatePrRequest {
    pub fn new(title: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: String::new(),
            head: head.into(),
            base: None,
            draft: false,
        }
    }

    /// Title is the first non-empty line of `description`, body the whole text.
    pub fn from_description(description: &str, head: impl Into<String>) -> Self {
        let title = description
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .trim_start_matches('#')
            .trim();

        Self::new(title, head).with_body(description)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn as_draft(mut self) -> Self {
        self.draft = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_description() {
        let req = CreatePrRequest::from_description(
            "\n# Add enableNestedVirtualization to WorkstationConfig\n\nRegenerated types.",
            "ai-update/workstationconfig/enableNestedVirtualization",
        );

        assert_eq!(
            req.title,
            "Add enableNestedVirtualization to WorkstationConfig"
        );
        assert!(req.body.contains("Regenerated types."));
        assert!(req.base.is_none());
        assert!(!req.draft);
    }

    #[test]
    fn test_request_builder() {
        let req = CreatePrRequest::new("Title", "feature")
            .with_base("master")
            .as_draft();

        assert_eq!(req.base.as_deref(), Some("master"));
        assert!(req.draft);
    }

    #[test]
    fn test_pr_state_serialization() {
        let json = serde_json::to_string(&PrState::Open).unwrap();
        assert_eq!(json, "\"open\"");
        let state: PrState = serde_json::from_str("\"merged\"").unwrap();
        assert_eq!(state, PrState::Merged);
    }
}
