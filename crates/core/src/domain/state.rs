use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::change::{ApiChange, UpdatePhase};
use super::plan::{AnalysisResult, Modification};
use super::validation::ValidationResult;

/// Retry budget used when none is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Mutable state of one update workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateState {
    pub phase: UpdatePhase,
    pub current_attempt: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    /// Files actually written, in write order, without duplicates
    pub modified_files: Vec<String>,
    pub planned_modifications: Vec<Modification>,
    pub last_validation_results: Vec<ValidationResult>,
}

impl UpdateState {
    /// Record a written path. Returns `false` if it was already recorded.
    pub fn record_modified(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.modified_files.contains(&path) {
            return false;
        }
        self.modified_files.push(path);
        true
    }
}

/// One entry of the append-only attempt history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    pub phase: UpdatePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_results: Vec<ValidationResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifications_attempted: Vec<Modification>,
    pub timestamp: DateTime<Utc>,
}

impl AttemptResult {
    pub fn failure(phase: UpdatePhase, error: impl Into<String>) -> Self {
        Self {
            phase,
            error: Some(error.into()),
            validation_results: Vec::new(),
            modifications_attempted: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn success(phase: UpdatePhase) -> Self {
        Self {
            phase,
            error: None,
            validation_results: Vec::new(),
            modifications_attempted: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_validation_results(mut self, results: Vec<ValidationResult>) -> Self {
        self.validation_results = results;
        self
    }

    pub fn with_modifications(mut self, modifications: Vec<Modification>) -> Self {
        self.modifications_attempted = modifications;
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything known about a running workflow.
///
/// Owned by the orchestrator. Phase handlers borrow it mutably for the
/// duration of a single call; collaborators only ever see `&UpdateContext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContext {
    pub api_change: ApiChange,
    pub state: UpdateState,
    pub history: Vec<AttemptResult>,
    pub max_retries: u32,
}

impl UpdateContext {
    pub fn new(api_change: ApiChange, max_retries: u32) -> Self {
        Self {
            api_change,
            state: UpdateState::default(),
            history: Vec::new(),
            max_retries,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &AttemptResult> {
        self.history.iter().filter(|a| !a.is_success())
    }

    pub fn retries_remaining(&self) -> u32 {
        self.max_retries.saturating_sub(self.state.current_attempt)
    }
}
