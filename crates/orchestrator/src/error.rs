use thiserror::Error;
use updater_core::{UpdateContext, UpdatePhase};
use uuid::Uuid;

use crate::applier::ApplyError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error reported by an advisor, tooling or validator implementation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CollaboratorError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition { from: UpdatePhase, to: UpdatePhase },

    #[error("Advisor {operation} failed: {source}")]
    Advisor {
        operation: &'static str,
        #[source]
        source: CollaboratorError,
    },

    #[error("Tooling {operation} failed: {source}")]
    Tooling {
        operation: String,
        #[source]
        source: CollaboratorError,
    },

    #[error("Validator {name} failed: {source}")]
    Validator {
        name: String,
        #[source]
        source: CollaboratorError,
    },

    #[error("Malformed plan for {path}: {source}")]
    MalformedPlan {
        path: String,
        #[source]
        source: ApplyError,
    },

    #[error("Validation rejected: {error_count} compile errors, {planned} corrective modifications planned")]
    ReviewRejected { error_count: usize, planned: usize },

    #[error("Phase {phase} timed out after {timeout_ms}ms")]
    PhaseTimeout { phase: UpdatePhase, timeout_ms: u64 },

    #[error("Workflow cancelled during {phase}")]
    Cancelled { phase: UpdatePhase },

    #[error("Max retries exceeded after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl OrchestratorError {
    pub fn advisor(operation: &'static str, source: CollaboratorError) -> Self {
        Self::Advisor { operation, source }
    }

    pub fn tooling(operation: impl Into<String>, source: CollaboratorError) -> Self {
        Self::Tooling {
            operation: operation.into(),
            source,
        }
    }

    /// Errors that end the workflow instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Cancelled { .. } | Self::RetriesExhausted { .. } | Self::InvalidTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Outcome of one workflow run together with the context it ended in.
///
/// The context is returned on failure too, so the full attempt history stays
/// inspectable after a fatal error.
#[derive(Debug)]
pub struct WorkflowRun {
    pub run_id: Uuid,
    pub result: Result<()>,
    pub context: UpdateContext,
}

impl WorkflowRun {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }

    pub fn history(&self) -> &[updater_core::AttemptResult] {
        &self.context.history
    }

    pub fn modified_files(&self) -> &[String] {
        &self.context.state.modified_files
    }

    /// Convert to standard Result, discarding context.
    pub fn into_result(self) -> Result<()> {
        self.result
    }
}
