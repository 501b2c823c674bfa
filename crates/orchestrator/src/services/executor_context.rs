use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use updater_core::DEFAULT_MAX_RETRIES;
use uuid::Uuid;

use crate::core::{Advisor, Tooling, Validator, WorkflowEvent, WorkflowEventEmitter};

pub const DEFAULT_BRANCH_PREFIX: &str = "ai-update";
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Total failed attempts allowed across all phases
    pub max_retries: u32,
    /// Upper bound for one handler invocation
    pub phase_timeout: Duration,
    /// Send the next attempt back to Implementation when a review rejects the build
    pub rewind_on_review_failure: bool,
    /// Run validators concurrently instead of one after another
    pub parallel_validation: bool,
    pub branch_prefix: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            phase_timeout: DEFAULT_PHASE_TIMEOUT,
            rewind_on_review_failure: true,
            parallel_validation: false,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_phase_timeout(mut self, timeout: Duration) -> Self {
        self.phase_timeout = timeout;
        self
    }

    pub fn with_rewind_on_review_failure(mut self, rewind: bool) -> Self {
        self.rewind_on_review_failure = rewind;
        self
    }

    pub fn with_parallel_validation(mut self, parallel: bool) -> Self {
        self.parallel_validation = parallel;
        self
    }

    pub fn with_branch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.branch_prefix = prefix.into();
        self
    }
}

/// Shared services handed to every phase handler.
pub struct ExecutorContext {
    pub config: OrchestratorConfig,
    pub advisor: Arc<dyn Advisor>,
    pub tooling: Arc<dyn Tooling>,
    pub validators: Vec<Arc<dyn Validator>>,
    pub events: Option<WorkflowEventEmitter>,
    pub run_id: Uuid,
}

impl ExecutorContext {
    pub fn new(
        advisor: Arc<dyn Advisor>,
        tooling: Arc<dyn Tooling>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            config,
            advisor,
            tooling,
            validators: Vec::new(),
            events: None,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_event_emitter(mut self, emitter: WorkflowEventEmitter) -> Self {
        self.events = Some(emitter);
        self
    }

    pub fn emit(&self, event: WorkflowEvent) {
        if let Some(ref emitter) = self.events {
            let sequence = emitter.emit(self.run_id, event);
            debug!(run_id = %self.run_id, sequence, "Workflow event emitted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.phase_timeout, Duration::from_secs(900));
        assert!(config.rewind_on_review_failure);
        assert!(!config.parallel_validation);
        assert_eq!(config.branch_prefix, "ai-update");
    }

    #[test]
    fn test_config_builder() {
        let config = OrchestratorConfig::new()
            .with_max_retries(5)
            .with_phase_timeout(Duration::from_secs(30))
            .with_rewind_on_review_failure(false)
            .with_parallel_validation(true)
            .with_branch_prefix("bot");

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.phase_timeout, Duration::from_secs(30));
        assert!(!config.rewind_on_review_failure);
        assert!(config.parallel_validation);
        assert_eq!(config.branch_prefix, "bot");
    }
}
