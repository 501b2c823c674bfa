use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use updater_core::{ApiChange, AttemptResult, UpdateContext, UpdatePhase};
use uuid::Uuid;

use crate::core::{Advisor, PhaseHandler, Tooling, Validator, WorkflowEvent, WorkflowEventEmitter};
use crate::error::{OrchestratorError, Result, WorkflowRun};
use crate::phases::handler_for;
use crate::services::{ExecutorContext, OrchestratorConfig};
use crate::state_machine::PhaseStateMachine;

/// Drives an update workflow through its phases with a bounded retry budget.
///
/// Every failed phase attempt is appended to the history and charges the
/// single global budget; a successful phase advances without charging it.
/// The workflow ends after Publish succeeds, when the budget is spent, or
/// when the cancellation token fires.
pub struct UpdateOrchestrator {
    ctx: ExecutorContext,
    cancel: CancellationToken,
}

impl UpdateOrchestrator {
    pub fn new(
        advisor: Arc<dyn Advisor>,
        tooling: Arc<dyn Tooling>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            ctx: ExecutorContext::new(advisor, tooling, config),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.ctx = self.ctx.with_validator(validator);
        self
    }

    pub fn with_event_emitter(mut self, emitter: WorkflowEventEmitter) -> Self {
        self.ctx = self.ctx.with_event_emitter(emitter);
        self
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels the running workflow when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.ctx.config
    }

    /// Run the workflow for `change` to completion.
    ///
    /// The returned run carries the final context on success and on failure.
    pub async fn run(&mut self, change: ApiChange) -> WorkflowRun {
        self.ctx.run_id = Uuid::new_v4();
        let run_id = self.ctx.run_id;
        let mut update = UpdateContext::new(change, self.ctx.config.max_retries);

        info!(
            run_id = %run_id,
            change = %update.api_change,
            max_retries = update.max_retries,
            "Starting update workflow"
        );
        self.ctx.emit(WorkflowEvent::WorkflowStarted {
            change: update.api_change.clone(),
            max_retries: update.max_retries,
        });

        let result = self.drive(&mut update).await;

        match &result {
            Ok(()) => {
                info!(
                    run_id = %run_id,
                    modified_files = update.state.modified_files.len(),
                    attempts = update.state.current_attempt,
                    "Update workflow completed"
                );
                self.ctx.emit(WorkflowEvent::WorkflowCompleted {
                    modified_files: update.state.modified_files.clone(),
                });
            }
            Err(e) => {
                error!(
                    run_id = %run_id,
                    phase = %update.state.phase,
                    attempts = update.state.current_attempt,
                    error = %e,
                    "Update workflow failed"
                );
                self.ctx.emit(WorkflowEvent::WorkflowFailed {
                    attempts: update.state.current_attempt,
                    error: e.to_string(),
                });
            }
        }

        WorkflowRun {
            run_id,
            result,
            context: update,
        }
    }

    async fn drive(&self, update: &mut UpdateContext) -> Result<()> {
        while update.state.current_attempt < update.max_retries {
            let phase = update.state.phase;
            let attempt = update.state.current_attempt;

            debug!(phase = %phase, attempt, "Running phase");
            self.ctx.emit(WorkflowEvent::PhaseStarted { phase, attempt });

            match self.run_handler(handler_for(phase), update).await {
                Ok(()) => {
                    self.ctx.emit(WorkflowEvent::PhaseSucceeded { phase });

                    let Some(next) = PhaseStateMachine::next_phase(&phase) else {
                        update.history.push(AttemptResult::success(phase));
                        return Ok(());
                    };

                    PhaseStateMachine::validate_transition(&phase, &next)?;
                    info!(from = %phase, to = %next, "Phase advanced");
                    update.state.phase = next;
                }
                Err(err) => {
                    let next = PhaseStateMachine::retry_target(
                        &phase,
                        &err,
                        self.ctx.config.rewind_on_review_failure,
                    );
                    let message = Self::record_failure(update, phase, &err);

                    warn!(
                        phase = %phase,
                        attempt = update.state.current_attempt,
                        max_retries = update.max_retries,
                        error = %message,
                        "Phase attempt failed"
                    );
                    self.ctx.emit(WorkflowEvent::PhaseFailed {
                        phase,
                        attempt: update.state.current_attempt,
                        error: message,
                        next_phase: next,
                    });

                    if err.is_fatal() {
                        return Err(err);
                    }

                    // The phase stays on the failed handler once the budget is spent.
                    if update.state.current_attempt < update.max_retries {
                        PhaseStateMachine::validate_transition(&phase, &next)?;
                        update.state.phase = next;
                    }
                }
            }
        }

        Err(OrchestratorError::RetriesExhausted {
            attempts: update.history.len() as u32,
        })
    }

    /// One handler invocation bounded by the phase timeout and the cancellation token.
    async fn run_handler(
        &self,
        handler: &dyn PhaseHandler,
        update: &mut UpdateContext,
    ) -> Result<()> {
        let phase = handler.phase();
        let timeout = self.ctx.config.phase_timeout;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(OrchestratorError::Cancelled { phase }),
            outcome = tokio::time::timeout(timeout, handler.run(&self.ctx, update)) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) => Err(OrchestratorError::PhaseTimeout {
                        phase,
                        timeout_ms: timeout.as_millis() as u64,
                    }),
                }
            }
        }
    }

    /// Append a failed attempt to the history and charge the budget.
    fn record_failure(
        update: &mut UpdateContext,
        phase: UpdatePhase,
        err: &OrchestratorError,
    ) -> String {
        let message = format!("{}: {}", phase, err);
        let mut attempt = AttemptResult::failure(phase, message.clone());

        match phase {
            UpdatePhase::Validation => {
                attempt = attempt
                    .with_validation_results(update.state.last_validation_results.clone());
            }
            UpdatePhase::Implementation => {
                attempt = attempt.with_modifications(update.state.planned_modifications.clone());
            }
            UpdatePhase::Analysis | UpdatePhase::Publish => {}
        }

        update.history.push(attempt);
        update.state.current_attempt += 1;
        update.state.last_error = Some(message.clone());
        message
    }
}
