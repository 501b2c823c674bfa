//! Validation phase.
//!
//! Runs every registered validator, reviews the aggregate result through the
//! advisor and turns a rejecting verdict into corrective modifications for the
//! next Implementation attempt.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};
use updater_core::{UpdateContext, UpdatePhase, ValidationResult};

use crate::core::PhaseHandler;
use crate::error::{OrchestratorError, Result};
use crate::services::ExecutorContext;

pub struct ValidationPhase;

impl ValidationPhase {
    async fn run_sequential(
        ctx: &ExecutorContext,
        update: &mut UpdateContext,
    ) -> Result<Vec<ValidationResult>> {
        let mut results = Vec::with_capacity(ctx.validators.len());

        for validator in &ctx.validators {
            match validator.validate(update).await {
                Ok(result) => results.push(result),
                Err(source) => {
                    update.state.last_validation_results = results;
                    return Err(OrchestratorError::Validator {
                        name: validator.name().to_string(),
                        source,
                    });
                }
            }
        }

        Ok(results)
    }

    async fn run_parallel(
        ctx: &ExecutorContext,
        update: &mut UpdateContext,
    ) -> Result<Vec<ValidationResult>> {
        let shared: &UpdateContext = update;
        let outcomes = join_all(ctx.validators.iter().map(|validator| async move {
            (validator.name().to_string(), validator.validate(shared).await)
        }))
        .await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(source) if first_error.is_none() => {
                    first_error = Some(OrchestratorError::Validator { name, source });
                }
                Err(source) => {
                    warn!(validator = %name, error = %source, "Additional validator failure");
                }
            }
        }

        match first_error {
            Some(err) => {
                update.state.last_validation_results = results;
                Err(err)
            }
            None => Ok(results),
        }
    }
}

#[async_trait]
impl PhaseHandler for ValidationPhase {
    fn phase(&self) -> UpdatePhase {
        UpdatePhase::Validation
    }

    async fn run(&self, ctx: &ExecutorContext, update: &mut UpdateContext) -> Result<()> {
        update.state.last_validation_results.clear();

        if ctx.validators.is_empty() {
            warn!("No validators registered, the empty aggregate passes");
        }

        let results = if ctx.config.parallel_validation {
            Self::run_parallel(ctx, update).await?
        } else {
            Self::run_sequential(ctx, update).await?
        };

        let aggregate = ValidationResult::aggregate(&results);
        update.state.last_validation_results = results;

        info!(
            validators = ctx.validators.len(),
            success = aggregate.success,
            errors = aggregate.errors.len(),
            "Validation finished"
        );

        let decision = ctx
            .advisor
            .review_validation_result(update, &aggregate)
            .await
            .map_err(|e| OrchestratorError::advisor("review_validation_result", e))?;

        if decision.success {
            return Ok(());
        }

        let planned = decision.modifications.len();
        update.state.planned_modifications = decision.modifications;

        Err(OrchestratorError::ReviewRejected {
            error_count: aggregate.errors.len(),
            planned,
        })
    }
}
