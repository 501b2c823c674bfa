//! Implementation phase.
//!
//! Plans the edits through the advisor and prepares every file edit of the
//! plan in memory before anything is written. Targets that an earlier
//! generator step produces cannot be read ahead; their edits are range-checked
//! up front and bounds-checked when the step runs. A failing step stops the
//! phase; files written by earlier steps stay written and stay listed in
//! `modified_files`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::{debug, info};
use updater_core::{
    ImplementationPlan, ImplementationStep, Modification, UpdateContext, UpdatePhase,
};

use crate::applier::{apply_modifications, validate_ranges, ApplyError};
use crate::core::PhaseHandler;
use crate::error::{OrchestratorError, Result};
use crate::services::ExecutorContext;

pub struct ImplementationPhase;

fn malformed(path: &str) -> impl FnOnce(ApplyError) -> OrchestratorError + '_ {
    move |source| OrchestratorError::MalformedPlan {
        path: path.to_string(),
        source,
    }
}

impl ImplementationPhase {
    /// Check the whole plan against the files on disk before any write.
    ///
    /// Returns the edited content for each `ModifyFile` step whose target
    /// could be read ahead, indexed like `plan.steps`. Repeated edits of one
    /// file chain on the staged content.
    async fn prepare(
        ctx: &ExecutorContext,
        plan: &ImplementationPlan,
    ) -> Result<Vec<Option<Vec<u8>>>> {
        let mut generated: HashSet<&str> = HashSet::new();
        let mut staged: HashMap<&str, Vec<u8>> = HashMap::new();
        let mut prepared = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            let ImplementationStep::ModifyFile {
                file_path,
                modifications,
            } = step
            else {
                generated.insert(step.file_path());
                staged.remove(step.file_path());
                prepared.push(None);
                continue;
            };

            validate_ranges(modifications).map_err(malformed(file_path))?;
            if generated.contains(file_path.as_str()) {
                prepared.push(None);
                continue;
            }

            let content = match staged.remove(file_path.as_str()) {
                Some(content) => content,
                None => Self::read(ctx, file_path).await?,
            };
            let updated =
                apply_modifications(&content, modifications).map_err(malformed(file_path))?;
            staged.insert(file_path.as_str(), updated.clone());
            prepared.push(Some(updated));
        }

        Ok(prepared)
    }

    async fn read(ctx: &ExecutorContext, file_path: &str) -> Result<Vec<u8>> {
        ctx.tooling
            .read_file(file_path)
            .await
            .map_err(|e| OrchestratorError::tooling(format!("read_file {file_path}"), e))
    }

    /// Edit a file produced earlier in this plan.
    async fn apply_to_generated(
        ctx: &ExecutorContext,
        file_path: &str,
        modifications: &[Modification],
    ) -> Result<Vec<u8>> {
        let content = Self::read(ctx, file_path).await?;
        apply_modifications(&content, modifications).map_err(malformed(file_path))
    }

    async fn execute_step(
        ctx: &ExecutorContext,
        update: &mut UpdateContext,
        step: &ImplementationStep,
        prepared: Option<Vec<u8>>,
    ) -> Result<()> {
        debug!(kind = step.kind(), path = step.file_path(), "Executing plan step");

        match step {
            ImplementationStep::GenerateTypes { file_path, options } => {
                ctx.tooling
                    .generate_types(options)
                    .await
                    .map_err(|e| {
                        OrchestratorError::tooling(format!("generate_types {file_path}"), e)
                    })?;
                update.state.record_modified(file_path.as_str());
            }
            ImplementationStep::GenerateMapper { file_path, options } => {
                ctx.tooling
                    .generate_mapper(options)
                    .await
                    .map_err(|e| {
                        OrchestratorError::tooling(format!("generate_mapper {file_path}"), e)
                    })?;
                update.state.record_modified(file_path.as_str());
            }
            ImplementationStep::ModifyFile {
                file_path,
                modifications,
            } => {
                let updated = match prepared {
                    Some(content) => content,
                    None => Self::apply_to_generated(ctx, file_path, modifications).await?,
                };

                ctx.tooling
                    .write_file(file_path, &updated)
                    .await
                    .map_err(|e| {
                        OrchestratorError::tooling(format!("write_file {file_path}"), e)
                    })?;
                update.state.record_modified(file_path.as_str());
            }
        }

        Ok(())
    }
}

#[async_trait]
impl PhaseHandler for ImplementationPhase {
    fn phase(&self) -> UpdatePhase {
        UpdatePhase::Implementation
    }

    async fn run(&self, ctx: &ExecutorContext, update: &mut UpdateContext) -> Result<()> {
        let plan = ctx
            .advisor
            .plan_implementation(update)
            .await
            .map_err(|e| OrchestratorError::advisor("plan_implementation", e))?;

        update.state.planned_modifications = plan.modifications();
        let prepared = Self::prepare(ctx, &plan).await?;

        info!(
            steps = plan.steps.len(),
            modifications = update.state.planned_modifications.len(),
            "Executing implementation plan"
        );

        for (step, content) in plan.steps.iter().zip(prepared) {
            Self::execute_step(ctx, update, step, content).await?;
        }

        update.state.planned_modifications.clear();
        Ok(())
    }
}
