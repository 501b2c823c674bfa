use async_trait::async_trait;
use tracing::info;
use updater_core::{UpdateContext, UpdatePhase};

use crate::core::PhaseHandler;
use crate::error::{OrchestratorError, Result};
use crate::services::ExecutorContext;

/// Asks the advisor what the change affects and stores the answer.
pub struct AnalysisPhase;

#[async_trait]
impl PhaseHandler for AnalysisPhase {
    fn phase(&self) -> UpdatePhase {
        UpdatePhase::Analysis
    }

    async fn run(&self, ctx: &ExecutorContext, update: &mut UpdateContext) -> Result<()> {
        let analysis = ctx
            .advisor
            .analyze_change(update)
            .await
            .map_err(|e| OrchestratorError::advisor("analyze_change", e))?;

        info!(
            change = %update.api_change,
            affected_files = analysis.affected_files.len(),
            required_changes = analysis.required_changes.len(),
            "Analysis complete"
        );

        update.state.analysis = Some(analysis);
        Ok(())
    }
}
