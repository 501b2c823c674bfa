use async_trait::async_trait;
use tracing::{info, warn};
use updater_core::{ApiChange, UpdateContext, UpdatePhase};

use crate::core::PhaseHandler;
use crate::error::{OrchestratorError, Result};
use crate::services::ExecutorContext;

/// Branch used to publish `change`: `{prefix}/{lowercase message}/{field}`.
pub fn branch_name(prefix: &str, change: &ApiChange) -> String {
    format!(
        "{}/{}/{}",
        prefix,
        change.message_name.to_lowercase(),
        change.field_name
    )
}

/// Publishes the modified files as a pull request.
pub struct PublishPhase;

#[async_trait]
impl PhaseHandler for PublishPhase {
    fn phase(&self) -> UpdatePhase {
        UpdatePhase::Publish
    }

    async fn run(&self, ctx: &ExecutorContext, update: &mut UpdateContext) -> Result<()> {
        let description = ctx
            .advisor
            .prepare_pr_description(update)
            .await
            .map_err(|e| OrchestratorError::advisor("prepare_pr_description", e))?;

        let branch = branch_name(&ctx.config.branch_prefix, &update.api_change);

        if update.state.modified_files.is_empty() {
            warn!(branch = %branch, "Publishing with no modified files");
        }

        ctx.tooling
            .publish(&branch, &update.state.modified_files, &description)
            .await
            .map_err(|e| OrchestratorError::tooling("publish", e))?;

        info!(
            branch = %branch,
            files = update.state.modified_files.len(),
            "Change published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name() {
        let change = ApiChange::new("WorkstationConfig", "enableNestedVirtualization");
        assert_eq!(
            branch_name("ai-update", &change),
            "ai-update/workstationconfig/enableNestedVirtualization"
        );
    }

    #[test]
    fn test_branch_name_is_deterministic() {
        let change = ApiChange::new("Foo", "bar");
        assert_eq!(branch_name("bot", &change), branch_name("bot", &change));
        assert_eq!(branch_name("bot", &change), "bot/foo/bar");
    }
}
