//! Contracts for the external collaborators the orchestrator drives.
//!
//! Implementations live outside this crate. Every call is awaited before the
//! workflow moves on, so implementations never see concurrent calls from one
//! workflow except for validators under `parallel_validation`.

use async_trait::async_trait;
use updater_core::{
    AnalysisResult, GenerateMapperOptions, GenerateTypesOptions, ImplementationPlan,
    ReviewDecision, UpdateContext, ValidationResult,
};

use crate::error::CollaboratorResult;

/// Reasoning service that analyzes, plans, reviews and describes a change.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn analyze_change(&self, ctx: &UpdateContext) -> CollaboratorResult<AnalysisResult>;

    /// Plan the edits for the change. Pending corrective modifications from a
    /// rejected review are available as `ctx.state.planned_modifications`.
    async fn plan_implementation(
        &self,
        ctx: &UpdateContext,
    ) -> CollaboratorResult<ImplementationPlan>;

    async fn review_validation_result(
        &self,
        ctx: &UpdateContext,
        result: &ValidationResult,
    ) -> CollaboratorResult<ReviewDecision>;

    async fn prepare_pr_description(&self, ctx: &UpdateContext) -> CollaboratorResult<String>;
}

/// File access, code generation and publishing.
#[async_trait]
pub trait Tooling: Send + Sync {
    async fn read_file(&self, path: &str) -> CollaboratorResult<Vec<u8>>;

    async fn write_file(&self, path: &str, content: &[u8]) -> CollaboratorResult<()>;

    async fn generate_types(&self, options: &GenerateTypesOptions) -> CollaboratorResult<()>;

    async fn generate_mapper(&self, options: &GenerateMapperOptions) -> CollaboratorResult<()>;

    /// Create `branch`, commit `files` to it and open a pull request.
    async fn publish(
        &self,
        branch: &str,
        files: &[String],
        description: &str,
    ) -> CollaboratorResult<()>;
}

/// Build or compile check over the working tree.
#[async_trait]
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    async fn validate(&self, ctx: &UpdateContext) -> CollaboratorResult<ValidationResult>;
}
