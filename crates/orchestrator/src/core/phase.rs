//! Phase handler trait.
//!
//! Each workflow phase (Analysis, Implementation, Validation, Publish)
//! implements `PhaseHandler`. The orchestrator owns the `UpdateContext` and
//! lends it mutably for exactly one `run` call; retry, timeout and history
//! bookkeeping stay in the orchestrator.

use async_trait::async_trait;
use updater_core::{UpdateContext, UpdatePhase};

use crate::error::Result;
use crate::services::ExecutorContext;

#[async_trait]
pub trait PhaseHandler: Send + Sync {
    /// The phase this handler runs.
    fn phase(&self) -> UpdatePhase;

    /// Run the phase once.
    ///
    /// An `Err` is recorded as a failed attempt. Partial state changes made
    /// before the error (for example files already written) are kept.
    async fn run(&self, ctx: &ExecutorContext, update: &mut UpdateContext) -> Result<()>;
}
