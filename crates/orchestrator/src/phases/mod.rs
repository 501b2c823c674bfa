//! Phase handlers for the update workflow.
//!
//! - [`AnalysisPhase`] - Impact analysis through the advisor
//! - [`ImplementationPhase`] - Plans and applies edits and generator runs
//! - [`ValidationPhase`] - Runs validators and reviews the aggregate result
//! - [`PublishPhase`] - Branch, commit, push and pull request

mod analysis;
mod implementation;
mod publish;
mod validation;

pub use analysis::AnalysisPhase;
pub use implementation::ImplementationPhase;
pub use publish::{branch_name, PublishPhase};
pub use validation::ValidationPhase;

use crate::core::PhaseHandler;
use updater_core::UpdatePhase;

/// Handler for `phase`.
pub fn handler_for(phase: UpdatePhase) -> &'static dyn PhaseHandler {
    match phase {
        UpdatePhase::Analysis => &AnalysisPhase,
        UpdatePhase::Implementation => &ImplementationPhase,
        UpdatePhase::Validation => &ValidationPhase,
        UpdatePhase::Publish => &PublishPhase,
    }
}
