pub mod applier;
pub mod core;
pub mod error;
pub mod executor;
pub mod phases;
pub mod services;
pub mod state_machine;

pub use applier::{apply_modifications, validate_modifications, ApplyError};
pub use error::{CollaboratorError, CollaboratorResult, OrchestratorError, Result, WorkflowRun};
pub use executor::UpdateOrchestrator;
pub use services::{ExecutorContext, OrchestratorConfig};
pub use state_machine::PhaseStateMachine;
