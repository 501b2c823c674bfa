//! Core abstractions for the update workflow.
//!
//! - [`PhaseHandler`] - Trait that all workflow phases implement
//! - [`Advisor`], [`Tooling`], [`Validator`] - Collaborator contracts
//! - [`WorkflowEventEmitter`] - Event emitter with sequence guarantees

mod collaborators;
mod events;
mod phase;

pub use collaborators::{Advisor, Tooling, Validator};
pub use events::{EventEnvelope, WorkflowEvent, WorkflowEventEmitter};
pub use phase::PhaseHandler;
