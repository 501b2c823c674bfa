//! OpenRouter-backed advisor for API update workflows.
//!
//! Sends analysis, planning, review and PR-description prompts to a chat
//! completion model and decodes the replies into the domain types the
//! orchestrator consumes. Replies that do not decode are errors, never
//! silently defaulted.

mod advisor;
pub mod error;
pub mod openrouter;
pub mod parse;
pub mod prompts;

pub use advisor::{
    AdvisorConfig, OpenRouterAdvisor, DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use error::{AdvisorError, AdvisorResult};
pub use openrouter::{CompletionOptions, OpenRouterClient};
