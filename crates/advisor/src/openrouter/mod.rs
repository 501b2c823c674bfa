//! OpenRouter API client for chat completions

pub mod client;
pub mod types;

pub use client::{CompletionOptions, OpenRouterClient};
pub use types::*;
