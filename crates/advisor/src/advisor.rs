use async_trait::async_trait;
use orchestrator::core::Advisor;
use orchestrator::CollaboratorResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use updater_core::{
    AnalysisResult, ImplementationPlan, ReviewDecision, UpdateContext, ValidationResult,
};

use crate::error::{AdvisorError, AdvisorResult};
use crate::openrouter::{ChatMessage, CompletionOptions, OpenRouterClient};
use crate::parse::parse_reply;
use crate::prompts::{UpdatePrompts, SYSTEM_PROMPT};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Settings for the OpenRouter-backed advisor.
///
/// The API key itself is never stored in config files; `api_key_env` names
/// the environment variable that holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// HTTP-level retries for rate limits and server errors
    pub max_retries: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: Some(0.2),
            max_tokens: Some(8192),
            max_retries: 3,
        }
    }
}

impl AdvisorConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> AdvisorResult<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AdvisorError::MissingApiKey(self.api_key_env.clone()))
    }
}

pub struct OpenRouterAdvisor {
    client: OpenRouterClient,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenRouterAdvisor {
    pub fn new(client: OpenRouterClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Build an advisor from config, reading the API key from the environment.
    pub fn from_config(config: &AdvisorConfig) -> AdvisorResult<Self> {
        let client = OpenRouterClient::new(config.api_key()?, config.base_url.clone())
            .with_max_retries(config.max_retries);

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: String, json: bool) -> AdvisorResult<String> {
        let options = CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json,
        };
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        self.client
            .chat_completion(messages, &self.model, &options)
            .await
    }
}

#[async_trait]
impl Advisor for OpenRouterAdvisor {
    async fn analyze_change(&self, ctx: &UpdateContext) -> CollaboratorResult<AnalysisResult> {
        debug!(change = %ctx.api_change, "Requesting analysis");
        let reply = self.complete(UpdatePrompts::analyze(ctx), true).await?;
        let analysis: AnalysisResult = parse_reply("analyze_change", &reply)?;

        info!(
            affected_files = analysis.affected_files.len(),
            required_changes = analysis.required_changes.len(),
            "Analysis received"
        );
        Ok(analysis)
    }

    async fn plan_implementation(
        &self,
        ctx: &UpdateContext,
    ) -> CollaboratorResult<ImplementationPlan> {
        debug!(
            change = %ctx.api_change,
            corrections = ctx.state.planned_modifications.len(),
            "Requesting implementation plan"
        );
        let reply = self.complete(UpdatePrompts::plan(ctx), true).await?;
        let plan: ImplementationPlan = parse_reply("plan_implementation", &reply)?;

        info!(steps = plan.steps.len(), "Implementation plan received");
        Ok(plan)
    }

    async fn review_validation_result(
        &self,
        ctx: &UpdateContext,
        result: &ValidationResult,
    ) -> CollaboratorResult<ReviewDecision> {
        if result.success {
            return Ok(ReviewDecision::approve());
        }

        debug!(errors = result.errors.len(), "Requesting review of failed validation");
        let reply = self.complete(UpdatePrompts::review(ctx, result), true).await?;
        let decision: ReviewDecision = parse_reply("review_validation_result", &reply)?;

        info!(
            success = decision.success,
            modifications = decision.modifications.len(),
            "Review received"
        );
        Ok(decision)
    }

    async fn prepare_pr_description(&self, ctx: &UpdateContext) -> CollaboratorResult<String> {
        let reply = self.complete(UpdatePrompts::pr_description(ctx), false).await?;
        let description = reply.trim();

        if description.is_empty() {
            return Err(AdvisorError::MalformedResponse {
                operation: "prepare_pr_description",
                message: "empty description".to_string(),
            }
            .into());
        }
        Ok(description.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_fill_missing_keys() {
        let config: AdvisorConfig = toml::from_str("model = \"openai/gpt-4o\"").unwrap();
        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_missing_api_key() {
        let config = AdvisorConfig {
            api_key_env: "API_UPDATER_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let err = OpenRouterAdvisor::from_config(&config).err().unwrap();
        assert!(matches!(err, AdvisorError::MissingApiKey(ref name) if name == "API_UPDATER_TEST_UNSET_KEY"));
    }
}
