use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use super::types::{
    ApiErrorBody, ChatMessage, CompletionRequest, CompletionResponse, ResponseFormat,
};
use crate::error::{AdvisorError, AdvisorResult};

const DEFAULT_MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Options for one chat completion call.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Request a JSON object response
    pub json: bool,
}

/// Client for an OpenAI-compatible chat completions API (OpenRouter by default).
///
/// Rate limits (429) and server errors (5xx) are retried with exponential
/// backoff up to `max_retries` times; a `retry-after` header wins over the
/// computed delay. Other failures are returned immediately.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    initial_backoff: Duration,
}

impl OpenRouterClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Send `messages` and return the text of the first choice.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        options: &CompletionOptions,
    ) -> AdvisorResult<String> {
        let request = CompletionRequest {
            model,
            messages: &messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options.json.then(ResponseFormat::json_object),
            stream: false,
        };

        let mut backoff = self.initial_backoff;
        let mut retries = 0;

        loop {
            let err = match self.send(&request).await {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            let Some(delay) = retry_delay(&err, backoff) else {
                return Err(err);
            };
            if retries >= self.max_retries {
                warn!(retries, error = %err, "Chat completion retries exhausted");
                return Err(err);
            }

            retries += 1;
            warn!(
                error = %err,
                delay_ms = delay.as_millis() as u64,
                attempt = retries,
                max_retries = self.max_retries,
                "Chat completion failed, retrying"
            );
            tokio::time::sleep(delay).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> AdvisorResult<String> {
        debug!(
            model = request.model,
            messages = request.messages.len(),
            json = request.response_format.is_some(),
            "Sending chat completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: CompletionResponse = response.json().await?;
        if let Some(ref usage) = body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }

        body.into_text().ok_or_else(|| AdvisorError::OpenRouterApi {
            message: "No completion returned".to_string(),
            status_code: None,
        })
    }
}

/// Delay before retrying `err`, or `None` when it is not retryable.
fn retry_delay(err: &AdvisorError, backoff: Duration) -> Option<Duration> {
    match err {
        AdvisorError::RateLimited {
            retry_after: Some(secs),
        } => Some(Duration::from_secs(*secs).min(MAX_BACKOFF)),
        AdvisorError::RateLimited { retry_after: None } => Some(backoff),
        AdvisorError::OpenRouterApi {
            status_code: Some(code),
            ..
        } if *code >= 500 => Some(backoff),
        _ => None,
    }
}

async fn error_from_response(response: Response) -> AdvisorError {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return AdvisorError::RateLimited { retry_after };
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => body.error.message,
        Err(_) => text,
    };

    AdvisorError::OpenRouterApi {
        message,
        status_code: Some(status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenRouterClient::new(
            "test-key".to_string(),
            "https://openrouter.ai/api/v1/".to_string(),
        );
        assert_eq!(client.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(client.max_retries, 3);
    }

    #[test]
    fn test_retry_delay() {
        let backoff = Duration::from_millis(250);

        let limited = AdvisorError::RateLimited {
            retry_after: Some(2),
        };
        assert_eq!(retry_delay(&limited, backoff), Some(Duration::from_secs(2)));

        let server = AdvisorError::OpenRouterApi {
            message: "bad gateway".to_string(),
            status_code: Some(502),
        };
        assert_eq!(retry_delay(&server, backoff), Some(backoff));

        let client = AdvisorError::OpenRouterApi {
            message: "unauthorized".to_string(),
            status_code: Some(401),
        };
        assert_eq!(retry_delay(&client, backoff), None);

        let malformed = AdvisorError::MalformedResponse {
            operation: "plan_implementation",
            message: "eof".to_string(),
        };
        assert_eq!(retry_delay(&malformed, backoff), None);
    }
}
