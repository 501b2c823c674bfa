use orchestrator::CollaboratorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("OpenRouter API error: {message}")]
    OpenRouterApi {
        message: String,
        status_code: Option<u16>,
    },

    #[error("OpenRouter rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed {operation} response: {message}")]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),
}

pub type AdvisorResult<T> = std::result::Result<T, AdvisorError>;

impl From<AdvisorError> for CollaboratorError {
    fn from(err: AdvisorError) -> Self {
        CollaboratorError::with_source(err.to_string(), err)
    }
}
