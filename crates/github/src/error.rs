use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("API error: {0}")]
    Api(String),

    #[error("GitHub CLI not found: {0}")]
    CliNotFound(String),

    #[error("Invalid pull request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, GitHubError>;
