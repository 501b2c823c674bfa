use github::GitHubError;
use orchestrator::CollaboratorError;
use thiserror::Error;
use vcs::VcsError;

#[derive(Debug, Error)]
pub enum ToolingError {
    #[error("Path escapes project root: {0}")]
    PathEscape(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("{command} failed: {status}\nOutput: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("Empty command configured for {0}")]
    EmptyCommand(&'static str),

    #[error("VCS error: {0}")]
    Vcs(#[from] VcsError),

    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),
}

pub type Result<T> = std::result::Result<T, ToolingError>;

impl From<ToolingError> for CollaboratorError {
    fn from(err: ToolingError) -> Self {
        CollaboratorError::with_source(err.to_string(), err)
    }
}
