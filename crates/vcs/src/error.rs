use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git {0}")]
    CommandFailed(String),

    #[error("{0} is not installed or not on PATH")]
    CommandNotFound(String),

    #[error("Not a git repository: {0}")]
    NotInitialized(String),

    #[error("No staged changes to commit in {0}")]
    NothingToCommit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VcsError>;
