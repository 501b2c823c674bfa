use async_trait::async_trait;

use crate::error::Result;

/// Outcome of [`VersionControl::create_branch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchCheckout {
    /// The branch did not exist and was created from HEAD
    Created,
    /// The branch already existed, usually from an earlier publish attempt
    Existing,
}

/// Version control operations needed to publish a change on its own branch.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Check if the repository is initialized with this VCS
    async fn is_initialized(&self) -> Result<bool>;

    /// Switch to `branch`, creating it from the current HEAD when missing
    async fn create_branch(&self, branch: &str) -> Result<BranchCheckout>;

    /// Stage the given paths, relative to the repository root
    async fn stage(&self, paths: &[String]) -> Result<()>;

    /// Commit staged changes and return the new commit id
    async fn commit(&self, message: &str) -> Result<String>;

    /// Id of the commit HEAD points at
    async fn head_commit(&self) -> Result<String>;

    /// Push `branch` to the configured remote
    async fn push(&self, branch: &str) -> Result<()>;
}
