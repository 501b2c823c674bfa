use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, VcsError};
use crate::traits::{BranchCheckout, VersionControl};

pub struct GitVcs {
    repo_path: PathBuf,
    remote: String,
}

impl GitVcs {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            remote: "origin".to_string(),
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        debug!("Running git {:?} in {:?}", args, self.repo_path);

        Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => VcsError::CommandNotFound("git".to_string()),
                _ => VcsError::Io(e),
            })
    }

    async fn run_git(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(VcsError::CommandFailed(format!(
                "{} failed: {}{}",
                args.join(" "),
                stderr,
                stdout
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VersionControl for GitVcs {
    async fn is_initialized(&self) -> Result<bool> {
        let git_dir = self.repo_path.join(".git");
        Ok(git_dir.exists())
    }

    async fn create_branch(&self, branch: &str) -> Result<BranchCheckout> {
        if !self.is_initialized().await? {
            return Err(VcsError::NotInitialized(
                self.repo_path.display().to_string(),
            ));
        }

        let local_ref = format!("refs/heads/{}", branch);
        let exists = self
            .output(&["rev-parse", "--verify", "--quiet", &local_ref])
            .await?
            .status
            .success();

        if exists {
            self.run_git(&["checkout", branch]).await?;
            info!(branch = %branch, "Switched to existing branch");
            Ok(BranchCheckout::Existing)
        } else {
            self.run_git(&["checkout", "-b", branch]).await?;
            info!(branch = %branch, "Created branch");
            Ok(BranchCheckout::Created)
        }
    }

    async fn stage(&self, paths: &[String]) -> Result<()> {
        for path in paths {
            self.run_git(&["add", "--", path]).await?;
        }
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<String> {
        let staged = self.run_git(&["diff", "--cached", "--name-only"]).await?;
        if staged.trim().is_empty() {
            return Err(VcsError::NothingToCommit(
                self.repo_path.display().to_string(),
            ));
        }

        self.run_git(&["commit", "-m", message]).await?;
        self.head_commit().await
    }

    async fn head_commit(&self) -> Result<String> {
        let output = self.run_git(&["rev-parse", "HEAD"]).await?;
        Ok(output.trim().to_string())
    }

    async fn push(&self, branch: &str) -> Result<()> {
        self.run_git(&["push", "-u", &self.remote, branch]).await?;
        info!(remote = %self.remote, branch = %branch, "Pushed branch");
        Ok(())
    }
}
