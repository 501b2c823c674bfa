use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{GitHubError, Result};
use crate::types::{CreatePrRequest, PrState, PullRequest};

/// GitHub CLI wrapper that uses the user's local `gh` authentication
pub struct GhCli {
    /// Working directory for gh commands (usually the repo root)
    cwd: PathBuf,
    program: String,
}

impl GhCli {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            program: "gh".to_string(),
        }
    }

    /// Use a different executable than `gh` on the PATH
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn pr_create_args(request: &CreatePrRequest) -> Vec<String> {
        let mut args = vec![
            "pr".to_string(),
            "create".to_string(),
            "--title".to_string(),
            request.title.clone(),
            "--body".to_string(),
            request.body.clone(),
            "--head".to_string(),
            request.head.clone(),
        ];

        if let Some(ref base) = request.base {
            args.push("--base".to_string());
            args.push(base.clone());
        }

        if request.draft {
            args.push("--draft".to_string());
        }

        args
    }

    /// Create a pull request using gh CLI
    pub async fn create_pull_request(&self, request: CreatePrRequest) -> Result<PullRequest> {
        if request.title.is_empty() {
            return Err(GitHubError::InvalidRequest("empty title".to_string()));
        }

        info!(
            "Creating PR via gh CLI: {} ({} -> {})",
            request.title,
            request.head,
            request.base.as_deref().unwrap_or("default branch")
        );

        let output = Command::new(&self.program)
            .args(Self::pr_create_args(&request))
            .current_dir(&self.cwd)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => GitHubError::CliNotFound(self.program.clone()),
                _ => GitHubError::Api(format!("Failed to run gh CLI: {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitHubError::Api(format!("gh pr create failed: {}", stderr)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let pr_url = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();
        let number = pr_number_from_url(&pr_url).unwrap_or(0);

        debug!("Created PR #{} at {}", number, pr_url);

        Ok(PullRequest {
            number,
            title: request.title,
            body: Some(request.body),
            state: PrState::Open,
            head_branch: request.head,
            base_branch: request.base,
            html_url: pr_url,
            created_at: chrono::Utc::now(),
        })
    }
}

/// Extract the PR number from a URL such as `https://github.com/owner/repo/pull/123`
pub fn pr_number_from_url(url: &str) -> Option<u64> {
    url.trim_end_matches('/')
        .split('/')
        .next_back()
        .and_then(|s| s.parse::<u64>().ok())
}
