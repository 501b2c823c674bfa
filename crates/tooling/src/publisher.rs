//! Publishing a finished change: branch, commit, push and pull request.

use async_trait::async_trait;
use github::{CreatePrRequest, GhCli};
use tracing::info;
use vcs::{BranchCheckout, VcsError, VersionControl};

use crate::config::ToolingConfig;
use crate::error::Result;

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, branch: &str, files: &[String], description: &str) -> Result<()>;
}

/// Publishes through a version control backend and the GitHub CLI.
pub struct GitPublisher<V> {
    vcs: V,
    gh: GhCli,
    base_branch: Option<String>,
    draft: bool,
}

impl<V: VersionControl> GitPublisher<V> {
    pub fn new(vcs: V, gh: GhCli, config: &ToolingConfig) -> Self {
        Self {
            vcs,
            gh,
            base_branch: config.base_branch.clone(),
            draft: config.draft,
        }
    }

    /// Commit the staged files. A branch left by an earlier attempt may
    /// already carry the commit, in which case its HEAD is reused.
    async fn commit(&self, checkout: BranchCheckout, description: &str) -> Result<String> {
        match self.vcs.commit(description).await {
            Err(VcsError::NothingToCommit(_)) if checkout == BranchCheckout::Existing => {
                let head = self.vcs.head_commit().await?;
                info!(commit = %head, "Nothing new to commit, reusing branch head");
                Ok(head)
            }
            result => Ok(result?),
        }
    }

    fn pr_request(&self, branch: &str, description: &str) -> CreatePrRequest {
        let mut request = CreatePrRequest::from_description(description, branch);
        if let Some(ref base) = self.base_branch {
            request = request.with_base(base.clone());
        }
        if self.draft {
            request = request.as_draft();
        }
        request
    }
}

#[async_trait]
impl<V: VersionControl> Publisher for GitPublisher<V> {
    async fn publish(&self, branch: &str, files: &[String], description: &str) -> Result<()> {
        let checkout = self.vcs.create_branch(branch).await?;
        self.vcs.stage(files).await?;
        let commit = self.commit(checkout, description).await?;
        self.vcs.push(branch).await?;

        let pr = self
            .gh
            .create_pull_request(self.pr_request(branch, description))
            .await?;

        info!(
            branch = %branch,
            commit = %commit,
            pr_number = pr.number,
            url = %pr.html_url,
            "Pull request created"
        );
        Ok(())
    }
}

/// Logs what would be published and touches nothing.
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, branch: &str, files: &[String], description: &str) -> Result<()> {
        info!(
            branch = %branch,
            files = ?files,
            description_length = description.len(),
            "Dry run: skipping publish"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingVcs {
        calls: Mutex<Vec<String>>,
        fail_push: bool,
        branch_exists: bool,
        nothing_staged: bool,
    }

    #[async_trait]
    impl VersionControl for RecordingVcs {
        async fn is_initialized(&self) -> vcs::Result<bool> {
            Ok(true)
        }

        async fn create_branch(&self, branch: &str) -> vcs::Result<BranchCheckout> {
            self.calls.lock().unwrap().push(format!("branch {}", branch));
            Ok(if self.branch_exists {
                BranchCheckout::Existing
            } else {
                BranchCheckout::Created
            })
        }

        async fn stage(&self, paths: &[String]) -> vcs::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("stage {}", paths.join(",")));
            Ok(())
        }

        async fn commit(&self, message: &str) -> vcs::Result<String> {
            if self.nothing_staged {
                return Err(VcsError::NothingToCommit("/repo".to_string()));
            }
            self.calls.lock().unwrap().push(format!("commit {}", message));
            Ok("abc123".to_string())
        }

        async fn head_commit(&self) -> vcs::Result<String> {
            Ok("def456".to_string())
        }

        async fn push(&self, branch: &str) -> vcs::Result<()> {
            if self.fail_push {
                return Err(VcsError::CommandFailed("push rejected".to_string()));
            }
            self.calls.lock().unwrap().push(format!("push {}", branch));
            Ok(())
        }
    }

    #[test]
    fn test_pr_request_uses_config() {
        let config = ToolingConfig {
            base_branch: Some("master".to_string()),
            draft: true,
            ..Default::default()
        };
        let publisher = GitPublisher::new(RecordingVcs::default(), GhCli::new("."), &config);

        let request = publisher.pr_request("ai-update/foo/bar", "Add bar\n\nDetails");
        assert_eq!(request.title, "Add bar");
        assert_eq!(request.head, "ai-update/foo/bar");
        assert_eq!(request.base.as_deref(), Some("master"));
        assert!(request.draft);
    }

    #[tokio::test]
    async fn test_push_failure_stops_before_pull_request() {
        let vcs = RecordingVcs {
            fail_push: true,
            ..Default::default()
        };
        let gh = GhCli::new(".").with_program("gh-definitely-not-installed");
        let publisher = GitPublisher::new(vcs, gh, &ToolingConfig::default());

        let err = publisher
            .publish("b", &["a.go".to_string()], "Add a")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("push rejected"));
        let calls = publisher.vcs.calls.lock().unwrap();
        assert_eq!(*calls, vec!["branch b", "stage a.go", "commit Add a"]);
    }

    #[tokio::test]
    async fn test_existing_branch_reuses_head_when_nothing_staged() {
        let vcs = RecordingVcs {
            branch_exists: true,
            nothing_staged: true,
            ..Default::default()
        };
        let publisher = GitPublisher::new(vcs, GhCli::new("."), &ToolingConfig::default());

        let commit = publisher
            .commit(BranchCheckout::Existing, "Add a")
            .await
            .unwrap();
        assert_eq!(commit, "def456");
    }

    #[tokio::test]
    async fn test_new_branch_with_nothing_staged_fails() {
        let vcs = RecordingVcs {
            nothing_staged: true,
            ..Default::default()
        };
        let gh = GhCli::new(".").with_program("gh-definitely-not-installed");
        let publisher = GitPublisher::new(vcs, gh, &ToolingConfig::default());

        let err = publisher
            .publish("b", &["a.go".to_string()], "Add a")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No staged changes"), "{}", err);
    }

    #[tokio::test]
    async fn test_dry_run_does_nothing() {
        DryRunPublisher
            .publish("b", &["a.go".to_string()], "desc")
            .await
            .unwrap();
    }
}
