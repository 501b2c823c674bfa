//! Publishing against a real git repository, including a retry after a
//! failed push.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

use github::GhCli;
use tempfile::TempDir;
use tooling::{GitPublisher, Publisher, ToolingConfig};
use vcs::GitVcs;

const BRANCH: &str = "ai-update/foo/bar";

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?}: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "bot@example.com"]);
    git(dir, &["config", "user.name", "Update Bot"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    std::fs::write(dir.join("a.go"), "package a\n").unwrap();
    git(dir, &["add", "a.go"]);
    git(dir, &["commit", "-q", "-m", "initial"]);
}

fn fake_gh(dir: &Path) -> String {
    let script = dir.join("fake-gh");
    std::fs::write(&script, "#!/bin/sh\necho https://github.com/o/r/pull/7\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script.display().to_string()
}

#[tokio::test]
async fn test_publish_succeeds_on_retry_after_push_failure() {
    if !git_available() {
        return;
    }

    let repo = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    init_repo(repo.path());
    std::fs::write(repo.path().join("a.go"), "package a\n\nvar Bar = 1\n").unwrap();

    let gh = GhCli::new(repo.path()).with_program(fake_gh(bin.path()));
    let publisher = GitPublisher::new(GitVcs::new(repo.path()), gh, &ToolingConfig::default());
    let files = vec!["a.go".to_string()];

    // No remote configured yet, so the push fails after the commit.
    let first = publisher.publish(BRANCH, &files, "Add bar").await;
    assert!(first.is_err());
    let committed = git(repo.path(), &["rev-parse", BRANCH]);

    git(remote.path(), &["init", "-q", "--bare"]);
    git(
        repo.path(),
        &["remote", "add", "origin", &remote.path().display().to_string()],
    );

    publisher
        .publish(BRANCH, &files, "Add bar")
        .await
        .unwrap();

    assert_eq!(git(repo.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), BRANCH);
    assert_eq!(git(repo.path(), &["rev-parse", BRANCH]), committed);
    assert_eq!(git(remote.path(), &["rev-parse", BRANCH]), committed);
}

#[tokio::test]
async fn test_publish_retry_from_base_branch_commits_new_changes() {
    if !git_available() {
        return;
    }

    let repo = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    init_repo(repo.path());
    let base = git(repo.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
    git(remote.path(), &["init", "-q", "--bare"]);
    git(
        repo.path(),
        &["remote", "add", "origin", &remote.path().display().to_string()],
    );

    // A branch with this name survives from an earlier run.
    git(repo.path(), &["branch", BRANCH]);
    assert_eq!(git(repo.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), base);
    std::fs::write(repo.path().join("a.go"), "package a\n\nvar Bar = 2\n").unwrap();

    let gh = GhCli::new(repo.path()).with_program(fake_gh(bin.path()));
    let publisher = GitPublisher::new(GitVcs::new(repo.path()), gh, &ToolingConfig::default());
    publisher
        .publish(BRANCH, &["a.go".to_string()], "Add bar")
        .await
        .unwrap();

    let head = git(repo.path(), &["rev-parse", BRANCH]);
    assert_ne!(head, git(repo.path(), &["rev-parse", &base]));
    assert_eq!(git(remote.path(), &["rev-parse", BRANCH]), head);
}
