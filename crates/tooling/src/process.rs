use std::path::Path;
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, ToolingError};

pub struct CommandOutput {
    pub status: ExitStatus,
    /// stdout followed by stderr
    pub combined: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `program args..` in `cwd` and capture its output.
///
/// A non-zero exit is not an error here; callers decide what it means.
/// Dropping the returned future kills the child.
pub async fn run_command(program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput> {
    debug!("Running {} {:?} in {:?}", program, args, cwd);

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ToolingError::CommandNotFound(program.to_string()),
            _ => ToolingError::Io {
                path: cwd.display().to_string(),
                source: e,
            },
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(CommandOutput {
        status: output.status,
        combined,
    })
}

/// Run a configured command line and fail on a non-zero exit.
pub async fn run_checked(
    what: &'static str,
    command: &[String],
    extra_args: Vec<String>,
    cwd: &Path,
) -> Result<String> {
    let (program, base_args) = command
        .split_first()
        .ok_or(ToolingError::EmptyCommand(what))?;

    let mut args = base_args.to_vec();
    args.extend(extra_args);

    let output = run_command(program, &args, cwd).await?;
    if !output.success() {
        return Err(ToolingError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            status: output.status.to_string(),
            output: output.combined,
        });
    }

    Ok(output.combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let err = run_checked("build", &[], vec![], Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolingError::EmptyCommand("build")));
    }

    #[tokio::test]
    async fn test_missing_program_reported() {
        let err = run_command("no-such-program-for-tests", &[], Path::new("."))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ToolingError::CommandNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_carries_output() {
        let command = vec!["sh".to_string(), "-c".to_string()];
        let err = run_checked(
            "generator",
            &command,
            vec!["echo generator broke >&2; exit 3".to_string()],
            Path::new("."),
        )
        .await
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("generator broke"), "{}", message);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timed_out_command_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let args = vec!["-c".to_string(), "sleep 1; touch marker".to_string()];

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            run_command("sh", &args, dir.path()),
        )
        .await;
        assert!(result.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(!dir.path().join("marker").exists());
    }
}
