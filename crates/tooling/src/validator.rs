//! Build check that turns compiler diagnostics into structured errors.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use orchestrator::core::Validator;
use orchestrator::CollaboratorResult;
use regex::Regex;
use tracing::{debug, info};
use updater_core::{CompileError, UpdateContext, ValidationResult};

use crate::error::ToolingError;
use crate::process::run_command;

fn diagnostic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<file>[^\s:][^:]*):(?P<line>\d+)(?::(?P<column>\d+))?:\s*(?P<message>.+)$")
            .expect("diagnostic regex is valid")
    })
}

/// Parse `file:line[:column]: message` lines out of build output.
///
/// Files under `root` are reported relative to it and a leading `./` is
/// dropped. Lines that do not look like diagnostics are ignored.
pub fn parse_diagnostics(output: &str, root: &Path) -> Vec<CompileError> {
    output
        .lines()
        .filter_map(|line| diagnostic_regex().captures(line))
        .filter_map(|caps| {
            let file = relative_to(&caps["file"], root);
            let line = caps["line"].parse().ok()?;
            let column = caps
                .name("column")
                .and_then(|c| c.as_str().parse().ok())
                .unwrap_or(0);

            Some(CompileError {
                file,
                line,
                column,
                message: caps["message"].trim().to_string(),
            })
        })
        .collect()
}

fn relative_to(file: &str, root: &Path) -> String {
    let path = Path::new(file);
    let path = path.strip_prefix(root).unwrap_or(path);
    let path = path.strip_prefix("./").unwrap_or(path);
    path.display().to_string()
}

pub struct CompilationValidator {
    name: String,
    root: PathBuf,
    command: Vec<String>,
}

impl CompilationValidator {
    pub fn new(root: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            name: "compilation".to_string(),
            root: root.into(),
            command,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Validator for CompilationValidator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, ctx: &UpdateContext) -> CollaboratorResult<ValidationResult> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(ToolingError::EmptyCommand("build"))?;

        debug!(change = %ctx.api_change, command = ?self.command, "Running build check");
        let output = run_command(program, args, &self.root).await?;

        if output.success() {
            info!(validator = %self.name, "Build succeeded");
            return Ok(ValidationResult::passed(output.combined));
        }

        let errors = parse_diagnostics(&output.combined, &self.root);
        info!(
            validator = %self.name,
            status = %output.status,
            errors = errors.len(),
            "Build failed"
        );
        Ok(ValidationResult::failed(errors, output.combined))
    }
}
