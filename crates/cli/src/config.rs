use std::path::{Path, PathBuf};
use std::time::Duration;

use advisor::AdvisorConfig;
use anyhow::{Context, Result};
use orchestrator::services::{DEFAULT_BRANCH_PREFIX, DEFAULT_PHASE_TIMEOUT};
use orchestrator::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use tooling::ToolingConfig;
use updater_core::DEFAULT_MAX_RETRIES;

pub const UPDATER_DIR: &str = ".api-updater";
pub const CONFIG_FILE: &str = "config.toml";

/// Contents of `.api-updater/config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    pub orchestrator: OrchestratorSection,
    pub advisor: AdvisorConfig,
    pub tooling: ToolingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSection {
    pub max_retries: u32,
    pub phase_timeout_secs: u64,
    pub rewind_on_review_failure: bool,
    pub parallel_validation: bool,
    pub branch_prefix: String,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            phase_timeout_secs: DEFAULT_PHASE_TIMEOUT.as_secs(),
            rewind_on_review_failure: true,
            parallel_validation: false,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
        }
    }
}

impl OrchestratorSection {
    pub fn to_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new()
            .with_max_retries(self.max_retries)
            .with_phase_timeout(Duration::from_secs(self.phase_timeout_secs))
            .with_rewind_on_review_failure(self.rewind_on_review_failure)
            .with_parallel_validation(self.parallel_validation)
            .with_branch_prefix(self.branch_prefix.clone())
    }
}

pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(UPDATER_DIR).join(CONFIG_FILE)
}

impl UpdaterConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.to_toml()?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
