use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use github::GhCli;
use orchestrator::core::Tooling;
use orchestrator::CollaboratorResult;
use tracing::{debug, info};
use updater_core::{GenerateMapperOptions, GenerateTypesOptions};
use vcs::GitVcs;

use crate::config::ToolingConfig;
use crate::error::{Result, ToolingError};
use crate::process::run_checked;
use crate::publisher::{GitPublisher, Publisher};

/// Tooling rooted at a project directory.
///
/// Every path is relative to the root; absolute paths and paths that climb
/// out of the root are rejected.
pub struct LocalTooling {
    root: PathBuf,
    config: ToolingConfig,
    publisher: Arc<dyn Publisher>,
}

impl LocalTooling {
    /// Publish through git and the GitHub CLI in `root`.
    pub fn new(root: impl Into<PathBuf>, config: ToolingConfig) -> Self {
        let root = root.into();
        let vcs = GitVcs::new(root.clone()).with_remote(config.remote.clone());
        let publisher = GitPublisher::new(vcs, GhCli::new(&root), &config);
        Self {
            root,
            config,
            publisher: Arc::new(publisher),
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = path.is_empty()
            || relative.components().any(|c| {
                matches!(
                    c,
                    Component::ParentDir | Component::RootDir | Component::Prefix(_)
                )
            });

        if escapes {
            return Err(ToolingError::PathEscape(path.to_string()));
        }

        Ok(self.root.join(relative))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        tokio::fs::read(&full).await.map_err(|source| ToolingError::Io {
            path: path.to_string(),
            source,
        })
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;

        if let Some(dir) = full.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| ToolingError::Io {
                    path: dir.display().to_string(),
                    source,
                })?;
        }

        tokio::fs::write(&full, content)
            .await
            .map_err(|source| ToolingError::Io {
                path: path.to_string(),
                source,
            })?;

        debug!(path = %path, bytes = content.len(), "Wrote file");
        Ok(())
    }
}

pub fn generate_types_args(options: &GenerateTypesOptions) -> Vec<String> {
    vec![
        "generate-types".to_string(),
        "--service".to_string(),
        options.service.clone(),
        "--resource".to_string(),
        options.resource.clone(),
        "--api-version".to_string(),
        options.api_version.clone(),
    ]
}

pub fn generate_mapper_args(options: &GenerateMapperOptions) -> Vec<String> {
    vec![
        "generate-mapper".to_string(),
        "--service".to_string(),
        options.service.clone(),
        "--api-version".to_string(),
        options.api_version.clone(),
        "--output-dir".to_string(),
        options.output_dir.clone(),
    ]
}

#[async_trait]
impl Tooling for LocalTooling {
    async fn read_file(&self, path: &str) -> CollaboratorResult<Vec<u8>> {
        Ok(self.read(path).await?)
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> CollaboratorResult<()> {
        Ok(self.write(path, content).await?)
    }

    async fn generate_types(&self, options: &GenerateTypesOptions) -> CollaboratorResult<()> {
        info!(
            service = %options.service,
            resource = %options.resource,
            api_version = %options.api_version,
            "Generating types"
        );
        run_checked(
            "generator",
            &self.config.generator_command,
            generate_types_args(options),
            &self.root,
        )
        .await?;
        Ok(())
    }

    async fn generate_mapper(&self, options: &GenerateMapperOptions) -> CollaboratorResult<()> {
        info!(
            service = %options.service,
            api_version = %options.api_version,
            output_dir = %options.output_dir,
            "Generating mapper"
        );
        run_checked(
            "generator",
            &self.config.generator_command,
            generate_mapper_args(options),
            &self.root,
        )
        .await?;
        Ok(())
    }

    async fn publish(
        &self,
        branch: &str,
        files: &[String],
        description: &str,
    ) -> CollaboratorResult<()> {
        for file in files {
            self.resolve(file)?;
        }
        Ok(self.publisher.publish(branch, files, description).await?)
    }
}
