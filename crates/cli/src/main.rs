mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use advisor::OpenRouterAdvisor;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orchestrator::{UpdateOrchestrator, WorkflowRun};
use tooling::{CompilationValidator, DryRunPublisher, LocalTooling};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use updater_core::ApiChange;

use crate::config::{default_config_path, UpdaterConfig};

#[derive(Parser)]
#[command(name = "api-updater")]
#[command(about = "Apply upstream API changes with an AI-driven update workflow", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project the workflow operates on
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Config file (default: <project-root>/.api-updater/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the update workflow for one API change
    Run {
        /// Message or entity that changed
        #[arg(long)]
        message: String,

        /// Field that was added or changed
        #[arg(long)]
        field: String,

        #[arg(long)]
        max_retries: Option<u32>,

        /// Advisor model override
        #[arg(long, env = "API_UPDATER_MODEL")]
        model: Option<String>,

        /// Log the branch and files instead of publishing
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a default config file
    Init,
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&cli.project_root));

    match cli.command {
        Commands::Run {
            message,
            field,
            max_retries,
            model,
            dry_run,
        } => {
            init_tracing();

            let mut config = UpdaterConfig::load(&config_path).await?;
            if let Some(max) = max_retries {
                config.orchestrator.max_retries = max;
            }
            if let Some(model) = model {
                config.advisor.model = model;
            }

            let run = run_workflow(
                &cli.project_root,
                &config,
                ApiChange::new(message, field),
                dry_run,
            )
            .await?;
            print_summary(&run)
        }
        Commands::Init => {
            init_project(&config_path).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ShowConfig => {
            let config = UpdaterConfig::load(&config_path).await?;
            println!("# {}", config_path.display());
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_workflow(
    project_root: &Path,
    config: &UpdaterConfig,
    change: ApiChange,
    dry_run: bool,
) -> Result<WorkflowRun> {
    let root = project_root
        .canonicalize()
        .with_context(|| format!("Project root {} not found", project_root.display()))?;

    let advisor = OpenRouterAdvisor::from_config(&config.advisor)
        .context("Failed to configure advisor")?;

    let mut local = LocalTooling::new(&root, config.tooling.clone());
    if dry_run {
        local = local.with_publisher(Arc::new(DryRunPublisher));
    }

    let validator = CompilationValidator::new(&root, config.tooling.build_command.clone());

    let mut orchestrator = UpdateOrchestrator::new(
        Arc::new(advisor),
        Arc::new(local),
        config.orchestrator.to_config(),
    )
    .with_validator(Arc::new(validator));

    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling workflow");
            cancel.cancel();
        }
    });

    tracing::info!(
        root = %root.display(),
        model = %config.advisor.model,
        dry_run,
        "Running update workflow"
    );
    Ok(orchestrator.run(change).await)
}

fn print_summary(run: &WorkflowRun) -> Result<ExitCode> {
    let state = &run.context.state;

    println!();
    println!("Update {}", run.context.api_change);
    println!("════════════════════════════════════════");
    println!("  Run:       {}", run.run_id);
    println!("  Phase:     {}", state.phase);
    println!("  Failures:  {}/{}", state.current_attempt, run.context.max_retries);

    if state.modified_files.is_empty() {
        println!("  Modified:  (none)");
    } else {
        println!("  Modified:");
        for file in &state.modified_files {
            println!("    {}", file);
        }
    }
    println!();

    match &run.result {
        Ok(()) => {
            println!("Workflow completed.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("Workflow failed: {}", e);
            println!();
            println!("History:");
            println!(
                "{}",
                serde_json::to_string_pretty(run.history()).context("Failed to render history")?
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn init_project(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    UpdaterConfig::default().save(config_path).await?;

    println!("Created {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Export OPENROUTER_API_KEY (or the variable named by advisor.api_key_env)");
    println!("  2. Adjust the [tooling] commands for your project");
    println!("  3. Run 'api-updater run --message <Message> --field <field>'");

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_updater=info,orchestrator=info,advisor=info,tooling=info,vcs=info,github=info"
                    .into()
            }),
        )
        .init();
}
