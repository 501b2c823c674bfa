//! Local implementations of the orchestrator's tooling and validator contracts.
//!
//! - [`LocalTooling`] - File access, code generators and publishing in a project root
//! - [`CompilationValidator`] - Build check with compiler diagnostic parsing
//! - [`Publisher`] - Git + GitHub CLI publishing, or a dry run

pub mod config;
pub mod error;
pub mod local;
pub mod process;
pub mod publisher;
pub mod validator;

pub use config::ToolingConfig;
pub use error::{Result, ToolingError};
pub use local::LocalTooling;
pub use publisher::{DryRunPublisher, GitPublisher, Publisher};
pub use validator::{parse_diagnostics, CompilationValidator};
