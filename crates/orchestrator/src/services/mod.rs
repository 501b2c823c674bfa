pub mod executor_context;

pub use executor_context::{
    ExecutorContext, OrchestratorConfig, DEFAULT_BRANCH_PREFIX, DEFAULT_PHASE_TIMEOUT,
};
