mod change;
mod plan;
mod state;
mod validation;

pub use change::{ApiChange, UpdatePhase};
pub use plan::{
    AnalysisResult, ChangeKind, GenerateMapperOptions, GenerateTypesOptions, ImplementationPlan,
    ImplementationStep, Modification, RequiredChange,
};
pub use state::{AttemptResult, UpdateContext, UpdateState, DEFAULT_MAX_RETRIES};
pub use validation::{CompileError, ReviewDecision, ValidationResult};
