use serde::{Deserialize, Serialize};

use super::plan::Modification;

/// Outcome of one validator run (usually a build).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<CompileError>,
    #[serde(default)]
    pub logs: String,
}

impl ValidationResult {
    pub fn passed(logs: impl Into<String>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            logs: logs.into(),
        }
    }

    pub fn failed(errors: Vec<CompileError>, logs: impl Into<String>) -> Self {
        Self {
            success: false,
            errors,
            logs: logs.into(),
        }
    }

    /// Merge several validator results into one for review.
    ///
    /// The aggregate passes only when every input passed. Logs are joined with
    /// a `== validator N ==` header per input.
    pub fn aggregate(results: &[ValidationResult]) -> Self {
        let success = results.iter().all(|r| r.success);
        let errors = results.iter().flat_map(|r| r.errors.clone()).collect();
        let logs = results
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.logs.is_empty())
            .map(|(i, r)| format!("== validator {} ==\n{}", i + 1, r.logs))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            success,
            errors,
            logs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileError {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.file, self.line, self.column, self.message
        )
    }
}

/// Advisor verdict on a validation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub success: bool,
    #[serde(default)]
    pub modifications: Vec<Modification>,
}

impl ReviewDecision {
    pub fn approve() -> Self {
        Self {
            success: true,
            modifications: Vec::new(),
        }
    }

    pub fn reject(modifications: Vec<Modification>) -> Self {
        Self {
            success: false,
            modifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(file: &str) -> CompileError {
        CompileError {
            file: file.to_string(),
            line: 12,
            column: 4,
            message: "undefined: foo".to_string(),
        }
    }

    #[test]
    fn test_aggregate_all_passed() {
        let agg = ValidationResult::aggregate(&[
            ValidationResult::passed("ok"),
            ValidationResult::passed(""),
        ]);
        assert!(agg.success);
        assert!(agg.errors.is_empty());
        assert_eq!(agg.logs, "== validator 1 ==\nok");
    }

    #[test]
    fn test_aggregate_collects_every_failure() {
        let agg = ValidationResult::aggregate(&[
            ValidationResult::failed(vec![error("a.go")], "a failed"),
            ValidationResult::passed("fine"),
            ValidationResult::failed(vec![error("b.go")], "b failed"),
        ]);
        assert!(!agg.success);
        assert_eq!(agg.errors.len(), 2);
        assert_eq!(agg.errors[1].file, "b.go");
        assert!(agg.logs.contains("== validator 3 ==\nb failed"));
    }

    #[test]
    fn test_aggregate_empty_passes() {
        assert!(ValidationResult::aggregate(&[]).success);
    }

    #[test]
    fn test_compile_error_display() {
        assert_eq!(error("x.go").to_string(), "x.go:12:4: undefined: foo");
    }
}
