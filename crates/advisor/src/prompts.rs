use updater_core::{AttemptResult, CompileError, Modification, UpdateContext, ValidationResult};

pub const SYSTEM_PROMPT: &str = "You maintain a large Kubernetes resource codebase whose API \
types and mappers are generated from upstream protobuf definitions. When asked for JSON, reply \
with a single JSON object and nothing else.";

const MODIFICATION_SCHEMA: &str = r#"{"start_line": <1-based first line to replace>, "end_line": <line after the last replaced line; equal to start_line to insert>, "new_content": "<replacement text, empty to delete>"}"#;

pub struct UpdatePrompts;

impl UpdatePrompts {
    pub fn analyze(ctx: &UpdateContext) -> String {
        format!(
            r#"Analyze the following API change.

## Change
**Message:** {message}
**New Field:** {field}

## Previous Attempts
{history}

## Required Output
Determine which files need to be modified and what changes are required.
Reply with JSON:
{{"affected_files": ["<path>"], "required_changes": [{{"kind": "schema_type" | "mapper" | "modification", "description": "<what>", "file_path": "<path or null>"}}]}}"#,
            message = ctx.api_change.message_name,
            field = ctx.api_change.field_name,
            history = format_history(&ctx.history),
        )
    }

    pub fn plan(ctx: &UpdateContext) -> String {
        let analysis = ctx
            .state
            .analysis
            .as_ref()
            .and_then(|a| serde_json::to_string_pretty(a).ok())
            .unwrap_or_else(|| "(none)".to_string());

        let corrections = if ctx.state.planned_modifications.is_empty() {
            String::new()
        } else {
            format!(
                "\n## Corrections From Review\nThe last build was rejected. Fold these edits into the plan:\n{}\n",
                format_modifications(&ctx.state.planned_modifications)
            )
        };

        format!(
            r#"Plan the implementation of an API change.

## Change
**Message:** {message}
**Field:** {field}

## Analysis
{analysis}
{corrections}
## Previous Attempts
{history}

## Required Output
Line numbers always refer to the file as it is now. Ranges in one file must not overlap.
Reply with JSON:
{{"steps": [
  {{"kind": "generate_types", "file_path": "<path>", "options": {{"service": "<proto service>", "resource": "<kind>", "api_version": "<version>"}}}},
  {{"kind": "generate_mapper", "file_path": "<path>", "options": {{"service": "<proto service>", "api_version": "<version>", "output_dir": "<dir>"}}}},
  {{"kind": "modify_file", "file_path": "<path>", "modifications": [{schema}]}}
]}}"#,
            message = ctx.api_change.message_name,
            field = ctx.api_change.field_name,
            analysis = analysis,
            corrections = corrections,
            history = format_history(&ctx.history),
            schema = MODIFICATION_SCHEMA,
        )
    }

    pub fn review(ctx: &UpdateContext, result: &ValidationResult) -> String {
        format!(
            r#"Review validation failures.

## Errors
{errors}
## Build Output
{logs}

## Previous Attempts
{history}

## Required Output
Suggest modifications to fix these errors.
Reply with JSON:
{{"success": false, "modifications": [{schema}]}}
Use "success": true only if the failures need no source change."#,
            errors = format_errors(&result.errors),
            logs = truncate(&result.logs, 8000),
            history = format_history(&ctx.history),
            schema = MODIFICATION_SCHEMA,
        )
    }

    pub fn pr_description(ctx: &UpdateContext) -> String {
        format!(
            r#"Create a pull request description.

## API Change
{change}

## Modified Files
{files}

## Implementation History
{history}

The first line is the pull request title. Reply with plain Markdown, no JSON."#,
            change = ctx.api_change,
            files = ctx
                .state
                .modified_files
                .iter()
                .map(|f| format!("- {}", f))
                .collect::<Vec<_>>()
                .join("\n"),
            history = format_history(&ctx.history),
        )
    }
}

pub fn format_history(history: &[AttemptResult]) -> String {
    if history.is_empty() {
        return "(none)\n".to_string();
    }

    let mut result = String::new();
    for (i, attempt) in history.iter().enumerate() {
        result.push_str(&format!("Attempt {} ({}):\n", i + 1, attempt.phase));
        if let Some(ref error) = attempt.error {
            result.push_str(&format!("Error: {}\n", error));
        }
        for validation in &attempt.validation_results {
            result.push_str(&format_errors(&validation.errors));
        }
    }
    result
}

pub fn format_errors(errors: &[CompileError]) -> String {
    errors.iter().map(|e| format!("{}\n", e)).collect()
}

pub fn format_modifications(modifications: &[Modification]) -> String {
    modifications
        .iter()
        .map(|m| serde_json::to_string(m).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}\n... (truncated)", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use updater_core::{ApiChange, UpdatePhase};

    fn ctx() -> UpdateContext {
        UpdateContext::new(ApiChange::new("WorkstationConfig", "enableAudit"), 3)
    }

    #[test]
    fn test_format_history() {
        let history = vec![
            AttemptResult::failure(UpdatePhase::Analysis, "analysis: quota"),
            AttemptResult::failure(UpdatePhase::Validation, "validation: rejected")
                .with_validation_results(vec![ValidationResult::failed(
                    vec![CompileError {
                        file: "a.go".to_string(),
                        line: 1,
                        column: 2,
                        message: "undefined: X".to_string(),
                    }],
                    "",
                )]),
        ];

        assert_eq!(
            format_history(&history),
            "Attempt 1 (analysis):\nError: analysis: quota\n\
             Attempt 2 (validation):\nError: validation: rejected\na.go:1:2: undefined: X\n"
        );
        assert_eq!(format_history(&[]), "(none)\n");
    }

    #[test]
    fn test_plan_prompt_includes_corrections() {
        let mut ctx = ctx();
        assert!(!UpdatePrompts::plan(&ctx).contains("Corrections From Review"));

        ctx.state.planned_modifications = vec![Modification::new(4, 5, "fixed")];
        let prompt = UpdatePrompts::plan(&ctx);
        assert!(prompt.contains("Corrections From Review"));
        assert!(prompt.contains(r#""new_content":"fixed""#));
    }

    #[test]
    fn test_analyze_prompt_names_change() {
        let prompt = UpdatePrompts::analyze(&ctx());
        assert!(prompt.contains("**Message:** WorkstationConfig"));
        assert!(prompt.contains("**New Field:** enableAudit"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc\n... (truncated)");
    }
}
