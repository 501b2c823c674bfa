use serde::{Deserialize, Serialize};

/// Commands and publishing options for [`crate::LocalTooling`] and
/// [`crate::CompilationValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolingConfig {
    /// Program plus leading arguments of the code generator
    pub generator_command: Vec<String>,
    /// Program plus arguments of the build check
    pub build_command: Vec<String>,
    pub remote: String,
    /// Pull request target; the repository default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    pub draft: bool,
}

impl Default for ToolingConfig {
    fn default() -> Self {
        Self {
            generator_command: vec![
                "go".to_string(),
                "run".to_string(),
                "./dev/tools/controllerbuilder".to_string(),
            ],
            build_command: vec!["go".to_string(), "build".to_string(), "./...".to_string()],
            remote: "origin".to_string(),
            base_branch: None,
            draft: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ToolingConfig = toml::from_str(r#"build_command = ["make", "build"]"#).unwrap();

        assert_eq!(config.build_command, vec!["make", "build"]);
        assert_eq!(config.generator_command[0], "go");
        assert_eq!(config.remote, "origin");
        assert!(config.base_branch.is_none());
    }
}
