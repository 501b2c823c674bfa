use serde::{Deserialize, Serialize};

/// Impact analysis produced by the advisor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub affected_files: Vec<String>,
    #[serde(default)]
    pub required_changes: Vec<RequiredChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredChange {
    pub kind: ChangeKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Generated schema/resource types must be regenerated
    SchemaType,
    /// Proto <-> resource mapper must be regenerated
    Mapper,
    /// Hand-written file needs a line-level edit
    Modification,
}

/// Ordered list of steps that implement the change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationPlan {
    #[serde(default)]
    pub steps: Vec<ImplementationStep>,
}

impl ImplementationPlan {
    pub fn new(steps: Vec<ImplementationStep>) -> Self {
        Self { steps }
    }

    /// All line edits carried by `ModifyFile` steps, in plan order.
    pub fn modifications(&self) -> Vec<Modification> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                ImplementationStep::ModifyFile { modifications, .. } => Some(modifications),
                _ => None,
            })
            .flatten()
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImplementationStep {
    GenerateTypes {
        file_path: String,
        options: GenerateTypesOptions,
    },
    GenerateMapper {
        file_path: String,
        options: GenerateMapperOptions,
    },
    ModifyFile {
        file_path: String,
        modifications: Vec<Modification>,
    },
}

impl ImplementationStep {
    pub fn file_path(&self) -> &str {
        match self {
            Self::GenerateTypes { file_path, .. }
            | Self::GenerateMapper { file_path, .. }
            | Self::ModifyFile { file_path, .. } => file_path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::GenerateTypes { .. } => "generate_types",
            Self::GenerateMapper { .. } => "generate_mapper",
            Self::ModifyFile { .. } => "modify_file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateTypesOptions {
    pub service: String,
    pub resource: String,
    pub api_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateMapperOptions {
    pub service: String,
    pub api_version: String,
    pub output_dir: String,
}

/// Replace lines `[start_line, end_line)` of the original file with `new_content`.
///
/// Line numbers are 1-based and always refer to the file as it was when the
/// modification set was planned. `start_line == end_line` inserts before
/// `start_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default)]
    pub new_content: String,
}

impl Modification {
    pub fn new(start_line: usize, end_line: usize, new_content: impl Into<String>) -> Self {
        Self {
            start_line,
            end_line,
            new_content: new_content.into(),
        }
    }

    pub fn insertion(line: usize, new_content: impl Into<String>) -> Self {
        Self::new(line, line, new_content)
    }

    pub fn is_insertion(&self) -> bool {
        self.start_line == self.end_line
    }
}
