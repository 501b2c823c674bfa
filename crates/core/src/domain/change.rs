use serde::{Deserialize, Serialize};

/// The upstream API change that triggers an update workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChange {
    /// Message or entity that changed (e.g. `WorkstationConfig`)
    pub message_name: String,
    /// Field that was added or changed on the message
    pub field_name: String,
}

impl ApiChange {
    pub fn new(message_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            message_name: message_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl std::fmt::Display for ApiChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.message_name, self.field_name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePhase {
    #[default]
    Analysis,
    Implementation,
    Validation,
    /// Branch, commit, push and pull request creation
    Publish,
}

impl UpdatePhase {
    pub const ALL: [UpdatePhase; 4] = [
        Self::Analysis,
        Self::Implementation,
        Self::Validation,
        Self::Publish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Implementation => "implementation",
            Self::Validation => "validation",
            Self::Publish => "publish",
        }
    }
}

impl std::fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_wire_name() {
        for phase in UpdatePhase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase));
        }
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&UpdatePhase::Publish).unwrap();
        assert_eq!(json, "\"publish\"");
    }

    #[test]
    fn test_api_change_display() {
        let change = ApiChange::new("WorkstationConfig", "enableNestedVirtualization");
        assert_eq!(
            change.to_string(),
            "WorkstationConfig.enableNestedVirtualization"
        );
    }
}
