use crate::action::ActionId;
use serde::{Deserialize, Serialize};

/// Stable codes for validation issues.
pub mod issue_codes {
    pub const CIRCULAR_DEPENDENCY: &str = "CIRCULAR_DEPENDENCY";
    pub const RENAME_CONFLICT: &str = "RENAME_CONFLICT";
    pub const HIGH_SEVERITY_CONFLICT: &str = "HIGH_SEVERITY_CONFLICT";
    pub const ORDER_FALLBACK: &str = "ORDER_FALLBACK";
    pub const ORDER_VIOLATION: &str = "ORDER_VIOLATION";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionId>,
}

impl ValidationIssue {
    pub fn new(code: &str, message: impl Into<String>, actions: Vec<ActionId>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            actions,
        }
    }
}

/// Outcome of plan validation. Errors make the plan structurally invalid;
/// warnings and suggestions are advisory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,

    #[serde(default)]
    pub errors: Vec<ValidationIssue>,

    #[serde(default)]
    pub warnings: Vec<ValidationIssue>,

    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}
