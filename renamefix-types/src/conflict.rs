use crate::action::ActionId;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    FileConflict,
    ReferenceConflict,
    ContentConflict,
    PathConflict,
}

/// A structural hazard found in a set of actions.
///
/// Advisory only: conflicts never block plan construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub kind: ConflictKind,
    pub description: String,

    #[serde(default)]
    pub affected_actions: Vec<ActionId>,

    pub severity: Severity,
    pub resolution: String,
}

impl ConflictInfo {
    pub fn new(
        kind: ConflictKind,
        severity: Severity,
        description: impl Into<String>,
        resolution: impl Into<String>,
        affected_actions: Vec<ActionId>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            affected_actions,
            severity,
            resolution: resolution.into(),
        }
    }
}
