use crate::action::{
    ActionId, ContentChange, FileRename, RefactorAction, ReferenceUpdate, RiskLevel,
};
use crate::conflict::ConflictInfo;
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefactorPlan {
    pub schema: String,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub root: Utf8PathBuf,

    #[serde(default)]
    pub file_renames: Vec<FileRename>,

    #[serde(default)]
    pub content_changes: Vec<ContentChange>,

    #[serde(default)]
    pub reference_updates: Vec<ReferenceUpdate>,

    #[serde(default)]
    pub dependencies: Vec<PlanDependency>,

    #[serde(default)]
    pub conflicts: Vec<ConflictInfo>,

    /// Total order over action ids the executor must honor.
    #[serde(default)]
    pub execution_order: Vec<ActionId>,

    pub metadata: PlanMetadata,
}

impl RefactorPlan {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self {
            schema: crate::schema::RENAMEFIX_PLAN_V1.to_string(),
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            root,
            file_renames: vec![],
            content_changes: vec![],
            reference_updates: vec![],
            dependencies: vec![],
            conflicts: vec![],
            execution_order: vec![],
            metadata: PlanMetadata::default(),
        }
    }

    /// All actions in insertion order: renames, content changes, reference updates.
    pub fn actions(&self) -> Vec<RefactorAction> {
        let mut out = Vec::with_capacity(self.action_count());
        out.extend(self.file_renames.iter().cloned().map(RefactorAction::from));
        out.extend(self.content_changes.iter().cloned().map(RefactorAction::from));
        out.extend(self.reference_updates.iter().cloned().map(RefactorAction::from));
        out
    }

    pub fn action(&self, id: &ActionId) -> Option<RefactorAction> {
        self.actions().into_iter().find(|a| a.id() == id)
    }

    pub fn action_count(&self) -> usize {
        self.file_renames.len() + self.content_changes.len() + self.reference_updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_count() == 0
    }

    /// Replace the action lists from a flat action set, keeping relative order per kind.
    pub fn set_actions(&mut self, actions: Vec<RefactorAction>) {
        self.file_renames.clear();
        self.content_changes.clear();
        self.reference_updates.clear();
        for action in actions {
            match action {
                RefactorAction::FileRename(a) => self.file_renames.push(a),
                RefactorAction::ContentChange(a) => self.content_changes.push(a),
                RefactorAction::ReferenceUpdate(a) => self.reference_updates.push(a),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    OrderDependency,
    FileDependency,
}

/// An explicit edge in the action-dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDependency {
    pub action_id: ActionId,
    pub depends_on: Vec<ActionId>,
    pub reason: String,
    pub kind: DependencyKind,
}

/// How `execution_order` was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStrategy {
    #[default]
    Topological,
    /// Action dependencies were cyclic; ordered by kind priority, then insertion order.
    PriorityFallback,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub estimated_duration_minutes: u64,
    pub risk_level: RiskLevel,
    pub backup_required: bool,
    pub testing_required: bool,
    pub total_actions: u64,
    pub files_analyzed: u64,
    pub cycles_detected: u64,

    #[serde(default)]
    pub ordering: OrderStrategy,
}

/// Counts for logs and the external report layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub file_renames: u64,
    pub content_changes: u64,
    pub reference_updates: u64,
    pub replacements: u64,
    pub files_touched: u64,
    pub conflicts_high: u64,
    pub conflicts_medium: u64,
    pub conflicts_low: u64,
}
