//! Structural validation of a finished plan.

use crate::config::LimitsConfig;
use crate::cycles::find_cycles;
use crate::order::successors;
use camino::Utf8Path;
use renamefix_types::action::{ActionId, RefactorAction, RiskLevel};
use renamefix_types::conflict::Severity;
use renamefix_types::plan::{OrderStrategy, RefactorPlan};
use renamefix_types::validation::{ValidationIssue, ValidationResult, issue_codes};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Re-derive the plan's hazards. Never fails; errors in the result mark the plan invalid.
pub fn validate_plan(plan: &RefactorPlan, limits: &LimitsConfig) -> ValidationResult {
    let actions = plan.actions();
    let mut result = ValidationResult::default();

    // Edges point from an action to the actions that must run after it; a cycle either way is a
    // cycle.
    let adjacency = successors(&actions, &plan.dependencies);
    let mut reported: BTreeSet<Vec<usize>> = BTreeSet::new();
    for cycle in find_cycles(&adjacency) {
        let mut key = cycle.clone();
        key.sort_unstable();
        key.dedup();
        if !reported.insert(key) {
            continue;
        }
        let ids: Vec<ActionId> = cycle.iter().map(|&i| actions[i].id().clone()).collect();
        let names: Vec<&str> = ids.iter().map(ActionId::as_str).collect();
        result.errors.push(ValidationIssue::new(
            issue_codes::CIRCULAR_DEPENDENCY,
            format!("circular action dependency: {}", names.join(" -> ")),
            ids,
        ));
    }

    let mut by_target: BTreeMap<&Utf8Path, Vec<ActionId>> = BTreeMap::new();
    for r in &plan.file_renames {
        by_target
            .entry(r.new_path.as_path())
            .or_default()
            .push(r.meta.id.clone());
    }
    for (target, ids) in by_target {
        if ids.len() > 1 {
            result.errors.push(ValidationIssue::new(
                issue_codes::RENAME_CONFLICT,
                format!("{} renames target {target}", ids.len()),
                ids,
            ));
        }
    }

    for conflict in plan.conflicts.iter().filter(|c| c.severity == Severity::High) {
        result.warnings.push(ValidationIssue::new(
            issue_codes::HIGH_SEVERITY_CONFLICT,
            conflict.description.clone(),
            conflict.affected_actions.clone(),
        ));
    }

    match plan.metadata.ordering {
        OrderStrategy::PriorityFallback => result.warnings.push(ValidationIssue::new(
            issue_codes::ORDER_FALLBACK,
            "action dependencies are cyclic; execution order falls back to kind priority",
            Vec::new(),
        )),
        OrderStrategy::Topological => {
            if let Some(issue) = order_violation(plan, &actions, &adjacency) {
                result.warnings.push(issue);
            }
        }
    }

    if actions.len() > limits.batch_threshold {
        result.suggestions.push(format!(
            "split the {} actions into smaller batches",
            actions.len()
        ));
    }
    if plan.metadata.risk_level == RiskLevel::High {
        result
            .suggestions
            .push("do a dry run in a test environment first".to_string());
    }
    if plan.metadata.cycles_detected > 0 {
        result.suggestions.push(format!(
            "break the {} circular module reference(s) before renaming",
            plan.metadata.cycles_detected
        ));
    }
    if plan.metadata.testing_required {
        result
            .suggestions
            .push("run the test suite after applying the plan".to_string());
    }

    result.valid = result.errors.is_empty();
    debug!(
        plan = %plan.id,
        valid = result.valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "plan validated"
    );
    result
}

/// The execution order must list every action exactly once, after everything it depends on.
fn order_violation(
    plan: &RefactorPlan,
    actions: &[RefactorAction],
    adjacency: &[Vec<usize>],
) -> Option<ValidationIssue> {
    let position: BTreeMap<&ActionId, usize> = plan
        .execution_order
        .iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    let complete = position.len() == plan.execution_order.len()
        && plan.execution_order.len() == actions.len()
        && actions.iter().all(|a| position.contains_key(a.id()));
    if !complete {
        return Some(ValidationIssue::new(
            issue_codes::ORDER_VIOLATION,
            "execution order does not list every action exactly once",
            Vec::new(),
        ));
    }

    let mut late: Vec<ActionId> = Vec::new();
    for (before, succ) in adjacency.iter().enumerate() {
        let b = position[actions[before].id()];
        for &after in succ {
            let id = actions[after].id();
            if position[id] < b && !late.contains(id) {
                late.push(id.clone());
            }
        }
    }
    if late.is_empty() {
        None
    } else {
        Some(ValidationIssue::new(
            issue_codes::ORDER_VIOLATION,
            format!("{} action(s) run before their dependencies", late.len()),
            late,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renamefix_types::action::{ActionMeta, FileRename, RollbackData};
    use renamefix_types::conflict::{ConflictInfo, ConflictKind};
    use renamefix_types::plan::{DependencyKind, PlanDependency};

    fn rename(id: &str, old: &str, new: &str) -> FileRename {
        FileRename {
            meta: ActionMeta {
                id: ActionId::new(id),
                priority: 1,
                estimated_risk: RiskLevel::Low,
                dependencies: vec![],
                preconditions: vec![],
                rollback: RollbackData::RestorePath {
                    from: new.into(),
                    to: old.into(),
                },
            },
            old_path: old.into(),
            new_path: new.into(),
            update_references: false,
        }
    }

    fn dep(action: &str, on: &str) -> PlanDependency {
        PlanDependency {
            action_id: ActionId::new(action),
            depends_on: vec![ActionId::new(on)],
            reason: String::new(),
            kind: DependencyKind::FileDependency,
        }
    }

    fn plan_with(renames: Vec<FileRename>) -> RefactorPlan {
        let mut plan = RefactorPlan::new("/repo".into());
        plan.execution_order = renames.iter().map(|r| r.meta.id.clone()).collect();
        plan.file_renames = renames;
        plan
    }

    #[test]
    fn clean_plan_is_valid() {
        let plan = plan_with(vec![rename("r1", "a.ts", "b.ts")]);
        let result = validate_plan(&plan, &LimitsConfig::default());
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn cycles_and_duplicate_targets_are_errors() {
        let mut plan = plan_with(vec![rename("r1", "a.ts", "x.ts"), rename("r2", "b.ts", "x.ts")]);
        plan.dependencies = vec![dep("r1", "r2"), dep("r2", "r1")];
        let result = validate_plan(&plan, &LimitsConfig::default());

        assert!(!result.valid);
        assert!(result.has_error(issue_codes::CIRCULAR_DEPENDENCY));
        assert!(result.has_error(issue_codes::RENAME_CONFLICT));
        assert_eq!(
            result
                .errors
                .iter()
                .filter(|e| e.code == issue_codes::CIRCULAR_DEPENDENCY)
                .count(),
            1
        );
    }

    #[test]
    fn high_conflicts_and_fallback_are_warnings() {
        let mut plan = plan_with(vec![rename("r1", "a.ts", "b.ts")]);
        plan.conflicts.push(ConflictInfo::new(
            ConflictKind::PathConflict,
            Severity::High,
            "bad path",
            "rename",
            vec![ActionId::new("r1")],
        ));
        plan.metadata.ordering = OrderStrategy::PriorityFallback;
        let result = validate_plan(&plan, &LimitsConfig::default());

        assert!(result.valid);
        assert!(result.has_warning(issue_codes::HIGH_SEVERITY_CONFLICT));
        assert!(result.has_warning(issue_codes::ORDER_FALLBACK));
    }

    #[test]
    fn order_violations_are_warnings() {
        let mut plan = plan_with(vec![rename("r1", "a.ts", "b.ts"), rename("r2", "c.ts", "d.ts")]);
        plan.dependencies = vec![dep("r1", "r2")];
        let result = validate_plan(&plan, &LimitsConfig::default());
        assert!(result.valid);
        let issue = result
            .warnings
            .iter()
            .find(|w| w.code == issue_codes::ORDER_VIOLATION)
            .unwrap();
        assert_eq!(issue.actions, vec![ActionId::new("r1")]);

        plan.execution_order.pop();
        let result = validate_plan(&plan, &LimitsConfig::default());
        assert!(result.has_warning(issue_codes::ORDER_VIOLATION));
    }

    #[test]
    fn suggestions_follow_limits_and_risk() {
        let mut plan = plan_with(vec![rename("r1", "a.ts", "b.ts"), rename("r2", "c.ts", "d.ts")]);
        plan.metadata.risk_level = RiskLevel::High;
        plan.metadata.cycles_detected = 1;
        plan.metadata.testing_required = true;
        let limits = LimitsConfig {
            batch_threshold: 1,
            ..LimitsConfig::default()
        };
        let result = validate_plan(&plan, &limits);
        assert_eq!(result.suggestions.len(), 4);
    }
}
