//! Plan optimization: one content change per file.

use crate::config::LimitsConfig;
use crate::order::execution_order;
use crate::planner::{assess, refresh_content_change};
use camino::Utf8PathBuf;
use chrono::Utc;
use renamefix_types::action::{ActionId, ContentChange};
use renamefix_types::plan::{PlanDependency, PlanMetadata, RefactorPlan};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;
use uuid::Uuid;

/// Merge content changes that target the same file and re-derive order and metadata.
///
/// The first change for a file keeps its id; dependencies and conflicts that named a merged-away
/// change are rewritten to the survivor. The input plan is left untouched.
pub fn optimize_plan(plan: &RefactorPlan, limits: &LimitsConfig) -> RefactorPlan {
    let mut merged: Vec<ContentChange> = Vec::new();
    let mut by_file: BTreeMap<Utf8PathBuf, usize> = BTreeMap::new();
    let mut remap: BTreeMap<ActionId, ActionId> = BTreeMap::new();

    for change in &plan.content_changes {
        match by_file.get(&change.file_path) {
            Some(&i) => {
                let survivor = &mut merged[i];
                remap.insert(change.meta.id.clone(), survivor.meta.id.clone());
                for r in &change.replacements {
                    if !survivor.replacements.contains(r) {
                        survivor.replacements.push(r.clone());
                    }
                }
                for d in &change.meta.dependencies {
                    if !survivor.meta.dependencies.contains(d) {
                        survivor.meta.dependencies.push(d.clone());
                    }
                }
            }
            None => {
                by_file.insert(change.file_path.clone(), merged.len());
                merged.push(change.clone());
            }
        }
    }

    for change in &mut merged {
        change.replacements.sort_by_key(|r| (r.line, r.column));
        refresh_content_change(change);
    }

    let mut out = plan.clone();
    out.id = Uuid::new_v4();
    out.timestamp = Utc::now();
    out.content_changes = merged;

    let resolve = |id: &ActionId| remap.get(id).unwrap_or(id).clone();

    let mut actions = out.actions();
    for action in &mut actions {
        let own = action.id().clone();
        let priority = action.kind().default_priority();
        let meta = action.meta_mut();
        meta.priority = priority;
        let mut deps: Vec<ActionId> = Vec::new();
        for d in meta.dependencies.iter().map(&resolve) {
            if d != own && !deps.contains(&d) {
                deps.push(d);
            }
        }
        meta.dependencies = deps;
    }

    let live: BTreeSet<ActionId> = actions.iter().map(|a| a.id().clone()).collect();
    let mut seen = HashSet::new();
    out.dependencies = plan
        .dependencies
        .iter()
        .filter_map(|d| {
            let action_id = resolve(&d.action_id);
            let mut depends_on: Vec<ActionId> = Vec::new();
            for on in d.depends_on.iter().map(&resolve) {
                if on != action_id && live.contains(&on) && !depends_on.contains(&on) {
                    depends_on.push(on);
                }
            }
            if depends_on.is_empty() || !live.contains(&action_id) {
                return None;
            }
            seen.insert((action_id.clone(), depends_on.clone(), d.kind))
                .then(|| PlanDependency {
                    action_id,
                    depends_on,
                    reason: d.reason.clone(),
                    kind: d.kind,
                })
        })
        .collect();

    for conflict in &mut out.conflicts {
        let mut ids: Vec<ActionId> = Vec::new();
        for id in conflict.affected_actions.iter().map(&resolve) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        conflict.affected_actions = ids;
    }

    let (order, ordering) = execution_order(&actions, &out.dependencies);
    out.set_actions(actions);
    out.execution_order = order;
    let all = out.actions();
    out.metadata = PlanMetadata {
        files_analyzed: plan.metadata.files_analyzed,
        cycles_detected: plan.metadata.cycles_detected,
        ordering,
        ..assess(&all, &out.conflicts, limits)
    };

    debug!(
        from = %plan.id,
        to = %out.id,
        merged = remap.len(),
        actions = all.len(),
        "plan optimized"
    );
    out
}
