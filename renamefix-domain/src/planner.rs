use crate::analyzer::{
    DependencyAnalyzer, DependencyGraph, FoundReference, relativize, strip_suffix,
};
use crate::config::{LimitsConfig, PlannerConfig};
use crate::conflicts::{ConflictDetector, syntax_risk};
use crate::naming::Normalizer;
use crate::order::execution_order;
use crate::ports::RepoView;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use renamefix_types::action::{
    ActionId, ActionKind, ActionMeta, ContentChange, FileRename, Precondition, RefactorAction,
    ReferenceKind, ReferenceUpdate, Replacement, RiskLevel, RollbackData,
};
use renamefix_types::conflict::{ConflictInfo, Severity};
use renamefix_types::plan::{
    DependencyKind, PlanDependency, PlanMetadata, PlanSummary, RefactorPlan,
};
use renamefix_types::scan::{ScanMatch, ScanResult};
use renamefix_types::validation::ValidationResult;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Monotonic action id source for one planning run.
#[derive(Debug, Default)]
pub struct IdGen {
    next: u32,
}

impl IdGen {
    pub fn next_id(&mut self, kind: ActionKind) -> ActionId {
        self.next += 1;
        ActionId(format!("{}-{:04}", kind.id_prefix(), self.next))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

/// One scanned file, project-relative, with every match reported for it.
struct ScannedInput<'a> {
    path: Utf8PathBuf,
    matches: Vec<&'a ScanMatch>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Turn scan matches into an ordered plan.
    ///
    /// Fails only when the project root is unusable or its files cannot be enumerated. Missing or
    /// unreadable files are skipped with a warning.
    pub fn create_plan(
        &self,
        repo: &dyn RepoView,
        scan: &ScanResult,
    ) -> anyhow::Result<RefactorPlan> {
        repo.check_root().context("check project root")?;

        let analyzer = DependencyAnalyzer::new(&self.config.analysis);
        let inputs = scanned_inputs(repo.root(), scan);
        let files: Vec<Utf8PathBuf> = inputs.iter().map(|f| f.path.clone()).collect();
        let graph = analyzer.analyze_dependencies(repo, &files);

        let mut ids = IdGen::default();

        // Renames first so every later action can target post-rename paths.
        let mut renames: Vec<FileRename> = Vec::new();
        for input in &inputs {
            let naming: Vec<&ScanMatch> = input
                .matches
                .iter()
                .copied()
                .filter(|m| m.category.is_file_naming())
                .collect();
            if naming.is_empty() {
                continue;
            }
            let normalizer = Normalizer::for_file(&self.config.naming.rules, &naming);
            let new_path = normalizer.normalize_path(&input.path);
            if new_path == input.path {
                debug!(file = %input.path, "normalization leaves the name unchanged");
                continue;
            }
            renames.push(new_rename(
                ids.next_id(ActionKind::FileRename),
                &input.path,
                new_path,
            ));
        }

        let renamed: BTreeMap<Utf8PathBuf, (ActionId, Utf8PathBuf)> = renames
            .iter()
            .map(|r| (r.old_path.clone(), (r.meta.id.clone(), r.new_path.clone())))
            .collect();
        chain_dependencies(&mut renames, &renamed);

        let mut content_changes: Vec<ContentChange> = Vec::new();
        for input in &inputs {
            let edits: Vec<Replacement> = input
                .matches
                .iter()
                .filter(|m| !m.category.is_file_naming())
                .map(|m| replacement_for(m))
                .collect();
            if edits.is_empty() {
                continue;
            }
            content_changes.push(new_content_change(
                ids.next_id(ActionKind::ContentChange),
                &input.path,
                renamed.get(&input.path),
                edits,
            ));
        }

        let mut reference_updates: Vec<ReferenceUpdate> = Vec::new();
        for rename in &mut renames {
            let found = analyzer
                .find_references(repo, &rename.old_path)
                .with_context(|| format!("find references to {}", rename.old_path))?;
            let per_file = first_reference_per_file(found);

            rename.update_references = !per_file.is_empty();
            rename.meta.estimated_risk = rename_risk(rename);

            for found in per_file {
                reference_updates.push(new_reference_update(
                    ids.next_id(ActionKind::ReferenceUpdate),
                    rename,
                    renamed.get(&found.file),
                    found,
                ));
            }
        }

        let mut plan = RefactorPlan::new(repo.root().to_path_buf());
        plan.file_renames = renames;
        plan.content_changes = content_changes;
        plan.reference_updates = reference_updates;

        let actions = plan.actions();
        plan.dependencies = order_dependencies(&actions);
        plan.dependencies
            .extend(file_dependencies(&actions, &graph, &renamed));

        plan.conflicts =
            ConflictDetector::new(&self.config.limits).detect_conflicts(&actions, &graph);

        let (order, ordering) = execution_order(&actions, &plan.dependencies);
        plan.execution_order = order;
        plan.metadata = PlanMetadata {
            files_analyzed: files.len() as u64,
            cycles_detected: graph.cycles().len() as u64,
            ordering,
            ..assess(&actions, &plan.conflicts, &self.config.limits)
        };

        let summary = summarize_plan(&plan);
        info!(
            plan = %plan.id,
            renames = summary.file_renames,
            content_changes = summary.content_changes,
            reference_updates = summary.reference_updates,
            conflicts = plan.conflicts.len(),
            risk = ?plan.metadata.risk_level,
            "plan created"
        );
        Ok(plan)
    }

    pub fn validate_plan(&self, plan: &RefactorPlan) -> ValidationResult {
        crate::validate::validate_plan(plan, &self.config.limits)
    }

    pub fn optimize_plan(&self, plan: &RefactorPlan) -> RefactorPlan {
        crate::optimize::optimize_plan(plan, &self.config.limits)
    }
}

/// Project-relative inputs in first-seen order, matches for the same file merged. Files without
/// matches take no part in planning.
fn scanned_inputs<'a>(root: &Utf8Path, scan: &'a ScanResult) -> Vec<ScannedInput<'a>> {
    let mut out: Vec<ScannedInput<'a>> = Vec::new();
    let mut index: BTreeMap<Utf8PathBuf, usize> = BTreeMap::new();
    for file in scan.files.iter().filter(|f| !f.matches.is_empty()) {
        let Some(path) = relativize(root, &file.file_path) else {
            warn!(
                file = %file.file_path,
                root = %root,
                "scanned file lies outside the project root; skipping"
            );
            continue;
        };
        match index.get(&path) {
            Some(&i) => out[i].matches.extend(file.matches.iter()),
            None => {
                index.insert(path.clone(), out.len());
                out.push(ScannedInput {
                    path,
                    matches: file.matches.iter().collect(),
                });
            }
        }
    }
    out
}

fn replacement_for(m: &ScanMatch) -> Replacement {
    Replacement {
        line: m.line,
        column: m.column,
        length: m.length(),
        original_text: m.original_text.clone(),
        new_text: m.suggested_fix.clone(),
    }
}

fn new_rename(id: ActionId, old_path: &Utf8Path, new_path: Utf8PathBuf) -> FileRename {
    FileRename {
        meta: ActionMeta {
            id,
            priority: ActionKind::FileRename.default_priority(),
            estimated_risk: RiskLevel::Low,
            dependencies: vec![],
            preconditions: vec![
                Precondition::FileExists {
                    path: old_path.to_path_buf(),
                },
                Precondition::FileAbsent {
                    path: new_path.clone(),
                },
            ],
            rollback: RollbackData::RestorePath {
                from: new_path.clone(),
                to: old_path.to_path_buf(),
            },
        },
        old_path: old_path.to_path_buf(),
        new_path,
        update_references: false,
    }
}

/// A rename whose target is another rename's source runs after that rename vacates it.
///
/// Circular chains get no edges; the conflict detector reports them.
fn chain_dependencies(
    renames: &mut [FileRename],
    by_source: &BTreeMap<Utf8PathBuf, (ActionId, Utf8PathBuf)>,
) {
    for rename in renames.iter_mut() {
        let Some((vacating, _)) = by_source.get(&rename.new_path) else {
            continue;
        };
        if *vacating == rename.meta.id || leads_back(by_source, &rename.new_path, &rename.old_path)
        {
            continue;
        }
        rename.meta.dependencies.push(vacating.clone());
    }
}

/// Follow source -> target links from `from` and report whether they reach `start`.
fn leads_back(
    by_source: &BTreeMap<Utf8PathBuf, (ActionId, Utf8PathBuf)>,
    from: &Utf8Path,
    start: &Utf8Path,
) -> bool {
    let mut cur = from;
    for _ in 0..=by_source.len() {
        if cur == start {
            return true;
        }
        match by_source.get(cur) {
            Some((_, next)) => cur = next,
            None => return false,
        }
    }
    false
}

fn new_content_change(
    id: ActionId,
    path: &Utf8Path,
    renamed: Option<&(ActionId, Utf8PathBuf)>,
    replacements: Vec<Replacement>,
) -> ContentChange {
    let (file_path, dependencies) = match renamed {
        Some((rename_id, new_path)) => (new_path.clone(), vec![rename_id.clone()]),
        None => (path.to_path_buf(), vec![]),
    };
    let mut change = ContentChange {
        meta: ActionMeta {
            id,
            priority: ActionKind::ContentChange.default_priority(),
            estimated_risk: RiskLevel::Low,
            dependencies,
            preconditions: vec![],
            rollback: RollbackData::RevertReplacements {
                replacements: vec![],
            },
        },
        file_path,
        replacements,
    };
    refresh_content_change(&mut change);
    change
}

/// Recompute the fields derived from a change's replacements and path.
pub(crate) fn refresh_content_change(change: &mut ContentChange) {
    change.meta.priority = ActionKind::ContentChange.default_priority();
    change.meta.estimated_risk = syntax_risk(change).1;
    change.meta.preconditions = vec![Precondition::FileExists {
        path: change.file_path.clone(),
    }];
    change.meta.rollback = RollbackData::RevertReplacements {
        replacements: change.replacements.iter().rev().map(Replacement::inverse).collect(),
    };
}

fn first_reference_per_file(found: Vec<FoundReference>) -> Vec<FoundReference> {
    let mut seen = BTreeSet::new();
    found
        .into_iter()
        .filter(|f| seen.insert(f.file.clone()))
        .collect()
}

fn new_reference_update(
    id: ActionId,
    rename: &FileRename,
    referrer_renamed: Option<&(ActionId, Utf8PathBuf)>,
    found: FoundReference,
) -> ReferenceUpdate {
    let mut dependencies = vec![rename.meta.id.clone()];
    let file_path = match referrer_renamed {
        Some((own_rename, new_path)) => {
            if *own_rename != rename.meta.id {
                dependencies.push(own_rename.clone());
            }
            new_path.clone()
        }
        None => found.file.clone(),
    };
    let new_specifier = rewrite_specifier(&found.specifier, &rename.old_path, &rename.new_path);

    ReferenceUpdate {
        meta: ActionMeta {
            id,
            priority: ActionKind::ReferenceUpdate.default_priority(),
            estimated_risk: reference_risk(found.kind),
            dependencies,
            preconditions: vec![Precondition::FileExists {
                path: file_path.clone(),
            }],
            rollback: RollbackData::RestoreReference {
                file_path: file_path.clone(),
                from: new_specifier.clone(),
                to: found.specifier.clone(),
            },
        },
        file_path,
        old_reference: rename.old_path.clone(),
        new_reference: rename.new_path.clone(),
        reference_kind: found.kind,
        old_specifier: found.specifier,
        new_specifier,
        line: found.line,
    }
}

/// Rewrite the last segment of `specifier` for a basename change from `old` to `new`.
///
/// `./a.ts` becomes `./b.ts`, `./a` becomes `./b`, `./a.js` becomes `./b.js`, and a directory
/// import that resolved through an index file gets the new stem appended.
pub fn rewrite_specifier(specifier: &str, old: &Utf8Path, new: &Utf8Path) -> String {
    let (body, suffix) = strip_suffix(specifier);
    let (dir, last) = match body.rfind('/') {
        Some(i) => body.split_at(i + 1),
        None => ("", body),
    };

    let old_name = old.file_name().unwrap_or_default();
    let new_name = new.file_name().unwrap_or_default();
    let old_stem = old.file_stem().unwrap_or(old_name);
    let new_stem = new.file_stem().unwrap_or(new_name);
    let last_path = Utf8Path::new(last);

    let rewritten = if last == old_name {
        format!("{dir}{new_name}")
    } else if last == old_stem {
        format!("{dir}{new_stem}")
    } else if last_path.file_stem() == Some(old_stem) && last_path.extension().is_some() {
        let ext = last_path.extension().unwrap_or_default();
        format!("{dir}{new_stem}.{ext}")
    } else {
        format!("{}/{new_stem}", body.trim_end_matches('/'))
    };
    format!("{rewritten}{suffix}")
}

fn rename_risk(rename: &FileRename) -> RiskLevel {
    if rename.old_path.as_str().to_lowercase() == rename.new_path.as_str().to_lowercase() {
        RiskLevel::High
    } else if rename.update_references {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn reference_risk(kind: ReferenceKind) -> RiskLevel {
    match kind {
        ReferenceKind::ModuleRef => RiskLevel::Low,
        ReferenceKind::ConfigRef | ReferenceKind::PathRef => RiskLevel::Medium,
    }
}

/// One order-dependency per declared action dependency.
pub(crate) fn order_dependencies(actions: &[RefactorAction]) -> Vec<PlanDependency> {
    let renames: BTreeMap<&ActionId, &FileRename> = actions
        .iter()
        .filter_map(|a| match a {
            RefactorAction::FileRename(r) => Some((&r.meta.id, r)),
            _ => None,
        })
        .collect();

    let mut out = Vec::new();
    for action in actions {
        for on in &action.meta().dependencies {
            let reason = match renames.get(on) {
                Some(r) => format!("runs after {} is renamed to {}", r.old_path, r.new_path),
                None => format!("runs after {on}"),
            };
            out.push(PlanDependency {
                action_id: action.id().clone(),
                depends_on: vec![on.clone()],
                reason,
                kind: DependencyKind::OrderDependency,
            });
        }
    }
    out
}

/// For every graph edge `A -> B`, each action on `A` depends on each action on `B`.
fn file_dependencies(
    actions: &[RefactorAction],
    graph: &DependencyGraph,
    renamed: &BTreeMap<Utf8PathBuf, (ActionId, Utf8PathBuf)>,
) -> Vec<PlanDependency> {
    let back: BTreeMap<&Utf8Path, &Utf8Path> = renamed
        .iter()
        .map(|(old, (_, new))| (new.as_path(), old.as_path()))
        .collect();

    let mut touching: BTreeMap<&Utf8Path, Vec<&ActionId>> = BTreeMap::new();
    for action in actions {
        let path = action.target_path();
        // Renames already name their pre-rename path.
        let graph_path = match action {
            RefactorAction::FileRename(_) => path,
            _ => back.get(path).copied().unwrap_or(path),
        };
        touching.entry(graph_path).or_default().push(action.id());
    }

    let mut seen: BTreeSet<(&ActionId, &ActionId)> = BTreeSet::new();
    let mut out = Vec::new();
    for edge in graph.edges() {
        let (Some(from), Some(to)) = (graph.node(edge.from), graph.node(edge.to)) else {
            continue;
        };
        let (Some(dependents), Some(targets)) = (
            touching.get(from.path.as_path()),
            touching.get(to.path.as_path()),
        ) else {
            continue;
        };
        for &a in dependents {
            for &b in targets {
                if a == b || !seen.insert((a, b)) {
                    continue;
                }
                out.push(PlanDependency {
                    action_id: a.clone(),
                    depends_on: vec![b.clone()],
                    reason: format!("{} references {}", from.path, to.path),
                    kind: DependencyKind::FileDependency,
                });
            }
        }
    }
    out
}

/// Duration, risk and requirement fields of the plan metadata.
pub(crate) fn assess(
    actions: &[RefactorAction],
    conflicts: &[ConflictInfo],
    limits: &LimitsConfig,
) -> PlanMetadata {
    PlanMetadata {
        estimated_duration_minutes: estimated_duration_minutes(actions),
        risk_level: plan_risk(actions, conflicts, limits),
        backup_required: true,
        testing_required: actions.len() > limits.testing_threshold,
        total_actions: actions.len() as u64,
        ..PlanMetadata::default()
    }
}

/// 2 minutes per rename, max(1, n/2) per content change with n replacements, 1 per reference
/// update, rounded up.
pub(crate) fn estimated_duration_minutes(actions: &[RefactorAction]) -> u64 {
    let half_minutes: u64 = actions
        .iter()
        .map(|a| match a {
            RefactorAction::FileRename(_) => 4,
            RefactorAction::ContentChange(c) => (c.replacements.len() as u64).max(2),
            RefactorAction::ReferenceUpdate(_) => 2,
        })
        .sum();
    half_minutes.div_ceil(2)
}

pub(crate) fn plan_risk(
    actions: &[RefactorAction],
    conflicts: &[ConflictInfo],
    limits: &LimitsConfig,
) -> RiskLevel {
    let high_actions = actions
        .iter()
        .filter(|a| a.meta().estimated_risk.is_high())
        .count();
    if conflicts.iter().any(|c| c.severity == Severity::High)
        || high_actions > limits.high_risk_action_limit
    {
        RiskLevel::High
    } else if conflicts.len() > limits.conflict_threshold
        || actions.len() > limits.risky_plan_actions
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Counts per action kind, files touched and conflicts per severity.
pub fn summarize_plan(plan: &RefactorPlan) -> PlanSummary {
    let mut files: BTreeSet<&Utf8Path> = BTreeSet::new();
    files.extend(plan.file_renames.iter().map(|r| r.old_path.as_path()));
    files.extend(plan.content_changes.iter().map(|c| c.file_path.as_path()));
    files.extend(plan.reference_updates.iter().map(|u| u.file_path.as_path()));

    let count = |severity: Severity| {
        plan.conflicts
            .iter()
            .filter(|c| c.severity == severity)
            .count() as u64
    };

    PlanSummary {
        file_renames: plan.file_renames.len() as u64,
        content_changes: plan.content_changes.len() as u64,
        reference_updates: plan.reference_updates.len() as u64,
        replacements: plan
            .content_changes
            .iter()
            .map(|c| c.replacements.len() as u64)
            .sum(),
        files_touched: files.len() as u64,
        conflicts_high: count(Severity::High),
        conflicts_medium: count(Severity::Medium),
        conflicts_low: count(Severity::Low),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryRepoView;
    use pretty_assertions::assert_eq;
    use renamefix_types::plan::OrderStrategy;
    use renamefix_types::scan::{MatchCategory, ScannedFile};

    fn scan_match(
        category: MatchCategory,
        line: u32,
        column: u32,
        original: &str,
        fix: &str,
    ) -> ScanMatch {
        ScanMatch {
            category,
            line,
            column,
            original_text: original.to_string(),
            suggested_fix: fix.to_string(),
            context: String::new(),
            severity: Severity::Medium,
            pattern: String::new(),
        }
    }

    fn scanned(path: &str, matches: Vec<ScanMatch>) -> ScannedFile {
        ScannedFile {
            file_path: path.into(),
            file_kind: "typescript".to_string(),
            matches,
        }
    }

    #[test]
    fn ids_are_monotonic_across_kinds() {
        let mut ids = IdGen::default();
        assert_eq!(ids.next_id(ActionKind::FileRename).as_str(), "rename-0001");
        assert_eq!(ids.next_id(ActionKind::ContentChange).as_str(), "content-0002");
        assert_eq!(ids.next_id(ActionKind::ReferenceUpdate).as_str(), "reference-0003");
    }

    #[test]
    fn specifier_rewrites() {
        let old = Utf8Path::new("src/a.ts");
        let new = Utf8Path::new("src/b.ts");
        assert_eq!(rewrite_specifier("./a.ts", old, new), "./b.ts");
        assert_eq!(rewrite_specifier("../src/a", old, new), "../src/b");
        assert_eq!(rewrite_specifier("./a.js?raw", old, new), "./b.js?raw");

        let index = Utf8Path::new("lib/index.ts");
        let main = Utf8Path::new("lib/main.ts");
        assert_eq!(rewrite_specifier("./lib", index, main), "./lib/main");
        assert_eq!(rewrite_specifier("./lib/", index, main), "./lib/main");
    }

    #[test]
    fn duration_rounds_up() {
        let plan_actions = |n: usize| -> Vec<RefactorAction> {
            (0..n)
                .map(|i| {
                    RefactorAction::ContentChange(new_content_change(
                        ActionId(format!("c{i}")),
                        Utf8Path::new("a.ts"),
                        None,
                        vec![
                            replacement_for(&scan_match(MatchCategory::Variable, 1, 1, "a", "b"));
                            3
                        ],
                    ))
                })
                .collect()
        };
        // 1.5 minutes per change
        assert_eq!(estimated_duration_minutes(&plan_actions(1)), 2);
        assert_eq!(estimated_duration_minutes(&plan_actions(2)), 3);
        assert_eq!(estimated_duration_minutes(&[]), 0);
    }

    #[test]
    fn risk_thresholds() {
        let limits = LimitsConfig::default();
        let conflict = |severity| {
            ConflictInfo::new(
                renamefix_types::conflict::ConflictKind::FileConflict,
                severity,
                "",
                "",
                vec![],
            )
        };
        assert_eq!(plan_risk(&[], &[], &limits), RiskLevel::Low);
        assert_eq!(plan_risk(&[], &[conflict(Severity::High)], &limits), RiskLevel::High);
        assert_eq!(
            plan_risk(&[], &vec![conflict(Severity::Low); 4], &limits),
            RiskLevel::Medium
        );
    }

    #[test]
    fn rename_of_referenced_file_depends_and_orders() {
        let repo = MemoryRepoView::new("/proj")
            .with_file("seedram-client.ts", "export const x = 1;\n")
            .with_file("lib/user.ts", "import { x } from '../seedram-client';\n");
        let scan = ScanResult {
            files: vec![scanned(
                "/proj/seedram-client.ts",
                vec![scan_match(
                    MatchCategory::File,
                    1,
                    1,
                    "seedram-client.ts",
                    "seedream-client.ts",
                )],
            )],
        };

        let plan = Planner::new().create_plan(&repo, &scan).unwrap();
        assert_eq!(plan.file_renames.len(), 1);
        assert_eq!(plan.file_renames[0].new_path, Utf8PathBuf::from("seedream-client.ts"));
        assert!(plan.file_renames[0].update_references);
        assert_eq!(plan.file_renames[0].meta.estimated_risk, RiskLevel::Medium);

        assert_eq!(plan.reference_updates.len(), 1);
        let update = &plan.reference_updates[0];
        assert_eq!(update.file_path, Utf8PathBuf::from("lib/user.ts"));
        assert_eq!(update.old_specifier, "../seedram-client");
        assert_eq!(update.new_specifier, "../seedream-client");
        assert_eq!(update.meta.dependencies, vec![plan.file_renames[0].meta.id.clone()]);

        assert_eq!(plan.metadata.ordering, OrderStrategy::Topological);
        assert_eq!(
            plan.execution_order,
            vec![plan.file_renames[0].meta.id.clone(), update.meta.id.clone()]
        );
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn edits_on_renamed_file_target_new_path() {
        let repo = MemoryRepoView::new("/proj").with_file("SeedRam.ts", "class SeedRam {}\n");
        let scan = ScanResult {
            files: vec![scanned(
                "SeedRam.ts",
                vec![
                    scan_match(MatchCategory::File, 1, 1, "SeedRam.ts", "Seedream.ts"),
                    scan_match(MatchCategory::Class, 1, 7, "SeedRam", "Seedream"),
                ],
            )],
        };

        let plan = Planner::new().create_plan(&repo, &scan).unwrap();
        let rename = &plan.file_renames[0];
        let change = &plan.content_changes[0];
        assert_eq!(change.file_path, Utf8PathBuf::from("Seedream.ts"));
        assert_eq!(change.meta.dependencies, vec![rename.meta.id.clone()]);
        assert_eq!(
            change.meta.preconditions,
            vec![Precondition::FileExists { path: "Seedream.ts".into() }]
        );
        assert_eq!(plan.execution_order[0], rename.meta.id);
    }

    #[test]
    fn unchanged_names_produce_no_rename() {
        let repo = MemoryRepoView::new("/proj").with_file("plain.ts", "");
        let scan = ScanResult {
            files: vec![scanned(
                "plain.ts",
                vec![scan_match(MatchCategory::File, 1, 1, "plain.ts", "plain.ts")],
            )],
        };
        let plan = Planner::new().create_plan(&repo, &scan).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.metadata.files_analyzed, 1);
    }

    #[test]
    fn rename_chain_runs_after_target_is_vacated() {
        let repo = MemoryRepoView::new("/proj")
            .with_file("a.ts", "")
            .with_file("b.ts", "");
        let scan = ScanResult {
            files: vec![
                scanned("a.ts", vec![scan_match(MatchCategory::File, 1, 1, "a.ts", "b.ts")]),
                scanned("b.ts", vec![scan_match(MatchCategory::File, 1, 1, "b.ts", "c.ts")]),
            ],
        };

        let plan = Planner::new().create_plan(&repo, &scan).unwrap();
        let first = &plan.file_renames[0];
        let second = &plan.file_renames[1];
        assert_eq!(first.new_path, Utf8PathBuf::from("b.ts"));
        assert_eq!(second.new_path, Utf8PathBuf::from("c.ts"));
        assert_eq!(first.meta.dependencies, vec![second.meta.id.clone()]);
        assert!(second.meta.dependencies.is_empty());
        assert!(plan.dependencies.iter().any(|d| d.action_id == first.meta.id
            && d.depends_on == vec![second.meta.id.clone()]
            && d.kind == DependencyKind::OrderDependency));

        // Replaying the order never renames onto a path that still exists.
        let mut present: BTreeSet<Utf8PathBuf> =
            ["a.ts", "b.ts"].into_iter().map(Utf8PathBuf::from).collect();
        for id in &plan.execution_order {
            let rename = plan
                .file_renames
                .iter()
                .find(|r| &r.meta.id == id)
                .unwrap();
            assert!(present.remove(&rename.old_path), "{} missing", rename.old_path);
            assert!(present.insert(rename.new_path.clone()), "{} occupied", rename.new_path);
        }
        assert_eq!(plan.metadata.ordering, OrderStrategy::Topological);
        assert!(plan.conflicts.is_empty());
        assert!(Planner::new().validate_plan(&plan).valid);
    }

    #[test]
    fn circular_rename_chain_adds_no_dependencies() {
        let repo = MemoryRepoView::new("/proj")
            .with_file("a.ts", "")
            .with_file("b.ts", "");
        let scan = ScanResult {
            files: vec![
                scanned("a.ts", vec![scan_match(MatchCategory::File, 1, 1, "a.ts", "b.ts")]),
                scanned("b.ts", vec![scan_match(MatchCategory::File, 1, 1, "b.ts", "a.ts")]),
            ],
        };

        let plan = Planner::new().create_plan(&repo, &scan).unwrap();
        assert!(plan.file_renames.iter().all(|r| r.meta.dependencies.is_empty()));
        assert!(
            plan.conflicts
                .iter()
                .any(|c| c.description.starts_with("circular rename"))
        );
    }

    #[test]
    fn summary_counts() {
        let repo = MemoryRepoView::new("/proj")
            .with_file("a.ts", "")
            .with_file("b.ts", "");
        let scan = ScanResult {
            files: vec![
                scanned(
                    "a.ts",
                    vec![scan_match(MatchCategory::Variable, 1, 1, "seedRam", "seedream")],
                ),
                scanned(
                    "b.ts",
                    vec![
                        scan_match(MatchCategory::Variable, 1, 1, "seedRam", "seedream"),
                        scan_match(MatchCategory::Variable, 2, 1, "seedRam", "seedream"),
                    ],
                ),
            ],
        };
        let plan = Planner::new().create_plan(&repo, &scan).unwrap();
        let summary = summarize_plan(&plan);
        assert_eq!(summary.content_changes, 2);
        assert_eq!(summary.replacements, 3);
        assert_eq!(summary.files_touched, 2);
        assert_eq!(summary.file_renames, 0);
    }
}
