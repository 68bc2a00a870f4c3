//! Conflict detection over a proposed action set.
//!
//! Five independent passes. Every finding is kept; none short-circuits another.

use crate::analyzer::DependencyGraph;
use crate::config::LimitsConfig;
use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use renamefix_types::action::{
    ActionId, ContentChange, FileRename, RefactorAction, ReferenceUpdate, RiskLevel,
};
use renamefix_types::conflict::{ConflictInfo, ConflictKind, Severity};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:class|interface|type|enum|struct|trait|function|def|module|namespace|package|import|export)\b",
    )
    .expect("declaration pattern")
});

const ILLEGAL_PATH_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Score how likely a content change is to break surrounding syntax.
///
/// Per replacement: +2 if either text looks like a declaration or module boundary, +1 if it touches
/// a quoted literal, +1 if the length changes by more than 10 characters.
pub fn syntax_risk(change: &ContentChange) -> (u32, RiskLevel) {
    let score: u32 = change
        .replacements
        .iter()
        .map(|r| {
            let mut s = 0;
            if DECLARATION.is_match(&r.original_text) || DECLARATION.is_match(&r.new_text) {
                s += 2;
            }
            if [&r.original_text, &r.new_text]
                .iter()
                .any(|t| t.contains(['\'', '"', '`']))
            {
                s += 1;
            }
            let old_len = r.original_text.chars().count();
            let new_len = r.new_text.chars().count();
            if old_len.abs_diff(new_len) > 10 {
                s += 1;
            }
            s
        })
        .sum();

    let risk = match score {
        s if s >= 5 => RiskLevel::High,
        s if s >= 2 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    };
    (score, risk)
}

#[derive(Debug, Clone)]
pub struct ConflictDetector {
    limits: LimitsConfig,
}

impl ConflictDetector {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            limits: limits.clone(),
        }
    }

    pub fn detect_conflicts(
        &self,
        actions: &[RefactorAction],
        graph: &DependencyGraph,
    ) -> Vec<ConflictInfo> {
        let mut renames = Vec::new();
        let mut changes = Vec::new();
        let mut updates = Vec::new();
        for action in actions {
            match action {
                RefactorAction::FileRename(a) => renames.push(a),
                RefactorAction::ContentChange(a) => changes.push(a),
                RefactorAction::ReferenceUpdate(a) => updates.push(a),
            }
        }

        let mut out = Vec::new();
        out.extend(rename_conflicts(&renames));
        out.extend(reference_conflicts(actions, &renames, &updates, graph));
        out.extend(content_conflicts(&changes));
        out.extend(self.path_conflicts(&renames));
        out.extend(forwarded_cycles(graph));

        debug!(actions = actions.len(), conflicts = out.len(), "conflict detection finished");
        out
    }

    fn path_conflicts(&self, renames: &[&FileRename]) -> Vec<ConflictInfo> {
        let mut out = Vec::new();
        for r in renames {
            let path = r.new_path.as_str();
            let ids = vec![r.meta.id.clone()];

            let len = path.chars().count();
            if len > self.limits.max_path_len {
                out.push(ConflictInfo::new(
                    ConflictKind::PathConflict,
                    Severity::Medium,
                    format!(
                        "{path} is {len} characters, over the {} character limit",
                        self.limits.max_path_len
                    ),
                    "shorten the target name or its directory",
                    ids.clone(),
                ));
            }

            if path
                .chars()
                .any(|c| c.is_control() || ILLEGAL_PATH_CHARS.contains(&c))
            {
                out.push(ConflictInfo::new(
                    ConflictKind::PathConflict,
                    Severity::High,
                    format!("{path:?} contains characters not allowed in file names"),
                    "remove control characters and any of <>:\"|?*",
                    ids.clone(),
                ));
            }

            if let Some(stem) = r.new_path.file_stem() {
                let device = stem.to_ascii_uppercase();
                if RESERVED_NAMES.contains(&device.as_str()) {
                    out.push(ConflictInfo::new(
                        ConflictKind::PathConflict,
                        Severity::High,
                        format!("{path} uses the reserved device name {device}"),
                        "choose a name that is not an OS device name",
                        ids,
                    ));
                }
            }
        }
        out
    }
}

fn rename_conflicts(renames: &[&FileRename]) -> Vec<ConflictInfo> {
    let mut out = Vec::new();

    let mut by_target: BTreeMap<&Utf8Path, Vec<ActionId>> = BTreeMap::new();
    for r in renames {
        by_target
            .entry(r.new_path.as_path())
            .or_default()
            .push(r.meta.id.clone());
    }
    for (target, ids) in &by_target {
        if ids.len() > 1 {
            out.push(ConflictInfo::new(
                ConflictKind::FileConflict,
                Severity::High,
                format!("{} renames target {target}", ids.len()),
                "give each rename a distinct target",
                ids.clone(),
            ));
        }
    }

    // Collisions that only exist on case-insensitive file systems.
    let mut by_folded: BTreeMap<String, (BTreeSet<&Utf8Path>, Vec<ActionId>)> = BTreeMap::new();
    for r in renames {
        let entry = by_folded.entry(r.new_path.as_str().to_lowercase()).or_default();
        entry.0.insert(r.new_path.as_path());
        entry.1.push(r.meta.id.clone());
    }
    for (folded, (paths, ids)) in by_folded {
        if paths.len() > 1 {
            out.push(ConflictInfo::new(
                ConflictKind::FileConflict,
                Severity::Medium,
                format!("targets differ only by case: {folded}"),
                "pick one spelling for the target",
                ids,
            ));
        }
    }

    let by_source: BTreeMap<&Utf8Path, &FileRename> =
        renames.iter().map(|r| (r.old_path.as_path(), *r)).collect();
    let mut reported: BTreeSet<Vec<ActionId>> = BTreeSet::new();
    for start in renames {
        let mut chain = vec![start.meta.id.clone()];
        let mut names = vec![start.old_path.as_str(), start.new_path.as_str()];
        let mut cur = start.new_path.as_path();
        let mut closed = false;
        for _ in 0..renames.len() {
            if cur == start.old_path.as_path() {
                closed = true;
                break;
            }
            let Some(next) = by_source.get(cur) else {
                break;
            };
            chain.push(next.meta.id.clone());
            names.push(next.new_path.as_str());
            cur = next.new_path.as_path();
        }
        if !closed && cur == start.old_path.as_path() {
            closed = true;
        }
        if !closed {
            continue;
        }

        let mut key = chain.clone();
        key.sort();
        key.dedup();
        if reported.insert(key) {
            out.push(ConflictInfo::new(
                ConflictKind::FileConflict,
                Severity::High,
                format!("circular rename: {}", names.join(" -> ")),
                "break the cycle with a temporary intermediate name",
                chain,
            ));
        }
    }

    out
}

fn reference_conflicts(
    actions: &[RefactorAction],
    renames: &[&FileRename],
    updates: &[&ReferenceUpdate],
    graph: &DependencyGraph,
) -> Vec<ConflictInfo> {
    let mut out = Vec::new();

    // Updates on renamed files carry the post-rename path.
    let renamed_back: BTreeMap<&Utf8Path, &Utf8Path> = renames
        .iter()
        .map(|r| (r.new_path.as_path(), r.old_path.as_path()))
        .collect();
    let graph_path = |p: &Utf8Path| -> Utf8PathBuf {
        renamed_back.get(p).copied().unwrap_or(p).to_path_buf()
    };

    let covered: BTreeSet<(Utf8PathBuf, &Utf8Path)> = updates
        .iter()
        .map(|u| (graph_path(&u.file_path), u.old_reference.as_path()))
        .collect();

    for r in renames {
        for referrer in graph.referencing(&r.old_path) {
            if !covered.contains(&(referrer.to_path_buf(), r.old_path.as_path())) {
                out.push(ConflictInfo::new(
                    ConflictKind::ReferenceConflict,
                    Severity::High,
                    format!(
                        "{referrer} references {} but has no reference update for its rename",
                        r.old_path
                    ),
                    format!("add a reference update in {referrer} pointing at {}", r.new_path),
                    vec![r.meta.id.clone()],
                ));
            }
        }
    }

    let mut by_pair: BTreeMap<(&Utf8Path, &Utf8Path), Vec<ActionId>> = BTreeMap::new();
    for u in updates {
        by_pair
            .entry((u.file_path.as_path(), u.old_reference.as_path()))
            .or_default()
            .push(u.meta.id.clone());
    }
    for ((file, old), ids) in by_pair {
        if ids.len() > 1 {
            out.push(ConflictInfo::new(
                ConflictKind::ReferenceConflict,
                Severity::Medium,
                format!("{} updates of the reference to {old} in {file}", ids.len()),
                "keep a single update per file and reference",
                ids,
            ));
        }
    }

    let mut known: BTreeSet<&Utf8Path> = BTreeSet::new();
    for action in actions {
        known.insert(action.target_path());
        if let RefactorAction::FileRename(r) = action {
            known.insert(r.new_path.as_path());
        }
    }
    for u in updates {
        if !known.contains(u.new_reference.as_path()) && !graph.contains(&u.new_reference) {
            out.push(ConflictInfo::new(
                ConflictKind::ReferenceConflict,
                Severity::High,
                format!(
                    "{} would point at {}, which no action or project file provides",
                    u.file_path, u.new_reference
                ),
                "check the rename target or drop the update",
                vec![u.meta.id.clone()],
            ));
        }
    }

    out
}

fn content_conflicts(changes: &[&ContentChange]) -> Vec<ConflictInfo> {
    let mut out = Vec::new();

    let mut by_file: BTreeMap<&Utf8Path, Vec<&ContentChange>> = BTreeMap::new();
    for &c in changes {
        by_file.entry(c.file_path.as_path()).or_default().push(c);
    }
    for (file, group) in &by_file {
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                let overlapping = a
                    .replacements
                    .iter()
                    .any(|ra| b.replacements.iter().any(|rb| ra.overlaps(rb)));
                if overlapping {
                    out.push(ConflictInfo::new(
                        ConflictKind::ContentConflict,
                        Severity::High,
                        format!("overlapping replacements in {file}"),
                        "merge the edits into a single change",
                        vec![a.meta.id.clone(), b.meta.id.clone()],
                    ));
                }
            }
        }
    }

    for c in changes {
        let (score, risk) = syntax_risk(c);
        if risk.is_high() {
            out.push(ConflictInfo::new(
                ConflictKind::ContentConflict,
                Severity::Medium,
                format!("edits in {} touch structural syntax (risk score {score})", c.file_path),
                "verify the file still parses after the change",
                vec![c.meta.id.clone()],
            ));
        }
    }

    out
}

fn forwarded_cycles(graph: &DependencyGraph) -> Vec<ConflictInfo> {
    graph
        .cycles_as_paths()
        .into_iter()
        .filter(|cycle| cycle.iter().collect::<BTreeSet<_>>().len() > 1)
        .map(|cycle| {
            let names: Vec<&str> = cycle.iter().map(|p| p.as_str()).collect();
            ConflictInfo::new(
                ConflictKind::ReferenceConflict,
                Severity::Medium,
                format!("circular module references: {}", names.join(" -> ")),
                "decouple the modules by hand before renaming",
                Vec::new(),
            )
        })
        .collect()
}
