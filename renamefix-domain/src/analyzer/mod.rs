//! Dependency analyzer: module-reference graph and reverse-reference queries.

mod extract;
mod graph;
mod resolve;

pub use extract::{RawReference, extract_references};
pub use graph::{DependencyEdge, DependencyGraph, DependencyNode, NodeId, NodeKind};
pub use resolve::{normalize, relativize, resolve_specifier, strip_suffix};

use crate::config::AnalysisConfig;
use crate::ports::RepoView;
use camino::{Utf8Path, Utf8PathBuf};
use graph::GraphBuilder;
use renamefix_types::action::ReferenceKind;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// A resolved reference from `file` to a queried target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundReference {
    pub file: Utf8PathBuf,
    pub specifier: String,
    pub kind: ReferenceKind,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct DependencyAnalyzer {
    analysis: AnalysisConfig,
}

impl DependencyAnalyzer {
    pub fn new(analysis: &AnalysisConfig) -> Self {
        Self {
            analysis: analysis.clone(),
        }
    }

    /// Build the reference graph over `files` (project-relative or absolute under the root).
    ///
    /// Unreadable files stay in the graph as nodes without outgoing edges. Referenced files outside
    /// `files` are added as nodes when they exist.
    pub fn analyze_dependencies(
        &self,
        repo: &dyn RepoView,
        files: &[Utf8PathBuf],
    ) -> DependencyGraph {
        let root = repo.root();
        let mut builder = GraphBuilder::default();

        let mut inputs: Vec<Utf8PathBuf> = Vec::new();
        let mut seen = BTreeSet::new();
        for file in files {
            let Some(rel) = relativize(root, file) else {
                warn!(file = %file, root = %root, "file lies outside the project root; skipping");
                continue;
            };
            if seen.insert(rel.clone()) {
                inputs.push(rel);
            }
        }

        for rel in &inputs {
            self.add_node(&mut builder, root, rel);
        }

        for rel in &inputs {
            let from = self.add_node(&mut builder, root, rel);
            let text = match repo.read_to_string(rel) {
                Ok(t) => t,
                Err(err) => {
                    warn!(file = %rel, error = %err, "skipping unreadable file");
                    continue;
                }
            };

            for raw in extract_references(&text, &self.analysis) {
                match resolve_specifier(repo, &self.analysis, rel, &raw.specifier) {
                    Some(target) => {
                        let to = self.add_node(&mut builder, root, &target);
                        builder.add_edge(from, to, raw.kind);
                    }
                    None => {
                        debug!(file = %rel, specifier = %raw.specifier, "reference not resolved in project");
                    }
                }
            }
        }

        let graph = builder.build();
        debug!(
            nodes = graph.len(),
            edges = graph.edges().len(),
            cycles = graph.cycles().len(),
            "dependency graph built"
        );
        graph
    }

    /// Every reference in the project that resolves to `target`, re-derived from scratch.
    ///
    /// Fails only when the project's files cannot be enumerated.
    pub fn find_references(
        &self,
        repo: &dyn RepoView,
        target: &Utf8Path,
    ) -> anyhow::Result<Vec<FoundReference>> {
        let target = relativize(repo.root(), target).unwrap_or_else(|| target.to_path_buf());
        let mut out = Vec::new();

        for file in repo.source_files(&self.analysis)? {
            if file == target {
                continue;
            }
            let text = match repo.read_to_string(&file) {
                Ok(t) => t,
                Err(err) => {
                    warn!(file = %file, error = %err, "skipping unreadable file");
                    continue;
                }
            };
            for raw in extract_references(&text, &self.analysis) {
                if resolve_specifier(repo, &self.analysis, &file, &raw.specifier).as_ref()
                    == Some(&target)
                {
                    out.push(FoundReference {
                        file: file.clone(),
                        specifier: raw.specifier,
                        kind: raw.kind,
                        line: raw.line,
                    });
                }
            }
        }

        debug!(target = %target, references = out.len(), "reverse references resolved");
        Ok(out)
    }

    /// Files whose resolved references include `target`, in enumeration order.
    pub fn find_referencing_files(
        &self,
        repo: &dyn RepoView,
        target: &Utf8Path,
    ) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let mut files: Vec<Utf8PathBuf> = Vec::new();
        for found in self.find_references(repo, target)? {
            if files.last() != Some(&found.file) {
                files.push(found.file);
            }
        }
        Ok(files)
    }

    fn add_node(&self, builder: &mut GraphBuilder, root: &Utf8Path, rel: &Utf8Path) -> NodeId {
        builder.add_node(rel, root.join(rel), self.node_kind(rel))
    }

    fn node_kind(&self, rel: &Utf8Path) -> NodeKind {
        if self.analysis.is_config_file(rel) {
            NodeKind::Config
        } else if rel
            .file_stem()
            .is_some_and(|stem| self.analysis.index_files.iter().any(|i| i == stem))
        {
            NodeKind::Module
        } else {
            NodeKind::File
        }
    }
}
