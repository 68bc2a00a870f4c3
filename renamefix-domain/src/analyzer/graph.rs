use crate::cycles::find_cycles;
use camino::{Utf8Path, Utf8PathBuf};
use renamefix_types::action::ReferenceKind;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Index of a node in its [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    /// A directory entry point such as `index.ts`.
    Module,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub id: NodeId,
    /// Project-relative path; the node's identity.
    pub path: Utf8PathBuf,
    pub absolute_path: Utf8PathBuf,
    pub kind: NodeKind,
    pub references: Vec<NodeId>,
    pub referenced_by: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: ReferenceKind,
    /// Number of occurrences of this reference in `from`.
    pub weight: u32,
}

/// Module-reference graph of one planning run. Immutable once built.
///
/// Every edge endpoint is a node of the graph. Every cycle lists node ids where consecutive ids are
/// joined by an edge and the last id equals the first.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
    edges: Vec<DependencyEdge>,
    cycles: Vec<Vec<NodeId>>,
    index: BTreeMap<Utf8PathBuf, NodeId>,
}

impl DependencyGraph {
    pub fn nodes(&self) -> &[DependencyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn cycles(&self) -> &[Vec<NodeId>] {
        &self.cycles
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&DependencyNode> {
        self.nodes.get(id.index())
    }

    pub fn find(&self, path: &Utf8Path) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.index.contains_key(path)
    }

    pub fn edges_from(&self, id: NodeId) -> impl Iterator<Item = &DependencyEdge> + '_ {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Paths of nodes whose references include `path`.
    pub fn referencing(&self, path: &Utf8Path) -> Vec<&Utf8Path> {
        let Some(target) = self.find(path).and_then(|id| self.node(id)) else {
            return Vec::new();
        };
        target
            .referenced_by
            .iter()
            .filter_map(|id| self.node(*id))
            .map(|n| n.path.as_path())
            .collect()
    }

    pub fn cycles_as_paths(&self) -> Vec<Vec<Utf8PathBuf>> {
        self.cycles
            .iter()
            .map(|cycle| {
                cycle
                    .iter()
                    .filter_map(|id| self.node(*id))
                    .map(|n| n.path.clone())
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    nodes: Vec<DependencyNode>,
    edges: Vec<DependencyEdge>,
    index: BTreeMap<Utf8PathBuf, NodeId>,
    edge_index: HashMap<(NodeId, NodeId, ReferenceKind), usize>,
}

impl GraphBuilder {
    /// Returns the existing id when `path` is already present.
    pub(crate) fn add_node(
        &mut self,
        path: &Utf8Path,
        absolute_path: Utf8PathBuf,
        kind: NodeKind,
    ) -> NodeId {
        if let Some(id) = self.index.get(path) {
            return *id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(DependencyNode {
            id,
            path: path.to_path_buf(),
            absolute_path,
            kind,
            references: Vec::new(),
            referenced_by: Vec::new(),
        });
        self.index.insert(path.to_path_buf(), id);
        id
    }

    /// Self references are dropped.
    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId, kind: ReferenceKind) {
        if from == to {
            return;
        }
        if let Some(&i) = self.edge_index.get(&(from, to, kind)) {
            self.edges[i].weight += 1;
            return;
        }
        self.edge_index.insert((from, to, kind), self.edges.len());
        self.edges.push(DependencyEdge {
            from,
            to,
            kind,
            weight: 1,
        });

        if !self.nodes[from.index()].references.contains(&to) {
            self.nodes[from.index()].references.push(to);
        }
        if !self.nodes[to.index()].referenced_by.contains(&from) {
            self.nodes[to.index()].referenced_by.push(from);
        }
    }

    pub(crate) fn build(self) -> DependencyGraph {
        let adjacency: Vec<Vec<usize>> = self
            .nodes
            .iter()
            .map(|n| n.references.iter().map(|r| r.index()).collect())
            .collect();
        let cycles = find_cycles(&adjacency)
            .into_iter()
            .map(|c| c.into_iter().map(|i| NodeId(i as u32)).collect())
            .collect();

        DependencyGraph {
            nodes: self.nodes,
            edges: self.edges,
            cycles,
            index: self.index,
        }
    }
}
