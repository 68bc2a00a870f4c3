//! Execution ordering over the action-dependency graph.

use renamefix_types::action::{ActionId, RefactorAction};
use renamefix_types::plan::{OrderStrategy, PlanDependency};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::warn;

/// `adjacency[i]` holds the indices of actions that must run after action `i`.
/// Dependencies naming unknown ids are ignored.
pub(crate) fn successors(
    actions: &[RefactorAction],
    dependencies: &[PlanDependency],
) -> Vec<Vec<usize>> {
    let position: BTreeMap<&ActionId, usize> = actions
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id(), i))
        .collect();

    let mut edges: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); actions.len()];
    let explicit = dependencies
        .iter()
        .flat_map(|d| d.depends_on.iter().map(move |on| (on, &d.action_id)));
    let declared = actions
        .iter()
        .flat_map(|a| a.meta().dependencies.iter().map(move |on| (on, a.id())));

    for (before, after) in explicit.chain(declared) {
        let (Some(&b), Some(&a)) = (position.get(before), position.get(after)) else {
            continue;
        };
        if a != b {
            edges[b].insert(a);
        }
    }

    edges.into_iter().map(|s| s.into_iter().collect()).collect()
}

/// Kahn's algorithm, draining ready actions in insertion order.
///
/// When the dependencies are cyclic, falls back to kind priority with insertion order breaking ties.
pub fn execution_order(
    actions: &[RefactorAction],
    dependencies: &[PlanDependency],
) -> (Vec<ActionId>, OrderStrategy) {
    let adjacency = successors(actions, dependencies);

    let mut in_degree = vec![0usize; actions.len()];
    for succ in &adjacency {
        for &s in succ {
            in_degree[s] += 1;
        }
    }

    let mut ready: VecDeque<usize> = (0..actions.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut drained = Vec::with_capacity(actions.len());
    while let Some(i) = ready.pop_front() {
        drained.push(i);
        for &s in &adjacency[i] {
            in_degree[s] -= 1;
            if in_degree[s] == 0 {
                ready.push_back(s);
            }
        }
    }

    if drained.len() == actions.len() {
        let order = drained.into_iter().map(|i| actions[i].id().clone()).collect();
        return (order, OrderStrategy::Topological);
    }

    warn!(
        actions = actions.len(),
        ordered = drained.len(),
        "action dependencies are cyclic; falling back to priority order"
    );
    let mut indices: Vec<usize> = (0..actions.len()).collect();
    indices.sort_by_key(|&i| (actions[i].meta().priority, i));
    let order = indices
        .into_iter()
        .map(|i| actions[i].id().clone())
        .collect();
    (order, OrderStrategy::PriorityFallback)
}
