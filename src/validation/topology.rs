//! Topological execution planning.
//!
//! Kahn's algorithm over the graph index. The FIFO frontier is seeded
//! with entry nodes in workflow insertion order and every batch of
//! newly-ready nodes is ordered by node insertion index, so the sort is
//! deterministic and stable under edge reordering.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use crate::domain::{NodeId, Workflow};
use crate::graph::{adjacency, entry_nodes, in_degrees};

/// Failure of the topological sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TopologicalSortError {
    #[error("cycle detected")]
    CycleDetected,
}

/// Kahn's algorithm: every node exactly once, each source before its
/// targets. Fails if the graph contains a cycle.
pub fn topological_sort(workflow: &Workflow) -> Result<Vec<NodeId>, TopologicalSortError> {
    if workflow.nodes.is_empty() {
        return Ok(Vec::new());
    }

    let adj = adjacency(workflow);
    let edge_map = workflow.edge_map();
    let node_order = workflow.node_order();
    let mut degrees = in_degrees(workflow);

    let mut queue: VecDeque<NodeId> = entry_nodes(workflow).into();
    let mut order: Vec<NodeId> = Vec::with_capacity(workflow.nodes.len());

    while let Some(node) = queue.pop_front() {
        let mut ready: Vec<NodeId> = Vec::new();

        if let Some(edge_ids) = adj.get(&node) {
            for edge_id in edge_ids {
                let Some(edge) = edge_map.get(edge_id) else {
                    continue;
                };
                let degree = degrees.entry(edge.target.clone()).or_insert(0);
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    ready.push(edge.target.clone());
                }
            }
        }

        // Insertion-index order keeps the result independent of edge
        // insertion order.
        ready.sort_by_key(|id| node_order.get(id).copied().unwrap_or(usize::MAX));
        queue.extend(ready);
        order.push(node);
    }

    if order.len() != workflow.nodes.len() {
        return Err(TopologicalSortError::CycleDetected);
    }

    Ok(order)
}

/// Assign each node an execution level: entries are level 0, every other
/// node is one past its deepest predecessor. Nodes sharing a level are
/// independent and may run in parallel.
pub fn execution_levels(workflow: &Workflow) -> HashMap<NodeId, usize> {
    let adj = adjacency(workflow);
    let edge_map = workflow.edge_map();
    let mut degrees = in_degrees(workflow);

    let mut levels: HashMap<NodeId, usize> = HashMap::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    for node_id in entry_nodes(workflow) {
        levels.insert(node_id.clone(), 0);
        queue.push_back(node_id);
    }

    while let Some(node) = queue.pop_front() {
        let current_level = levels.get(&node).copied().unwrap_or(0);

        if let Some(edge_ids) = adj.get(&node) {
            for edge_id in edge_ids {
                let Some(edge) = edge_map.get(edge_id) else {
                    continue;
                };
                let existing = levels.get(&edge.target).copied().unwrap_or(0);
                levels.insert(edge.target.clone(), existing.max(current_level + 1));

                let degree = degrees.entry(edge.target.clone()).or_insert(0);
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    queue.push_back(edge.target.clone());
                }
            }
        }
    }

    levels
}
