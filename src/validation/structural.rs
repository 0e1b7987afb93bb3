//! Structural validation rules over the graph index.
//!
//! Each rule is a pure function of the workflow snapshot and collects
//! every failure it can observe, not only the first. Rule ordering
//! constraints (edge references before cycles, cycles before orphans)
//! live in the orchestrator.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::{EdgeId, NodeId, PortId, Workflow};
use crate::graph::{adjacency, entry_nodes, exit_nodes, reverse_adjacency};

use super::types::{ValidationError, ValidationErrorCode, ValidationResult};

fn from_errors(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        ValidationResult::success(None)
    } else {
        ValidationResult::failure(errors)
    }
}

/// Every edge must reference existing nodes. One error per missing
/// endpoint; both endpoints of one edge may fail.
pub fn validate_edge_references(workflow: &Workflow) -> ValidationResult {
    let node_ids: HashSet<&NodeId> = workflow.nodes.iter().map(|n| &n.id).collect();
    let mut errors = Vec::new();

    for edge in &workflow.edges {
        if !node_ids.contains(&edge.source) {
            errors.push(
                ValidationError::new(
                    ValidationErrorCode::InvalidEdgeReference,
                    format!("Edge references non-existent source node: {}", edge.source),
                )
                .with_nodes(vec![edge.source.clone()])
                .with_edges(vec![edge.id.clone()]),
            );
        }
        if !node_ids.contains(&edge.target) {
            errors.push(
                ValidationError::new(
                    ValidationErrorCode::InvalidEdgeReference,
                    format!("Edge references non-existent target node: {}", edge.target),
                )
                .with_nodes(vec![edge.target.clone()])
                .with_edges(vec![edge.id.clone()]),
            );
        }
    }

    from_errors(errors)
}

/// No two edges may share `(source, sourcePort, target, targetPort)`.
/// Each collision names both edge ids in insertion order.
pub fn validate_no_duplicate_edges(workflow: &Workflow) -> ValidationResult {
    let mut seen: HashMap<(&NodeId, &PortId, &NodeId, &PortId), &EdgeId> = HashMap::new();
    let mut errors = Vec::new();

    for edge in &workflow.edges {
        match seen.get(&edge.connection_key()) {
            Some(first) => {
                errors.push(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateEdge,
                        "Duplicate edge between same ports",
                    )
                    .with_edges(vec![(*first).clone(), edge.id.clone()]),
                );
            }
            None => {
                seen.insert(edge.connection_key(), &edge.id);
            }
        }
    }

    from_errors(errors)
}

/// The workflow must have at least one entry node (in-degree zero).
/// Produces exactly one error: either "no nodes" or "no entry nodes".
pub fn validate_has_entry_node(workflow: &Workflow) -> ValidationResult {
    if workflow.nodes.is_empty() {
        return ValidationResult::failure(vec![ValidationError::new(
            ValidationErrorCode::NoEntryNode,
            "Workflow has no nodes",
        )]);
    }

    if entry_nodes(workflow).is_empty() {
        return ValidationResult::failure(vec![ValidationError::new(
            ValidationErrorCode::NoEntryNode,
            "Workflow has no entry nodes (all nodes have incoming edges)",
        )]);
    }

    ValidationResult::success(None)
}

const UNVISITED: u8 = 0;
const VISITING: u8 = 1;
const VISITED: u8 = 2;

/// Detect cycles with a three-colour DFS. One error per detected back
/// edge, reporting the nodes on the recursion stack from the back-edge
/// target. DFS roots are taken in workflow insertion order so reports
/// are deterministic.
pub fn validate_no_cycles(workflow: &Workflow) -> ValidationResult {
    let adj = adjacency(workflow);
    let edge_map = workflow.edge_map();

    let mut state: HashMap<NodeId, u8> = workflow
        .nodes
        .iter()
        .map(|n| (n.id.clone(), UNVISITED))
        .collect();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut errors = Vec::new();

    for node in &workflow.nodes {
        if state.get(&node.id).copied().unwrap_or(UNVISITED) == UNVISITED {
            cycle_dfs(&node.id, &adj, &edge_map, &mut state, &mut stack, &mut errors);
        }
    }

    from_errors(errors)
}

fn cycle_dfs(
    node: &NodeId,
    adj: &crate::graph::AdjacencyList,
    edge_map: &HashMap<&EdgeId, &crate::domain::Edge>,
    state: &mut HashMap<NodeId, u8>,
    stack: &mut Vec<NodeId>,
    errors: &mut Vec<ValidationError>,
) {
    state.insert(node.clone(), VISITING);
    stack.push(node.clone());

    if let Some(edge_ids) = adj.get(node) {
        for edge_id in edge_ids {
            let Some(edge) = edge_map.get(edge_id) else {
                continue;
            };
            let target = &edge.target;
            match state.get(target).copied().unwrap_or(UNVISITED) {
                UNVISITED => cycle_dfs(target, adj, edge_map, state, stack, errors),
                VISITING => {
                    if let Some(pos) = stack.iter().position(|n| n == target) {
                        let cycle: Vec<NodeId> = stack[pos..].to_vec();
                        let path: Vec<String> = cycle.iter().map(|n| n.to_string()).collect();
                        errors.push(
                            ValidationError::new(
                                ValidationErrorCode::CycleDetected,
                                format!("Cycle detected: {}", path.join(" -> ")),
                            )
                            .with_nodes(cycle),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    stack.pop();
    state.insert(node.clone(), VISITED);
}

/// Every node must lie on some path from an entry node to an exit node.
/// Forward BFS from entries and backward BFS from exits; a node in
/// neither set is an orphan. One error listing all orphans.
///
/// An isolated node is technically both an entry and an exit, so the
/// frontiers only seed entries/exits that carry at least one edge;
/// isolated nodes then land in neither set and are reported.
pub fn validate_no_orphans(workflow: &Workflow) -> ValidationResult {
    let adj = adjacency(workflow);
    let rev = reverse_adjacency(workflow);
    let edge_map = workflow.edge_map();

    let mut reachable_from_entry: HashSet<NodeId> = HashSet::new();
    let mut forward: VecDeque<NodeId> = entry_nodes(workflow)
        .into_iter()
        .filter(|n| adj.get(n).map(|out| !out.is_empty()).unwrap_or(false))
        .collect();
    while let Some(node) = forward.pop_front() {
        if !reachable_from_entry.insert(node.clone()) {
            continue;
        }
        if let Some(edge_ids) = adj.get(&node) {
            for edge_id in edge_ids {
                if let Some(edge) = edge_map.get(edge_id) {
                    forward.push_back(edge.target.clone());
                }
            }
        }
    }

    let mut reaches_exit: HashSet<NodeId> = HashSet::new();
    let mut backward: VecDeque<NodeId> = exit_nodes(workflow)
        .into_iter()
        .filter(|n| rev.get(n).map(|inc| !inc.is_empty()).unwrap_or(false))
        .collect();
    while let Some(node) = backward.pop_front() {
        if !reaches_exit.insert(node.clone()) {
            continue;
        }
        if let Some(edge_ids) = rev.get(&node) {
            for edge_id in edge_ids {
                if let Some(edge) = edge_map.get(edge_id) {
                    backward.push_back(edge.source.clone());
                }
            }
        }
    }

    let orphans: Vec<NodeId> = workflow
        .nodes
        .iter()
        .filter(|n| !reachable_from_entry.contains(&n.id) && !reaches_exit.contains(&n.id))
        .map(|n| n.id.clone())
        .collect();

    if orphans.is_empty() {
        ValidationResult::success(None)
    } else {
        ValidationResult::failure(vec![
            ValidationError::new(
                ValidationErrorCode::OrphanNode,
                format!("Found {} orphan node(s) not connected to workflow", orphans.len()),
            )
            .with_nodes(orphans),
        ])
    }
}
