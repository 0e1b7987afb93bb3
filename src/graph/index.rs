//! Graph index over an immutable workflow snapshot.
//!
//! Pure O(V+E) transforms of the workflow structure into forms the
//! validation algorithms consume. Every node appears as a key in every
//! map; an edge whose source or target does not resolve to a node is
//! ignored for adjacency counts (the dangling reference itself is
//! reported by the edge-reference rule).

use std::collections::{HashMap, HashSet};

use crate::domain::{EdgeId, NodeId, Workflow};

/// NodeId -> outgoing edge ids, in edge insertion order.
pub type AdjacencyList = HashMap<NodeId, Vec<EdgeId>>;

/// NodeId -> incoming edge ids, in edge insertion order.
pub type ReverseAdjacencyList = HashMap<NodeId, Vec<EdgeId>>;

/// NodeId -> count of incoming edges.
pub type InDegreeMap = HashMap<NodeId, usize>;

fn node_ids(workflow: &Workflow) -> HashSet<&NodeId> {
    workflow.nodes.iter().map(|n| &n.id).collect()
}

/// Map each node to its outgoing edge ids.
pub fn adjacency(workflow: &Workflow) -> AdjacencyList {
    let nodes = node_ids(workflow);
    let mut adj: AdjacencyList = workflow
        .nodes
        .iter()
        .map(|n| (n.id.clone(), Vec::new()))
        .collect();

    for edge in &workflow.edges {
        if nodes.contains(&edge.source) && nodes.contains(&edge.target) {
            if let Some(out) = adj.get_mut(&edge.source) {
                out.push(edge.id.clone());
            }
        }
    }

    adj
}

/// Map each node to its incoming edge ids.
pub fn reverse_adjacency(workflow: &Workflow) -> ReverseAdjacencyList {
    let nodes = node_ids(workflow);
    let mut rev: ReverseAdjacencyList = workflow
        .nodes
        .iter()
        .map(|n| (n.id.clone(), Vec::new()))
        .collect();

    for edge in &workflow.edges {
        if nodes.contains(&edge.source) && nodes.contains(&edge.target) {
            if let Some(inc) = rev.get_mut(&edge.target) {
                inc.push(edge.id.clone());
            }
        }
    }

    rev
}

/// Compute the in-degree of each node.
pub fn in_degrees(workflow: &Workflow) -> InDegreeMap {
    let nodes = node_ids(workflow);
    let mut degrees: InDegreeMap = workflow
        .nodes
        .iter()
        .map(|n| (n.id.clone(), 0))
        .collect();

    for edge in &workflow.edges {
        if nodes.contains(&edge.source) && nodes.contains(&edge.target) {
            if let Some(d) = degrees.get_mut(&edge.target) {
                *d += 1;
            }
        }
    }

    degrees
}

/// Nodes with no incoming edges, in workflow insertion order.
pub fn entry_nodes(workflow: &Workflow) -> Vec<NodeId> {
    let degrees = in_degrees(workflow);
    workflow
        .nodes
        .iter()
        .filter(|n| degrees.get(&n.id).copied().unwrap_or(0) == 0)
        .map(|n| n.id.clone())
        .collect()
}

/// Nodes with no outgoing edges, in workflow insertion order.
pub fn exit_nodes(workflow: &Workflow) -> Vec<NodeId> {
    let adj = adjacency(workflow);
    workflow
        .nodes
        .iter()
        .filter(|n| adj.get(&n.id).map(|v| v.is_empty()).unwrap_or(true))
        .map(|n| n.id.clone())
        .collect()
}
