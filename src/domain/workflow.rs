//! Workflow definitions.
//!
//! A [`Workflow`] is always handed to the validator as an immutable
//! snapshot. Nodes and edges keep their insertion order; topological
//! planning relies on it for reproducible tie-breaks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::edge::Edge;
use super::ids::{EdgeId, NodeId, WorkflowId};
use super::node::Node;

/// Lifecycle status of a workflow definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    /// Being edited, not executable.
    Draft,
    /// Passed validation, ready to execute.
    Valid,
    /// Failed validation, needs fixes.
    Invalid,
    /// Soft-deleted, not executable.
    Archived,
}

/// Workflow metadata, separate from graph structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: String,
    /// Monotonically increasing, for optimistic concurrency control.
    pub version: u64,
}

/// A complete workflow definition.
///
/// The nodes and edges form a DAG once validated:
/// acyclic, all edge references resolve, at least one entry node,
/// no orphans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub status: WorkflowStatus,
    pub meta: WorkflowMeta,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Workflow {
    /// Node lookup map. O(n) construction, O(1) lookup.
    pub fn node_map(&self) -> HashMap<&NodeId, &Node> {
        self.nodes.iter().map(|n| (&n.id, n)).collect()
    }

    /// Edge lookup map. O(n) construction, O(1) lookup.
    pub fn edge_map(&self) -> HashMap<&EdgeId, &Edge> {
        self.edges.iter().map(|e| (&e.id, e)).collect()
    }

    /// Insertion index per node, for deterministic tie-breaks.
    pub fn node_order(&self) -> HashMap<&NodeId, usize> {
        self.nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect()
    }

    /// Apply an edit to the graph, bumping the version and resetting the
    /// lifecycle to draft. The previous snapshot stays untouched.
    pub fn apply_edit(&self, nodes: Vec<Node>, edges: Vec<Edge>, now: DateTime<Utc>) -> Workflow {
        Workflow {
            id: self.id.clone(),
            status: WorkflowStatus::Draft,
            meta: WorkflowMeta {
                version: self.meta.version + 1,
                updated_at: now,
                ..self.meta.clone()
            },
            nodes,
            edges,
        }
    }
}
