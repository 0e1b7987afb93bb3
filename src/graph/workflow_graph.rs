//! petgraph-backed view of a workflow.
//!
//! Built once per workflow snapshot and used by execution planning for
//! successor/predecessor queries. Construction requires every edge to
//! resolve; run the validator first.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::domain::{EdgeId, NodeId, Workflow};
use crate::error::WorkflowError;

/// Node id to petgraph index mapping.
pub type NodeIndexMap = HashMap<NodeId, NodeIndex>;

/// Directed graph over a workflow's node and edge ids.
#[derive(Debug)]
pub struct WorkflowGraph {
    graph: StableDiGraph<NodeId, EdgeId>,
    node_index_map: NodeIndexMap,
    node_order: Vec<NodeId>,
}

impl WorkflowGraph {
    /// Build the graph from a workflow snapshot.
    pub fn build(workflow: &Workflow) -> Result<Self, WorkflowError> {
        let mut graph = StableDiGraph::new();
        let mut node_index_map = NodeIndexMap::new();
        let mut node_order = Vec::with_capacity(workflow.nodes.len());

        for node in &workflow.nodes {
            let idx = graph.add_node(node.id.clone());
            node_index_map.insert(node.id.clone(), idx);
            node_order.push(node.id.clone());
        }

        for edge in &workflow.edges {
            let source_idx = node_index_map.get(&edge.source).ok_or_else(|| {
                WorkflowError::GraphBuildError(format!(
                    "Edge {} references missing source node: {}",
                    edge.id, edge.source
                ))
            })?;
            let target_idx = node_index_map.get(&edge.target).ok_or_else(|| {
                WorkflowError::GraphBuildError(format!(
                    "Edge {} references missing target node: {}",
                    edge.id, edge.target
                ))
            })?;
            graph.add_edge(*source_idx, *target_idx, edge.id.clone());
        }

        Ok(Self {
            graph,
            node_index_map,
            node_order,
        })
    }

    fn index_of(&self, node_id: &NodeId) -> Result<NodeIndex, WorkflowError> {
        self.node_index_map
            .get(node_id)
            .copied()
            .ok_or_else(|| WorkflowError::NodeNotFound(node_id.clone()))
    }

    /// Direct successors of a node, in workflow insertion order.
    pub fn successors(&self, node_id: &NodeId) -> Result<Vec<NodeId>, WorkflowError> {
        let idx = self.index_of(node_id)?;
        let set: HashSet<NodeId> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        Ok(self.in_insertion_order(set))
    }

    /// Direct predecessors of a node, in workflow insertion order.
    pub fn predecessors(&self, node_id: &NodeId) -> Result<Vec<NodeId>, WorkflowError> {
        let idx = self.index_of(node_id)?;
        let set: HashSet<NodeId> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        Ok(self.in_insertion_order(set))
    }

    /// Every node reachable from `node_id` via outgoing edges, excluding
    /// the node itself.
    pub fn descendants(&self, node_id: &NodeId) -> Result<HashSet<NodeId>, WorkflowError> {
        let start = self.index_of(node_id)?;
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(idx) = queue.pop_front() {
            for next in self.graph.neighbors_directed(idx, petgraph::Direction::Outgoing) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        Ok(seen
            .into_iter()
            .filter(|idx| *idx != start)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn in_insertion_order(&self, set: HashSet<NodeId>) -> Vec<NodeId> {
        self.node_order
            .iter()
            .filter(|id| set.contains(*id))
            .cloned()
            .collect()
    }
}
