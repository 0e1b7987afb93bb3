//! Graph views over a workflow snapshot.
//!
//! [`index`] holds the pure adjacency/in-degree transforms the validator
//! consumes; [`WorkflowGraph`] is the petgraph-backed structure execution
//! planning traverses.

pub mod index;
mod workflow_graph;

pub use index::{
    adjacency, entry_nodes, exit_nodes, in_degrees, reverse_adjacency, AdjacencyList,
    InDegreeMap, ReverseAdjacencyList,
};
pub use workflow_graph::{NodeIndexMap, WorkflowGraph};
