//! Validation result types.
//!
//! The wire form matches the discriminated record consumed by canvas
//! tooling: `{ valid: true, executionOrder }` or
//! `{ valid: false, errors: [{ code, message, nodeIds?, edgeIds? }] }`.

use serde::{Deserialize, Serialize};

use crate::domain::{EdgeId, NodeId};

/// Closed set of validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorCode {
    // Structural
    CycleDetected,
    InvalidEdgeReference,
    DuplicateEdge,
    NoEntryNode,
    OrphanNode,
    // Semantic
    TypeMismatch,
    MissingRequiredInput,
}

/// A single validation error with the exact nodes and edges to highlight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub code: ValidationErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_ids: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edge_ids: Vec<EdgeId>,
}

impl ValidationError {
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            node_ids: Vec::new(),
            edge_ids: Vec::new(),
        }
    }

    pub fn with_nodes(mut self, node_ids: Vec<NodeId>) -> Self {
        self.node_ids = node_ids;
        self
    }

    pub fn with_edges(mut self, edge_ids: Vec<EdgeId>) -> Self {
        self.edge_ids = edge_ids;
        self
    }
}

/// Result of validating a workflow snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    /// Topological order of nodes; present only when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_order: Option<Vec<NodeId>>,
}

impl ValidationResult {
    pub fn success(execution_order: Option<Vec<NodeId>>) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            execution_order,
        }
    }

    pub fn failure(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
            execution_order: None,
        }
    }

    pub fn codes(&self) -> Vec<ValidationErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }
}
