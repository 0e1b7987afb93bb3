//! Workflow-level error types.
//!
//! Validation findings are not errors: rules return a
//! [`ValidationResult`](crate::validation::ValidationResult) so all
//! failures can be collected. [`WorkflowError`] covers the fallible
//! operations around the validator — graph construction, planning and
//! execution bookkeeping.

use thiserror::Error;

use crate::domain::{EdgeId, ExecutionId, NodeId};
use crate::validation::ValidationResult;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),
    #[error("Execution not found: {0}")]
    ExecutionNotFound(ExecutionId),
    #[error("Graph build error: {0}")]
    GraphBuildError(String),
    #[error("Cycle detected in graph")]
    CycleDetected,
    #[error("Workflow validation failed")]
    ValidationFailed(Box<ValidationResult>),
    #[error("Execution already finished: {0}")]
    ExecutionFinished(ExecutionId),
}
