//! Execution runs and per-node execution state.
//!
//! An [`Execution`] is created from a valid workflow snapshot and is
//! immutable once it reaches a terminal status. Node states are owned by
//! the execution.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::{ExecutionId, NodeId, WorkflowId};

/// Overall status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Created, not yet started.
    Pending,
    /// At least one node is executing or waiting to.
    Running,
    /// All nodes finished successfully (or were skipped by a resume).
    Completed,
    /// At least one node failed after retries.
    Failed,
    /// User-initiated cancellation.
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

/// Status of a single node within an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeExecutionStatus {
    /// Waiting for dependencies.
    Pending,
    /// Dependencies met, awaiting an executor.
    Queued,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Failed after all retries.
    Failed,
    /// Skipped due to upstream failure or a resume.
    Skipped,
}

impl NodeExecutionStatus {
    /// Terminal states are final for the lifetime of the execution.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NodeExecutionStatus::Completed
                | NodeExecutionStatus::Failed
                | NodeExecutionStatus::Skipped
        )
    }
}

/// Runtime state of a single node during execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionState {
    pub node_id: NodeId,
    pub status: NodeExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl NodeExecutionState {
    pub fn pending(node_id: NodeId) -> Self {
        Self {
            node_id,
            status: NodeExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            retry_count: 0,
            error: None,
            output: None,
        }
    }
}

/// A single execution run of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: ExecutionId,
    pub workflow_id: WorkflowId,
    /// Snapshot of the workflow version that passed validation.
    pub workflow_version: u64,
    pub status: ExecutionStatus,
    pub triggered_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Map<String, Value>>,
    #[serde(default)]
    pub node_states: Vec<NodeExecutionState>,
    /// Set on executions created by a resume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_execution_id: Option<ExecutionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumed_from_node_id: Option<NodeId>,
}

impl Execution {
    /// Node state lookup map.
    pub fn node_state_map(&self) -> HashMap<&NodeId, &NodeExecutionState> {
        self.node_states.iter().map(|s| (&s.node_id, s)).collect()
    }

    pub fn node_state(&self, node_id: &NodeId) -> Option<&NodeExecutionState> {
        self.node_states.iter().find(|s| &s.node_id == node_id)
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
