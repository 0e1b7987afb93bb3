//! Execution lifecycle bookkeeping.
//!
//! The tracker owns every execution's state: creation from a validated
//! workflow snapshot, per-node transitions, aggregate status, cancel and
//! resume. When a hub is attached, each applied transition is published
//! as the matching stream event, in order, so subscribers observe the
//! contract the reducer expects.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::domain::{
    Execution, ExecutionId, ExecutionStatus, NodeExecutionState, NodeExecutionStatus, NodeId,
    Workflow,
};
use crate::error::WorkflowError;
use crate::events::{EventHub, EventKind, ExecutionEvent};
use crate::graph::WorkflowGraph;

#[derive(Default)]
struct TrackerState {
    executions: HashMap<ExecutionId, Execution>,
    // execution id -> tenant id, for isolation checks
    tenants: HashMap<ExecutionId, String>,
}

/// Tracks executions and publishes their transitions.
#[derive(Default)]
pub struct ExecutionTracker {
    state: RwLock<TrackerState>,
    hub: Option<Arc<EventHub>>,
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a hub; every subsequent transition is published to it.
    pub fn with_hub(hub: Arc<EventHub>) -> Self {
        Self {
            state: RwLock::new(TrackerState::default()),
            hub: Some(hub),
        }
    }

    fn emit(&self, events: Vec<ExecutionEvent>) {
        if let Some(hub) = &self.hub {
            for event in &events {
                hub.publish(event);
            }
        }
    }

    /// Create a new execution with every node pending.
    pub fn create(
        &self,
        workflow: &Workflow,
        inputs: Map<String, Value>,
        triggered_by: &str,
        tenant_id: &str,
    ) -> Execution {
        let execution = Execution {
            id: ExecutionId::new(uuid::Uuid::new_v4().to_string()),
            workflow_id: workflow.id.clone(),
            workflow_version: workflow.meta.version,
            status: ExecutionStatus::Pending,
            triggered_by: triggered_by.to_string(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            inputs,
            outputs: None,
            node_states: workflow
                .nodes
                .iter()
                .map(|n| NodeExecutionState::pending(n.id.clone()))
                .collect(),
            parent_execution_id: None,
            resumed_from_node_id: None,
        };

        let mut state = self.state.write();
        state
            .executions
            .insert(execution.id.clone(), execution.clone());
        state
            .tenants
            .insert(execution.id.clone(), tenant_id.to_string());
        execution
    }

    /// Fetch an execution, enforcing tenant isolation. A wrong tenant is
    /// indistinguishable from a missing execution.
    pub fn get(
        &self,
        execution_id: &ExecutionId,
        tenant_id: &str,
    ) -> Result<Execution, WorkflowError> {
        let state = self.state.read();
        let execution = state.executions.get(execution_id);
        let stored_tenant = state.tenants.get(execution_id);

        match (execution, stored_tenant) {
            (Some(execution), Some(tenant)) if tenant == tenant_id => Ok(execution.clone()),
            _ => Err(WorkflowError::ExecutionNotFound(execution_id.clone())),
        }
    }

    pub fn node_queued(
        &self,
        execution_id: &ExecutionId,
        node_id: &NodeId,
    ) -> Result<Execution, WorkflowError> {
        self.apply_node_event(execution_id, node_id, EventKind::NodeQueued, None, None, None)
    }

    pub fn node_running(
        &self,
        execution_id: &ExecutionId,
        node_id: &NodeId,
        retry_count: u32,
    ) -> Result<Execution, WorkflowError> {
        self.apply_node_event(
            execution_id,
            node_id,
            EventKind::NodeRunning,
            Some(retry_count),
            None,
            None,
        )
    }

    pub fn node_completed(
        &self,
        execution_id: &ExecutionId,
        node_id: &NodeId,
        output: Value,
    ) -> Result<Execution, WorkflowError> {
        self.apply_node_event(
            execution_id,
            node_id,
            EventKind::NodeCompleted,
            None,
            None,
            Some(output),
        )
    }

    /// Complete a node from a cached result without running it.
    pub fn node_cache_hit(
        &self,
        execution_id: &ExecutionId,
        node_id: &NodeId,
        output: Value,
    ) -> Result<Execution, WorkflowError> {
        self.apply_node_event(
            execution_id,
            node_id,
            EventKind::NodeCacheHit,
            None,
            None,
            Some(output),
        )
    }

    pub fn node_failed(
        &self,
        execution_id: &ExecutionId,
        node_id: &NodeId,
        error: &str,
    ) -> Result<Execution, WorkflowError> {
        self.apply_node_event(
            execution_id,
            node_id,
            EventKind::NodeFailed,
            None,
            Some(error.to_string()),
            None,
        )
    }

    pub fn node_skipped(
        &self,
        execution_id: &ExecutionId,
        node_id: &NodeId,
        reason: &str,
    ) -> Result<Execution, WorkflowError> {
        self.apply_node_event(
            execution_id,
            node_id,
            EventKind::NodeSkipped,
            None,
            Some(reason.to_string()),
            None,
        )
    }

    /// Mark every descendant of a failed node as skipped.
    pub fn skip_descendants(
        &self,
        execution_id: &ExecutionId,
        graph: &WorkflowGraph,
        failed_node_id: &NodeId,
    ) -> Result<Execution, WorkflowError> {
        let descendants = graph.descendants(failed_node_id)?;
        let reason = format!("Skipped due to upstream failure: {failed_node_id}");

        let pending: Vec<NodeId> = {
            let state = self.state.read();
            let execution = state
                .executions
                .get(execution_id)
                .ok_or_else(|| WorkflowError::ExecutionNotFound(execution_id.clone()))?;
            execution
                .node_states
                .iter()
                .filter(|s| descendants.contains(&s.node_id) && !s.status.is_terminal())
                .map(|s| s.node_id.clone())
                .collect()
        };

        for node_id in pending {
            self.node_skipped(execution_id, &node_id, &reason)?;
        }

        let state = self.state.read();
        state
            .executions
            .get(execution_id)
            .cloned()
            .ok_or_else(|| WorkflowError::ExecutionNotFound(execution_id.clone()))
    }

    /// Cancel a pending or running execution. Finished executions are
    /// immutable.
    pub fn cancel(
        &self,
        execution_id: &ExecutionId,
        tenant_id: &str,
    ) -> Result<Execution, WorkflowError> {
        let mut events = Vec::new();
        let result = {
            let mut state = self.state.write();
            if state.tenants.get(execution_id).map(String::as_str) != Some(tenant_id) {
                return Err(WorkflowError::ExecutionNotFound(execution_id.clone()));
            }
            let execution = state
                .executions
                .get_mut(execution_id)
                .ok_or_else(|| WorkflowError::ExecutionNotFound(execution_id.clone()))?;

            if execution.status.is_terminal() {
                return Err(WorkflowError::ExecutionFinished(execution_id.clone()));
            }

            execution.status = ExecutionStatus::Cancelled;
            execution.completed_at = Some(Utc::now());
            events.push(ExecutionEvent::execution_cancelled(execution_id.clone()));
            if execution.parent_execution_id.is_some() {
                events.push(ExecutionEvent::resume_complete(
                    execution_id.clone(),
                    ExecutionStatus::Cancelled,
                ));
            }
            execution.clone()
        };

        self.emit(events);
        Ok(result)
    }

    /// Output of a node, if it has produced one.
    pub fn node_output(
        &self,
        execution_id: &ExecutionId,
        node_id: &NodeId,
    ) -> Result<Option<Value>, WorkflowError> {
        let state = self.state.read();
        let execution = state
            .executions
            .get(execution_id)
            .ok_or_else(|| WorkflowError::ExecutionNotFound(execution_id.clone()))?;
        Ok(execution
            .node_state(node_id)
            .and_then(|s| s.output.clone()))
    }

    /// Create a new execution resuming a prior one from `resume_from`.
    ///
    /// The restart node and everything downstream of it are re-run;
    /// every other node is carried over as completed with its parent
    /// output reused.
    pub fn resume(
        &self,
        parent_execution_id: &ExecutionId,
        workflow: &Workflow,
        resume_from: &NodeId,
        triggered_by: &str,
        tenant_id: &str,
    ) -> Result<Execution, WorkflowError> {
        let parent = self.get(parent_execution_id, tenant_id)?;
        let graph = WorkflowGraph::build(workflow)?;

        let mut rerun = graph.descendants(resume_from)?;
        rerun.insert(resume_from.clone());

        let parent_states = parent.node_state_map();
        let mut node_states = Vec::with_capacity(workflow.nodes.len());
        let mut reused: Vec<NodeId> = Vec::new();
        let mut skipped_count = 0;

        for node in &workflow.nodes {
            if rerun.contains(&node.id) {
                node_states.push(NodeExecutionState::pending(node.id.clone()));
                continue;
            }
            skipped_count += 1;
            let mut carried = match parent_states.get(&node.id) {
                Some(parent_state)
                    if parent_state.status == NodeExecutionStatus::Completed =>
                {
                    if parent_state.output.is_some() {
                        reused.push(node.id.clone());
                    }
                    NodeExecutionState {
                        output: parent_state.output.clone(),
                        started_at: parent_state.started_at,
                        completed_at: parent_state.completed_at,
                        ..NodeExecutionState::pending(node.id.clone())
                    }
                }
                _ => NodeExecutionState::pending(node.id.clone()),
            };
            carried.status = NodeExecutionStatus::Completed;
            node_states.push(carried);
        }

        let rerun_count = workflow.nodes.len() - skipped_count;

        let execution = Execution {
            id: ExecutionId::new(uuid::Uuid::new_v4().to_string()),
            workflow_id: workflow.id.clone(),
            workflow_version: workflow.meta.version,
            status: ExecutionStatus::Pending,
            triggered_by: triggered_by.to_string(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            inputs: parent.inputs.clone(),
            outputs: None,
            node_states,
            parent_execution_id: Some(parent.id.clone()),
            resumed_from_node_id: Some(resume_from.clone()),
        };

        {
            let mut state = self.state.write();
            state
                .executions
                .insert(execution.id.clone(), execution.clone());
            state
                .tenants
                .insert(execution.id.clone(), tenant_id.to_string());
        }

        let mut events = vec![ExecutionEvent::resume_start(
            execution.id.clone(),
            &parent.id,
            resume_from,
            skipped_count,
            rerun_count,
        )];
        for node_id in &reused {
            events.push(ExecutionEvent::node_output_reused(
                execution.id.clone(),
                node_id,
                &parent.id,
            ));
        }
        self.emit(events);

        Ok(execution)
    }

    fn apply_node_event(
        &self,
        execution_id: &ExecutionId,
        node_id: &NodeId,
        kind: EventKind,
        retry_count: Option<u32>,
        detail: Option<String>,
        output: Option<Value>,
    ) -> Result<Execution, WorkflowError> {
        let mut events = Vec::new();
        let result = {
            let mut state = self.state.write();
            let execution = state
                .executions
                .get_mut(execution_id)
                .ok_or_else(|| WorkflowError::ExecutionNotFound(execution_id.clone()))?;

            if execution.status.is_terminal() {
                return Err(WorkflowError::ExecutionFinished(execution_id.clone()));
            }

            let now = Utc::now();

            // The stream starts before any NODE_* event appears on it.
            if execution.status == ExecutionStatus::Pending {
                execution.status = ExecutionStatus::Running;
                execution.started_at = Some(now);
                events.push(ExecutionEvent::execution_started(execution_id.clone()));
            }

            let node_state = execution
                .node_states
                .iter_mut()
                .find(|s| &s.node_id == node_id)
                .ok_or_else(|| WorkflowError::NodeNotFound(node_id.clone()))?;

            let to = match kind {
                EventKind::NodeQueued => NodeExecutionStatus::Queued,
                EventKind::NodeRunning => NodeExecutionStatus::Running,
                EventKind::NodeCompleted | EventKind::NodeCacheHit => {
                    NodeExecutionStatus::Completed
                }
                EventKind::NodeFailed => NodeExecutionStatus::Failed,
                EventKind::NodeSkipped => NodeExecutionStatus::Skipped,
                _ => unreachable!("not a node transition kind"),
            };

            tracing::debug!(
                "execution {}: node {} {:?} -> {:?}",
                execution_id,
                node_id,
                node_state.status,
                to
            );

            node_state.status = to;
            match to {
                NodeExecutionStatus::Running => {
                    if node_state.started_at.is_none() {
                        node_state.started_at = Some(now);
                    }
                    if let Some(retry_count) = retry_count {
                        node_state.retry_count = retry_count;
                    }
                }
                NodeExecutionStatus::Completed => {
                    node_state.completed_at = Some(now);
                    node_state.output = output;
                }
                NodeExecutionStatus::Failed | NodeExecutionStatus::Skipped => {
                    node_state.completed_at = Some(now);
                    node_state.error = detail.clone();
                }
                _ => {}
            }

            events.push(match kind {
                EventKind::NodeQueued => {
                    ExecutionEvent::node_queued(execution_id.clone(), node_id)
                }
                EventKind::NodeRunning => ExecutionEvent::node_running(
                    execution_id.clone(),
                    node_id,
                    retry_count.unwrap_or(0),
                ),
                EventKind::NodeCompleted => {
                    ExecutionEvent::node_completed(execution_id.clone(), node_id)
                }
                EventKind::NodeCacheHit => {
                    ExecutionEvent::node_cache_hit(execution_id.clone(), node_id)
                }
                EventKind::NodeFailed => ExecutionEvent::node_failed(
                    execution_id.clone(),
                    node_id,
                    detail.as_deref().unwrap_or(""),
                ),
                EventKind::NodeSkipped => ExecutionEvent::node_skipped(
                    execution_id.clone(),
                    node_id,
                    detail.as_deref().unwrap_or(""),
                ),
                _ => unreachable!(),
            });

            // Terminal node transitions may finish the whole execution.
            if to.is_terminal() {
                let aggregate = aggregate_status(execution);
                if aggregate.is_terminal() {
                    execution.status = aggregate;
                    execution.completed_at = Some(now);
                    events.push(match aggregate {
                        ExecutionStatus::Failed => {
                            ExecutionEvent::execution_failed(execution_id.clone())
                        }
                        _ => ExecutionEvent::execution_completed(execution_id.clone()),
                    });
                    if execution.parent_execution_id.is_some() {
                        events.push(ExecutionEvent::resume_complete(
                            execution_id.clone(),
                            aggregate,
                        ));
                    }
                }
            }

            execution.clone()
        };

        self.emit(events);
        Ok(result)
    }
}

/// Aggregate execution status from node states: anything still to do
/// means running; otherwise a single failure fails the run.
fn aggregate_status(execution: &Execution) -> ExecutionStatus {
    let mut has_failed = false;

    for state in &execution.node_states {
        match state.status {
            NodeExecutionStatus::Failed => has_failed = true,
            NodeExecutionStatus::Running
            | NodeExecutionStatus::Pending
            | NodeExecutionStatus::Queued => return ExecutionStatus::Running,
            _ => {}
        }
    }

    if has_failed {
        ExecutionStatus::Failed
    } else {
        ExecutionStatus::Completed
    }
}
