//! Client-side event reduction.
//!
//! An [`ExecutionView`] folds a stream of events into a live picture of
//! one execution. The reducer is total: events that do not fit the node
//! state machine, and kinds it does not know, are counted and ignored;
//! duplicate terminal events are idempotent.
//!
//! The stream is not an authoritative store — after a reconnect,
//! consumers resubscribe and reconcile against a fresh execution fetch.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::domain::{ExecutionStatus, NodeExecutionState, NodeExecutionStatus, NodeId};

use super::event::{EventKind, ExecutionEvent, LogLevel};

/// A retained log line.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub node_id: NodeId,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

const DEFAULT_LOG_CAPACITY: usize = 200;

/// Live view of a single execution, built by applying events in receive
/// order.
#[derive(Debug)]
pub struct ExecutionView {
    pub execution_status: ExecutionStatus,
    pub node_states: HashMap<NodeId, NodeExecutionState>,
    /// Most recent log lines, oldest first.
    pub logs: VecDeque<LogEntry>,
    /// Events that were unknown or did not fit the state machine.
    pub ignored_events: u64,
    log_capacity: usize,
}

impl Default for ExecutionView {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionView {
    pub fn new() -> Self {
        Self::with_log_capacity(DEFAULT_LOG_CAPACITY)
    }

    pub fn with_log_capacity(log_capacity: usize) -> Self {
        Self {
            execution_status: ExecutionStatus::Pending,
            node_states: HashMap::new(),
            logs: VecDeque::new(),
            ignored_events: 0,
            log_capacity,
        }
    }

    pub fn node_status(&self, node_id: &NodeId) -> Option<NodeExecutionStatus> {
        self.node_states.get(node_id).map(|s| s.status)
    }

    /// Apply one event. Total over any event; never panics.
    pub fn apply(&mut self, event: &ExecutionEvent) {
        match event.event {
            EventKind::ExecutionStarted => {
                if !self.execution_status.is_terminal() {
                    self.execution_status = ExecutionStatus::Running;
                }
            }
            EventKind::ExecutionCompleted => {
                self.finish_execution(ExecutionStatus::Completed);
            }
            EventKind::ExecutionFailed => {
                self.finish_execution(ExecutionStatus::Failed);
            }
            EventKind::ExecutionCancelled => {
                self.finish_execution(ExecutionStatus::Cancelled);
            }
            EventKind::NodeQueued => {
                self.transition(event, NodeExecutionStatus::Queued);
            }
            EventKind::NodeRunning => {
                self.transition(event, NodeExecutionStatus::Running);
            }
            EventKind::NodeCompleted | EventKind::NodeCacheHit => {
                self.transition(event, NodeExecutionStatus::Completed);
            }
            EventKind::NodeFailed => {
                self.transition(event, NodeExecutionStatus::Failed);
            }
            EventKind::NodeSkipped => {
                self.transition(event, NodeExecutionStatus::Skipped);
            }
            EventKind::LogEmitted => {
                self.push_log(event);
            }
            EventKind::NodeOutputReused => {
                // A reused predecessor output arrives pre-completed.
                self.transition(event, NodeExecutionStatus::Completed);
            }
            EventKind::ResumeComplete => {
                if let Some(status) = event
                    .payload
                    .get("status")
                    .cloned()
                    .and_then(|v| serde_json::from_value::<ExecutionStatus>(v).ok())
                {
                    self.finish_execution(status);
                } else {
                    self.ignored_events += 1;
                }
            }
            // Channel bookkeeping; no state to fold.
            EventKind::Connected | EventKind::Ack | EventKind::Error | EventKind::ResumeStart => {}
            EventKind::Unknown => {
                self.ignored_events += 1;
            }
        }
    }

    fn finish_execution(&mut self, status: ExecutionStatus) {
        // Duplicate terminal events are idempotent; the first one wins.
        if !self.execution_status.is_terminal() {
            self.execution_status = status;
        }
    }

    fn transition(&mut self, event: &ExecutionEvent, to: NodeExecutionStatus) {
        let Some(node_id) = event.node_id() else {
            self.ignored_events += 1;
            return;
        };

        let state = self
            .node_states
            .entry(node_id.clone())
            .or_insert_with(|| NodeExecutionState::pending(node_id));

        if state.status == to && to.is_terminal() {
            // Duplicate terminal event.
            return;
        }

        if !allowed(event.event, state.status, to) {
            self.ignored_events += 1;
            return;
        }

        state.status = to;
        match to {
            NodeExecutionStatus::Running => {
                if state.started_at.is_none() {
                    state.started_at = Some(event.timestamp);
                }
                if let Some(retry_count) = event.retry_count() {
                    state.retry_count = retry_count;
                }
            }
            NodeExecutionStatus::Completed => {
                state.completed_at = Some(event.timestamp);
            }
            NodeExecutionStatus::Failed => {
                state.completed_at = Some(event.timestamp);
                state.error = event.error_message().map(str::to_string);
            }
            NodeExecutionStatus::Skipped => {
                state.completed_at = Some(event.timestamp);
                state.error = event.skip_reason().map(str::to_string);
            }
            _ => {}
        }
    }

    fn push_log(&mut self, event: &ExecutionEvent) {
        let (Some(node_id), Some(level), Some(message)) =
            (event.node_id(), event.log_level(), event.log_message())
        else {
            self.ignored_events += 1;
            return;
        };

        self.logs.push_back(LogEntry {
            node_id,
            level,
            message: message.to_string(),
            timestamp: event.timestamp,
        });
        while self.logs.len() > self.log_capacity {
            self.logs.pop_front();
        }
    }
}

/// The authoritative node state machine.
///
/// `pending -> queued -> running -> completed | failed`;
/// `pending | queued -> skipped`; cache hits and reused outputs jump
/// straight to completed. Terminal states are final.
fn allowed(kind: EventKind, from: NodeExecutionStatus, to: NodeExecutionStatus) -> bool {
    use NodeExecutionStatus::*;

    if from.is_terminal() {
        return false;
    }

    match to {
        Queued => from == Pending,
        Running => from == Queued,
        Completed => match kind {
            EventKind::NodeCacheHit | EventKind::NodeOutputReused => {
                matches!(from, Pending | Queued | Running)
            }
            _ => from == Running,
        },
        Failed => from == Running,
        Skipped => matches!(from, Pending | Queued),
        Pending => false,
    }
}
