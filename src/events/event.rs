//! Real-time execution events.
//!
//! The wire form is `{ event, executionId, timestamp, payload }` with
//! kind-specific camelCase payload keys. Payloads stay dynamic maps at
//! the boundary; the typed accessors below are what the reducer uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::{ExecutionId, ExecutionStatus, NodeId};

use super::protocol::ProtocolErrorCode;

/// Kinds of real-time events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    // Channel lifecycle
    Connected,
    Ack,
    Error,
    // Execution lifecycle
    ExecutionStarted,
    ExecutionCompleted,
    ExecutionFailed,
    ExecutionCancelled,
    // Node lifecycle
    NodeQueued,
    NodeRunning,
    NodeCompleted,
    NodeFailed,
    NodeSkipped,
    NodeCacheHit,
    // Logging
    LogEmitted,
    // Resume protocol
    ResumeStart,
    NodeOutputReused,
    ResumeComplete,
    /// Forward compatibility: kinds this consumer does not know.
    #[serde(other)]
    Unknown,
}

/// Severity of a runtime log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// A single event on an execution's stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEvent {
    pub event: EventKind,
    /// Absent only on connection-scoped events (CONNECTED and
    /// protocol-level ERROR).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<ExecutionId>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

fn payload_from(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl ExecutionEvent {
    fn new(event: EventKind, execution_id: Option<ExecutionId>, payload: Value) -> Self {
        Self {
            event,
            execution_id,
            timestamp: Utc::now(),
            payload: payload_from(payload),
        }
    }

    pub fn connected(
        connection_id: &str,
        user_id: &str,
        tenant_id: &str,
        role: super::hub::Role,
    ) -> Self {
        Self::new(
            EventKind::Connected,
            None,
            json!({
                "connectionId": connection_id,
                "userId": user_id,
                "tenantId": tenant_id,
                "role": role,
            }),
        )
    }

    pub fn ack(execution_id: ExecutionId, action: &str) -> Self {
        let payload = json!({
            "action": action,
            "executionId": &execution_id,
        });
        Self::new(EventKind::Ack, Some(execution_id), payload)
    }

    pub fn protocol_error(
        execution_id: Option<ExecutionId>,
        code: ProtocolErrorCode,
        message: &str,
    ) -> Self {
        Self::new(
            EventKind::Error,
            execution_id,
            json!({
                "code": code,
                "message": message,
            }),
        )
    }

    pub fn execution_started(execution_id: ExecutionId) -> Self {
        Self::new(EventKind::ExecutionStarted, Some(execution_id), json!({}))
    }

    pub fn execution_completed(execution_id: ExecutionId) -> Self {
        Self::new(EventKind::ExecutionCompleted, Some(execution_id), json!({}))
    }

    pub fn execution_failed(execution_id: ExecutionId) -> Self {
        Self::new(EventKind::ExecutionFailed, Some(execution_id), json!({}))
    }

    pub fn execution_cancelled(execution_id: ExecutionId) -> Self {
        Self::new(EventKind::ExecutionCancelled, Some(execution_id), json!({}))
    }

    pub fn node_queued(execution_id: ExecutionId, node_id: &NodeId) -> Self {
        Self::new(
            EventKind::NodeQueued,
            Some(execution_id),
            json!({ "nodeId": node_id }),
        )
    }

    pub fn node_running(execution_id: ExecutionId, node_id: &NodeId, retry_count: u32) -> Self {
        Self::new(
            EventKind::NodeRunning,
            Some(execution_id),
            json!({
                "nodeId": node_id,
                "retryCount": retry_count,
            }),
        )
    }

    pub fn node_completed(execution_id: ExecutionId, node_id: &NodeId) -> Self {
        Self::new(
            EventKind::NodeCompleted,
            Some(execution_id),
            json!({ "nodeId": node_id }),
        )
    }

    pub fn node_failed(execution_id: ExecutionId, node_id: &NodeId, error: &str) -> Self {
        Self::new(
            EventKind::NodeFailed,
            Some(execution_id),
            json!({
                "nodeId": node_id,
                "error": error,
            }),
        )
    }

    pub fn node_skipped(execution_id: ExecutionId, node_id: &NodeId, reason: &str) -> Self {
        Self::new(
            EventKind::NodeSkipped,
            Some(execution_id),
            json!({
                "nodeId": node_id,
                "reason": reason,
            }),
        )
    }

    pub fn node_cache_hit(execution_id: ExecutionId, node_id: &NodeId) -> Self {
        Self::new(
            EventKind::NodeCacheHit,
            Some(execution_id),
            json!({ "nodeId": node_id }),
        )
    }

    pub fn log_emitted(
        execution_id: ExecutionId,
        node_id: &NodeId,
        level: LogLevel,
        message: &str,
    ) -> Self {
        Self::new(
            EventKind::LogEmitted,
            Some(execution_id),
            json!({
                "nodeId": node_id,
                "level": level,
                "message": message,
            }),
        )
    }

    pub fn resume_start(
        execution_id: ExecutionId,
        parent_execution_id: &ExecutionId,
        resumed_from_node_id: &NodeId,
        skipped_count: usize,
        rerun_count: usize,
    ) -> Self {
        Self::new(
            EventKind::ResumeStart,
            Some(execution_id),
            json!({
                "parentExecutionId": parent_execution_id,
                "resumedFromNodeId": resumed_from_node_id,
                "skippedCount": skipped_count,
                "rerunCount": rerun_count,
            }),
        )
    }

    pub fn node_output_reused(
        execution_id: ExecutionId,
        node_id: &NodeId,
        source_execution_id: &ExecutionId,
    ) -> Self {
        Self::new(
            EventKind::NodeOutputReused,
            Some(execution_id),
            json!({
                "nodeId": node_id,
                "sourceExecutionId": source_execution_id,
            }),
        )
    }

    pub fn resume_complete(execution_id: ExecutionId, status: ExecutionStatus) -> Self {
        Self::new(
            EventKind::ResumeComplete,
            Some(execution_id),
            json!({ "status": status }),
        )
    }

    // === Payload accessors ===

    pub fn node_id(&self) -> Option<NodeId> {
        self.payload
            .get("nodeId")
            .and_then(Value::as_str)
            .map(NodeId::from)
    }

    pub fn retry_count(&self) -> Option<u32> {
        self.payload
            .get("retryCount")
            .and_then(Value::as_u64)
            .map(|n| n as u32)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.payload.get("error").and_then(Value::as_str)
    }

    pub fn skip_reason(&self) -> Option<&str> {
        self.payload.get("reason").and_then(Value::as_str)
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        self.payload
            .get("level")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn log_message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }
}
