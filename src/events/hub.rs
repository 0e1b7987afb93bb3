//! Hub-and-spoke event fan-out.
//!
//! One [`EventHub`] serves all executions: producers publish events,
//! connections subscribe per execution id and receive them on a bounded
//! outbox. Publishing for one execution is serialized by the hub lock,
//! preserving the per-node state machine ordering.
//!
//! Backpressure: when an outbox is full, LOG_EMITTED events are dropped
//! (they are not needed for correctness); any other event closes the
//! lagging subscription with ERROR{overflow}.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::domain::ExecutionId;

use super::event::{EventKind, ExecutionEvent};
use super::protocol::{ClientMessage, ProtocolErrorCode};

/// Role of the authenticated user behind a connection. Surfaced to the
/// client via CONNECTED; enforcement happens outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Admin,
    Member,
    Viewer,
}

/// Identity attached to a connection at channel establishment.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub user_id: String,
    pub tenant_id: String,
    pub role: Role,
}

/// Client half of a connection: the id to address it by and the event
/// receiver the transport drains.
pub struct ConnectionHandle {
    pub connection_id: String,
    pub events: mpsc::Receiver<ExecutionEvent>,
}

struct ConnectionState {
    tx: mpsc::Sender<ExecutionEvent>,
    subscriptions: HashSet<ExecutionId>,
    dropped_logs: u64,
}

#[derive(Default)]
struct HubState {
    connections: HashMap<String, ConnectionState>,
    // execution id -> connection ids
    subscribers: HashMap<ExecutionId, HashSet<String>>,
}

const DEFAULT_OUTBOX_CAPACITY: usize = 256;

/// Routes execution events to subscribed connections.
pub struct EventHub {
    state: Mutex<HubState>,
    outbox_capacity: usize,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::with_outbox_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    pub fn with_outbox_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(HubState::default()),
            outbox_capacity: capacity,
        }
    }

    /// Register a new connection. The CONNECTED greeting is already in
    /// the returned receiver.
    pub fn connect(&self, info: ConnectionInfo) -> ConnectionHandle {
        let connection_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(self.outbox_capacity);

        let greeting = ExecutionEvent::connected(
            &connection_id,
            &info.user_id,
            &info.tenant_id,
            info.role,
        );
        // A fresh outbox cannot be full.
        let _ = tx.try_send(greeting);

        self.state.lock().connections.insert(
            connection_id.clone(),
            ConnectionState {
                tx,
                subscriptions: HashSet::new(),
                dropped_logs: 0,
            },
        );

        ConnectionHandle {
            connection_id,
            events: rx,
        }
    }

    /// Remove a connection and all of its subscriptions.
    pub fn disconnect(&self, connection_id: &str) {
        let mut state = self.state.lock();
        if let Some(connection) = state.connections.remove(connection_id) {
            for execution_id in connection.subscriptions {
                if let Some(subs) = state.subscribers.get_mut(&execution_id) {
                    subs.remove(connection_id);
                    if subs.is_empty() {
                        state.subscribers.remove(&execution_id);
                    }
                }
            }
        }
    }

    /// Subscribe a connection to an execution's events. Idempotent;
    /// replies with ACK either way.
    pub fn subscribe(&self, connection_id: &str, execution_id: &ExecutionId) {
        let mut state = self.state.lock();
        let Some(connection) = state.connections.get_mut(connection_id) else {
            return;
        };
        connection.subscriptions.insert(execution_id.clone());
        let ack = ExecutionEvent::ack(execution_id.clone(), "subscribe");
        let _ = connection.tx.try_send(ack);

        state
            .subscribers
            .entry(execution_id.clone())
            .or_default()
            .insert(connection_id.to_string());
    }

    /// Unsubscribe a connection. Idempotent; does not affect other
    /// subscribers.
    pub fn unsubscribe(&self, connection_id: &str, execution_id: &ExecutionId) {
        let mut state = self.state.lock();
        if let Some(subs) = state.subscribers.get_mut(execution_id) {
            subs.remove(connection_id);
            if subs.is_empty() {
                state.subscribers.remove(execution_id);
            }
        }
        if let Some(connection) = state.connections.get_mut(connection_id) {
            connection.subscriptions.remove(execution_id);
            let ack = ExecutionEvent::ack(execution_id.clone(), "unsubscribe");
            let _ = connection.tx.try_send(ack);
        }
    }

    /// Handle a raw client message: parse, then subscribe/unsubscribe.
    /// Malformed input gets an ERROR{malformed} reply.
    pub fn handle_message(&self, connection_id: &str, raw: &str) {
        match ClientMessage::parse(raw) {
            Ok(ClientMessage::Subscribe { execution_id }) => {
                self.subscribe(connection_id, &execution_id);
            }
            Ok(ClientMessage::Unsubscribe { execution_id }) => {
                self.unsubscribe(connection_id, &execution_id);
            }
            Err(err) => {
                self.send_error(connection_id, None, ProtocolErrorCode::Malformed, &err.to_string());
            }
        }
    }

    /// Send an ERROR event to a single connection, e.g. after the
    /// embedding layer rejects a subscription as unauthorized or unknown.
    pub fn send_error(
        &self,
        connection_id: &str,
        execution_id: Option<ExecutionId>,
        code: ProtocolErrorCode,
        message: &str,
    ) {
        let state = self.state.lock();
        if let Some(connection) = state.connections.get(connection_id) {
            let event = ExecutionEvent::protocol_error(execution_id, code, message);
            let _ = connection.tx.try_send(event);
        }
    }

    /// Publish an event to every subscriber of its execution id.
    pub fn publish(&self, event: &ExecutionEvent) {
        let Some(execution_id) = event.execution_id.clone() else {
            return;
        };

        let mut state = self.state.lock();
        let Some(subscriber_ids) = state.subscribers.get(&execution_id) else {
            return;
        };
        let subscriber_ids: Vec<String> = subscriber_ids.iter().cloned().collect();

        let mut overflowed: Vec<String> = Vec::new();
        for connection_id in subscriber_ids {
            let Some(connection) = state.connections.get_mut(&connection_id) else {
                continue;
            };
            match connection.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if event.event == EventKind::LogEmitted {
                        // Logs are droppable under backpressure.
                        connection.dropped_logs += 1;
                    } else {
                        overflowed.push(connection_id);
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    overflowed.push(connection_id);
                }
            }
        }

        for connection_id in overflowed {
            tracing::warn!(
                "closing lagging subscription: connection={} execution={}",
                connection_id,
                execution_id
            );
            if let Some(subs) = state.subscribers.get_mut(&execution_id) {
                subs.remove(&connection_id);
                if subs.is_empty() {
                    state.subscribers.remove(&execution_id);
                }
            }
            if let Some(connection) = state.connections.get_mut(&connection_id) {
                connection.subscriptions.remove(&execution_id);
                let error = ExecutionEvent::protocol_error(
                    Some(execution_id.clone()),
                    ProtocolErrorCode::Overflow,
                    "subscriber too slow; subscription closed",
                );
                let _ = connection.tx.try_send(error);
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.state.lock().connections.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.state
            .lock()
            .subscribers
            .values()
            .map(|subs| subs.len())
            .sum()
    }

    /// Log events dropped for a connection under backpressure.
    pub fn dropped_log_count(&self, connection_id: &str) -> u64 {
        self.state
            .lock()
            .connections
            .get(connection_id)
            .map(|c| c.dropped_logs)
            .unwrap_or(0)
    }
}
