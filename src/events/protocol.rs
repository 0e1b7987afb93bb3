//! Client-to-server messages and protocol error codes.

use serde::{Deserialize, Serialize};

use crate::domain::ExecutionId;

/// Messages a client may send on the stream.
///
/// Wire form: `{ "action": "subscribe" | "unsubscribe", "executionId": … }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Subscribe { execution_id: ExecutionId },
    #[serde(rename_all = "camelCase")]
    Unsubscribe { execution_id: ExecutionId },
}

impl ClientMessage {
    /// Parse a raw UTF-8 record. Malformed input is the caller's cue to
    /// reply with ERROR{malformed}.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn action(&self) -> &'static str {
        match self {
            ClientMessage::Subscribe { .. } => "subscribe",
            ClientMessage::Unsubscribe { .. } => "unsubscribe",
        }
    }

    pub fn execution_id(&self) -> &ExecutionId {
        match self {
            ClientMessage::Subscribe { execution_id } => execution_id,
            ClientMessage::Unsubscribe { execution_id } => execution_id,
        }
    }
}

/// Protocol-level failure codes carried by ERROR events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolErrorCode {
    /// A subscriber could not keep up and the subscription was closed.
    Overflow,
    Unauthorized,
    UnknownExecution,
    Malformed,
}
