//! Real-time execution event contract.
//!
//! The vocabulary producers and consumers share: event kinds and payload
//! shapes ([`event`]), the subscribe/unsubscribe protocol
//! ([`protocol`]), the server-side fan-out ([`hub`]) and the client-side
//! reducer ([`reducer`]).
//!
//! Ordering guarantees per execution id:
//! - events for one node follow the state machine
//!   QUEUED -> RUNNING -> (COMPLETED | FAILED | SKIPPED), with CACHE_HIT
//!   substituting for RUNNING -> COMPLETED;
//! - EXECUTION_STARTED precedes any NODE_* event, and exactly one of
//!   EXECUTION_COMPLETED / EXECUTION_FAILED / EXECUTION_CANCELLED
//!   terminates the stream;
//! - LOG_EMITTED for a node appears only between its RUNNING and its
//!   terminal event;
//! - nothing is ordered across nodes beyond causal constraints.

mod event;
mod hub;
mod protocol;
mod reducer;

pub use event::{EventKind, ExecutionEvent, LogLevel};
pub use hub::{ConnectionHandle, ConnectionInfo, EventHub, Role};
pub use protocol::{ClientMessage, ProtocolErrorCode};
pub use reducer::{ExecutionView, LogEntry};
