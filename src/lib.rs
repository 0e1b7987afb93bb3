//! Workflow graph core for agent workflows.
//!
//! Users assemble AI-agent workflows as DAGs of typed nodes; this crate
//! holds the hard, reusable pieces underneath the canvas and the
//! transport:
//!
//! - the domain model for nodes, edges, workflows, agents and executions
//!   ([`domain`]);
//! - the DAG validator — structural and semantic rules composed into a
//!   total, deterministic pipeline that yields a topological execution
//!   order ([`validation`]);
//! - the real-time execution event contract, with a hub-and-spoke
//!   fan-out and a client-side reducer ([`events`]);
//! - execution planning, state tracking and result caching
//!   ([`execution`]).
//!
//! The validator is synchronous and pure: each call owns its snapshot,
//! never throws for input it can classify, and returns every error it
//! can observe with the exact node and edge ids to highlight.

pub mod domain;
pub mod error;
pub mod events;
pub mod execution;
pub mod graph;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::domain::{
	AgentCategory,
	AgentDefinition,
	AgentId,
	AgentRegistry,
	DataType,
	Edge,
	EdgeId,
	Execution,
	ExecutionId,
	ExecutionStatus,
	Node,
	NodeConfig,
	NodeExecutionState,
	NodeExecutionStatus,
	NodeId,
	NodePosition,
	NodeType,
	PortId,
	PortSchema,
	RetryPolicy,
	Workflow,
	WorkflowId,
	WorkflowMeta,
	WorkflowStatus,
};
pub use crate::error::WorkflowError;
pub use crate::events::{
	ClientMessage,
	ConnectionHandle,
	ConnectionInfo,
	EventHub,
	EventKind,
	ExecutionEvent,
	ExecutionView,
	LogEntry,
	LogLevel,
	ProtocolErrorCode,
	Role,
};
pub use crate::execution::{generate_plan, ExecutionPlan, ExecutionTracker, ResultCache};
pub use crate::graph::WorkflowGraph;
pub use crate::validation::{
	validate_workflow,
	validate_workflow_full,
	validate_workflow_structure,
	ValidateOptions,
	ValidationError,
	ValidationErrorCode,
	ValidationResult,
};
