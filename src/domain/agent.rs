//! Agent definitions and port schemas.
//!
//! An [`AgentDefinition`] is a template, not an instance; workflow nodes
//! reference agents by [`AgentId`]. The registry backing semantic
//! validation is a plain map supplied by the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::{AgentId, PortId};

/// Primitive types supported for agent inputs and outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Object => "object",
            DataType::Array => "array",
        };
        f.write_str(name)
    }
}

/// Schema for a single input or output port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortSchema {
    pub name: PortId,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

fn default_required() -> bool {
    true
}

/// Agent category for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Llm,
    Retrieval,
    Transform,
    Integration,
    Logic,
}

/// Retry behavior for agent execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Complete definition of an agent available in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDefinition {
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: AgentCategory,
    /// Ordered input ports; `name` matches an edge's target port.
    #[serde(default)]
    pub input_schema: Vec<PortSchema>,
    /// Ordered output ports; `name` matches an edge's source port.
    #[serde(default)]
    pub output_schema: Vec<PortSchema>,
    #[serde(default)]
    pub default_config: Map<String, Value>,
    #[serde(default = "default_cacheable")]
    pub cacheable: bool,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

fn default_cacheable() -> bool {
    true
}

impl AgentDefinition {
    /// Look up an input port by name.
    pub fn input_port(&self, name: &PortId) -> Option<&PortSchema> {
        self.input_schema.iter().find(|p| &p.name == name)
    }

    /// Look up an output port by name.
    pub fn output_port(&self, name: &PortId) -> Option<&PortSchema> {
        self.output_schema.iter().find(|p| &p.name == name)
    }
}

/// Read-only lookup of agent definitions used by semantic validation.
pub type AgentRegistry = HashMap<AgentId, AgentDefinition>;
