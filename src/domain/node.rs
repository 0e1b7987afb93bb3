//! Workflow nodes.
//!
//! A node's behavior is determined by its [`NodeConfig`], a tagged
//! variant keyed on the node type. The tag is preserved through
//! serialization so producers and consumers agree on the kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::agent::DataType;
use super::ids::{AgentId, NodeId};

/// The category of a node, determining its execution behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Executes an AI agent.
    Agent,
    /// Executes a deterministic tool.
    Tool,
    /// Workflow entry point carrying user-provided data.
    Input,
    /// Workflow exit point carrying the final result.
    Output,
}

/// Visual position on the canvas. Ignored by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

/// Node-specific configuration, keyed on the node type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeConfig {
    #[serde(rename_all = "camelCase")]
    Agent {
        agent_id: AgentId,
        #[serde(default)]
        parameters: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    Tool {
        tool_id: String,
        #[serde(default)]
        parameters: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    Input { data_type: DataType },
    #[serde(rename_all = "camelCase")]
    Output { data_type: DataType },
}

/// A single node in the workflow DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub position: NodePosition,
    pub config: NodeConfig,
}

impl Node {
    /// The node type, derived from the config tag.
    pub fn node_type(&self) -> NodeType {
        match self.config {
            NodeConfig::Agent { .. } => NodeType::Agent,
            NodeConfig::Tool { .. } => NodeType::Tool,
            NodeConfig::Input { .. } => NodeType::Input,
            NodeConfig::Output { .. } => NodeType::Output,
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self.config, NodeConfig::Agent { .. })
    }

    /// The referenced agent id, for agent nodes.
    pub fn agent_id(&self) -> Option<&AgentId> {
        match &self.config {
            NodeConfig::Agent { agent_id, .. } => Some(agent_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_node(id: &str, agent: &str) -> Node {
        Node {
            id: NodeId::from(id),
            label: id.to_string(),
            position: NodePosition { x: 0.0, y: 0.0 },
            config: NodeConfig::Agent {
                agent_id: AgentId::from(agent),
                parameters: Map::new(),
            },
        }
    }

    #[test]
    fn test_node_type_follows_config() {
        let node = agent_node("a", "summarizer");
        assert_eq!(node.node_type(), NodeType::Agent);
        assert!(node.is_agent());
        assert_eq!(node.agent_id(), Some(&AgentId::from("summarizer")));

        let input = Node {
            id: NodeId::from("in"),
            label: "Input".to_string(),
            position: NodePosition { x: 0.0, y: 0.0 },
            config: NodeConfig::Input {
                data_type: DataType::String,
            },
        };
        assert_eq!(input.node_type(), NodeType::Input);
        assert!(input.agent_id().is_none());
    }

    #[test]
    fn test_config_serialization_preserves_tag() {
        let node = agent_node("a", "summarizer");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["config"]["type"], "agent");
        assert_eq!(json["config"]["agentId"], "summarizer");

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back.node_type(), NodeType::Agent);
    }

    #[test]
    fn test_input_config_data_type() {
        let json = r#"{"id":"in","label":"In","position":{"x":1.0,"y":2.0},"config":{"type":"input","dataType":"number"}}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.node_type(), NodeType::Input);
    }
}
