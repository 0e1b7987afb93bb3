//! Shared builders for unit tests.

use chrono::Utc;
use serde_json::Map;

use crate::domain::{
    AgentCategory, AgentDefinition, AgentId, AgentRegistry, DataType, Edge, EdgeId, Node,
    NodeConfig, NodeId, NodePosition, PortId, PortSchema, RetryPolicy, Workflow, WorkflowId,
    WorkflowMeta, WorkflowStatus,
};

pub fn input_node(id: &str) -> Node {
    Node {
        id: NodeId::from(id),
        label: id.to_string(),
        position: NodePosition { x: 0.0, y: 0.0 },
        config: NodeConfig::Input {
            data_type: DataType::String,
        },
    }
}

pub fn output_node(id: &str) -> Node {
    Node {
        id: NodeId::from(id),
        label: id.to_string(),
        position: NodePosition { x: 0.0, y: 0.0 },
        config: NodeConfig::Output {
            data_type: DataType::String,
        },
    }
}

pub fn agent_node(id: &str, agent_id: &str) -> Node {
    Node {
        id: NodeId::from(id),
        label: id.to_string(),
        position: NodePosition { x: 0.0, y: 0.0 },
        config: NodeConfig::Agent {
            agent_id: AgentId::from(agent_id),
            parameters: Map::new(),
        },
    }
}

pub fn tool_node(id: &str) -> Node {
    Node {
        id: NodeId::from(id),
        label: id.to_string(),
        position: NodePosition { x: 0.0, y: 0.0 },
        config: NodeConfig::Tool {
            tool_id: format!("tool_{id}"),
            parameters: Map::new(),
        },
    }
}

pub fn edge(id: &str, source: &str, source_port: &str, target: &str, target_port: &str) -> Edge {
    Edge {
        id: EdgeId::from(id),
        source: NodeId::from(source),
        source_port: PortId::from(source_port),
        target: NodeId::from(target),
        target_port: PortId::from(target_port),
    }
}

pub fn workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
    let now = Utc::now();
    Workflow {
        id: WorkflowId::from("wf_test"),
        status: WorkflowStatus::Draft,
        meta: WorkflowMeta {
            name: "test workflow".to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            owner_id: "user_001".to_string(),
            version: 1,
        },
        nodes,
        edges,
    }
}

/// Workflow of neutral (tool) nodes; structural rules don't care about
/// node kinds.
pub fn workflow_with(node_ids: &[&str], edges: Vec<Edge>) -> Workflow {
    workflow(node_ids.iter().map(|id| tool_node(id)).collect(), edges)
}

/// `in -> a -> out` with an agent in the middle, ports wired to the
/// summarizer registry.
pub fn linear_workflow() -> Workflow {
    workflow(
        vec![
            input_node("in"),
            agent_node("a", "summarizer"),
            output_node("out"),
        ],
        vec![
            edge("e1", "in", "value", "a", "text"),
            edge("e2", "a", "summary", "out", "value"),
        ],
    )
}

pub fn port(name: &str, data_type: DataType, required: bool) -> PortSchema {
    PortSchema {
        name: PortId::from(name),
        data_type,
        required,
        description: String::new(),
    }
}

pub fn agent_def(id: &str, inputs: Vec<PortSchema>, outputs: Vec<PortSchema>) -> AgentDefinition {
    AgentDefinition {
        id: AgentId::from(id),
        name: id.to_string(),
        description: String::new(),
        category: AgentCategory::Llm,
        input_schema: inputs,
        output_schema: outputs,
        default_config: Map::new(),
        cacheable: true,
        retry_policy: RetryPolicy::default(),
    }
}

/// Registry with a single `summarizer` agent: `text: string` in,
/// `summary: string` out.
pub fn summarizer_registry() -> AgentRegistry {
    let agent = agent_def(
        "summarizer",
        vec![port("text", DataType::String, true)],
        vec![port("summary", DataType::String, true)],
    );
    [(agent.id.clone(), agent)].into_iter().collect()
}
