//! Builders shared by the integration tests.
#![allow(dead_code)]

use chrono::Utc;
use serde_json::Map;

use agentforge::{
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

pub fn registry(agents: Vec<AgentDefinition>) -> AgentRegistry {
    agents.into_iter().map(|a| (a.id.clone(), a)).collect()
}
