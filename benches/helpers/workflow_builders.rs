#![allow(dead_code)]

use chrono::Utc;
use serde_json::Map;

use agentforge::{
    Edge, EdgeId, Node, NodeConfig, NodeId, NodePosition, PortId, Workflow, WorkflowId,
    WorkflowMeta, WorkflowStatus,
};

fn tool_node(id: String) -> Node {
    Node {
        id: NodeId::new(id.clone()),
        label: id.clone(),
        position: NodePosition { x: 0.0, y: 0.0 },
        config: NodeConfig::Tool {
            tool_id: format!("tool_{id}"),
            parameters: Map::new(),
        },
    }
}

fn wrap(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
    let now = Utc::now();
    Workflow {
        id: WorkflowId::from("wf_bench"),
        status: WorkflowStatus::Draft,
        meta: WorkflowMeta {
            name: "bench".to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            owner_id: "bench".to_string(),
            version: 1,
        },
        nodes,
        edges,
    }
}

/// `n0 -> n1 -> … -> n{count-1}`.
pub fn build_linear_workflow(node_count: usize) -> Workflow {
    let node_count = node_count.max(1);
    let nodes: Vec<Node> = (0..node_count).map(|i| tool_node(format!("n{i}"))).collect();
    let edges: Vec<Edge> = (0..node_count.saturating_sub(1))
        .map(|i| Edge {
            id: EdgeId::new(format!("e{i}")),
            source: NodeId::new(format!("n{i}")),
            source_port: PortId::from("out"),
            target: NodeId::new(format!("n{}", i + 1)),
            target_port: PortId::from("in"),
        })
        .collect();
    wrap(nodes, edges)
}

/// A root fanning out to `width` parallel branches that re-join.
pub fn build_fanout_workflow(width: usize) -> Workflow {
    let width = width.max(1);
    let mut nodes = vec![tool_node("root".to_string())];
    let mut edges = Vec::new();

    for i in 0..width {
        nodes.push(tool_node(format!("branch{i}")));
        edges.push(Edge {
            id: EdgeId::new(format!("out{i}")),
            source: NodeId::from("root"),
            source_port: PortId::from("out"),
            target: NodeId::new(format!("branch{i}")),
            target_port: PortId::from("in"),
        });
    }

    nodes.push(tool_node("join".to_string()));
    for i in 0..width {
        edges.push(Edge {
            id: EdgeId::new(format!("in{i}")),
            source: NodeId::new(format!("branch{i}")),
            source_port: PortId::from("out"),
            target: NodeId::from("join"),
            target_port: PortId::new(format!("slot{i}")),
        });
    }

    wrap(nodes, edges)
}
