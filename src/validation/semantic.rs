//! Semantic validation rules.
//!
//! Both rules need an [`AgentRegistry`] supplied by the caller; the
//! registry is read-only for the duration of a validation call. Edges
//! touching `input`/`output` nodes (or any non-agent node) are skipped —
//! their types are declared in node config and checked at execution.

use std::collections::HashSet;

use crate::domain::{AgentRegistry, PortId, Workflow};
use crate::graph::reverse_adjacency;

use super::types::{ValidationError, ValidationErrorCode, ValidationResult};

/// For each edge between two agent nodes, the source output port's type
/// must strictly equal the target input port's type. Unknown agents and
/// unknown ports surface as TYPE_MISMATCH because the edge cannot be
/// typed.
pub fn validate_type_compatibility(
    workflow: &Workflow,
    registry: &AgentRegistry,
) -> ValidationResult {
    let node_map = workflow.node_map();
    let mut errors = Vec::new();

    for edge in &workflow.edges {
        // Missing endpoints are the edge-reference rule's finding.
        let (Some(source_node), Some(target_node)) =
            (node_map.get(&edge.source), node_map.get(&edge.target))
        else {
            continue;
        };

        let (Some(source_agent_id), Some(target_agent_id)) =
            (source_node.agent_id(), target_node.agent_id())
        else {
            continue;
        };

        let source_agent = registry.get(source_agent_id);
        let target_agent = registry.get(target_agent_id);

        if source_agent.is_none() {
            errors.push(
                ValidationError::new(
                    ValidationErrorCode::TypeMismatch,
                    format!("Unknown agent definition on edge source: {source_agent_id}"),
                )
                .with_nodes(vec![edge.source.clone()])
                .with_edges(vec![edge.id.clone()]),
            );
        }
        if target_agent.is_none() {
            errors.push(
                ValidationError::new(
                    ValidationErrorCode::TypeMismatch,
                    format!("Unknown agent definition on edge target: {target_agent_id}"),
                )
                .with_nodes(vec![edge.target.clone()])
                .with_edges(vec![edge.id.clone()]),
            );
        }
        let (Some(source_agent), Some(target_agent)) = (source_agent, target_agent) else {
            continue;
        };

        let source_port = source_agent.output_port(&edge.source_port);
        if source_port.is_none() {
            errors.push(
                ValidationError::new(
                    ValidationErrorCode::TypeMismatch,
                    format!("Source node has no output port: {}", edge.source_port),
                )
                .with_nodes(vec![edge.source.clone()])
                .with_edges(vec![edge.id.clone()]),
            );
        }
        let target_port = target_agent.input_port(&edge.target_port);
        if target_port.is_none() {
            errors.push(
                ValidationError::new(
                    ValidationErrorCode::TypeMismatch,
                    format!("Target node has no input port: {}", edge.target_port),
                )
                .with_nodes(vec![edge.target.clone()])
                .with_edges(vec![edge.id.clone()]),
            );
        }
        let (Some(source_port), Some(target_port)) = (source_port, target_port) else {
            continue;
        };

        // Strict equality; no coercion between primitive types.
        if source_port.data_type != target_port.data_type {
            errors.push(
                ValidationError::new(
                    ValidationErrorCode::TypeMismatch,
                    format!(
                        "Type mismatch: {} -> {}",
                        source_port.data_type, target_port.data_type
                    ),
                )
                .with_nodes(vec![edge.source.clone(), edge.target.clone()])
                .with_edges(vec![edge.id.clone()]),
            );
        }
    }

    if errors.is_empty() {
        ValidationResult::success(None)
    } else {
        ValidationResult::failure(errors)
    }
}

/// Every required input port of an agent node must have at least one
/// incoming edge. One error per node, listing all missing ports.
pub fn validate_required_inputs(
    workflow: &Workflow,
    registry: &AgentRegistry,
) -> ValidationResult {
    let rev = reverse_adjacency(workflow);
    let edge_map = workflow.edge_map();
    let mut errors = Vec::new();

    for node in &workflow.nodes {
        let Some(agent_id) = node.agent_id() else {
            continue;
        };
        let Some(agent) = registry.get(agent_id) else {
            // Unknown agents are the type-compatibility rule's finding.
            continue;
        };

        let connected_ports: HashSet<&PortId> = rev
            .get(&node.id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| edge_map.get(edge_id))
            .map(|edge| &edge.target_port)
            .collect();

        let missing: Vec<String> = agent
            .input_schema
            .iter()
            .filter(|port| port.required && !connected_ports.contains(&port.name))
            .map(|port| port.name.to_string())
            .collect();

        if !missing.is_empty() {
            errors.push(
                ValidationError::new(
                    ValidationErrorCode::MissingRequiredInput,
                    format!("Missing required inputs: {}", missing.join(", ")),
                )
                .with_nodes(vec![node.id.clone()]),
            );
        }
    }

    if errors.is_empty() {
        ValidationResult::success(None)
    } else {
        ValidationResult::failure(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataType;
    use crate::testutil::{
        agent_def, agent_node, edge, input_node, port, summarizer_registry, workflow,
    };

    fn two_agent_registry() -> AgentRegistry {
        let a = agent_def(
            "producer",
            vec![],
            vec![port("r", DataType::String, true)],
        );
        let b = agent_def(
            "consumer",
            vec![port("x", DataType::Number, true)],
            vec![],
        );
        [(a.id.clone(), a), (b.id.clone(), b)].into_iter().collect()
    }

    #[test]
    fn test_type_mismatch_on_edge() {
        let wf = workflow(
            vec![agent_node("a", "producer"), agent_node("b", "consumer")],
            vec![edge("e1", "a", "r", "b", "x")],
        );
        let result = validate_type_compatibility(&wf, &two_agent_registry());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ValidationErrorCode::TypeMismatch);
        assert!(result.errors[0].message.contains("string -> number"));
        assert_eq!(result.errors[0].edge_ids, vec!["e1".into()]);
    }

    #[test]
    fn test_matching_types_pass() {
        let wf = workflow(
            vec![agent_node("a", "summarizer"), agent_node("b", "summarizer")],
            vec![edge("e1", "a", "summary", "b", "text")],
        );
        assert!(validate_type_compatibility(&wf, &summarizer_registry()).valid);
    }

    #[test]
    fn test_edges_touching_input_nodes_are_skipped() {
        let wf = workflow(
            vec![input_node("in"), agent_node("a", "summarizer")],
            vec![edge("e1", "in", "value", "a", "text")],
        );
        assert!(validate_type_compatibility(&wf, &summarizer_registry()).valid);
    }

    #[test]
    fn test_unknown_agent_names_the_side() {
        let wf = workflow(
            vec![agent_node("a", "ghost_agent"), agent_node("b", "summarizer")],
            vec![edge("e1", "a", "out", "b", "text")],
        );
        let result = validate_type_compatibility(&wf, &summarizer_registry());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("edge source"));
        assert!(result.errors[0].message.contains("ghost_agent"));
        assert_eq!(result.errors[0].node_ids, vec!["a".into()]);
    }

    #[test]
    fn test_unknown_port_is_reported() {
        let wf = workflow(
            vec![agent_node("a", "summarizer"), agent_node("b", "summarizer")],
            vec![edge("e1", "a", "nope", "b", "text")],
        );
        let result = validate_type_compatibility(&wf, &summarizer_registry());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("no output port: nope"));
    }

    #[test]
    fn test_missing_required_input() {
        let wf = workflow(vec![agent_node("a", "summarizer")], vec![]);
        let result = validate_required_inputs(&wf, &summarizer_registry());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].code,
            ValidationErrorCode::MissingRequiredInput
        );
        assert!(result.errors[0].message.contains("text"));
        assert_eq!(result.errors[0].node_ids, vec!["a".into()]);
    }

    #[test]
    fn test_required_input_satisfied_by_any_edge() {
        let wf = workflow(
            vec![input_node("in"), agent_node("a", "summarizer")],
            vec![edge("e1", "in", "value", "a", "text")],
        );
        assert!(validate_required_inputs(&wf, &summarizer_registry()).valid);
    }

    #[test]
    fn test_optional_inputs_do_not_require_edges() {
        let agent = agent_def(
            "opt",
            vec![
                port("must", DataType::String, true),
                port("may", DataType::String, false),
            ],
            vec![],
        );
        let registry: AgentRegistry = [(agent.id.clone(), agent)].into_iter().collect();
        let wf = workflow(
            vec![input_node("in"), agent_node("a", "opt")],
            vec![edge("e1", "in", "value", "a", "must")],
        );
        assert!(validate_required_inputs(&wf, &registry).valid);
    }

    #[test]
    fn test_one_error_lists_all_missing_ports() {
        let agent = agent_def(
            "multi",
            vec![
                port("p1", DataType::String, true),
                port("p2", DataType::Number, true),
            ],
            vec![],
        );
        let registry: AgentRegistry = [(agent.id.clone(), agent)].into_iter().collect();
        let wf = workflow(vec![agent_node("a", "multi")], vec![]);
        let result = validate_required_inputs(&wf, &registry);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("p1"));
        assert!(result.errors[0].message.contains("p2"));
    }
}
