//! Execution plans.
//!
//! A plan is derived once from a validated workflow snapshot and carries
//! everything a dispatcher needs: the topological order, dependency maps
//! in both directions, and the entry/exit frontier.

use std::collections::HashMap;

use crate::domain::{ExecutionId, NodeId, Workflow, WorkflowId};
use crate::error::WorkflowError;
use crate::graph::{entry_nodes, exit_nodes, WorkflowGraph};
use crate::validation::{execution_levels, topological_sort};

#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    /// Every node exactly once, dependencies before dependents.
    pub execution_order: Vec<NodeId>,
    /// node -> its direct parents.
    pub dependencies: HashMap<NodeId, Vec<NodeId>>,
    /// node -> its direct children.
    pub dependents: HashMap<NodeId, Vec<NodeId>>,
    pub entry_nodes: Vec<NodeId>,
    pub exit_nodes: Vec<NodeId>,
    /// Parallelism levels: nodes sharing a level are independent.
    pub levels: HashMap<NodeId, usize>,
}

impl ExecutionPlan {
    /// Nodes whose dependencies are all contained in `completed`.
    pub fn ready_nodes(&self, completed: &[NodeId]) -> Vec<NodeId> {
        self.execution_order
            .iter()
            .filter(|node| !completed.contains(node))
            .filter(|node| {
                self.dependencies
                    .get(*node)
                    .map(|parents| parents.iter().all(|p| completed.contains(p)))
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }
}

/// Generate an execution plan for a workflow. The workflow must already
/// have passed structural validation.
pub fn generate_plan(
    workflow: &Workflow,
    execution_id: ExecutionId,
) -> Result<ExecutionPlan, WorkflowError> {
    let execution_order = topological_sort(workflow).map_err(|_| WorkflowError::CycleDetected)?;
    let graph = WorkflowGraph::build(workflow)?;

    let mut dependencies = HashMap::new();
    let mut dependents = HashMap::new();
    for node in &workflow.nodes {
        dependencies.insert(node.id.clone(), graph.predecessors(&node.id)?);
        dependents.insert(node.id.clone(), graph.successors(&node.id)?);
    }

    Ok(ExecutionPlan {
        execution_id,
        workflow_id: workflow.id.clone(),
        execution_order,
        dependencies,
        dependents,
        entry_nodes: entry_nodes(workflow),
        exit_nodes: exit_nodes(workflow),
        levels: execution_levels(workflow),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{edge, linear_workflow, workflow_with};

    #[test]
    fn test_plan_for_linear_workflow() {
        let wf = linear_workflow();
        let plan = generate_plan(&wf, ExecutionId::from("exec1")).unwrap();

        let expected: Vec<NodeId> = vec!["in".into(), "a".into(), "out".into()];
        assert_eq!(plan.execution_order, expected);
        assert_eq!(plan.entry_nodes, vec![NodeId::from("in")]);
        assert_eq!(plan.exit_nodes, vec![NodeId::from("out")]);
        assert_eq!(plan.dependencies[&NodeId::from("a")], vec![NodeId::from("in")]);
        assert_eq!(plan.dependents[&NodeId::from("a")], vec![NodeId::from("out")]);
        assert_eq!(plan.levels[&NodeId::from("in")], 0);
        assert_eq!(plan.levels[&NodeId::from("a")], 1);
        assert_eq!(plan.levels[&NodeId::from("out")], 2);
    }

    #[test]
    fn test_plan_rejects_cycle() {
        let wf = workflow_with(
            &["a", "b"],
            vec![
                edge("e1", "a", "out", "b", "in"),
                edge("e2", "b", "out", "a", "in"),
            ],
        );
        assert!(matches!(
            generate_plan(&wf, ExecutionId::from("exec1")),
            Err(WorkflowError::CycleDetected)
        ));
    }

    #[test]
    fn test_ready_nodes_advance_with_completion() {
        let wf = linear_workflow();
        let plan = generate_plan(&wf, ExecutionId::from("exec1")).unwrap();

        assert_eq!(plan.ready_nodes(&[]), vec![NodeId::from("in")]);
        assert_eq!(
            plan.ready_nodes(&[NodeId::from("in")]),
            vec![NodeId::from("a")]
        );
        assert_eq!(
            plan.ready_nodes(&[NodeId::from("in"), NodeId::from("a")]),
            vec![NodeId::from("out")]
        );
    }
}
