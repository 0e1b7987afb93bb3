//! Workflow validation.
//!
//! [`validate_workflow`] composes the structural rules, the semantic
//! rules and the topological planner in a fixed order, collecting every
//! error it can while short-circuiting only when a failing rule would
//! make the next one unsafe:
//!
//! 1. edge references — later rules dereference edge endpoints
//! 2. duplicate edges
//! 3. entry-node presence
//! 4. cycles — orphan BFS reports would be meaningless on a cyclic graph
//! 5. orphans
//! 6. type compatibility and required inputs, when a registry is supplied
//!
//! A valid result carries the execution order computed on the same
//! snapshot.

mod semantic;
mod structural;
mod topology;
mod types;

use crate::domain::{AgentRegistry, Workflow};

pub use semantic::{validate_required_inputs, validate_type_compatibility};
pub use structural::{
    validate_edge_references, validate_has_entry_node, validate_no_cycles,
    validate_no_duplicate_edges, validate_no_orphans,
};
pub use topology::{execution_levels, topological_sort, TopologicalSortError};
pub use types::{ValidationError, ValidationErrorCode, ValidationResult};

/// Options for workflow validation.
#[derive(Default)]
pub struct ValidateOptions<'a> {
    /// Agent registry for semantic validation. Absent means the semantic
    /// rules are skipped.
    pub agent_registry: Option<&'a AgentRegistry>,
    /// Return after the first failing rule instead of collecting all
    /// errors.
    pub fail_fast: bool,
}

/// Validate a workflow snapshot against every invariant.
pub fn validate_workflow(workflow: &Workflow, options: ValidateOptions<'_>) -> ValidationResult {
    let mut all_errors: Vec<ValidationError> = Vec::new();

    // Every rule below dereferences edge endpoints.
    let result = validate_edge_references(workflow);
    if !result.valid {
        all_errors.extend(result.errors);
        return ValidationResult::failure(all_errors);
    }

    let result = validate_no_duplicate_edges(workflow);
    if !result.valid {
        all_errors.extend(result.errors);
        if options.fail_fast {
            return ValidationResult::failure(all_errors);
        }
    }

    let result = validate_has_entry_node(workflow);
    if !result.valid {
        all_errors.extend(result.errors);
        if options.fail_fast {
            return ValidationResult::failure(all_errors);
        }
    }

    // Orphan reports assume an acyclic graph.
    let result = validate_no_cycles(workflow);
    if !result.valid {
        all_errors.extend(result.errors);
        return ValidationResult::failure(all_errors);
    }

    let result = validate_no_orphans(workflow);
    if !result.valid {
        all_errors.extend(result.errors);
        if options.fail_fast {
            return ValidationResult::failure(all_errors);
        }
    }

    if !all_errors.is_empty() && options.agent_registry.is_none() {
        return ValidationResult::failure(all_errors);
    }

    if let Some(registry) = options.agent_registry {
        let result = validate_type_compatibility(workflow, registry);
        if !result.valid {
            all_errors.extend(result.errors);
            if options.fail_fast {
                return ValidationResult::failure(all_errors);
            }
        }

        let result = validate_required_inputs(workflow, registry);
        if !result.valid {
            all_errors.extend(result.errors);
            if options.fail_fast {
                return ValidationResult::failure(all_errors);
            }
        }
    }

    if !all_errors.is_empty() {
        return ValidationResult::failure(all_errors);
    }

    match topological_sort(workflow) {
        Ok(order) => ValidationResult::success(Some(order)),
        // Unreachable once the cycle rule has passed; kept as the safety
        // net the planner contract requires.
        Err(TopologicalSortError::CycleDetected) => {
            ValidationResult::failure(vec![ValidationError::new(
                ValidationErrorCode::CycleDetected,
                "Workflow contains a cycle",
            )])
        }
    }
}

/// Structural-only validation, for fast feedback during editing.
pub fn validate_workflow_structure(workflow: &Workflow) -> ValidationResult {
    validate_workflow(workflow, ValidateOptions::default())
}

/// Full validation including semantics. Use before execution.
pub fn validate_workflow_full(workflow: &Workflow, registry: &AgentRegistry) -> ValidationResult {
    validate_workflow(
        workflow,
        ValidateOptions {
            agent_registry: Some(registry),
            fail_fast: false,
        },
    )
}
