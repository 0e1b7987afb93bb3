//! Opaque string identifiers.
//!
//! Each identifier kind gets its own newtype so APIs cannot accept the
//! wrong kind of id. No structure is assumed beyond printability;
//! equality is by value.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a node within a workflow.
    NodeId
);
string_id!(
    /// Identifier of an edge within a workflow.
    EdgeId
);
string_id!(
    /// Name of an input or output port on a node.
    PortId
);
string_id!(
    /// Identifier of a workflow definition.
    WorkflowId
);
string_id!(
    /// Identifier of a single execution run.
    ExecutionId
);
string_id!(
    /// Identifier of an agent definition in the registry.
    AgentId
);
