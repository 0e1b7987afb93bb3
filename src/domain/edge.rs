//! Workflow edges.

use serde::{Deserialize, Serialize};

use super::ids::{EdgeId, NodeId, PortId};

/// A directed connection from a source port to a target port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub source_port: PortId,
    pub target: NodeId,
    pub target_port: PortId,
}

impl Edge {
    /// Identity of the connection, ignoring the edge id. Two edges with the
    /// same key are duplicates.
    pub fn connection_key(&self) -> (&NodeId, &PortId, &NodeId, &PortId) {
        (&self.source, &self.source_port, &self.target, &self.target_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_key_ignores_edge_id() {
        let e1 = Edge {
            id: EdgeId::from("e1"),
            source: NodeId::from("a"),
            source_port: PortId::from("out"),
            target: NodeId::from("b"),
            target_port: PortId::from("in"),
        };
        let mut e2 = e1.clone();
        e2.id = EdgeId::from("e2");
        assert_eq!(e1.connection_key(), e2.connection_key());

        e2.target_port = PortId::from("other");
        assert_ne!(e1.connection_key(), e2.connection_key());
    }

    #[test]
    fn test_edge_serde_camel_case() {
        let e = Edge {
            id: EdgeId::from("e1"),
            source: NodeId::from("a"),
            source_port: PortId::from("out"),
            target: NodeId::from("b"),
            target_port: PortId::from("in"),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["sourcePort"], "out");
        assert_eq!(json["targetPort"], "in");
    }
}
