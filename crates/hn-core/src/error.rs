use core::fmt;

use thiserror::Error;

use crate::ids::NodeId;

pub type HnResult<T> = Result<T, HnError>;

/// One offending column inside a schema violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnViolation {
    pub column: String,
    pub constraint: String,
}

impl ColumnViolation {
    pub fn new(column: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for ColumnViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.column, self.constraint)
    }
}

#[derive(Error, Debug)]
pub enum HnError {
    /// A table rejected incoming rows. Carries every offending column,
    /// not just the first one found.
    #[error("Schema violation in table '{table}': {}", list_violations(.violations))]
    Schema {
        table: String,
        violations: Vec<ColumnViolation>,
    },

    /// An explicitly supplied node ID is already registered somewhere
    /// in the model.
    #[error("Node ID {node_id} is already in use")]
    IdInUse { node_id: NodeId },

    /// Single-row lookup on a node-type model found no matching row.
    #[error("{node_type} node #{node_id} does not exist")]
    NotFound {
        node_type: &'static str,
        node_id: NodeId,
    },

    /// A node type's child tables reference IDs that are not the exact
    /// set recorded in its own node table.
    #[error(
        "For {node_type}, the node IDs in the data tables don't match the node IDs in the network"
    )]
    TableIdMismatch {
        node_type: &'static str,
        node_ids: Vec<NodeId>,
    },

    /// One node ID claimed by more than one node type.
    #[error("These node IDs were assigned to multiple node types: {}.", list_ids(.node_ids))]
    SharedNodeIds { node_ids: Vec<NodeId> },

    /// Negative node IDs anywhere in the model.
    #[error("Node IDs must be non-negative integers, got {}.", list_ids(.node_ids))]
    NegativeNodeIds { node_ids: Vec<NodeId> },

    /// Edge endpoints that resolve to no known node.
    #[error("Edges reference node IDs missing from the node table: {}.", list_ids(.node_ids))]
    UnknownEdgeNodes { node_ids: Vec<NodeId> },

    /// A second edge with the same endpoints and type.
    #[error(
        "Edges have to be unique, but edge with from_node_id {from}, \
         to_node_id {to}, edge_type {edge_type} already exists"
    )]
    DuplicateEdge {
        from: NodeId,
        to: NodeId,
        edge_type: String,
    },
}

fn list_ids(ids: &[NodeId]) -> String {
    let items: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

fn list_violations(violations: &[ColumnViolation]) -> String {
    let items: Vec<String> = violations.iter().map(ToString::to_string).collect();
    items.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_id_message_lists_offenders() {
        let err = HnError::NegativeNodeIds {
            node_ids: vec![NodeId::new(-1)],
        };
        assert_eq!(
            err.to_string(),
            "Node IDs must be non-negative integers, got [-1]."
        );
    }

    #[test]
    fn shared_id_message_lists_offenders() {
        let err = HnError::SharedNodeIds {
            node_ids: vec![NodeId::new(1)],
        };
        assert_eq!(
            err.to_string(),
            "These node IDs were assigned to multiple node types: [1]."
        );
    }

    #[test]
    fn mismatch_message_names_node_type() {
        let err = HnError::TableIdMismatch {
            node_type: "Pump",
            node_ids: vec![NodeId::new(8)],
        };
        assert_eq!(
            err.to_string(),
            "For Pump, the node IDs in the data tables don't match the node IDs in the network"
        );
    }

    #[test]
    fn schema_message_lists_every_column() {
        let err = HnError::Schema {
            table: "Pump / static".to_string(),
            violations: vec![
                ColumnViolation::new("flow_rate", "missing required column"),
                ColumnViolation::new("active", "expected Bool, got String"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("Pump / static"));
        assert!(text.contains("flow_rate: missing required column"));
        assert!(text.contains("active: expected Bool, got String"));
    }
}
