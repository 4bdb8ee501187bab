//! Directed connections between nodes.

use std::collections::BTreeSet;

use hn_core::{HnError, HnResult, NodeId, Point};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::NodeData;
use crate::nodes::is_control_type;

static EDGE_SCHEMA: Schema = Schema::new(
    "Edge",
    &[
        Column::required("from_node_id", ColumnType::Int),
        Column::required("to_node_id", ColumnType::Int),
        Column::required("edge_type", ColumnType::String),
        Column::optional("name", ColumnType::String),
        Column::optional("subnetwork_id", ColumnType::Int),
        Column::optional("geometry", ColumnType::Geometry),
    ],
    &["from_node_id", "to_node_id"],
);

/// Kind of a connection: water flows over `Flow` edges, control signals
/// travel over `Control` edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    #[default]
    Flow,
    Control,
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeType::Flow => write!(f, "flow"),
            EdgeType::Control => write!(f, "control"),
        }
    }
}

/// Row of the `Edge` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub edge_type: EdgeType,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnetwork_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<Point>>,
}

impl TableRow for EdgeRow {
    fn schema() -> &'static Schema {
        &EDGE_SCHEMA
    }

    /// Edges have no identity of their own; they are keyed by endpoints.
    fn node_id(&self) -> Option<NodeId> {
        None
    }

    fn set_node_id(&mut self, _node_id: NodeId) {}

    fn sort_key(&self) -> Vec<SortValue> {
        vec![self.from_node_id.into(), self.to_node_id.into()]
    }
}

/// All connections of a model. Duplicate (from, to, type) triples are
/// rejected at insert time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeTable {
    pub table: Table<EdgeRow>,
}

impl EdgeTable {
    /// Connect two nodes. The edge type is inferred from the source node:
    /// control nodes emit control edges, everything else carries flow.
    pub fn add(&mut self, from: &NodeData, to: &NodeData) -> HnResult<()> {
        self.add_named(from, to, "", None)
    }

    pub fn add_named(
        &mut self,
        from: &NodeData,
        to: &NodeData,
        name: &str,
        subnetwork_id: Option<i32>,
    ) -> HnResult<()> {
        let edge_type = if is_control_type(from.node_type) {
            EdgeType::Control
        } else {
            EdgeType::Flow
        };
        let row = EdgeRow {
            from_node_id: from.node_id,
            to_node_id: to.node_id,
            edge_type,
            name: name.to_string(),
            subnetwork_id,
            geometry: Some(vec![from.geometry, to.geometry]),
        };
        if self
            .table
            .rows()
            .iter()
            .any(|existing| {
                existing.from_node_id == row.from_node_id
                    && existing.to_node_id == row.to_node_id
                    && existing.edge_type == row.edge_type
            })
        {
            return Err(HnError::DuplicateEdge {
                from: row.from_node_id,
                to: row.to_node_id,
                edge_type: row.edge_type.to_string(),
            });
        }
        self.table.append_rows(vec![row]);
        Ok(())
    }

    /// Every node ID referenced by any endpoint.
    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.table
            .rows()
            .iter()
            .flat_map(|row| [row.from_node_id, row.to_node_id])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::NodeId;

    fn data(node_id: i32, node_type: &'static str) -> NodeData {
        NodeData {
            node_id: NodeId::new(node_id),
            node_type,
            geometry: Point::new(node_id as f64, 0.0),
        }
    }

    #[test]
    fn edge_type_follows_source_node() {
        let mut edges = EdgeTable::default();
        edges.add(&data(1, "Basin"), &data(2, "Pump")).unwrap();
        edges
            .add(&data(3, "DiscreteControl"), &data(2, "Pump"))
            .unwrap();
        assert_eq!(edges.table.rows()[0].edge_type, EdgeType::Flow);
        assert_eq!(edges.table.rows()[1].edge_type, EdgeType::Control);
    }

    #[test]
    fn duplicate_edges_are_rejected() {
        let mut edges = EdgeTable::default();
        edges.add(&data(1, "Basin"), &data(2, "Pump")).unwrap();
        let err = edges.add(&data(1, "Basin"), &data(2, "Pump")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Edges have to be unique, but edge with from_node_id 1, \
             to_node_id 2, edge_type flow already exists"
        );
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn same_endpoints_different_type_is_allowed() {
        let mut edges = EdgeTable::default();
        edges.add(&data(5, "Basin"), &data(2, "Pump")).unwrap();
        edges
            .add(&data(5, "PidControl"), &data(2, "Pump"))
            .unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn node_ids_covers_both_endpoints() {
        let mut edges = EdgeTable::default();
        edges.add(&data(1, "Basin"), &data(2, "Pump")).unwrap();
        edges.add(&data(2, "Pump"), &data(3, "Terminal")).unwrap();
        let ids: Vec<i32> = edges.node_ids().iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn edge_geometry_spans_the_endpoints() {
        let mut edges = EdgeTable::default();
        edges.add(&data(1, "Basin"), &data(4, "Terminal")).unwrap();
        assert_eq!(
            edges.table.rows()[0].geometry,
            Some(vec![Point::new(1.0, 0.0), Point::new(4.0, 0.0)])
        );
    }
}
