//! The node entity and the per-type node identity table.

use std::collections::{BTreeMap, BTreeSet};

use hn_core::{Extent, HnError, HnResult, NodeId, Point, ScalarValue};
use hn_table::{Column, ColumnType, GeometryRow, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

/// A single network element as supplied by the caller, before it is added
/// to a node-type model.
///
/// Never mutated after `add`; all further changes happen on the owning
/// tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub node_id: Option<NodeId>,
    pub geometry: Point,
    pub name: String,
    pub subnetwork_id: Option<i32>,
    pub extra: BTreeMap<String, ScalarValue>,
}

impl Node {
    /// A node whose ID is assigned by the registry at `add` time.
    pub fn new(geometry: Point) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    /// A node with a caller-chosen ID, checked for uniqueness at `add`.
    pub fn with_id(node_id: i32, geometry: Point) -> Self {
        Self {
            node_id: Some(NodeId::new(node_id)),
            geometry,
            ..Self::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn in_subnetwork(mut self, subnetwork_id: i32) -> Self {
        self.subnetwork_id = Some(subnetwork_id);
        self
    }

    /// Attach a caller-supplied metadata value.
    pub fn meta(mut self, key: &str, value: impl Into<ScalarValue>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// The canonical identity-table row for this node. Pure: no registry
    /// interaction, no mutation.
    pub fn identity_row(&self, node_type: &str, node_id: NodeId) -> NodeRow {
        NodeRow {
            node_id,
            node_type: node_type.to_string(),
            name: self.name.clone(),
            subnetwork_id: self.subnetwork_id,
            geometry: self.geometry,
        }
    }
}

static NODE_SCHEMA: Schema = Schema::new(
    "Node",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("node_type", ColumnType::String),
        Column::optional("name", ColumnType::String),
        Column::optional("subnetwork_id", ColumnType::Int),
        Column::required("geometry", ColumnType::Geometry),
    ],
    &["node_id"],
);

/// Row of the `Node` identity table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub node_id: NodeId,
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnetwork_id: Option<i32>,
    pub geometry: Point,
}

impl TableRow for NodeRow {
    fn schema() -> &'static Schema {
        &NODE_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![self.node_id.into()]
    }
}

impl GeometryRow for NodeRow {
    fn point(&self) -> Point {
        self.geometry
    }
}

/// Resolved identity of one node, returned by `add` and `get`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeData {
    pub node_id: NodeId,
    pub node_type: &'static str,
    pub geometry: Point,
}

/// Identity table of one node type: the authoritative set of its node IDs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeTable {
    pub table: Table<NodeRow>,
}

impl NodeTable {
    pub fn append(&mut self, node: &Node, node_type: &'static str, node_id: NodeId) -> NodeData {
        let row = node.identity_row(node_type, node_id);
        self.table.append_row_with_extras(row, &node.extra);
        NodeData {
            node_id,
            node_type,
            geometry: node.geometry,
        }
    }

    /// Single-row lookup. Range access is intentionally unsupported.
    pub fn get(&self, node_type: &'static str, node_id: NodeId) -> HnResult<NodeData> {
        self.table
            .rows()
            .iter()
            .find(|row| row.node_id == node_id)
            .map(|row| NodeData {
                node_id: row.node_id,
                node_type,
                geometry: row.geometry,
            })
            .ok_or(HnError::NotFound { node_type, node_id })
    }

    pub fn ids(&self) -> BTreeSet<NodeId> {
        self.table.node_ids()
    }

    /// Keep only rows recorded under the given node type. Invoked after a
    /// read so a stale row of a different type never leaks into this view.
    pub fn filter(&mut self, node_type: &str) {
        self.table.retain(|row| row.node_type == node_type);
    }

    pub fn extent(&self) -> Option<Extent> {
        self.table.extent()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
