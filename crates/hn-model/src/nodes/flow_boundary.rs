//! FlowBoundary: a boundary condition injecting a prescribed flow.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static FLOW_BOUNDARY_STATIC_SCHEMA: Schema = Schema::new(
    "FlowBoundary / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("active", ColumnType::Bool),
        Column::required("flow_rate", ColumnType::Float),
    ],
    &["node_id"],
);

static FLOW_BOUNDARY_TIME_SCHEMA: Schema = Schema::new(
    "FlowBoundary / time",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("time", ColumnType::DateTime),
        Column::required("flow_rate", ColumnType::Float),
    ],
    &["node_id", "time"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowBoundaryStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub flow_rate: f64,
}

impl TableRow for FlowBoundaryStaticRow {
    fn schema() -> &'static Schema {
        &FLOW_BOUNDARY_STATIC_SCHEMA
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

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowBoundaryTimeRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub time: NaiveDateTime,
    pub flow_rate: f64,
}

impl TableRow for FlowBoundaryTimeRow {
    fn schema() -> &'static Schema {
        &FLOW_BOUNDARY_TIME_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![self.node_id.into(), self.time.into()]
    }
}

/// Child-table payload accepted by [`FlowBoundary::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum FlowBoundaryTable {
    Static(Vec<FlowBoundaryStaticRow>),
    Time(Vec<FlowBoundaryTimeRow>),
}

/// All flow boundaries of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowBoundary {
    pub node: NodeTable,
    pub static_: Table<FlowBoundaryStaticRow>,
    pub time: Table<FlowBoundaryTimeRow>,
}

impl FlowBoundary {
    pub const NODE_TYPE: &'static str = "FlowBoundary";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<FlowBoundaryTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                FlowBoundaryTable::Static(rows) => append_stamped(&mut self.static_, rows, node_id),
                FlowBoundaryTable::Time(rows) => append_stamped(&mut self.time, rows, node_id),
            }
        }
        let data = self.node.append(&node, Self::NODE_TYPE, node_id);
        registry.add(node_id);
        Ok(data)
    }

    pub fn get(&self, node_id: NodeId) -> HnResult<NodeData> {
        self.node.get(Self::NODE_TYPE, node_id)
    }
}

impl NodeModel for FlowBoundary {
    fn node_type(&self) -> &'static str {
        Self::NODE_TYPE
    }

    fn node(&self) -> &NodeTable {
        &self.node
    }

    fn node_mut(&mut self) -> &mut NodeTable {
        &mut self.node
    }

    fn table_node_ids(&self) -> BTreeSet<NodeId> {
        let mut ids = self.static_.node_ids();
        ids.extend(self.time.node_ids());
        ids
    }

    fn has_table_data(&self) -> bool {
        self.static_.is_set() || self.time.is_set()
    }
}
