//! PidControl: continuously steers a pump or outlet toward a target level.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static PID_CONTROL_STATIC_SCHEMA: Schema = Schema::new(
    "PidControl / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("active", ColumnType::Bool),
        Column::required("listen_node_id", ColumnType::Int),
        Column::required("target", ColumnType::Float),
        Column::required("proportional", ColumnType::Float),
        Column::required("integral", ColumnType::Float),
        Column::required("derivative", ColumnType::Float),
        Column::optional("control_state", ColumnType::String),
    ],
    &["node_id", "control_state"],
);

static PID_CONTROL_TIME_SCHEMA: Schema = Schema::new(
    "PidControl / time",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("time", ColumnType::DateTime),
        Column::required("listen_node_id", ColumnType::Int),
        Column::required("target", ColumnType::Float),
        Column::required("proportional", ColumnType::Float),
        Column::required("integral", ColumnType::Float),
        Column::required("derivative", ColumnType::Float),
    ],
    &["node_id", "time"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PidControlStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub listen_node_id: NodeId,
    pub target: f64,
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_state: Option<String>,
}

impl TableRow for PidControlStaticRow {
    fn schema() -> &'static Schema {
        &PID_CONTROL_STATIC_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![self.node_id.into(), self.control_state.clone().into()]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PidControlTimeRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub time: NaiveDateTime,
    pub listen_node_id: NodeId,
    pub target: f64,
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
}

impl TableRow for PidControlTimeRow {
    fn schema() -> &'static Schema {
        &PID_CONTROL_TIME_SCHEMA
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

/// Child-table payload accepted by [`PidControl::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum PidControlTable {
    Static(Vec<PidControlStaticRow>),
    Time(Vec<PidControlTimeRow>),
}

/// All PID controllers of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PidControl {
    pub node: NodeTable,
    pub static_: Table<PidControlStaticRow>,
    pub time: Table<PidControlTimeRow>,
}

impl PidControl {
    pub const NODE_TYPE: &'static str = "PidControl";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<PidControlTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                PidControlTable::Static(rows) => append_stamped(&mut self.static_, rows, node_id),
                PidControlTable::Time(rows) => append_stamped(&mut self.time, rows, node_id),
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

impl NodeModel for PidControl {
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
