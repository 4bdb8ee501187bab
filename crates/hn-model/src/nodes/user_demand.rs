//! UserDemand: extracts water for a user and returns a fraction of it.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static USER_DEMAND_STATIC_SCHEMA: Schema = Schema::new(
    "UserDemand / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("active", ColumnType::Bool),
        Column::required("demand", ColumnType::Float),
        Column::required("return_factor", ColumnType::Float),
        Column::required("min_level", ColumnType::Float),
        Column::required("priority", ColumnType::Int),
    ],
    &["node_id", "priority"],
);

static USER_DEMAND_TIME_SCHEMA: Schema = Schema::new(
    "UserDemand / time",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("time", ColumnType::DateTime),
        Column::required("demand", ColumnType::Float),
        Column::required("return_factor", ColumnType::Float),
        Column::required("min_level", ColumnType::Float),
        Column::required("priority", ColumnType::Int),
    ],
    &["node_id", "priority", "time"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDemandStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub demand: f64,
    pub return_factor: f64,
    pub min_level: f64,
    pub priority: i32,
}

impl TableRow for UserDemandStaticRow {
    fn schema() -> &'static Schema {
        &USER_DEMAND_STATIC_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![self.node_id.into(), SortValue::Int(self.priority as i64)]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserDemandTimeRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub time: NaiveDateTime,
    pub demand: f64,
    pub return_factor: f64,
    pub min_level: f64,
    pub priority: i32,
}

impl TableRow for UserDemandTimeRow {
    fn schema() -> &'static Schema {
        &USER_DEMAND_TIME_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![
            self.node_id.into(),
            SortValue::Int(self.priority as i64),
            self.time.into(),
        ]
    }
}

/// Child-table payload accepted by [`UserDemand::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum UserDemandTable {
    Static(Vec<UserDemandStaticRow>),
    Time(Vec<UserDemandTimeRow>),
}

/// All user demands of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserDemand {
    pub node: NodeTable,
    pub static_: Table<UserDemandStaticRow>,
    pub time: Table<UserDemandTimeRow>,
}

impl UserDemand {
    pub const NODE_TYPE: &'static str = "UserDemand";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<UserDemandTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                UserDemandTable::Static(rows) => append_stamped(&mut self.static_, rows, node_id),
                UserDemandTable::Time(rows) => append_stamped(&mut self.time, rows, node_id),
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

impl NodeModel for UserDemand {
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
