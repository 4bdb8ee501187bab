//! LevelDemand: asks allocation to keep a basin between two levels.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static LEVEL_DEMAND_STATIC_SCHEMA: Schema = Schema::new(
    "LevelDemand / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("min_level", ColumnType::Float),
        Column::required("max_level", ColumnType::Float),
        Column::required("priority", ColumnType::Int),
    ],
    &["node_id"],
);

static LEVEL_DEMAND_TIME_SCHEMA: Schema = Schema::new(
    "LevelDemand / time",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("time", ColumnType::DateTime),
        Column::required("min_level", ColumnType::Float),
        Column::required("max_level", ColumnType::Float),
        Column::required("priority", ColumnType::Int),
    ],
    &["node_id", "priority", "time"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDemandStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub min_level: f64,
    pub max_level: f64,
    pub priority: i32,
}

impl TableRow for LevelDemandStaticRow {
    fn schema() -> &'static Schema {
        &LEVEL_DEMAND_STATIC_SCHEMA
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
pub struct LevelDemandTimeRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub time: NaiveDateTime,
    pub min_level: f64,
    pub max_level: f64,
    pub priority: i32,
}

impl TableRow for LevelDemandTimeRow {
    fn schema() -> &'static Schema {
        &LEVEL_DEMAND_TIME_SCHEMA
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

/// Child-table payload accepted by [`LevelDemand::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum LevelDemandTable {
    Static(Vec<LevelDemandStaticRow>),
    Time(Vec<LevelDemandTimeRow>),
}

/// All level demands of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelDemand {
    pub node: NodeTable,
    pub static_: Table<LevelDemandStaticRow>,
    pub time: Table<LevelDemandTimeRow>,
}

impl LevelDemand {
    pub const NODE_TYPE: &'static str = "LevelDemand";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<LevelDemandTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                LevelDemandTable::Static(rows) => append_stamped(&mut self.static_, rows, node_id),
                LevelDemandTable::Time(rows) => append_stamped(&mut self.time, rows, node_id),
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

impl NodeModel for LevelDemand {
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

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::Point;

    #[test]
    fn level_band_is_stored_per_node() {
        let mut registry = UsedIds::new();
        let mut demand = LevelDemand::default();
        demand
            .add(
                &mut registry,
                Node::new(Point::new(0.0, 0.0)),
                vec![LevelDemandTable::Static(vec![LevelDemandStaticRow {
                    min_level: 1.0,
                    max_level: 1.5,
                    priority: 1,
                    ..LevelDemandStaticRow::default()
                }])],
            )
            .unwrap();
        let row = &demand.static_.rows()[0];
        assert_eq!(row.min_level, 1.0);
        assert_eq!(row.max_level, 1.5);
    }
}
