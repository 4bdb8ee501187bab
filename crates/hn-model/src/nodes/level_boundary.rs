//! LevelBoundary: a boundary condition holding the water level fixed.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static LEVEL_BOUNDARY_STATIC_SCHEMA: Schema = Schema::new(
    "LevelBoundary / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("active", ColumnType::Bool),
        Column::required("level", ColumnType::Float),
    ],
    &["node_id"],
);

static LEVEL_BOUNDARY_TIME_SCHEMA: Schema = Schema::new(
    "LevelBoundary / time",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("time", ColumnType::DateTime),
        Column::required("level", ColumnType::Float),
    ],
    &["node_id", "time"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelBoundaryStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub level: f64,
}

impl TableRow for LevelBoundaryStaticRow {
    fn schema() -> &'static Schema {
        &LEVEL_BOUNDARY_STATIC_SCHEMA
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
pub struct LevelBoundaryTimeRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub time: NaiveDateTime,
    pub level: f64,
}

impl TableRow for LevelBoundaryTimeRow {
    fn schema() -> &'static Schema {
        &LEVEL_BOUNDARY_TIME_SCHEMA
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

/// Child-table payload accepted by [`LevelBoundary::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum LevelBoundaryTable {
    Static(Vec<LevelBoundaryStaticRow>),
    Time(Vec<LevelBoundaryTimeRow>),
}

/// All level boundaries of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelBoundary {
    pub node: NodeTable,
    pub static_: Table<LevelBoundaryStaticRow>,
    pub time: Table<LevelBoundaryTimeRow>,
}

impl LevelBoundary {
    pub const NODE_TYPE: &'static str = "LevelBoundary";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<LevelBoundaryTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                LevelBoundaryTable::Static(rows) => {
                    append_stamped(&mut self.static_, rows, node_id)
                }
                LevelBoundaryTable::Time(rows) => append_stamped(&mut self.time, rows, node_id),
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

impl NodeModel for LevelBoundary {
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

    fn at(time: &str) -> NaiveDateTime {
        time.parse().unwrap()
    }

    #[test]
    fn time_rows_sort_by_node_then_time() {
        let mut registry = UsedIds::new();
        let mut boundary = LevelBoundary::default();
        boundary
            .add(
                &mut registry,
                Node::new(Point::new(0.0, 0.0)),
                vec![LevelBoundaryTable::Time(vec![
                    LevelBoundaryTimeRow {
                        node_id: NodeId::default(),
                        time: at("2020-06-01T00:00:00"),
                        level: 1.5,
                    },
                    LevelBoundaryTimeRow {
                        node_id: NodeId::default(),
                        time: at("2020-01-01T00:00:00"),
                        level: 1.0,
                    },
                ])],
            )
            .unwrap();
        let sorted = boundary.time.sorted_for_write();
        assert_eq!(sorted.rows()[0].time, at("2020-01-01T00:00:00"));
        assert_eq!(sorted.rows()[1].time, at("2020-06-01T00:00:00"));
    }

    #[test]
    fn either_fragment_counts_as_table_data() {
        let mut registry = UsedIds::new();
        let mut boundary = LevelBoundary::default();
        assert!(!boundary.has_table_data());
        boundary
            .add(
                &mut registry,
                Node::new(Point::new(0.0, 0.0)),
                vec![LevelBoundaryTable::Static(vec![LevelBoundaryStaticRow {
                    level: 0.5,
                    ..LevelBoundaryStaticRow::default()
                }])],
            )
            .unwrap();
        assert!(boundary.has_table_data());
    }
}
