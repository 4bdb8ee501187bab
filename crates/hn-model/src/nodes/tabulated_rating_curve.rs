//! TabulatedRatingCurve: discharge as a piecewise-linear function of level.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static TABULATED_RATING_CURVE_STATIC_SCHEMA: Schema = Schema::new(
    "TabulatedRatingCurve / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("active", ColumnType::Bool),
        Column::required("level", ColumnType::Float),
        Column::required("flow_rate", ColumnType::Float),
        Column::optional("control_state", ColumnType::String),
    ],
    &["node_id", "control_state", "level"],
);

static TABULATED_RATING_CURVE_TIME_SCHEMA: Schema = Schema::new(
    "TabulatedRatingCurve / time",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("time", ColumnType::DateTime),
        Column::required("level", ColumnType::Float),
        Column::required("flow_rate", ColumnType::Float),
    ],
    &["node_id", "time", "level"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TabulatedRatingCurveStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub level: f64,
    pub flow_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_state: Option<String>,
}

impl TableRow for TabulatedRatingCurveStaticRow {
    fn schema() -> &'static Schema {
        &TABULATED_RATING_CURVE_STATIC_SCHEMA
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
            self.control_state.clone().into(),
            self.level.into(),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TabulatedRatingCurveTimeRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub time: NaiveDateTime,
    pub level: f64,
    pub flow_rate: f64,
}

impl TableRow for TabulatedRatingCurveTimeRow {
    fn schema() -> &'static Schema {
        &TABULATED_RATING_CURVE_TIME_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![self.node_id.into(), self.time.into(), self.level.into()]
    }
}

/// Child-table payload accepted by [`TabulatedRatingCurve::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum TabulatedRatingCurveTable {
    Static(Vec<TabulatedRatingCurveStaticRow>),
    Time(Vec<TabulatedRatingCurveTimeRow>),
}

/// All rating curves of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabulatedRatingCurve {
    pub node: NodeTable,
    pub static_: Table<TabulatedRatingCurveStaticRow>,
    pub time: Table<TabulatedRatingCurveTimeRow>,
}

impl TabulatedRatingCurve {
    pub const NODE_TYPE: &'static str = "TabulatedRatingCurve";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<TabulatedRatingCurveTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                TabulatedRatingCurveTable::Static(rows) => {
                    append_stamped(&mut self.static_, rows, node_id)
                }
                TabulatedRatingCurveTable::Time(rows) => {
                    append_stamped(&mut self.time, rows, node_id)
                }
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

impl NodeModel for TabulatedRatingCurve {
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

    fn level_point(level: f64, flow_rate: f64) -> TabulatedRatingCurveStaticRow {
        TabulatedRatingCurveStaticRow {
            level,
            flow_rate,
            ..TabulatedRatingCurveStaticRow::default()
        }
    }

    #[test]
    fn curve_points_sort_by_level_within_a_node() {
        let mut registry = UsedIds::new();
        let mut curve = TabulatedRatingCurve::default();
        curve
            .add(
                &mut registry,
                Node::with_id(0, Point::new(0.0, 0.0)),
                vec![TabulatedRatingCurveTable::Static(vec![
                    level_point(1.0, 0.1),
                    level_point(0.0, 0.0),
                ])],
            )
            .unwrap();
        let sorted = curve.static_.sorted_for_write();
        assert_eq!(sorted.rows()[0].level, 0.0);
        assert_eq!(sorted.rows()[1].level, 1.0);
    }

    #[test]
    fn id_zero_is_a_valid_node_id() {
        let mut registry = UsedIds::new();
        let mut curve = TabulatedRatingCurve::default();
        let data = curve
            .add(
                &mut registry,
                Node::with_id(0, Point::new(0.0, 0.0)),
                vec![TabulatedRatingCurveTable::Static(vec![level_point(
                    0.0, 0.0,
                )])],
            )
            .unwrap();
        assert_eq!(data.node_id, NodeId::new(0));
        assert!(registry.contains(NodeId::new(0)));
    }
}
