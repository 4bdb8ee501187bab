//! Basin: a water volume with a level-area-storage profile.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static BASIN_PROFILE_SCHEMA: Schema = Schema::new(
    "Basin / profile",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("area", ColumnType::Float),
        Column::required("level", ColumnType::Float),
    ],
    &["node_id", "level"],
);

static BASIN_STATE_SCHEMA: Schema = Schema::new(
    "Basin / state",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("level", ColumnType::Float),
    ],
    &["node_id"],
);

static BASIN_STATIC_SCHEMA: Schema = Schema::new(
    "Basin / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("drainage", ColumnType::Float),
        Column::optional("potential_evaporation", ColumnType::Float),
        Column::optional("infiltration", ColumnType::Float),
        Column::optional("precipitation", ColumnType::Float),
        Column::optional("urban_runoff", ColumnType::Float),
    ],
    &["node_id"],
);

static BASIN_TIME_SCHEMA: Schema = Schema::new(
    "Basin / time",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("time", ColumnType::DateTime),
        Column::optional("drainage", ColumnType::Float),
        Column::optional("potential_evaporation", ColumnType::Float),
        Column::optional("infiltration", ColumnType::Float),
        Column::optional("precipitation", ColumnType::Float),
        Column::optional("urban_runoff", ColumnType::Float),
    ],
    &["node_id", "time"],
);

static BASIN_SUBGRID_SCHEMA: Schema = Schema::new(
    "Basin / subgrid",
    &[
        Column::required("subgrid_id", ColumnType::Int),
        Column::required("node_id", ColumnType::Int),
        Column::required("basin_level", ColumnType::Float),
        Column::required("subgrid_level", ColumnType::Float),
    ],
    &["subgrid_id", "basin_level"],
);

/// One point of the level-area relation. Levels must ascend per basin;
/// storage follows by integration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasinProfileRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub area: f64,
    pub level: f64,
}

impl TableRow for BasinProfileRow {
    fn schema() -> &'static Schema {
        &BASIN_PROFILE_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![self.node_id.into(), self.level.into()]
    }
}

/// Initial water level of a basin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasinStateRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub level: f64,
}

impl TableRow for BasinStateRow {
    fn schema() -> &'static Schema {
        &BASIN_STATE_SCHEMA
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

/// Constant-in-time forcing of a basin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasinStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drainage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_evaporation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infiltration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urban_runoff: Option<f64>,
}

impl TableRow for BasinStaticRow {
    fn schema() -> &'static Schema {
        &BASIN_STATIC_SCHEMA
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

/// Time-varying forcing of a basin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasinTimeRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub time: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drainage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_evaporation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infiltration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urban_runoff: Option<f64>,
}

impl TableRow for BasinTimeRow {
    fn schema() -> &'static Schema {
        &BASIN_TIME_SCHEMA
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

/// Maps a basin level to the level of one subgrid element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasinSubgridRow {
    pub subgrid_id: i32,
    #[serde(default)]
    pub node_id: NodeId,
    pub basin_level: f64,
    pub subgrid_level: f64,
}

impl TableRow for BasinSubgridRow {
    fn schema() -> &'static Schema {
        &BASIN_SUBGRID_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![
            SortValue::Int(self.subgrid_id as i64),
            self.basin_level.into(),
        ]
    }
}

/// Child-table payload accepted by [`Basin::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum BasinTable {
    Profile(Vec<BasinProfileRow>),
    State(Vec<BasinStateRow>),
    Static(Vec<BasinStaticRow>),
    Time(Vec<BasinTimeRow>),
    Subgrid(Vec<BasinSubgridRow>),
}

/// All basins of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Basin {
    pub node: NodeTable,
    pub profile: Table<BasinProfileRow>,
    pub state: Table<BasinStateRow>,
    pub static_: Table<BasinStaticRow>,
    pub time: Table<BasinTimeRow>,
    pub subgrid: Table<BasinSubgridRow>,
}

impl Basin {
    pub const NODE_TYPE: &'static str = "Basin";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<BasinTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                BasinTable::Profile(rows) => append_stamped(&mut self.profile, rows, node_id),
                BasinTable::State(rows) => append_stamped(&mut self.state, rows, node_id),
                BasinTable::Static(rows) => append_stamped(&mut self.static_, rows, node_id),
                BasinTable::Time(rows) => append_stamped(&mut self.time, rows, node_id),
                BasinTable::Subgrid(rows) => append_stamped(&mut self.subgrid, rows, node_id),
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

impl NodeModel for Basin {
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
        let mut ids = self.profile.node_ids();
        ids.extend(self.state.node_ids());
        ids.extend(self.static_.node_ids());
        ids.extend(self.time.node_ids());
        ids.extend(self.subgrid.node_ids());
        ids
    }

    fn has_table_data(&self) -> bool {
        self.profile.is_set()
            || self.state.is_set()
            || self.static_.is_set()
            || self.time.is_set()
            || self.subgrid.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::Point;

    fn profile(area: f64, level: f64) -> BasinProfileRow {
        BasinProfileRow {
            node_id: NodeId::default(),
            area,
            level,
        }
    }

    #[test]
    fn add_stamps_every_fragment_with_the_same_id() {
        let mut registry = UsedIds::new();
        let mut basin = Basin::default();
        let data = basin
            .add(
                &mut registry,
                Node::new(Point::new(400.0, 200.0)),
                vec![
                    BasinTable::Profile(vec![profile(0.01, 0.0), profile(1000.0, 1.0)]),
                    BasinTable::State(vec![BasinStateRow {
                        node_id: NodeId::default(),
                        level: 0.04,
                    }]),
                    BasinTable::Static(vec![BasinStaticRow {
                        precipitation: Some(1e-8),
                        ..BasinStaticRow::default()
                    }]),
                ],
            )
            .unwrap();
        assert_eq!(data.node_id, NodeId::new(1));
        for row in basin.profile.rows() {
            assert_eq!(row.node_id, NodeId::new(1));
        }
        assert_eq!(basin.state.rows()[0].node_id, NodeId::new(1));
        assert_eq!(basin.static_.rows()[0].node_id, NodeId::new(1));
    }

    #[test]
    fn profile_orders_by_level_within_a_basin() {
        let mut registry = UsedIds::new();
        let mut basin = Basin::default();
        basin
            .add(
                &mut registry,
                Node::with_id(2, Point::new(0.0, 0.0)),
                vec![BasinTable::Profile(vec![
                    profile(1000.0, 1.0),
                    profile(0.01, 0.0),
                ])],
            )
            .unwrap();
        basin
            .add(
                &mut registry,
                Node::with_id(1, Point::new(1.0, 0.0)),
                vec![BasinTable::Profile(vec![profile(500.0, 0.5)])],
            )
            .unwrap();
        let sorted = basin.profile.sorted_for_write();
        let keys: Vec<(i32, f64)> = sorted
            .rows()
            .iter()
            .map(|row| (row.node_id.get(), row.level))
            .collect();
        assert_eq!(keys, vec![(1, 0.5), (2, 0.0), (2, 1.0)]);
    }

    #[test]
    fn subgrid_sorts_by_subgrid_id_not_node_id() {
        let mut registry = UsedIds::new();
        let mut basin = Basin::default();
        basin
            .add(
                &mut registry,
                Node::with_id(9, Point::new(0.0, 0.0)),
                vec![BasinTable::Subgrid(vec![
                    BasinSubgridRow {
                        subgrid_id: 2,
                        node_id: NodeId::default(),
                        basin_level: 0.0,
                        subgrid_level: 1.0,
                    },
                    BasinSubgridRow {
                        subgrid_id: 1,
                        node_id: NodeId::default(),
                        basin_level: 0.0,
                        subgrid_level: 2.0,
                    },
                ])],
            )
            .unwrap();
        let sorted = basin.subgrid.sorted_for_write();
        assert_eq!(sorted.rows()[0].subgrid_id, 1);
        assert_eq!(sorted.rows()[1].subgrid_id, 2);
    }

    #[test]
    fn basins_without_child_tables_report_no_table_data() {
        let mut registry = UsedIds::new();
        let mut basin = Basin::default();
        basin
            .add(&mut registry, Node::new(Point::new(0.0, 0.0)), vec![])
            .unwrap();
        assert!(!basin.has_table_data());
        assert_eq!(basin.node.len(), 1);
    }
}
