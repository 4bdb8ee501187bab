//! ManningResistance: open-channel friction between two basins.

use std::collections::BTreeSet;

use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static MANNING_RESISTANCE_STATIC_SCHEMA: Schema = Schema::new(
    "ManningResistance / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("active", ColumnType::Bool),
        Column::required("length", ColumnType::Float),
        Column::required("manning_n", ColumnType::Float),
        Column::required("profile_width", ColumnType::Float),
        Column::required("profile_slope", ColumnType::Float),
        Column::optional("control_state", ColumnType::String),
    ],
    &["node_id", "control_state"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManningResistanceStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub length: f64,
    pub manning_n: f64,
    pub profile_width: f64,
    pub profile_slope: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_state: Option<String>,
}

impl TableRow for ManningResistanceStaticRow {
    fn schema() -> &'static Schema {
        &MANNING_RESISTANCE_STATIC_SCHEMA
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

/// Child-table payload accepted by [`ManningResistance::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum ManningResistanceTable {
    Static(Vec<ManningResistanceStaticRow>),
}

/// All Manning resistances of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManningResistance {
    pub node: NodeTable,
    pub static_: Table<ManningResistanceStaticRow>,
}

impl ManningResistance {
    pub const NODE_TYPE: &'static str = "ManningResistance";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<ManningResistanceTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                ManningResistanceTable::Static(rows) => {
                    append_stamped(&mut self.static_, rows, node_id)
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

impl NodeModel for ManningResistance {
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
        self.static_.node_ids()
    }

    fn has_table_data(&self) -> bool {
        self.static_.is_set()
    }
}
