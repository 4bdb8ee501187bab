//! Pump: moves water against the gradient at a set flow rate.

use std::collections::BTreeSet;

use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static PUMP_STATIC_SCHEMA: Schema = Schema::new(
    "Pump / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("active", ColumnType::Bool),
        Column::required("flow_rate", ColumnType::Float),
        Column::optional("min_flow_rate", ColumnType::Float),
        Column::optional("max_flow_rate", ColumnType::Float),
        Column::optional("control_state", ColumnType::String),
    ],
    &["node_id", "control_state"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PumpStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub flow_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_state: Option<String>,
}

impl TableRow for PumpStaticRow {
    fn schema() -> &'static Schema {
        &PUMP_STATIC_SCHEMA
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

/// Child-table payload accepted by [`Pump::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum PumpTable {
    Static(Vec<PumpStaticRow>),
}

/// All pumps of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pump {
    pub node: NodeTable,
    pub static_: Table<PumpStaticRow>,
}

impl Pump {
    pub const NODE_TYPE: &'static str = "Pump";

    /// Add one pump with its parameterization. Either every table row and
    /// the identity row land, or nothing does.
    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<PumpTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                PumpTable::Static(rows) => append_stamped(&mut self.static_, rows, node_id),
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

impl NodeModel for Pump {
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
