//! LinearResistance: flow proportional to the level difference.

use std::collections::BTreeSet;

use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static LINEAR_RESISTANCE_STATIC_SCHEMA: Schema = Schema::new(
    "LinearResistance / static",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("active", ColumnType::Bool),
        Column::required("resistance", ColumnType::Float),
        Column::optional("max_flow_rate", ColumnType::Float),
        Column::optional("control_state", ColumnType::String),
    ],
    &["node_id", "control_state"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearResistanceStaticRow {
    #[serde(default)]
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub resistance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_state: Option<String>,
}

impl TableRow for LinearResistanceStaticRow {
    fn schema() -> &'static Schema {
        &LINEAR_RESISTANCE_STATIC_SCHEMA
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

/// Child-table payload accepted by [`LinearResistance::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum LinearResistanceTable {
    Static(Vec<LinearResistanceStaticRow>),
}

/// All linear resistances of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearResistance {
    pub node: NodeTable,
    pub static_: Table<LinearResistanceStaticRow>,
}

impl LinearResistance {
    pub const NODE_TYPE: &'static str = "LinearResistance";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<LinearResistanceTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                LinearResistanceTable::Static(rows) => {
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

impl NodeModel for LinearResistance {
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

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::Point;

    #[test]
    fn resistance_rows_take_the_accepted_id() {
        let mut registry = UsedIds::new();
        registry.add(NodeId::new(10));
        let mut resistance = LinearResistance::default();
        let data = resistance
            .add(
                &mut registry,
                Node::new(Point::new(0.0, 0.0)),
                vec![LinearResistanceTable::Static(vec![
                    LinearResistanceStaticRow {
                        resistance: 5e4,
                        ..LinearResistanceStaticRow::default()
                    },
                ])],
            )
            .unwrap();
        assert_eq!(data.node_id, NodeId::new(11));
        assert_eq!(resistance.static_.rows()[0].node_id, NodeId::new(11));
    }
}
