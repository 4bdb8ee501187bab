//! DiscreteControl: switches controlled nodes between states based on
//! observed conditions.

use std::collections::BTreeSet;

use hn_core::{HnResult, NodeId};
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::{append_stamped, NodeModel};
use crate::registry::UsedIds;

static DISCRETE_CONTROL_CONDITION_SCHEMA: Schema = Schema::new(
    "DiscreteControl / condition",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("listen_feature_id", ColumnType::Int),
        Column::required("variable", ColumnType::String),
        Column::required("greater_than", ColumnType::Float),
        Column::optional("look_ahead", ColumnType::Float),
    ],
    &["node_id", "listen_feature_id", "variable"],
);

static DISCRETE_CONTROL_LOGIC_SCHEMA: Schema = Schema::new(
    "DiscreteControl / logic",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::required("truth_state", ColumnType::String),
        Column::required("control_state", ColumnType::String),
    ],
    &["node_id", "truth_state"],
);

/// One observed condition: true when the listened variable exceeds the
/// threshold.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscreteControlConditionRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub listen_feature_id: NodeId,
    pub variable: String,
    pub greater_than: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_ahead: Option<f64>,
}

impl TableRow for DiscreteControlConditionRow {
    fn schema() -> &'static Schema {
        &DISCRETE_CONTROL_CONDITION_SCHEMA
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
            self.listen_feature_id.into(),
            self.variable.clone().into(),
        ]
    }
}

/// Maps a truth state over the conditions to the control state imposed on
/// the controlled nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscreteControlLogicRow {
    #[serde(default)]
    pub node_id: NodeId,
    pub truth_state: String,
    pub control_state: String,
}

impl TableRow for DiscreteControlLogicRow {
    fn schema() -> &'static Schema {
        &DISCRETE_CONTROL_LOGIC_SCHEMA
    }

    fn node_id(&self) -> Option<NodeId> {
        Some(self.node_id)
    }

    fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = node_id;
    }

    fn sort_key(&self) -> Vec<SortValue> {
        vec![self.node_id.into(), self.truth_state.clone().into()]
    }
}

/// Child-table payload accepted by [`DiscreteControl::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum DiscreteControlTable {
    Condition(Vec<DiscreteControlConditionRow>),
    Logic(Vec<DiscreteControlLogicRow>),
}

/// All discrete controllers of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiscreteControl {
    pub node: NodeTable,
    pub condition: Table<DiscreteControlConditionRow>,
    pub logic: Table<DiscreteControlLogicRow>,
}

impl DiscreteControl {
    pub const NODE_TYPE: &'static str = "DiscreteControl";

    pub fn add(
        &mut self,
        registry: &mut UsedIds,
        node: Node,
        tables: Vec<DiscreteControlTable>,
    ) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        for table in tables {
            match table {
                DiscreteControlTable::Condition(rows) => {
                    append_stamped(&mut self.condition, rows, node_id)
                }
                DiscreteControlTable::Logic(rows) => append_stamped(&mut self.logic, rows, node_id),
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

impl NodeModel for DiscreteControl {
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
        let mut ids = self.condition.node_ids();
        ids.extend(self.logic.node_ids());
        ids
    }

    fn has_table_data(&self) -> bool {
        self.condition.is_set() || self.logic.is_set()
    }
}
