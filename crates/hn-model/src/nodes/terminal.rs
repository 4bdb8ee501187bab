//! Terminal: water leaves the network here. No parameterization.

use std::collections::BTreeSet;

use hn_core::{HnResult, NodeId};

use crate::node::{Node, NodeData, NodeTable};
use crate::nodes::NodeModel;
use crate::registry::UsedIds;

/// All terminals of a model. Terminals carry no child tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Terminal {
    pub node: NodeTable,
}

impl Terminal {
    pub const NODE_TYPE: &'static str = "Terminal";

    pub fn add(&mut self, registry: &mut UsedIds, node: Node) -> HnResult<NodeData> {
        let node_id = registry.resolve(node.node_id)?;
        let data = self.node.append(&node, Self::NODE_TYPE, node_id);
        registry.add(node_id);
        Ok(data)
    }

    pub fn get(&self, node_id: NodeId) -> HnResult<NodeData> {
        self.node.get(Self::NODE_TYPE, node_id)
    }
}

impl NodeModel for Terminal {
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
        BTreeSet::new()
    }

    fn has_table_data(&self) -> bool {
        false
    }
}
