//! One module per node type.
//!
//! Each node-type model owns the identity table for its nodes plus the
//! child tables that parameterize them. The `NodeModel` trait is the
//! uniform view the top-level model uses for validation and I/O.

use std::collections::BTreeSet;

use hn_core::NodeId;
use hn_table::{Table, TableRow};

use crate::node::NodeTable;

pub mod basin;
pub mod discrete_control;
pub mod flow_boundary;
pub mod fractional_flow;
pub mod level_boundary;
pub mod level_demand;
pub mod linear_resistance;
pub mod manning_resistance;
pub mod outlet;
pub mod pid_control;
pub mod pump;
pub mod tabulated_rating_curve;
pub mod terminal;
pub mod user_demand;

pub use basin::{
    Basin, BasinProfileRow, BasinStateRow, BasinStaticRow, BasinSubgridRow, BasinTable,
    BasinTimeRow,
};
pub use discrete_control::{
    DiscreteControl, DiscreteControlConditionRow, DiscreteControlLogicRow, DiscreteControlTable,
};
pub use flow_boundary::{FlowBoundary, FlowBoundaryStaticRow, FlowBoundaryTable, FlowBoundaryTimeRow};
pub use fractional_flow::{FractionalFlow, FractionalFlowStaticRow, FractionalFlowTable};
pub use level_boundary::{
    LevelBoundary, LevelBoundaryStaticRow, LevelBoundaryTable, LevelBoundaryTimeRow,
};
pub use level_demand::{LevelDemand, LevelDemandStaticRow, LevelDemandTable, LevelDemandTimeRow};
pub use linear_resistance::{LinearResistance, LinearResistanceStaticRow, LinearResistanceTable};
pub use manning_resistance::{ManningResistance, ManningResistanceStaticRow, ManningResistanceTable};
pub use outlet::{Outlet, OutletStaticRow, OutletTable};
pub use pid_control::{PidControl, PidControlStaticRow, PidControlTable, PidControlTimeRow};
pub use pump::{Pump, PumpStaticRow, PumpTable};
pub use tabulated_rating_curve::{
    TabulatedRatingCurve, TabulatedRatingCurveStaticRow, TabulatedRatingCurveTable,
    TabulatedRatingCurveTimeRow,
};
pub use terminal::Terminal;
pub use user_demand::{UserDemand, UserDemandStaticRow, UserDemandTable, UserDemandTimeRow};

/// Node types whose outgoing edges carry control signals rather than water.
pub const CONTROL_NODE_TYPES: &[&str] = &["DiscreteControl", "PidControl"];

pub fn is_control_type(node_type: &str) -> bool {
    CONTROL_NODE_TYPES.contains(&node_type)
}

/// Uniform view over one node-type model.
pub trait NodeModel {
    fn node_type(&self) -> &'static str;

    /// The identity table of this type.
    fn node(&self) -> &NodeTable;

    fn node_mut(&mut self) -> &mut NodeTable;

    /// Node IDs mentioned by any child table of this type.
    fn table_node_ids(&self) -> BTreeSet<NodeId>;

    /// Whether any child table holds data. Types without child tables
    /// report `false` so consistency checks skip them.
    fn has_table_data(&self) -> bool;

    /// IDs known to this type, from the identity table and child tables.
    fn all_node_ids(&self) -> BTreeSet<NodeId> {
        let mut ids = self.node().ids();
        ids.extend(self.table_node_ids());
        ids
    }
}

/// Stamp the accepted node ID onto each row, then append. Child-table rows
/// arrive without an ID when the caller asked for a generated one.
pub(crate) fn append_stamped<R: TableRow>(table: &mut Table<R>, mut rows: Vec<R>, node_id: NodeId) {
    for row in &mut rows {
        row.set_node_id(node_id);
    }
    table.append_rows(rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_types_are_exactly_the_two_controllers() {
        assert!(is_control_type("DiscreteControl"));
        assert!(is_control_type("PidControl"));
        assert!(!is_control_type("Pump"));
        assert!(!is_control_type("Basin"));
    }
}
