//! The top-level model: run window, configuration, one model per node
//! type, the edge table, and the validation pass over all of it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use hn_core::{HnError, HnResult, NodeId};
use hn_table::{Table, TableRow};

use crate::config::{Allocation, Logging, Results, Solver};
use crate::edge::EdgeTable;
use crate::node::NodeRow;
use crate::nodes::{
    Basin, DiscreteControl, FlowBoundary, FractionalFlow, LevelBoundary, LevelDemand,
    LinearResistance, ManningResistance, NodeModel, Outlet, PidControl, Pump,
    TabulatedRatingCurve, Terminal, UserDemand,
};
use crate::registry::UsedIds;

/// Coordinate reference system assumed when the caller does not set one.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Read-only pass over every child table of a model plus the edge table.
/// The table name is available as `R::schema().name`.
pub trait TableVisitor {
    type Error;

    fn visit<R: TableRow>(&mut self, table: &Table<R>) -> Result<(), Self::Error>;
}

/// Mutating pass over the same tables, in the same order.
pub trait TableVisitorMut {
    type Error;

    fn visit<R: TableRow>(&mut self, table: &mut Table<R>) -> Result<(), Self::Error>;
}

/// A complete network model.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub starttime: NaiveDateTime,
    pub endtime: NaiveDateTime,
    pub crs: String,
    pub solver: Solver,
    pub logging: Logging,
    pub allocation: Allocation,
    pub results: Results,
    /// Node IDs handed out so far. Lent to each node-type model during
    /// `add`, so ID uniqueness holds across types.
    pub used_ids: UsedIds,
    pub basin: Basin,
    pub discrete_control: DiscreteControl,
    pub flow_boundary: FlowBoundary,
    pub fractional_flow: FractionalFlow,
    pub level_boundary: LevelBoundary,
    pub level_demand: LevelDemand,
    pub linear_resistance: LinearResistance,
    pub manning_resistance: ManningResistance,
    pub outlet: Outlet,
    pub pid_control: PidControl,
    pub pump: Pump,
    pub tabulated_rating_curve: TabulatedRatingCurve,
    pub terminal: Terminal,
    pub user_demand: UserDemand,
    pub edge: EdgeTable,
}

impl Model {
    pub fn new(starttime: NaiveDateTime, endtime: NaiveDateTime) -> Self {
        Self {
            starttime,
            endtime,
            crs: DEFAULT_CRS.to_string(),
            solver: Solver::default(),
            logging: Logging::default(),
            allocation: Allocation::default(),
            results: Results::default(),
            used_ids: UsedIds::new(),
            basin: Basin::default(),
            discrete_control: DiscreteControl::default(),
            flow_boundary: FlowBoundary::default(),
            fractional_flow: FractionalFlow::default(),
            level_boundary: LevelBoundary::default(),
            level_demand: LevelDemand::default(),
            linear_resistance: LinearResistance::default(),
            manning_resistance: ManningResistance::default(),
            outlet: Outlet::default(),
            pid_control: PidControl::default(),
            pump: Pump::default(),
            tabulated_rating_curve: TabulatedRatingCurve::default(),
            terminal: Terminal::default(),
            user_demand: UserDemand::default(),
            edge: EdgeTable::default(),
        }
    }

    /// Every node-type model, in a fixed order.
    pub fn node_models(&self) -> [&dyn NodeModel; 14] {
        [
            &self.basin,
            &self.discrete_control,
            &self.flow_boundary,
            &self.fractional_flow,
            &self.level_boundary,
            &self.level_demand,
            &self.linear_resistance,
            &self.manning_resistance,
            &self.outlet,
            &self.pid_control,
            &self.pump,
            &self.tabulated_rating_curve,
            &self.terminal,
            &self.user_demand,
        ]
    }

    pub fn node_models_mut(&mut self) -> [&mut dyn NodeModel; 14] {
        [
            &mut self.basin,
            &mut self.discrete_control,
            &mut self.flow_boundary,
            &mut self.fractional_flow,
            &mut self.level_boundary,
            &mut self.level_demand,
            &mut self.linear_resistance,
            &mut self.manning_resistance,
            &mut self.outlet,
            &mut self.pid_control,
            &mut self.pump,
            &mut self.tabulated_rating_curve,
            &mut self.terminal,
            &mut self.user_demand,
        ]
    }

    /// Node IDs present in any identity table.
    pub fn network_node_ids(&self) -> BTreeSet<NodeId> {
        let mut ids = BTreeSet::new();
        for model in self.node_models() {
            ids.extend(model.node().ids());
        }
        ids
    }

    /// The ID the next `add` without an explicit ID would receive.
    pub fn next_node_id(&self) -> NodeId {
        self.used_ids.new_id()
    }

    /// Recompute the registry from the tables. Needed after the node
    /// tables were populated directly instead of through `add`.
    pub fn rebuild_registry(&mut self) {
        let mut registry = UsedIds::new();
        for model in self.node_models() {
            for node_id in model.all_node_ids() {
                registry.add(node_id);
            }
        }
        self.used_ids = registry;
    }

    /// Check the whole model. Cheap structural checks run before the
    /// cross-table ones, so the first error is the most fundamental.
    pub fn validate(&self) -> HnResult<()> {
        self.validate_id_signs()?;
        self.validate_unique_ids()?;
        self.validate_table_ids()?;
        self.validate_edges()
    }

    fn validate_id_signs(&self) -> HnResult<()> {
        let mut negative = BTreeSet::new();
        for model in self.node_models() {
            negative.extend(
                model
                    .all_node_ids()
                    .into_iter()
                    .filter(|node_id| !node_id.is_non_negative()),
            );
        }
        negative.extend(
            self.edge
                .node_ids()
                .into_iter()
                .filter(|node_id| !node_id.is_non_negative()),
        );
        if negative.is_empty() {
            Ok(())
        } else {
            Err(HnError::NegativeNodeIds {
                node_ids: negative.into_iter().collect(),
            })
        }
    }

    fn validate_unique_ids(&self) -> HnResult<()> {
        let mut owners: BTreeMap<NodeId, usize> = BTreeMap::new();
        for model in self.node_models() {
            for node_id in model.node().ids() {
                *owners.entry(node_id).or_default() += 1;
            }
        }
        let shared: Vec<NodeId> = owners
            .into_iter()
            .filter(|(_, owner_count)| *owner_count > 1)
            .map(|(node_id, _)| node_id)
            .collect();
        if shared.is_empty() {
            Ok(())
        } else {
            Err(HnError::SharedNodeIds { node_ids: shared })
        }
    }

    fn validate_table_ids(&self) -> HnResult<()> {
        for model in self.node_models() {
            if !model.has_table_data() {
                continue;
            }
            let table_ids = model.table_node_ids();
            let network_ids = model.node().ids();
            if table_ids != network_ids {
                let node_ids = table_ids
                    .symmetric_difference(&network_ids)
                    .copied()
                    .collect();
                return Err(HnError::TableIdMismatch {
                    node_type: model.node_type(),
                    node_ids,
                });
            }
        }
        Ok(())
    }

    fn validate_edges(&self) -> HnResult<()> {
        let known = self.network_node_ids();
        let unknown: Vec<NodeId> = self
            .edge
            .node_ids()
            .difference(&known)
            .copied()
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(HnError::UnknownEdgeNodes { node_ids: unknown })
        }
    }

    /// The combined identity table over all node types, in write order.
    pub fn node_table(&self) -> Table<NodeRow> {
        let mut table = Table::new();
        for model in self.node_models() {
            table.extend_from(&model.node().table);
        }
        table.sorted_for_write()
    }

    /// Split a combined identity table back into the per-type node tables.
    /// Each model receives only the rows recorded under its own type.
    pub fn distribute_node_table(&mut self, table: &Table<NodeRow>) {
        for model in self.node_models_mut() {
            let node_type = model.node_type();
            model.node_mut().table = table.clone();
            model.node_mut().filter(node_type);
        }
    }

    /// Walk every child table plus the edge table, in a fixed order.
    pub fn visit_tables<V: TableVisitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        visitor.visit(&self.basin.profile)?;
        visitor.visit(&self.basin.state)?;
        visitor.visit(&self.basin.static_)?;
        visitor.visit(&self.basin.time)?;
        visitor.visit(&self.basin.subgrid)?;
        visitor.visit(&self.discrete_control.condition)?;
        visitor.visit(&self.discrete_control.logic)?;
        visitor.visit(&self.flow_boundary.static_)?;
        visitor.visit(&self.flow_boundary.time)?;
        visitor.visit(&self.fractional_flow.static_)?;
        visitor.visit(&self.level_boundary.static_)?;
        visitor.visit(&self.level_boundary.time)?;
        visitor.visit(&self.level_demand.static_)?;
        visitor.visit(&self.level_demand.time)?;
        visitor.visit(&self.linear_resistance.static_)?;
        visitor.visit(&self.manning_resistance.static_)?;
        visitor.visit(&self.outlet.static_)?;
        visitor.visit(&self.pid_control.static_)?;
        visitor.visit(&self.pid_control.time)?;
        visitor.visit(&self.pump.static_)?;
        visitor.visit(&self.tabulated_rating_curve.static_)?;
        visitor.visit(&self.tabulated_rating_curve.time)?;
        visitor.visit(&self.user_demand.static_)?;
        visitor.visit(&self.user_demand.time)?;
        visitor.visit(&self.edge.table)
    }

    pub fn visit_tables_mut<V: TableVisitorMut>(&mut self, visitor: &mut V) -> Result<(), V::Error> {
        visitor.visit(&mut self.basin.profile)?;
        visitor.visit(&mut self.basin.state)?;
        visitor.visit(&mut self.basin.static_)?;
        visitor.visit(&mut self.basin.time)?;
        visitor.visit(&mut self.basin.subgrid)?;
        visitor.visit(&mut self.discrete_control.condition)?;
        visitor.visit(&mut self.discrete_control.logic)?;
        visitor.visit(&mut self.flow_boundary.static_)?;
        visitor.visit(&mut self.flow_boundary.time)?;
        visitor.visit(&mut self.fractional_flow.static_)?;
        visitor.visit(&mut self.level_boundary.static_)?;
        visitor.visit(&mut self.level_boundary.time)?;
        visitor.visit(&mut self.level_demand.static_)?;
        visitor.visit(&mut self.level_demand.time)?;
        visitor.visit(&mut self.linear_resistance.static_)?;
        visitor.visit(&mut self.manning_resistance.static_)?;
        visitor.visit(&mut self.outlet.static_)?;
        visitor.visit(&mut self.pid_control.static_)?;
        visitor.visit(&mut self.pid_control.time)?;
        visitor.visit(&mut self.pump.static_)?;
        visitor.visit(&mut self.tabulated_rating_curve.static_)?;
        visitor.visit(&mut self.tabulated_rating_curve.time)?;
        visitor.visit(&mut self.user_demand.static_)?;
        visitor.visit(&mut self.user_demand.time)?;
        visitor.visit(&mut self.edge.table)
    }
}
