//! hn-testmodels: ready-made models for the integration test suites.
//!
//! Each factory builds a small but complete network. IDs are chosen
//! deliberately, including awkward ones, so the suites exercise ID
//! handling and not just the happy path.

use chrono::{NaiveDate, NaiveDateTime};
use hn_core::{HnResult, Point};
use hn_model::{
    BasinProfileRow, BasinStateRow, BasinStaticRow, BasinSubgridRow, BasinTable,
    FlowBoundaryStaticRow, FlowBoundaryTable, LevelBoundaryStaticRow, LevelBoundaryTable,
    LinearResistanceStaticRow, LinearResistanceTable, ManningResistanceStaticRow,
    ManningResistanceTable, Model, Node, PidControlStaticRow, PidControlTable, PumpStaticRow,
    PumpTable, TabulatedRatingCurveStaticRow, TabulatedRatingCurveTable,
};

fn day(year: i32, month: u32, date: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, date)
        .expect("valid calendar date")
        .and_hms_opt(0, 0, 0)
        .expect("valid time of day")
}

fn year_2020() -> (NaiveDateTime, NaiveDateTime) {
    (day(2020, 1, 1), day(2021, 1, 1))
}

fn square_profile() -> Vec<BasinProfileRow> {
    vec![
        BasinProfileRow {
            area: 0.01,
            level: 0.0,
            ..BasinProfileRow::default()
        },
        BasinProfileRow {
            area: 1000.0,
            level: 1.0,
            ..BasinProfileRow::default()
        },
    ]
}

fn state_at(level: f64) -> Vec<BasinStateRow> {
    vec![BasinStateRow {
        level,
        ..BasinStateRow::default()
    }]
}

/// One basin draining over a rating curve into a terminal. Uses ID 0 and
/// `i32::MAX` on purpose.
pub fn trivial_model() -> HnResult<Model> {
    let (start, end) = year_2020();
    let mut model = Model::new(start, end);

    let basin = model.basin.add(
        &mut model.used_ids,
        Node::with_id(6, Point::new(400.0, 200.0)),
        vec![
            BasinTable::Profile(square_profile()),
            BasinTable::State(state_at(0.04)),
            BasinTable::Static(vec![BasinStaticRow {
                precipitation: Some(1e-8),
                potential_evaporation: Some(1e-9),
                ..BasinStaticRow::default()
            }]),
            BasinTable::Subgrid(vec![
                BasinSubgridRow {
                    subgrid_id: 1,
                    basin_level: 0.0,
                    subgrid_level: 0.0,
                    ..BasinSubgridRow::default()
                },
                BasinSubgridRow {
                    subgrid_id: 1,
                    basin_level: 1.0,
                    subgrid_level: 1.0,
                    ..BasinSubgridRow::default()
                },
            ]),
        ],
    )?;

    let curve = model.tabulated_rating_curve.add(
        &mut model.used_ids,
        Node::with_id(0, Point::new(450.0, 200.0)),
        vec![TabulatedRatingCurveTable::Static(vec![
            TabulatedRatingCurveStaticRow {
                level: 0.0,
                flow_rate: 0.0,
                ..TabulatedRatingCurveStaticRow::default()
            },
            TabulatedRatingCurveStaticRow {
                level: 1.0,
                flow_rate: 10.0 / 86_400.0,
                ..TabulatedRatingCurveStaticRow::default()
            },
        ])],
    )?;

    let terminal = model.terminal.add(
        &mut model.used_ids,
        Node::with_id(i32::MAX, Point::new(500.0, 200.0)),
    )?;

    model.edge.add(&basin, &curve)?;
    model.edge.add(&curve, &terminal)?;
    Ok(model)
}

/// A chain of four basins joined by a Manning reach, a linear resistance
/// and a pump, draining over a rating curve into a terminal.
pub fn basic_model() -> HnResult<Model> {
    let (start, end) = year_2020();
    let mut model = Model::new(start, end);

    let mut basins = Vec::new();
    for (node_id, x) in [(1, 0.0), (3, 2.0), (5, 4.0), (7, 6.0)] {
        let basin = model.basin.add(
            &mut model.used_ids,
            Node::with_id(node_id, Point::new(x, 0.0)),
            vec![
                BasinTable::Profile(square_profile()),
                BasinTable::State(state_at(0.05)),
                BasinTable::Static(vec![BasinStaticRow {
                    precipitation: Some(2e-8),
                    ..BasinStaticRow::default()
                }]),
            ],
        )?;
        basins.push(basin);
    }

    let manning = model.manning_resistance.add(
        &mut model.used_ids,
        Node::with_id(2, Point::new(1.0, 0.0)),
        vec![ManningResistanceTable::Static(vec![
            ManningResistanceStaticRow {
                length: 900.0,
                manning_n: 0.04,
                profile_width: 6.0,
                profile_slope: 3.0,
                ..ManningResistanceStaticRow::default()
            },
        ])],
    )?;

    let resistance = model.linear_resistance.add(
        &mut model.used_ids,
        Node::with_id(4, Point::new(3.0, 0.0)),
        vec![LinearResistanceTable::Static(vec![
            LinearResistanceStaticRow {
                resistance: 5e4,
                ..LinearResistanceStaticRow::default()
            },
        ])],
    )?;

    let pump = model.pump.add(
        &mut model.used_ids,
        Node::with_id(6, Point::new(5.0, 0.0)),
        vec![PumpTable::Static(vec![PumpStaticRow {
            flow_rate: 0.5e-3,
            ..PumpStaticRow::default()
        }])],
    )?;

    let curve = model.tabulated_rating_curve.add(
        &mut model.used_ids,
        Node::with_id(8, Point::new(7.0, 0.0)),
        vec![TabulatedRatingCurveTable::Static(vec![
            TabulatedRatingCurveStaticRow {
                level: 0.0,
                flow_rate: 0.0,
                ..TabulatedRatingCurveStaticRow::default()
            },
            TabulatedRatingCurveStaticRow {
                level: 1.0,
                flow_rate: 1e-3,
                ..TabulatedRatingCurveStaticRow::default()
            },
        ])],
    )?;

    let terminal = model
        .terminal
        .add(&mut model.used_ids, Node::with_id(9, Point::new(8.0, 0.0)))?;

    model.edge.add(&basins[0], &manning)?;
    model.edge.add(&manning, &basins[1])?;
    model.edge.add(&basins[1], &resistance)?;
    model.edge.add(&resistance, &basins[2])?;
    model.edge.add(&basins[2], &pump)?;
    model.edge.add(&pump, &basins[3])?;
    model.edge.add(&basins[3], &curve)?;
    model.edge.add(&curve, &terminal)?;
    Ok(model)
}

/// A level-controlled basin: a PID controller listening to the basin
/// steers the pump that empties it.
pub fn pid_control_model() -> HnResult<Model> {
    let (start, end) = year_2020();
    let mut model = Model::new(start, end);

    let inflow = model.flow_boundary.add(
        &mut model.used_ids,
        Node::with_id(1, Point::new(0.0, 0.0)),
        vec![FlowBoundaryTable::Static(vec![FlowBoundaryStaticRow {
            flow_rate: 1e-3,
            ..FlowBoundaryStaticRow::default()
        }])],
    )?;

    let basin = model.basin.add(
        &mut model.used_ids,
        Node::with_id(2, Point::new(1.0, 0.0)),
        vec![
            BasinTable::Profile(square_profile()),
            BasinTable::State(state_at(0.5)),
        ],
    )?;

    let pump = model.pump.add(
        &mut model.used_ids,
        Node::with_id(3, Point::new(2.0, 0.0)),
        vec![PumpTable::Static(vec![PumpStaticRow {
            // Starting point; the controller takes over from here.
            flow_rate: 0.0,
            ..PumpStaticRow::default()
        }])],
    )?;

    let outside = model.level_boundary.add(
        &mut model.used_ids,
        Node::with_id(4, Point::new(3.0, 0.0)),
        vec![LevelBoundaryTable::Static(vec![LevelBoundaryStaticRow {
            level: 1.0,
            ..LevelBoundaryStaticRow::default()
        }])],
    )?;

    let controller = model.pid_control.add(
        &mut model.used_ids,
        Node::with_id(5, Point::new(1.5, 1.0)),
        vec![PidControlTable::Static(vec![PidControlStaticRow {
            listen_node_id: basin.node_id,
            target: 0.5,
            proportional: -5e-4,
            integral: -1e-7,
            derivative: 0.0,
            ..PidControlStaticRow::default()
        }])],
    )?;

    model.edge.add(&inflow, &basin)?;
    model.edge.add(&basin, &pump)?;
    model.edge.add(&pump, &outside)?;
    model.edge.add(&controller, &pump)?;
    Ok(model)
}
