use hn_core::NodeId;
use hn_model::{Model, Node, PumpStaticRow, PumpTable};
use hn_project::{read_model, write_model, ConfigDocument, GeoDatabase};
use hn_table::Table;
use hn_testmodels::{basic_model, pid_control_model, trivial_model};

fn temp_project_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("hn_project_{name}"));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    dir
}

#[test]
fn roundtrip_trivial_model() {
    let model = trivial_model().unwrap();
    let dir = temp_project_dir("roundtrip_trivial");
    let config_path = write_model(&model, &dir, "trivial").unwrap();
    let loaded = read_model(&config_path).unwrap();

    loaded.validate().unwrap();
    // The combined node table is canonical on both sides.
    assert_eq!(loaded.node_table(), model.node_table());
    assert_eq!(loaded.basin.profile, model.basin.profile.sorted_for_write());
    assert_eq!(loaded.basin.state, model.basin.state.sorted_for_write());
    assert_eq!(loaded.basin.subgrid, model.basin.subgrid.sorted_for_write());
    assert_eq!(
        loaded.tabulated_rating_curve.static_,
        model.tabulated_rating_curve.static_.sorted_for_write()
    );
    assert_eq!(loaded.edge.table, model.edge.table.sorted_for_write());
    // Never-touched tables come back unset.
    assert!(!loaded.pump.static_.is_set());
    assert!(!loaded.user_demand.time.is_set());
}

#[test]
fn roundtrip_basic_model_rebuilds_the_registry() {
    let model = basic_model().unwrap();
    let dir = temp_project_dir("roundtrip_basic");
    let config_path = write_model(&model, &dir, "basic").unwrap();
    let loaded = read_model(&config_path).unwrap();

    assert_eq!(loaded.next_node_id(), NodeId::new(10));
    assert_eq!(loaded.basin.node.len(), 4);
    assert_eq!(loaded.edge.table.len(), 8);
}

#[test]
fn roundtrip_preserves_config_sections() {
    let mut model = pid_control_model().unwrap();
    model.solver.saveat = 3600.0;
    model.solver.dt = Some(60.0);
    model.logging.timing = true;
    model.results.outstate = Some("final_state.json".to_string());
    model.crs = "EPSG:28992".to_string();

    let dir = temp_project_dir("roundtrip_config");
    let config_path = write_model(&model, &dir, "pid_control").unwrap();
    let loaded = read_model(&config_path).unwrap();

    assert_eq!(loaded.solver, model.solver);
    assert_eq!(loaded.logging, model.logging);
    assert_eq!(loaded.results, model.results);
    assert_eq!(loaded.crs, "EPSG:28992");
    assert_eq!(loaded.starttime, model.starttime);
    assert_eq!(loaded.endtime, model.endtime);
}

#[test]
fn roundtrip_keeps_node_metadata() {
    let mut model = trivial_model().unwrap();
    let node = Node::new(hn_core::Point::new(600.0, 200.0)).meta("owner", "waterboard");
    model.terminal.add(&mut model.used_ids, node).unwrap();

    let dir = temp_project_dir("roundtrip_metadata");
    let config_path = write_model(&model, &dir, "metadata").unwrap();
    let loaded = read_model(&config_path).unwrap();

    let extras = loaded.terminal.node.table.extras();
    assert!(extras.contains_key("meta_owner"));
}

#[test]
fn explicitly_empty_tables_survive_the_roundtrip() {
    let mut model = trivial_model().unwrap();
    // Present with zero rows, unlike the never-touched default.
    model.pump.static_ = Table::new();

    let dir = temp_project_dir("roundtrip_empty_table");
    let config_path = write_model(&model, &dir, "empty_table").unwrap();
    let loaded = read_model(&config_path).unwrap();

    assert!(loaded.pump.static_.is_set());
    assert!(loaded.pump.static_.is_empty());
}

#[test]
fn write_refuses_an_invalid_model() {
    let mut model = trivial_model().unwrap();
    // A pump row with no pump node behind it.
    model.pump.static_.append_rows(vec![PumpStaticRow {
        node_id: NodeId::new(12),
        flow_rate: 1.0,
        ..PumpStaticRow::default()
    }]);

    let dir = temp_project_dir("write_invalid");
    let err = write_model(&model, &dir, "invalid").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Model error: For Pump, the node IDs in the data tables don't match \
         the node IDs in the network"
    );
    assert!(!dir.join("invalid.yaml").exists());
}

#[test]
fn read_migrates_a_version_zero_project() {
    let model = trivial_model().unwrap();
    let dir = temp_project_dir("read_migrates");
    let config_path = write_model(&model, &dir, "old").unwrap();

    // Rewrite the files as a version-0 project with the old column name.
    let text = std::fs::read_to_string(&config_path).unwrap();
    let mut document: ConfigDocument = serde_yaml::from_str(&text).unwrap();
    document.format_version = 0;
    std::fs::write(&config_path, serde_yaml::to_string(&document).unwrap()).unwrap();

    let database_path = dir.join(&document.database);
    let database_text = std::fs::read_to_string(&database_path).unwrap();
    let mut database: GeoDatabase = serde_json::from_str(&database_text).unwrap();
    if let Some(stored) = database.tables.get_mut("Node") {
        for row in &mut stored.rows {
            row.insert("allocation_network_id".to_string(), serde_json::json!(2));
        }
        for column in &mut stored.columns {
            if column == "subnetwork_id" {
                *column = "allocation_network_id".to_string();
            }
        }
    }
    std::fs::write(
        &database_path,
        serde_json::to_string_pretty(&database).unwrap(),
    )
    .unwrap();

    let loaded = read_model(&config_path).unwrap();
    assert_eq!(loaded.basin.node.table.rows()[0].subnetwork_id, Some(2));
}

#[test]
fn fid_is_regenerated_not_ingested() {
    let model = trivial_model().unwrap();
    let dir = temp_project_dir("fid_regenerated");
    let config_path = write_model(&model, &dir, "fid").unwrap();

    let database_text = std::fs::read_to_string(dir.join("database.json")).unwrap();
    let database: GeoDatabase = serde_json::from_str(&database_text).unwrap();
    let node = database.table("Node").unwrap();
    let fids: Vec<i64> = node
        .rows
        .iter()
        .map(|row| row["fid"].as_i64().unwrap())
        .collect();
    assert_eq!(fids, vec![1, 2, 3]);

    // Reading drops the stored fid instead of treating it as metadata.
    let loaded = read_model(&config_path).unwrap();
    assert!(!loaded
        .basin
        .node
        .table
        .extras()
        .keys()
        .any(|key| key.contains("fid")));
}

#[test]
fn reading_a_corrupt_table_reports_every_bad_column() {
    let model = trivial_model().unwrap();
    let dir = temp_project_dir("corrupt_table");
    let config_path = write_model(&model, &dir, "corrupt").unwrap();

    let database_path = dir.join("database.json");
    let database_text = std::fs::read_to_string(&database_path).unwrap();
    let mut database: GeoDatabase = serde_json::from_str(&database_text).unwrap();
    if let Some(stored) = database.tables.get_mut("Basin / profile") {
        stored.rows[0].insert("area".to_string(), serde_json::json!("wide"));
        stored.rows[0].remove("level");
    }
    std::fs::write(
        &database_path,
        serde_json::to_string_pretty(&database).unwrap(),
    )
    .unwrap();

    let err = read_model(&config_path).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Basin / profile"), "{text}");
    assert!(text.contains("area"), "{text}");
    assert!(text.contains("level"), "{text}");
}

#[test]
fn roundtrip_twice_is_stable() {
    let model = basic_model().unwrap();
    let dir = temp_project_dir("roundtrip_twice_a");
    let config_path = write_model(&model, &dir, "basic").unwrap();
    let once = read_model(&config_path).unwrap();

    let dir2 = temp_project_dir("roundtrip_twice_b");
    let config_path2 = write_model(&once, &dir2, "basic").unwrap();
    let twice = read_model(&config_path2).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn adding_after_read_continues_the_id_sequence() {
    let model = basic_model().unwrap();
    let dir = temp_project_dir("add_after_read");
    let config_path = write_model(&model, &dir, "basic").unwrap();
    let mut loaded = read_model(&config_path).unwrap();

    let data = loaded
        .pump
        .add(
            &mut loaded.used_ids,
            Node::new(hn_core::Point::new(9.0, 0.0)),
            vec![PumpTable::Static(vec![PumpStaticRow {
                flow_rate: 1e-3,
                ..PumpStaticRow::default()
            }])],
        )
        .unwrap();
    assert_eq!(data.node_id, NodeId::new(10));
}
