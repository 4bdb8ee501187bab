//! The JSON geodatabase: an ordered map of named tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One stored table: declared column order plus loosely typed rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredTable {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// All tables of a persisted model, keyed by table name
/// (`"Node"`, `"Edge"`, `"Basin / profile"`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoDatabase {
    pub tables: BTreeMap<String, StoredTable>,
}

impl GeoDatabase {
    /// Store a table under its key, replacing any previous content.
    /// Rows receive a sequential `fid` starting at 1.
    pub fn put_table(&mut self, name: &str, columns: Vec<String>, mut rows: Vec<Map<String, Value>>) {
        for (offset, row) in rows.iter_mut().enumerate() {
            row.insert("fid".to_string(), Value::from(offset as i64 + 1));
        }
        self.tables
            .insert(name.to_string(), StoredTable { columns, rows });
    }

    pub fn table(&self, name: &str) -> Option<&StoredTable> {
        self.tables.get(name)
    }

    /// Rename a column in one table, in both the column list and the
    /// rows. Missing tables and missing columns are left alone.
    pub fn rename_column(&mut self, table: &str, from: &str, to: &str) {
        let Some(stored) = self.tables.get_mut(table) else {
            return;
        };
        for column in &mut stored.columns {
            if column == from {
                *column = to.to_string();
            }
        }
        for row in &mut stored.rows {
            if let Some(value) = row.remove(from) {
                row.insert(to.to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: Value) -> Map<String, Value> {
        match pairs {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn fid_is_assigned_sequentially_from_one() {
        let mut database = GeoDatabase::default();
        database.put_table(
            "Pump / static",
            vec!["node_id".to_string(), "flow_rate".to_string()],
            vec![
                record(json!({"node_id": 1, "flow_rate": 0.5})),
                record(json!({"node_id": 2, "flow_rate": 1.0})),
            ],
        );
        let stored = database.table("Pump / static").unwrap();
        assert_eq!(stored.rows[0]["fid"], json!(1));
        assert_eq!(stored.rows[1]["fid"], json!(2));
    }

    #[test]
    fn put_table_replaces_wholesale() {
        let mut database = GeoDatabase::default();
        database.put_table("Edge", vec![], vec![record(json!({"from_node_id": 1}))]);
        database.put_table("Edge", vec![], vec![]);
        assert!(database.table("Edge").unwrap().rows.is_empty());
    }

    #[test]
    fn rename_column_touches_columns_and_rows() {
        let mut database = GeoDatabase::default();
        database.put_table(
            "Node",
            vec!["node_id".to_string(), "allocation_network_id".to_string()],
            vec![record(json!({"node_id": 1, "allocation_network_id": 2}))],
        );
        database.rename_column("Node", "allocation_network_id", "subnetwork_id");
        let stored = database.table("Node").unwrap();
        assert!(stored.columns.contains(&"subnetwork_id".to_string()));
        assert!(!stored.columns.contains(&"allocation_network_id".to_string()));
        assert_eq!(stored.rows[0]["subnetwork_id"], json!(2));
        assert!(!stored.rows[0].contains_key("allocation_network_id"));
        // Renaming in an absent table is a no-op.
        database.rename_column("Edge", "a", "b");
    }
}
