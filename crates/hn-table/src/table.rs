//! Generic row container with append, record validation, and canonical sort.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDateTime;
use hn_core::{ColumnViolation, Extent, HnError, HnResult, NodeId, Point, ScalarValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::schema::{Column, ColumnType, Schema};
use crate::sort::{SortValue, compare_keys};

/// Prefix marking caller-supplied metadata columns.
pub const META_PREFIX: &str = "meta_";

/// A typed row of one table.
pub trait TableRow: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Declared columns and sort key for this row type.
    fn schema() -> &'static Schema;

    /// The node ID this row belongs to, if the table carries one.
    fn node_id(&self) -> Option<NodeId>;

    /// Stamp the row with its owning node ID.
    fn set_node_id(&mut self, node_id: NodeId);

    /// Values for the schema's `sort_by` columns, in declared order.
    fn sort_key(&self) -> Vec<SortValue>;
}

/// Rows that carry a point geometry.
pub trait GeometryRow: TableRow {
    fn point(&self) -> Point;
}

/// Append-only table of typed rows plus a side mapping of metadata columns.
///
/// Three states are distinguished: never touched (the default, omitted from
/// persisted output), explicitly constructed but empty (written as an empty
/// section), and populated. Metadata columns are column-major and always
/// have one value per row.
#[derive(Clone, Debug, PartialEq)]
pub struct Table<R: TableRow> {
    set: bool,
    rows: Vec<R>,
    extras: BTreeMap<String, Vec<ScalarValue>>,
}

impl<R: TableRow> Default for Table<R> {
    fn default() -> Self {
        Self {
            set: false,
            rows: Vec::new(),
            extras: BTreeMap::new(),
        }
    }
}

impl<R: TableRow> Table<R> {
    /// An explicitly constructed empty table, distinct from the default
    /// never-touched state.
    pub fn new() -> Self {
        Self {
            set: true,
            rows: Vec::new(),
            extras: BTreeMap::new(),
        }
    }

    pub fn from_rows(rows: Vec<R>) -> Self {
        let mut table = Self::new();
        table.append_rows(rows);
        table
    }

    /// Whether the table was ever explicitly constructed or appended to.
    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn extras(&self) -> &BTreeMap<String, Vec<ScalarValue>> {
        &self.extras
    }

    /// Append typed rows, preserving all prior rows. Metadata columns are
    /// padded with nulls for the new rows.
    pub fn append_rows(&mut self, rows: Vec<R>) {
        self.set = true;
        let added = rows.len();
        self.rows.extend(rows);
        for values in self.extras.values_mut() {
            values.extend(std::iter::repeat_n(ScalarValue::Null, added));
        }
    }

    /// Append one row together with metadata values. Metadata keys are
    /// normalized to carry the `meta_` prefix.
    pub fn append_row_with_extras(&mut self, row: R, extras: &BTreeMap<String, ScalarValue>) {
        let normalized = extras
            .iter()
            .map(|(key, value)| (normalize_meta_key(key), value.clone()))
            .collect();
        self.push_row(row, normalized);
    }

    fn push_row(&mut self, row: R, extras: BTreeMap<String, ScalarValue>) {
        self.set = true;
        let existing = self.rows.len();
        for (key, value) in extras {
            self.extras
                .entry(key)
                .or_insert_with(|| vec![ScalarValue::Null; existing])
                .push(value);
        }
        self.rows.push(row);
        // Columns the new row did not mention get a null.
        for values in self.extras.values_mut() {
            if values.len() == existing {
                values.push(ScalarValue::Null);
            }
        }
    }

    /// Ingest loosely typed records, as read from the database file.
    ///
    /// Declared columns are checked for presence, type, and nullability;
    /// every offending column is collected before failing. Undeclared
    /// columns pass through as metadata, renamed with the `meta_` prefix.
    /// A `fid` column is dropped, it is regenerated on write.
    pub fn append_records(&mut self, records: Vec<Map<String, Value>>) -> HnResult<()> {
        let schema = R::schema();
        let mut violations: Vec<ColumnViolation> = Vec::new();
        let mut accepted: Vec<(R, BTreeMap<String, ScalarValue>)> = Vec::with_capacity(records.len());

        for record in records {
            let mut declared = Map::new();
            let mut extra = BTreeMap::new();
            for (key, value) in record {
                if key == "fid" {
                    continue;
                }
                match schema.column(&key) {
                    Some(column) => {
                        check_cell(column, &value, &mut violations);
                        // A null in a nullable column is the same as absence.
                        if !value.is_null() {
                            declared.insert(key, value);
                        }
                    }
                    None => match scalar_from_value(&value) {
                        Some(scalar) => {
                            extra.insert(normalize_meta_key(&key), scalar);
                        }
                        None => push_violation(
                            &mut violations,
                            &key,
                            "metadata values must be scalars",
                        ),
                    },
                }
            }
            for column in schema.columns {
                if !column.nullable && !declared.contains_key(column.name) {
                    push_violation(&mut violations, column.name, "missing required column");
                }
            }
            if violations.is_empty() {
                match serde_json::from_value::<R>(Value::Object(declared)) {
                    Ok(row) => accepted.push((row, extra)),
                    Err(err) => push_violation(&mut violations, "<record>", &err.to_string()),
                }
            }
        }

        if !violations.is_empty() {
            return Err(HnError::Schema {
                table: schema.name.to_string(),
                violations,
            });
        }
        // Ingesting an empty record set still marks the table present.
        self.set = true;
        for (row, extra) in accepted {
            self.push_row(row, extra);
        }
        Ok(())
    }

    /// Append all rows and metadata columns of another table.
    pub fn extend_from(&mut self, other: &Table<R>) {
        if !other.set {
            return;
        }
        for (i, row) in other.rows.iter().enumerate() {
            let extra = other
                .extras
                .iter()
                .map(|(key, values)| (key.clone(), values[i].clone()))
                .collect();
            self.push_row(row.clone(), extra);
        }
        self.set = true;
    }

    /// Copy of the table with rows in canonical order: a stable ascending
    /// sort by the declared sort key, nulls last. The live table keeps its
    /// construction order.
    pub fn sorted_for_write(&self) -> Self {
        let keys: Vec<Vec<SortValue>> = self.rows.iter().map(TableRow::sort_key).collect();
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| compare_keys(&keys[a], &keys[b]));
        Self {
            set: self.set,
            rows: order.iter().map(|&i| self.rows[i].clone()).collect(),
            extras: self
                .extras
                .iter()
                .map(|(key, values)| {
                    let sorted = order.iter().map(|&i| values[i].clone()).collect();
                    (key.clone(), sorted)
                })
                .collect(),
        }
    }

    /// Set of node IDs referenced by the rows.
    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.rows.iter().filter_map(TableRow::node_id).collect()
    }

    /// Keep only rows satisfying the predicate, with metadata columns
    /// filtered in lockstep.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&R) -> bool,
    {
        let kept: Vec<bool> = self.rows.iter().map(|row| keep(row)).collect();
        let mut index = 0;
        self.rows.retain(|_| {
            let k = kept[index];
            index += 1;
            k
        });
        for values in self.extras.values_mut() {
            let mut index = 0;
            values.retain(|_| {
                let k = kept[index];
                index += 1;
                k
            });
        }
    }

    /// Serialize rows to loosely typed records, metadata included.
    /// Null metadata cells are omitted from their record.
    pub fn to_records(&self) -> Result<Vec<Map<String, Value>>, serde_json::Error> {
        let mut records = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let mut record = match serde_json::to_value(row)? {
                Value::Object(map) => map,
                other => {
                    return Err(serde::ser::Error::custom(format!(
                        "row serialized to {other:?}, expected an object"
                    )));
                }
            };
            for (key, values) in &self.extras {
                if !values[i].is_null() {
                    record.insert(key.clone(), serde_json::to_value(&values[i])?);
                }
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Declared column names followed by metadata column names.
    pub fn column_names(&self) -> Vec<String> {
        R::schema()
            .columns
            .iter()
            .map(|c| c.name.to_string())
            .chain(self.extras.keys().cloned())
            .collect()
    }
}

impl<R: GeometryRow> Table<R> {
    /// Bounding box over the row geometries.
    pub fn extent(&self) -> Option<Extent> {
        Extent::from_points(self.rows.iter().map(GeometryRow::point))
    }
}

fn normalize_meta_key(key: &str) -> String {
    if key.starts_with(META_PREFIX) {
        key.to_string()
    } else {
        format!("{META_PREFIX}{key}")
    }
}

fn push_violation(violations: &mut Vec<ColumnViolation>, column: &str, constraint: &str) {
    let violation = ColumnViolation::new(column, constraint);
    if !violations.contains(&violation) {
        violations.push(violation);
    }
}

fn check_cell(column: &Column, value: &Value, violations: &mut Vec<ColumnViolation>) {
    if value.is_null() {
        if !column.nullable {
            push_violation(violations, column.name, "null in non-nullable column");
        }
        return;
    }
    let ok = match column.dtype {
        ColumnType::Bool => value.is_boolean(),
        ColumnType::Int => value.is_i64() || value.is_u64(),
        ColumnType::Float => value.is_number(),
        ColumnType::String => value.is_string(),
        ColumnType::DateTime => value
            .as_str()
            .is_some_and(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()),
        ColumnType::Geometry => value.is_object() || value.is_array(),
    };
    if !ok {
        push_violation(
            violations,
            column.name,
            &format!("expected {}, got {}", column.dtype, kind_name(value)),
        );
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn scalar_from_value(value: &Value) -> Option<ScalarValue> {
    match value {
        Value::Null => Some(ScalarValue::Null),
        Value::Bool(b) => Some(ScalarValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(ScalarValue::Int)
            .or_else(|| n.as_f64().map(ScalarValue::Float)),
        Value::String(s) => Some(ScalarValue::String(s.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    static GAUGE_SCHEMA: Schema = Schema::new(
        "Gauge / static",
        &[
            Column::required("node_id", ColumnType::Int),
            Column::optional("stage", ColumnType::Float),
            Column::optional("label", ColumnType::String),
        ],
        &["node_id", "label"],
    );

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct GaugeRow {
        #[serde(default)]
        node_id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stage: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    }

    impl TableRow for GaugeRow {
        fn schema() -> &'static Schema {
            &GAUGE_SCHEMA
        }

        fn node_id(&self) -> Option<NodeId> {
            Some(self.node_id)
        }

        fn set_node_id(&mut self, node_id: NodeId) {
            self.node_id = node_id;
        }

        fn sort_key(&self) -> Vec<SortValue> {
            vec![self.node_id.into(), self.label.clone().into()]
        }
    }

    fn gauge(node_id: i32, label: Option<&str>) -> GaugeRow {
        GaugeRow {
            node_id: NodeId::new(node_id),
            stage: None,
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn default_is_unset_and_new_is_set() {
        let unset: Table<GaugeRow> = Table::default();
        assert!(!unset.is_set());
        assert!(unset.is_empty());

        let empty: Table<GaugeRow> = Table::new();
        assert!(empty.is_set());
        assert!(empty.is_empty());
    }

    #[test]
    fn append_records_drops_fid_and_prefixes_metadata() {
        let mut table: Table<GaugeRow> = Table::default();
        table
            .append_records(vec![
                json!({"fid": 1, "node_id": 2, "stage": 0.5, "source": "survey"})
                    .as_object()
                    .unwrap()
                    .clone(),
                json!({"fid": 2, "node_id": 1, "meta_source": "lidar"})
                    .as_object()
                    .unwrap()
                    .clone(),
            ])
            .unwrap();
        assert!(table.is_set());
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.extras()["meta_source"],
            vec![
                ScalarValue::String("survey".to_string()),
                ScalarValue::String("lidar".to_string()),
            ]
        );
        assert_eq!(table.rows()[0].node_id, NodeId::new(2));
        assert_eq!(table.rows()[0].stage, Some(0.5));
    }

    #[test]
    fn append_records_collects_every_offending_column() {
        let mut table: Table<GaugeRow> = Table::default();
        let err = table
            .append_records(vec![
                json!({"stage": "high"}).as_object().unwrap().clone(),
            ])
            .unwrap_err();
        match err {
            HnError::Schema { table, violations } => {
                assert_eq!(table, "Gauge / static");
                let columns: Vec<&str> =
                    violations.iter().map(|v| v.column.as_str()).collect();
                assert!(columns.contains(&"node_id"));
                assert!(columns.contains(&"stage"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failed_append_leaves_table_untouched() {
        let mut table: Table<GaugeRow> = Table::default();
        let result = table.append_records(vec![
            json!({"node_id": 1}).as_object().unwrap().clone(),
            json!({"node_id": "x"}).as_object().unwrap().clone(),
        ]);
        assert!(result.is_err());
        assert!(table.is_empty());
        assert!(!table.is_set());
    }

    #[test]
    fn sorted_for_write_orders_nulls_last_and_is_idempotent() {
        let table = Table::from_rows(vec![
            gauge(2, None),
            gauge(1, Some("b")),
            gauge(2, Some("a")),
            gauge(1, Some("a")),
        ]);
        let sorted = table.sorted_for_write();
        let labels: Vec<Option<&str>> = sorted
            .rows()
            .iter()
            .map(|r| r.label.as_deref())
            .collect();
        assert_eq!(labels, vec![Some("a"), Some("b"), Some("a"), None]);
        assert_eq!(sorted.sorted_for_write(), sorted);
        // The live table keeps its construction order.
        assert_eq!(table.rows()[0], gauge(2, None));
    }

    #[test]
    fn retain_filters_metadata_in_lockstep() {
        let mut table: Table<GaugeRow> = Table::default();
        let mut extras = BTreeMap::new();
        extras.insert("origin".to_string(), ScalarValue::from("a"));
        table.append_row_with_extras(gauge(1, None), &extras);
        let mut extras = BTreeMap::new();
        extras.insert("origin".to_string(), ScalarValue::from("b"));
        table.append_row_with_extras(gauge(2, None), &extras);

        table.retain(|row| row.node_id == NodeId::new(2));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.extras()["meta_origin"],
            vec![ScalarValue::String("b".to_string())]
        );
    }

    #[test]
    fn records_roundtrip_with_metadata() {
        let mut table: Table<GaugeRow> = Table::default();
        let mut extras = BTreeMap::new();
        extras.insert("meta_origin".to_string(), ScalarValue::from("survey"));
        table.append_row_with_extras(gauge(3, Some("x")), &extras);
        table.append_rows(vec![gauge(4, None)]);

        let records = table.to_records().unwrap();
        let mut back: Table<GaugeRow> = Table::default();
        back.append_records(records).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn node_ids_are_collected_from_rows() {
        let table = Table::from_rows(vec![gauge(5, None), gauge(3, None), gauge(5, None)]);
        let ids: Vec<NodeId> = table.node_ids().into_iter().collect();
        assert_eq!(ids, vec![NodeId::new(3), NodeId::new(5)]);
    }
}
