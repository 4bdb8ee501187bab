use hn_core::NodeId;
use hn_table::{Column, ColumnType, Schema, SortValue, Table, TableRow, compare_keys};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

static READING_SCHEMA: Schema = Schema::new(
    "Reading / time",
    &[
        Column::required("node_id", ColumnType::Int),
        Column::optional("label", ColumnType::String),
        Column::optional("value", ColumnType::Float),
    ],
    &["node_id", "label"],
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct ReadingRow {
    node_id: NodeId,
    label: Option<String>,
    value: Option<f64>,
}

impl TableRow for ReadingRow {
    fn schema() -> &'static Schema {
        &READING_SCHEMA
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

fn arb_row() -> impl Strategy<Value = ReadingRow> {
    (
        -5i32..20,
        proptest::option::of("[a-d]{1,3}"),
        proptest::option::of(-1.0e3f64..1.0e3),
    )
        .prop_map(|(id, label, value)| ReadingRow {
            node_id: NodeId::new(id),
            label,
            value,
        })
}

proptest! {
    #[test]
    fn canonical_sort_is_idempotent(rows in proptest::collection::vec(arb_row(), 0..40)) {
        let table = Table::from_rows(rows);
        let once = table.sorted_for_write();
        let twice = once.sorted_for_write();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn canonical_sort_yields_non_decreasing_keys(
        rows in proptest::collection::vec(arb_row(), 0..40),
    ) {
        let sorted = Table::from_rows(rows).sorted_for_write();
        for pair in sorted.rows().windows(2) {
            let order = compare_keys(&pair[0].sort_key(), &pair[1].sort_key());
            prop_assert_ne!(order, Ordering::Greater);
        }
    }

    #[test]
    fn canonical_sort_preserves_row_multiset(
        rows in proptest::collection::vec(arb_row(), 0..40),
    ) {
        let table = Table::from_rows(rows.clone());
        let sorted = table.sorted_for_write();
        prop_assert_eq!(sorted.len(), rows.len());
        for row in &rows {
            let before = rows.iter().filter(|r| *r == row).count();
            let after = sorted.rows().iter().filter(|r| *r == row).count();
            prop_assert_eq!(before, after);
        }
    }
}
