//! hn-table: validated tabular containers backing the network model.
//!
//! Contains:
//! - schema (declared column sets and sort keys)
//! - sort (sort-key values and canonical ordering)
//! - table (the generic row container with append/validate/sort)

pub mod schema;
pub mod sort;
pub mod table;

pub use schema::{Column, ColumnType, Schema};
pub use sort::{SortValue, compare_keys};
pub use table::{GeometryRow, META_PREFIX, Table, TableRow};
