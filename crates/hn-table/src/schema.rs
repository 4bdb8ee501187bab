//! Declared table shapes: column names, types, nullability, sort keys.

use core::fmt;

/// Type of a declared column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    String,
    DateTime,
    Geometry,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Bool => "Bool",
            ColumnType::Int => "Int",
            ColumnType::Float => "Float",
            ColumnType::String => "String",
            ColumnType::DateTime => "DateTime",
            ColumnType::Geometry => "Geometry",
        };
        f.write_str(name)
    }
}

/// One declared column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub dtype: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub const fn required(name: &'static str, dtype: ColumnType) -> Self {
        Self {
            name,
            dtype,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, dtype: ColumnType) -> Self {
        Self {
            name,
            dtype,
            nullable: true,
        }
    }
}

/// Static descriptor owned by each row type: the table name used as the
/// storage key, the declared columns, and the canonical sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub sort_by: &'static [&'static str],
}

impl Schema {
    pub const fn new(
        name: &'static str,
        columns: &'static [Column],
        sort_by: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            columns,
            sort_by,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}
