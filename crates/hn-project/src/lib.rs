//! hn-project: persisted model layout and its read/write entry points.
//!
//! A model on disk is a directory with `<name>.yaml` (the config
//! document) next to a geodatabase file holding one table per key.

pub mod document;
pub mod geodatabase;
pub mod migrate;

pub use document::ConfigDocument;
pub use geodatabase::{GeoDatabase, StoredTable};
pub use migrate::{migrate_to_latest, FORMAT_VERSION};

use std::path::{Path, PathBuf};

use hn_core::HnError;
use hn_model::{Model, NodeRow, TableVisitor, TableVisitorMut};
use hn_table::{Table, TableRow};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Model error: {0}")]
    Model(#[from] HnError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key of the combined node identity table in the geodatabase.
pub const NODE_TABLE_KEY: &str = "Node";

/// Writes every present table into a geodatabase, in canonical order.
struct TableWriter<'a> {
    database: &'a mut GeoDatabase,
}

impl TableVisitor for TableWriter<'_> {
    type Error = ProjectError;

    fn visit<R: TableRow>(&mut self, table: &Table<R>) -> Result<(), Self::Error> {
        if !table.is_set() {
            return Ok(());
        }
        let canonical = table.sorted_for_write();
        let records = canonical.to_records()?;
        self.database
            .put_table(R::schema().name, canonical.column_names(), records);
        Ok(())
    }
}

/// Loads each table that has a stored counterpart, by schema name.
struct TableReader<'a> {
    database: &'a GeoDatabase,
}

impl TableVisitorMut for TableReader<'_> {
    type Error = HnError;

    fn visit<R: TableRow>(&mut self, table: &mut Table<R>) -> Result<(), Self::Error> {
        if let Some(stored) = self.database.table(R::schema().name) {
            table.append_records(stored.rows.clone())?;
        }
        Ok(())
    }
}

/// Validate, canonicalize, and write a model as `<dir>/<name>.yaml` plus
/// the geodatabase file. Existing tables are replaced wholesale. Returns
/// the path of the written config document.
pub fn write_model(model: &Model, dir: &Path, name: &str) -> ProjectResult<PathBuf> {
    model.validate()?;

    let mut database = GeoDatabase::default();
    let node_table = model.node_table();
    database.put_table(
        NODE_TABLE_KEY,
        node_table.column_names(),
        node_table.to_records()?,
    );
    let mut writer = TableWriter {
        database: &mut database,
    };
    model.visit_tables(&mut writer)?;

    let document = ConfigDocument::for_model(model);
    std::fs::create_dir_all(dir)?;
    let database_path = dir.join(&document.database);
    std::fs::write(&database_path, serde_json::to_string_pretty(&database)?)?;
    let config_path = dir.join(format!("{name}.yaml"));
    std::fs::write(&config_path, serde_yaml::to_string(&document)?)?;

    tracing::info!(
        config = %config_path.display(),
        tables = database.tables.len(),
        "model written"
    );
    Ok(config_path)
}

/// Read a model back from its config document. The stored format is
/// migrated to the latest version before any table is interpreted, the
/// registry is rebuilt from the observed IDs, and the result is validated.
pub fn read_model(config_path: &Path) -> ProjectResult<Model> {
    let content = std::fs::read_to_string(config_path)?;
    let document: ConfigDocument = serde_yaml::from_str(&content)?;
    let dir = config_path.parent().unwrap_or(Path::new("."));
    let database_content = std::fs::read_to_string(dir.join(&document.database))?;
    let mut database: GeoDatabase = serde_json::from_str(&database_content)?;
    let document = migrate_to_latest(document, &mut database)?;

    let mut model = document.into_model();
    let mut node_table = Table::<NodeRow>::default();
    if let Some(stored) = database.table(NODE_TABLE_KEY) {
        node_table.append_records(stored.rows.clone())?;
    }
    model.distribute_node_table(&node_table);
    let mut reader = TableReader {
        database: &database,
    };
    model.visit_tables_mut(&mut reader)?;
    model.rebuild_registry();
    model.validate()?;

    tracing::info!(
        config = %config_path.display(),
        nodes = model.network_node_ids().len(),
        "model read"
    );
    Ok(model)
}
