//! Format migration chain for stored models.

use crate::document::ConfigDocument;
use crate::geodatabase::GeoDatabase;
use crate::ProjectError;

pub const FORMAT_VERSION: u32 = 1;

/// Walk the stored format up to the latest version, one step at a time.
pub fn migrate_to_latest(
    mut document: ConfigDocument,
    database: &mut GeoDatabase,
) -> Result<ConfigDocument, ProjectError> {
    while document.format_version < FORMAT_VERSION {
        document = migrate_one_version(document, database)?;
    }
    Ok(document)
}

fn migrate_one_version(
    document: ConfigDocument,
    database: &mut GeoDatabase,
) -> Result<ConfigDocument, ProjectError> {
    match document.format_version {
        0 => migrate_v0_to_v1(document, database),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {v}"),
        }),
    }
}

/// v0 stored subnetwork membership as `allocation_network_id`.
fn migrate_v0_to_v1(
    mut document: ConfigDocument,
    database: &mut GeoDatabase,
) -> Result<ConfigDocument, ProjectError> {
    for table in ["Node", "Edge"] {
        database.rename_column(table, "allocation_network_id", "subnetwork_id");
    }
    document.format_version = 1;
    Ok(document)
}
