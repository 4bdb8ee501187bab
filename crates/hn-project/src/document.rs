//! The YAML config document written next to the geodatabase.

use chrono::NaiveDateTime;
use hn_model::{Allocation, Logging, Model, Results, Solver};
use serde::{Deserialize, Serialize};

use crate::migrate::FORMAT_VERSION;

/// Default geodatabase filename relative to the config document.
pub const DATABASE_FILENAME: &str = "database.json";

/// Everything about a model except its tables: run window, coordinate
/// system, config sections, and where the geodatabase lives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub format_version: u32,
    pub starttime: NaiveDateTime,
    pub endtime: NaiveDateTime,
    pub crs: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub solver: Solver,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub allocation: Allocation,
    #[serde(default)]
    pub results: Results,
}

fn default_database() -> String {
    DATABASE_FILENAME.to_string()
}

impl ConfigDocument {
    /// Snapshot the non-table state of a model, at the current format
    /// version.
    pub fn for_model(model: &Model) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            starttime: model.starttime,
            endtime: model.endtime,
            crs: model.crs.clone(),
            database: default_database(),
            solver: model.solver.clone(),
            logging: model.logging.clone(),
            allocation: model.allocation.clone(),
            results: model.results.clone(),
        }
    }

    /// An empty model carrying this document's settings. Tables are
    /// filled in separately by the reader.
    pub fn into_model(self) -> Model {
        let mut model = Model::new(self.starttime, self.endtime);
        model.crs = self.crs;
        model.solver = self.solver;
        model.logging = self.logging;
        model.allocation = self.allocation;
        model.results = self.results;
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> (NaiveDateTime, NaiveDateTime) {
        (
            "2020-01-01T00:00:00".parse().unwrap(),
            "2021-01-01T00:00:00".parse().unwrap(),
        )
    }

    #[test]
    fn document_round_trips_through_yaml() {
        let (start, end) = window();
        let model = Model::new(start, end);
        let document = ConfigDocument::for_model(&model);
        let text = serde_yaml::to_string(&document).unwrap();
        let back: ConfigDocument = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, document);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let text = "\
format_version: 1
starttime: 2020-01-01T00:00:00
endtime: 2021-01-01T00:00:00
crs: EPSG:4326
";
        let document: ConfigDocument = serde_yaml::from_str(text).unwrap();
        assert_eq!(document.database, DATABASE_FILENAME);
        assert_eq!(document.solver, Solver::default());
        assert_eq!(document.results, Results::default());
    }

    #[test]
    fn into_model_carries_the_settings_over() {
        let (start, end) = window();
        let mut document = ConfigDocument {
            format_version: FORMAT_VERSION,
            starttime: start,
            endtime: end,
            crs: "EPSG:28992".to_string(),
            database: default_database(),
            solver: Solver::default(),
            logging: Logging::default(),
            allocation: Allocation::default(),
            results: Results::default(),
        };
        document.solver.saveat = 3600.0;
        let model = document.clone().into_model();
        assert_eq!(model.crs, "EPSG:28992");
        assert_eq!(model.solver.saveat, 3600.0);
        assert_eq!(model.starttime, start);
    }
}
