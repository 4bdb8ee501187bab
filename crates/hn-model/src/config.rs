//! Run configuration carried alongside the network: solver, logging,
//! allocation and results sections.

use serde::{Deserialize, Serialize};

/// Time integration settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Solver {
    pub algorithm: String,
    pub saveat: f64,
    pub adaptive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtmax: Option<f64>,
    pub force_dtmin: bool,
    pub abstol: f64,
    pub reltol: f64,
    pub maxiters: u64,
    pub sparse: bool,
    pub autodiff: bool,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            algorithm: "QNDF".to_string(),
            saveat: 86_400.0,
            adaptive: true,
            dt: None,
            dtmin: None,
            dtmax: None,
            force_dtmin: false,
            abstol: 1e-6,
            reltol: 1e-5,
            maxiters: 1_000_000_000,
            sparse: true,
            autodiff: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// What the run reports while it executes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub verbosity: Verbosity,
    pub timing: bool,
}

/// Water allocation settings. Allocation runs only when enabled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestep: Option<f64>,
    pub use_allocation: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Zstd,
    Lz4,
}

/// Where and how run output is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Results {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outstate: Option<String>,
    pub compression: Compression,
    pub compression_level: u8,
}

impl Default for Results {
    fn default() -> Self {
        Self {
            outstate: None,
            compression: Compression::Zstd,
            compression_level: 6,
        }
    }
}
