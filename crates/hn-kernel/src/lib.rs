//! hn-kernel: the contract between a model and the numerical kernel that
//! runs it.
//!
//! The kernel itself lives elsewhere; this crate only fixes the calling
//! convention. Time is in seconds since the simulation start.

use std::path::Path;

pub type KernelResult<T> = Result<T, KernelError>;

#[derive(thiserror::Error, Debug)]
pub enum KernelError {
    #[error("Unknown variable {name}")]
    UnknownVariable { name: String },

    #[error("Initialization failed: {what}")]
    Initialization { what: String },
}

/// A running simulation kernel.
///
/// `get_value_ptr` hands out a live view over kernel-owned state: writes
/// through the slice are visible to the next `update`.
pub trait HydroKernel {
    fn initialize(&mut self, config_path: &Path) -> KernelResult<()>;

    /// Advance one internal time step.
    fn update(&mut self) -> KernelResult<()>;

    /// Advance up to the given time, never past it.
    fn update_until(&mut self, time: f64) -> KernelResult<()>;

    fn get_component_name(&self) -> &str;

    fn get_start_time(&self) -> f64;

    fn get_current_time(&self) -> f64;

    fn get_end_time(&self) -> f64;

    /// Element type of a variable, as a type name like `"double"`.
    fn get_var_type(&self, name: &str) -> KernelResult<&'static str>;

    /// Number of elements of a variable.
    fn get_var_shape(&self, name: &str) -> KernelResult<usize>;

    fn get_value_ptr(&mut self, name: &str) -> KernelResult<&mut [f64]>;
}
