//! # volgrid Core
//!
//! Core types for volumetric gridding of scattered 3D point data.
//!
//! This crate provides:
//! - `Table`: minimal row-oriented tabular input boundary
//! - `GridData`: canonical point dataset with a preprocessing record
//! - `GridAxis` / `Grid3D`: regular 3D sampling domains and their derived
//!   grid, mesh and normalized-coordinate views
//! - `GridResults`: interpolated/variance output surfaces
//! - The crate-wide `Error`/`Result` types

pub mod error;
pub mod griddata;
pub mod grid3d;
pub mod table;

pub use error::{Error, Result};
pub use grid3d::{Axis, Grid3D, GridArrays, GridAxis, GridRes, GridResults, Mesh3};
pub use griddata::{
    AxisRange, ColumnMap, DownsamplingRecord, GridData, GridDataSpecs, NormalizationRecord,
    PreprocessingParams, Sample, StandardizationRecord,
};
pub use table::{Column, Table};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid3d::{Axis, Grid3D, GridArrays, GridAxis, GridResults};
    pub use crate::griddata::{ColumnMap, GridData, GridDataSpecs, PreprocessingParams, Sample};
    pub use crate::table::{Column, Table};
}
