//! # VolGrid Modelling
//!
//! Preprocessing, model backends and the interpolation pipeline for
//! VolGrid.
//!
//! ## Modules
//!
//! - **preprocessor**: Per-ID downsampling, XYZ normalization, V standardization
//! - **models**: Ordinary kriging and IDW backends behind one wrapper
//! - **modeler**: Applies a wrapped model to a grid, honoring preprocessing
//! - **interpolate**: One-call pipeline from samples to an interpolated volume

pub mod interpolate;
mod maybe_rayon;
pub mod modeler;
pub mod models;
pub mod preprocessor;

pub use interpolate::{InterpolateParams, interpolate, interpolate_returning_model};
pub use modeler::Modeler;
pub use models::{
    Model, ModelParams, ModelType, ModelWrapper, SUPPORTED_MODELS, SamplePoint3, get_model_type,
};
pub use preprocessor::{
    DownsamplingStat, PreprocessOptions, Preprocessor, reverse_preprocessing,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolate::{InterpolateParams, interpolate, interpolate_returning_model};
    pub use crate::modeler::Modeler;
    pub use crate::models::{
        Idw3d, IdwParams, KrigingParams, Model, ModelParams, ModelType, ModelWrapper,
        OrdinaryKriging3d, SamplePoint3, get_model_type,
    };
    pub use crate::preprocessor::{
        DownsamplingStat, PreprocessOptions, Preprocessor, reverse_preprocessing,
    };
    pub use volgrid_core::prelude::*;
}
