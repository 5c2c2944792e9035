//! Interpolation model backends and the uniform dispatch layer
//!
//! The supported backends are structurally different: the kriging
//! estimator fits its variogram at construction and returns an
//! (estimate, variance) pair in its own `(nz, nx, ny)` axis order, while
//! the IDW estimator is lazy, returns a single surface, and is natively
//! canonical. [`ModelWrapper`] hides all of that behind one fit/predict
//! contract: every prediction comes back as an `(interpolated, variance)`
//! pair in the canonical `(nx, ny, nz)` order, with an empty variance
//! array standing in for backends that have none.

pub mod idw;
pub mod kriging;
pub mod variogram;

use ndarray::{Array1, Array2, Array3};
use volgrid_core::{Error, Result};

pub use idw::{Idw3d, IdwParams};
pub use kriging::{KrigingParams, OrdinaryKriging3d};
pub use variogram::{
    EmpiricalVariogram, FittedVariogram, VariogramModel, VariogramParams, empirical_variogram,
    fit_best_variogram, fit_variogram,
};

/// A sample point with x, y, z coordinates and a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub value: f64,
}

impl SamplePoint3 {
    pub fn new(x: f64, y: f64, z: f64, value: f64) -> Self {
        Self { x, y, z, value }
    }

    /// Squared Euclidean distance to a location
    #[inline]
    pub fn dist_sq(&self, x: f64, y: f64, z: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        let dz = self.z - z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn dist(&self, other: &SamplePoint3) -> f64 {
        self.dist_sq(other.x, other.y, other.z).sqrt()
    }
}

/// Behavioral family of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Returns an estimate and an estimation variance
    Statistical,
    /// Returns a single estimate surface, no variance
    Deterministic,
}

/// Registry of supported model names
pub const SUPPORTED_MODELS: &[(&str, ModelType)] = &[
    ("ordinary_kriging", ModelType::Statistical),
    ("idw", ModelType::Deterministic),
];

/// Resolve a model name to its behavioral family.
///
/// # Errors
/// [`Error::UnsupportedModel`] identifying the unknown name.
pub fn get_model_type(name: &str) -> Result<ModelType> {
    SUPPORTED_MODELS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, t)| *t)
        .ok_or_else(|| Error::UnsupportedModel(name.into()))
}

/// Backend-specific construction parameters, one variant per backend.
#[derive(Debug, Clone)]
pub enum ModelParams {
    OrdinaryKriging(KrigingParams),
    Idw(IdwParams),
}

/// Closed set of backend estimators, each variant carrying its own
/// constructor and predict-call adapter.
#[derive(Debug, Clone)]
pub enum Model {
    OrdinaryKriging(OrdinaryKriging3d),
    Idw(Idw3d),
}

/// Axis permutation taking the statistical backend's native `(nz, nx, ny)`
/// output to the canonical `(nx, ny, nz)` order.
pub const KRIGING_AXIS_PERM: [usize; 3] = [1, 2, 0];

/// The deterministic backend is natively canonical.
pub const IDW_AXIS_PERM: [usize; 3] = [0, 1, 2];

fn permute(arr: Array3<f64>, perm: [usize; 3]) -> Array3<f64> {
    arr.permuted_axes(perm).as_standard_layout().into_owned()
}

impl Model {
    /// Construct the backend named `model_name` over a sample set.
    ///
    /// `params` may be `None` (backend defaults); a params variant that
    /// does not match the model name is rejected.
    pub fn from_name(
        model_name: &str,
        points: Vec<SamplePoint3>,
        params: Option<ModelParams>,
    ) -> Result<Self> {
        match get_model_type(model_name)? {
            ModelType::Statistical => {
                let params = match params {
                    None => KrigingParams::default(),
                    Some(ModelParams::OrdinaryKriging(p)) => p,
                    Some(other) => return Err(params_mismatch(model_name, &other)),
                };
                Ok(Model::OrdinaryKriging(OrdinaryKriging3d::new(
                    points, params,
                )?))
            }
            ModelType::Deterministic => {
                let params = match params {
                    None => IdwParams::default(),
                    Some(ModelParams::Idw(p)) => p,
                    Some(other) => return Err(params_mismatch(model_name, &other)),
                };
                Ok(Model::Idw(Idw3d::new(points, params)?))
            }
        }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            Model::OrdinaryKriging(_) => ModelType::Statistical,
            Model::Idw(_) => ModelType::Deterministic,
        }
    }

    /// Whether fitting already happened as part of construction
    pub fn is_prefitted(&self) -> bool {
        match self {
            Model::OrdinaryKriging(_) => true,
            Model::Idw(_) => false,
        }
    }
}

fn params_mismatch(model_name: &str, params: &ModelParams) -> Error {
    Error::InvalidParameter {
        name: "model_params",
        value: format!("{params:?}"),
        reason: format!("params variant does not match model {model_name}"),
    }
}

/// Uniform adapter over the backend estimators.
#[derive(Debug, Clone)]
pub struct ModelWrapper {
    model_name: String,
    model: Model,
}

impl ModelWrapper {
    /// Resolve `model_name` through the registry and construct its
    /// backend over the sample set.
    pub fn new(
        model_name: &str,
        points: Vec<SamplePoint3>,
        params: Option<ModelParams>,
    ) -> Result<Self> {
        Ok(Self {
            model_name: model_name.into(),
            model: Model::from_name(model_name, points, params)?,
        })
    }

    /// Construct from a flat N×4 matrix of (X, Y, Z, V) rows, the export
    /// format of `GridData::to_matrix`.
    pub fn from_matrix(
        model_name: &str,
        matrix: &Array2<f64>,
        params: Option<ModelParams>,
    ) -> Result<Self> {
        if matrix.ncols() != 4 {
            return Err(Error::InvalidParameter {
                name: "matrix",
                value: format!("{:?}", matrix.dim()),
                reason: "expected an N×4 matrix of (X, Y, Z, V)".into(),
            });
        }
        let points = matrix
            .rows()
            .into_iter()
            .map(|row| SamplePoint3::new(row[0], row[1], row[2], row[3]))
            .collect();
        Self::new(model_name, points, params)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn model_type(&self) -> ModelType {
        self.model.model_type()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Run any fit step the backend still needs. The statistical backend
    /// is pre-fitted at construction and the deterministic backend is
    /// lazy, so this is a no-op for every supported variant; the dispatch
    /// goes through the capability flag rather than the model name.
    pub fn fit(&mut self) -> Result<()> {
        if self.model.is_prefitted() {
            return Ok(());
        }
        // lazy backends compute everything at predict time
        Ok(())
    }

    /// Predict over the Cartesian product of the per-axis 1D sample
    /// arrays.
    ///
    /// Returns `(interpolated, variance)` in the canonical `(nx, ny, nz)`
    /// order. Deterministic backends have no variance surface; the
    /// variance array is then empty.
    pub fn predict(
        &self,
        gx: &Array1<f64>,
        gy: &Array1<f64>,
        gz: &Array1<f64>,
    ) -> Result<(Array3<f64>, Array3<f64>)> {
        match &self.model {
            Model::OrdinaryKriging(kriging) => {
                let (estimate, variance) = kriging.execute(gx, gy, gz)?;
                Ok((
                    permute(estimate, KRIGING_AXIS_PERM),
                    permute(variance, KRIGING_AXIS_PERM),
                ))
            }
            Model::Idw(idw) => {
                let estimate = permute(idw.compute(gx, gy, gz)?, IDW_AXIS_PERM);
                Ok((estimate, Array3::zeros((0, 0, 0))))
            }
        }
    }
}
