//! One-call interpolation pipeline
//!
//! Wires the grid construction, optional preprocessing, modeling and
//! prediction steps together: build the regular grid from the raw sample
//! set, preprocess if requested, fit the named backend on whatever the
//! sample set now is, and predict over the whole grid.

use ndarray::Array3;
use volgrid_core::{Grid3D, GridData, Result};

use crate::modeler::Modeler;
use crate::models::ModelParams;
use crate::preprocessor::{PreprocessOptions, Preprocessor};

/// Options for [`interpolate`].
#[derive(Debug, Clone)]
pub struct InterpolateParams {
    /// Backend parameters; `None` takes the backend defaults.
    pub model_params: Option<ModelParams>,
    /// Preprocessing to apply before fitting; `None` fits on raw samples.
    pub preprocess: Option<PreprocessOptions>,
    /// Blank out grid columns outside the sample XY footprint.
    /// On by default: the pipeline does not extrapolate beyond the
    /// surveyed area unless asked to.
    pub hull_restriction: bool,
}

impl Default for InterpolateParams {
    fn default() -> Self {
        Self {
            model_params: None,
            preprocess: None,
            hull_restriction: true,
        }
    }
}

/// Interpolate a sample set onto a regular grid, returning the
/// interpolated volume in `(nx, ny, nz)` order.
///
/// The grid is derived from the raw sample extent, so preprocessing
/// never changes the output frame.
pub fn interpolate(
    griddata: GridData,
    model_name: &str,
    grid_resolution: f64,
    params: InterpolateParams,
) -> Result<Array3<f64>> {
    let (interpolated, _) = interpolate_returning_model(griddata, model_name, grid_resolution, params)?;
    Ok(interpolated)
}

/// Same as [`interpolate`], also returning the fitted [`Modeler`] with
/// its grid and full results.
pub fn interpolate_returning_model(
    griddata: GridData,
    model_name: &str,
    grid_resolution: f64,
    params: InterpolateParams,
) -> Result<(Array3<f64>, Modeler)> {
    // grid frame comes from the raw samples, before any preprocessing
    let grid3d = Grid3D::from_griddata(&griddata, grid_resolution)?;

    let griddata = match &params.preprocess {
        Some(options) => Preprocessor::with_options(&griddata, options.clone()).preprocess()?,
        None => griddata,
    };

    let mut modeler = Modeler::new(griddata, grid3d, model_name, params.model_params)?
        .with_hull_restriction(params.hull_restriction);
    let results = modeler.predict()?;
    let interpolated = results.interpolated.clone();
    Ok((interpolated, modeler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use volgrid_core::Table;

    fn sample_griddata() -> GridData {
        let mut ids = Vec::new();
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut zs = Vec::new();
        let mut vs = Vec::new();
        for (i, (x, y)) in [(0.0, 0.0), (40.0, 5.0), (10.0, 35.0), (45.0, 40.0)]
            .into_iter()
            .enumerate()
        {
            for level in 0..4 {
                ids.push(format!("w{i}"));
                xs.push(x);
                ys.push(y);
                zs.push(level as f64 * 3.0);
                vs.push(0.2 * x + 0.1 * y + level as f64);
            }
        }
        let table = Table::new()
            .with_text("ID", ids)
            .unwrap()
            .with_numeric("X", xs)
            .unwrap()
            .with_numeric("Y", ys)
            .unwrap()
            .with_numeric("Z", zs)
            .unwrap()
            .with_numeric("V", vs)
            .unwrap();
        GridData::from_table(&table).unwrap()
    }

    #[test]
    fn test_interpolate_idw_shape_matches_grid() {
        let griddata = sample_griddata();
        let grid3d = Grid3D::from_griddata(&griddata, 10.0).unwrap();
        let params = InterpolateParams {
            hull_restriction: false,
            ..Default::default()
        };
        let out = interpolate(griddata, "idw", 10.0, params).unwrap();
        assert_eq!(out.dim(), grid3d.shape());
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_default_pipeline_masks_outside_footprint() {
        let griddata = sample_griddata();
        let out = interpolate(griddata, "idw", 10.0, InterpolateParams::default()).unwrap();
        // (x, y) = (40, 0) lies below the edge between samples (0, 0) and
        // (40, 5), outside the footprint hull
        assert!(out[[4, 0, 0]].is_nan());
        // the sample corner itself is on the hull boundary
        assert!(out[[0, 0, 0]].is_finite());
    }

    #[test]
    fn test_interpolate_with_preprocessing_keeps_raw_frame() {
        let griddata = sample_griddata();
        let raw_shape = Grid3D::from_griddata(&griddata, 10.0).unwrap().shape();
        let params = InterpolateParams {
            preprocess: Some(PreprocessOptions::default()),
            ..Default::default()
        };
        let (out, modeler) =
            interpolate_returning_model(griddata, "idw", 10.0, params).unwrap();
        // preprocessing rescales samples, never the output grid
        assert_eq!(out.dim(), raw_shape);
        assert!(modeler.griddata().preprocessing().normalization.is_some());
    }

    #[test]
    fn test_interpolate_unknown_model() {
        let err = interpolate(
            sample_griddata(),
            "nearest_neighbor",
            10.0,
            InterpolateParams::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("nearest_neighbor"));
    }
}
