//! Applies a wrapped model to a grid, honoring past preprocessing
//!
//! The modeler ties together a sample set, a grid, and one backend from
//! [`crate::models`]. Prediction reads the preprocessing record on the
//! sample set: normalized samples are predicted on the normalized grid,
//! and standardized values are mapped back to the original scale before
//! the results are stored.

use geo::{Area, ConvexHull, Intersects, MultiPoint, Point, Polygon};
use ndarray::Array3;
use volgrid_core::{
    Grid3D, GridArrays, GridData, GridResults, Result, Sample, StandardizationRecord,
};

use crate::models::{ModelParams, ModelWrapper};

/// Applies a model to a [`Grid3D`] over a [`GridData`] sample set.
#[derive(Debug, Clone)]
pub struct Modeler {
    griddata: GridData,
    grid3d: Grid3D,
    model: ModelWrapper,
    hull_restriction: bool,
    results: Option<GridResults>,
}

impl Modeler {
    /// Build the named backend over the sample set.
    ///
    /// The sample coordinates and values are taken as they currently are,
    /// so a preprocessed sample set yields a model in preprocessed space.
    pub fn new(
        griddata: GridData,
        grid3d: Grid3D,
        model_name: &str,
        model_params: Option<ModelParams>,
    ) -> Result<Self> {
        let model = ModelWrapper::from_matrix(model_name, &griddata.to_matrix(), model_params)?;
        Ok(Self {
            griddata,
            grid3d,
            model,
            hull_restriction: false,
            results: None,
        })
    }

    /// Blank out grid columns whose (x, y) falls outside the convex hull
    /// of the sample footprint. Off by default.
    pub fn with_hull_restriction(mut self, enabled: bool) -> Self {
        self.hull_restriction = enabled;
        self
    }

    pub fn griddata(&self) -> &GridData {
        &self.griddata
    }

    pub fn grid3d(&self) -> &Grid3D {
        &self.grid3d
    }

    pub fn model(&self) -> &ModelWrapper {
        &self.model
    }

    /// Results of the last `predict` call, if any.
    pub fn results(&self) -> Option<&GridResults> {
        self.results.as_ref()
    }

    /// Consume the modeler, returning its grid with any stored results.
    pub fn into_grid3d(self) -> Grid3D {
        self.grid3d
    }

    /// Predict over the whole grid, considering all past preprocessing.
    ///
    /// Normalized samples are predicted on the normalized grid samples,
    /// and standardized values are mapped back through the recorded mean
    /// and std. Results are stored on the modeler and on the grid; a
    /// repeated call replaces both.
    pub fn predict(&mut self) -> Result<&GridResults> {
        let grids = if self.griddata.preprocessing().normalization.is_some() {
            self.grid3d.normalized_grid()
        } else {
            self.grid3d.grid()
        };

        self.model.fit()?;
        let (mut interpolated, mut variance) = self.model.predict(&grids.x, &grids.y, &grids.z)?;

        if self.hull_restriction
            && let Some(hull) = footprint_hull(self.griddata.samples())
        {
            apply_hull_mask(&hull, &grids, &mut interpolated, &mut variance);
        }

        if let Some(record) = &self.griddata.preprocessing().standardization {
            reverse_standardized(&mut interpolated, record);
            if !variance.is_empty() {
                reverse_standardized(&mut variance, record);
            }
        }

        let results = GridResults {
            interpolated,
            variance,
        };
        self.grid3d.set_results(results.clone())?;
        Ok(self.results.insert(results))
    }
}

fn reverse_standardized(data: &mut Array3<f64>, record: &StandardizationRecord) {
    data.mapv_inplace(|v| v * record.std + record.mean);
}

/// Convex hull of the sample XY footprint, `None` when the footprint is
/// degenerate (fewer than 3 distinct locations, or all collinear).
fn footprint_hull(samples: &[Sample]) -> Option<Polygon<f64>> {
    let points: MultiPoint<f64> = samples.iter().map(|s| Point::new(s.x, s.y)).collect();
    let hull = points.convex_hull();
    if hull.unsigned_area() == 0.0 {
        return None;
    }
    Some(hull)
}

fn apply_hull_mask(
    hull: &Polygon<f64>,
    grids: &GridArrays,
    interpolated: &mut Array3<f64>,
    variance: &mut Array3<f64>,
) {
    let has_variance = !variance.is_empty();
    for (ix, &x) in grids.x.iter().enumerate() {
        for (iy, &y) in grids.y.iter().enumerate() {
            // boundary nodes count as inside
            if hull.intersects(&Point::new(x, y)) {
                continue;
            }
            for iz in 0..grids.z.len() {
                interpolated[[ix, iy, iz]] = f64::NAN;
                if has_variance {
                    variance[[ix, iy, iz]] = f64::NAN;
                }
            }
        }
    }
}
