//! Inverse Distance Weighting (IDW) in three dimensions
//!
//! Estimates the value at each grid node as a weighted average of the
//! sample points, with weights inversely proportional to distance raised
//! to a power parameter. A deterministic, parameter-free backend: it
//! holds only the sample set, and all computation happens at predict
//! time.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use ndarray::{Array1, Array3};
use volgrid_core::{Error, Result};

use crate::maybe_rayon::*;

use super::SamplePoint3;

/// Parameters for IDW interpolation
#[derive(Debug, Clone)]
pub struct IdwParams {
    /// Power parameter. Higher values give more weight to nearby points.
    pub power: f64,
    /// Maximum search radius. Points beyond this distance are ignored.
    /// `None` means all points are used (global IDW).
    pub max_radius: Option<f64>,
    /// Maximum number of nearest points to use.
    /// `None` means use all points within radius.
    pub max_points: Option<usize>,
    /// If a sample point is closer than this to the target node, its
    /// value is used directly (exact interpolation, avoids singularity).
    pub snap_distance: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 2.0,
            max_radius: None,
            max_points: None,
            snap_distance: 1e-10,
        }
    }
}

/// IDW estimator over a fixed 3D sample set.
#[derive(Debug, Clone)]
pub struct Idw3d {
    points: Vec<SamplePoint3>,
    params: IdwParams,
}

impl Idw3d {
    pub fn new(points: Vec<SamplePoint3>, params: IdwParams) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::Algorithm("No sample points provided".into()));
        }
        if !(params.power > 0.0) {
            return Err(Error::InvalidParameter {
                name: "power",
                value: params.power.to_string(),
                reason: "IDW power must be positive".into(),
            });
        }
        Ok(Self { points, params })
    }

    pub fn params(&self) -> &IdwParams {
        &self.params
    }

    /// Evaluate the estimator over the Cartesian product of the per-axis
    /// sample arrays.
    ///
    /// Output shape is the backend-native `(nx, ny, nz)` with index
    /// `[i, j, k]` addressing node `(gx[i], gy[j], gz[k])`. Nodes with no
    /// weight mass (empty search neighborhood) are NaN.
    pub fn compute(
        &self,
        gx: &Array1<f64>,
        gy: &Array1<f64>,
        gz: &Array1<f64>,
    ) -> Result<Array3<f64>> {
        let (nx, ny, nz) = (gx.len(), gy.len(), gz.len());

        // each X slab is independent and read-only over the sample set
        let data: Vec<f64> = (0..nx)
            .into_par_iter()
            .flat_map(|i| {
                let mut slab = Vec::with_capacity(ny * nz);
                for j in 0..ny {
                    for k in 0..nz {
                        slab.push(self.compute_point(gx[i], gy[j], gz[k]));
                    }
                }
                slab
            })
            .collect();

        Array3::from_shape_vec((nx, ny, nz), data)
            .map_err(|e| Error::Other(e.to_string()))
    }

    fn compute_point(&self, x: f64, y: f64, z: f64) -> f64 {
        let snap_sq = self.params.snap_distance * self.params.snap_distance;
        let max_radius_sq = self.params.max_radius.map(|r| r * r);

        let mut candidates: Vec<(f64, f64)> = Vec::new();
        for pt in &self.points {
            let dsq = pt.dist_sq(x, y, z);

            if dsq < snap_sq {
                return pt.value;
            }

            if let Some(max_sq) = max_radius_sq
                && dsq > max_sq
            {
                continue;
            }

            candidates.push((dsq, pt.value));
        }

        if candidates.is_empty() {
            return f64::NAN;
        }

        if let Some(max_points) = self.params.max_points
            && candidates.len() > max_points
        {
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
            candidates.truncate(max_points);
        }

        let mut sum_w = 0.0;
        let mut sum_wv = 0.0;
        for &(dsq, val) in &candidates {
            let w = 1.0 / dsq.sqrt().powf(self.params.power);
            sum_w += w;
            sum_wv += w * val;
        }

        if sum_w > 0.0 { sum_wv / sum_w } else { f64::NAN }
    }
}
