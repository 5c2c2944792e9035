//! Ordinary Kriging in three dimensions
//!
//! Best Linear Unbiased Estimator for spatial data. The variogram is
//! fitted from the sample set **at construction**, so this backend
//! belongs to the pre-fitted behavior class: `fit()` on the wrapper is a
//! no-op and `execute` only solves the per-node kriging systems.
//!
//! The kriging system for k neighbors of a target node x₀:
//! ```text
//! [γ(x₁,x₁) ... γ(x₁,xₖ) 1] [w₁]   [γ(x₁,x₀)]
//! [   ...     ...    ...   .] [. ] = [   ...   ]
//! [γ(xₖ,x₁) ... γ(xₖ,xₖ) 1] [wₖ]   [γ(xₖ,x₀)]
//! [  1       ...    1      0] [μ ]   [    1    ]
//! ```
//! where γ is the fitted semivariance and μ the Lagrange multiplier
//! enforcing Σwᵢ = 1.
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use ndarray::{Array1, Array3};
use volgrid_core::{Error, Result};

use crate::maybe_rayon::*;

use super::variogram::{
    FittedVariogram, VariogramModel, VariogramParams, empirical_variogram, fit_best_variogram,
    fit_variogram,
};
use super::SamplePoint3;

/// Parameters for Ordinary Kriging
#[derive(Debug, Clone)]
pub struct KrigingParams {
    /// Force a specific variogram model. `None` fits all three and keeps
    /// the best (lowest RSS).
    pub variogram_model: Option<VariogramModel>,
    /// Empirical variogram binning parameters
    pub variogram: VariogramParams,
    /// Maximum number of nearest points per estimation (default 16)
    pub max_points: usize,
    /// Maximum search radius. `None` means global search.
    pub max_radius: Option<f64>,
}

impl Default for KrigingParams {
    fn default() -> Self {
        Self {
            variogram_model: None,
            variogram: VariogramParams::default(),
            max_points: 16,
            max_radius: None,
        }
    }
}

/// Ordinary Kriging estimator, variogram fitted at construction.
#[derive(Debug, Clone)]
pub struct OrdinaryKriging3d {
    points: Vec<SamplePoint3>,
    variogram: FittedVariogram,
    params: KrigingParams,
}

impl OrdinaryKriging3d {
    /// Build the estimator and fit its variogram from the sample set.
    ///
    /// # Errors
    /// - Fewer than 2 samples
    /// - Variogram fitting failure (e.g. all semivariances zero)
    pub fn new(points: Vec<SamplePoint3>, params: KrigingParams) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::Algorithm(
                "Kriging requires at least 2 sample points".into(),
            ));
        }

        let empirical = empirical_variogram(&points, &params.variogram)?;
        let variogram = match params.variogram_model {
            Some(model) => fit_variogram(&empirical, model)?,
            None => fit_best_variogram(&empirical)?,
        };

        Ok(Self {
            points,
            variogram,
            params,
        })
    }

    /// Build with an externally supplied variogram (skips fitting).
    pub fn with_variogram(
        points: Vec<SamplePoint3>,
        variogram: FittedVariogram,
        params: KrigingParams,
    ) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::Algorithm(
                "Kriging requires at least 2 sample points".into(),
            ));
        }
        Ok(Self {
            points,
            variogram,
            params,
        })
    }

    /// The variogram the estimator was fitted with
    pub fn fitted_variogram(&self) -> &FittedVariogram {
        &self.variogram
    }

    /// Solve the kriging system at every node of the Cartesian product of
    /// the per-axis sample arrays.
    ///
    /// Output arrays are in the backend-native `(nz, nx, ny)` order with
    /// index `[k, i, j]` addressing node `(gx[i], gy[j], gz[k])`. Nodes
    /// with an empty search neighborhood are NaN in both surfaces;
    /// singular systems fall back to inverse-square-distance weights with
    /// NaN variance.
    pub fn execute(
        &self,
        gx: &Array1<f64>,
        gy: &Array1<f64>,
        gz: &Array1<f64>,
    ) -> Result<(Array3<f64>, Array3<f64>)> {
        let (nx, ny, nz) = (gx.len(), gy.len(), gz.len());

        // each Z slab is independent and read-only over the sample set
        let nodes: Vec<(f64, f64)> = (0..nz)
            .into_par_iter()
            .flat_map(|k| {
                let mut slab = Vec::with_capacity(nx * ny);
                for i in 0..nx {
                    for j in 0..ny {
                        slab.push(self.estimate_node(gx[i], gy[j], gz[k]));
                    }
                }
                slab
            })
            .collect();

        let estimate: Vec<f64> = nodes.iter().map(|(e, _)| *e).collect();
        let variance: Vec<f64> = nodes.iter().map(|(_, v)| *v).collect();
        Ok((
            Array3::from_shape_vec((nz, nx, ny), estimate)
                .map_err(|e| Error::Other(e.to_string()))?,
            Array3::from_shape_vec((nz, nx, ny), variance)
                .map_err(|e| Error::Other(e.to_string()))?,
        ))
    }

    fn estimate_node(&self, x0: f64, y0: f64, z0: f64) -> (f64, f64) {
        let mut dists: Vec<(usize, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, pt)| (i, pt.dist_sq(x0, y0, z0).sqrt()))
            .collect();

        if let Some(max_r) = self.params.max_radius {
            dists.retain(|(_, d)| *d <= max_r);
        }
        if dists.is_empty() {
            return (f64::NAN, f64::NAN);
        }

        dists.sort_by(|a, b| a.1.total_cmp(&b.1));
        let k = dists.len().min(self.params.max_points.max(1));
        let neighbors = &dists[..k];

        // target effectively on a sample point: exact value, zero variance
        if neighbors[0].1 < 1e-12 {
            return (self.points[neighbors[0].0].value, 0.0);
        }

        // kriging system of size (k+1) with the Lagrange row/column
        let m = k + 1;
        let mut mat = vec![0.0_f64; m * m];
        let mut rhs = vec![0.0_f64; m];

        for i in 0..k {
            let pi = &self.points[neighbors[i].0];
            for j in 0..k {
                if i != j {
                    let pj = &self.points[neighbors[j].0];
                    mat[i * m + j] = self.variogram.evaluate(pi.dist(pj));
                }
            }
            mat[i * m + k] = 1.0;
            mat[k * m + i] = 1.0;
            rhs[i] = self.variogram.evaluate(neighbors[i].1);
        }
        rhs[k] = 1.0;

        match kriging_solve(m, &mut mat, &mut rhs) {
            Ok(solution) => {
                let mut estimate = 0.0;
                for i in 0..k {
                    estimate += solution[i] * self.points[neighbors[i].0].value;
                }

                // σ² = Σ wᵢ·γ(xᵢ,x₀) + μ, clamped non-negative
                let mut variance = solution[k];
                for i in 0..k {
                    variance += solution[i] * self.variogram.evaluate(neighbors[i].1);
                }
                (estimate, variance.max(0.0))
            }
            Err(_) => {
                // singular system: inverse-square-distance fallback
                let mut sum_w = 0.0;
                let mut sum_wv = 0.0;
                for (idx, dist) in neighbors {
                    let w = 1.0 / (dist * dist);
                    sum_w += w;
                    sum_wv += w * self.points[*idx].value;
                }
                if sum_w > 0.0 {
                    (sum_wv / sum_w, f64::NAN)
                } else {
                    (f64::NAN, f64::NAN)
                }
            }
        }
    }
}

/// Solve Ax = b by Gaussian elimination with partial pivoting.
/// Specialized for the small kriging systems (typically 5-20 unknowns).
fn kriging_solve(n: usize, mat: &mut [f64], rhs: &mut [f64]) -> Result<Vec<f64>> {
    for col in 0..n {
        let mut max_val = mat[col * n + col].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = mat[row * n + col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < 1e-14 {
            return Err(Error::Algorithm("Kriging: singular matrix".into()));
        }

        if max_row != col {
            for j in 0..n {
                mat.swap(col * n + j, max_row * n + j);
            }
            rhs.swap(col, max_row);
        }

        let pivot = mat[col * n + col];
        for row in (col + 1)..n {
            let factor = mat[row * n + col] / pivot;
            mat[row * n + col] = 0.0;
            for j in (col + 1)..n {
                mat[row * n + j] -= factor * mat[col * n + j];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0_f64; n];
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for j in (col + 1)..n {
            sum -= mat[col * n + j] * x[j];
        }
        x[col] = sum / mat[col * n + col];
    }

    Ok(x)
}
