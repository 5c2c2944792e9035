//! Variogram computation and model fitting
//!
//! Computes the empirical (experimental) variogram of a scattered 3D
//! sample set and fits theoretical models (spherical, exponential,
//! Gaussian). Prerequisite for ordinary kriging.
//!
//! The semivariance γ(h) measures spatial dissimilarity as a function of
//! separation distance h:
//! ```text
//! γ(h) = (1/2N(h)) Σ [v(xᵢ) - v(xⱼ)]²   for all pairs with |xᵢ-xⱼ| ∈ h±Δh/2
//! ```
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use volgrid_core::{Error, Result};

use super::SamplePoint3;

/// Empirical variogram: semivariance values at discrete lag distances.
#[derive(Debug, Clone)]
pub struct EmpiricalVariogram {
    /// Lag distances (bin centers)
    pub lags: Vec<f64>,
    /// Semivariance values γ(h) at each lag
    pub semivariance: Vec<f64>,
    /// Number of point pairs contributing to each lag bin
    pub pair_counts: Vec<usize>,
}

/// Theoretical variogram model type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariogramModel {
    /// γ(h) = c₀ + c·[1.5(h/a) - 0.5(h/a)³] for h ≤ a; c₀+c for h > a
    Spherical,
    /// γ(h) = c₀ + c·[1 - exp(-3h/a)]
    Exponential,
    /// γ(h) = c₀ + c·[1 - exp(-3h²/a²)]
    Gaussian,
}

/// Fitted variogram model parameters
#[derive(Debug, Clone)]
pub struct FittedVariogram {
    /// Model type
    pub model: VariogramModel,
    /// Nugget (c₀): semivariance at h → 0
    pub nugget: f64,
    /// Sill (c₀ + c): semivariance at which the model levels off
    pub sill: f64,
    /// Range (a): distance at which semivariance reaches ~95% of sill
    pub range: f64,
    /// Partial sill (c = sill - nugget)
    pub partial_sill: f64,
    /// Residual sum of squares from fitting (lower = better)
    pub rss: f64,
}

impl FittedVariogram {
    /// Evaluate the fitted variogram model at distance h
    pub fn evaluate(&self, h: f64) -> f64 {
        if h < 1e-15 {
            return 0.0;
        }

        let c0 = self.nugget;
        let c = self.partial_sill;
        let a = self.range;

        match self.model {
            VariogramModel::Spherical => {
                if h >= a {
                    c0 + c
                } else {
                    let hr = h / a;
                    c0 + c * (1.5 * hr - 0.5 * hr * hr * hr)
                }
            }
            VariogramModel::Exponential => c0 + c * (1.0 - (-3.0 * h / a).exp()),
            VariogramModel::Gaussian => c0 + c * (1.0 - (-3.0 * h * h / (a * a)).exp()),
        }
    }
}

/// Parameters for empirical variogram computation
#[derive(Debug, Clone)]
pub struct VariogramParams {
    /// Number of lag bins (default 15)
    pub n_lags: usize,
    /// Maximum lag distance. If None, auto-computed as half the max pairwise distance.
    pub max_lag: Option<f64>,
    /// Lag tolerance as fraction of bin width (default 1.0 = full bin)
    pub lag_tolerance: f64,
}

impl Default for VariogramParams {
    fn default() -> Self {
        Self {
            n_lags: 15,
            max_lag: None,
            lag_tolerance: 1.0,
        }
    }
}

/// Compute the empirical variogram of a 3D sample set.
pub fn empirical_variogram(
    points: &[SamplePoint3],
    params: &VariogramParams,
) -> Result<EmpiricalVariogram> {
    let n = points.len();
    if n < 2 {
        return Err(Error::Algorithm(
            "Need at least 2 points for variogram".into(),
        ));
    }

    let max_lag = match params.max_lag {
        Some(m) => m,
        None => {
            let mut max_dist = 0.0_f64;
            for i in 0..n {
                for j in (i + 1)..n {
                    let d = points[i].dist(&points[j]);
                    if d > max_dist {
                        max_dist = d;
                    }
                }
            }
            // convention: max lag = half of max pairwise distance
            max_dist / 2.0
        }
    };

    if max_lag <= 0.0 {
        return Err(Error::Algorithm("Max lag must be positive".into()));
    }

    let bin_width = max_lag / params.n_lags as f64;
    let tol = bin_width * params.lag_tolerance;

    let mut lags = Vec::with_capacity(params.n_lags);
    let mut semivariance = vec![0.0_f64; params.n_lags];
    let mut pair_counts = vec![0_usize; params.n_lags];

    for k in 0..params.n_lags {
        lags.push((k as f64 + 0.5) * bin_width);
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let d = points[i].dist(&points[j]);
            let dv = points[i].value - points[j].value;
            let sq_diff = dv * dv;

            let bin = (d / bin_width - 0.5).round() as isize;
            if bin >= 0 && (bin as usize) < params.n_lags {
                let bin = bin as usize;
                if (d - lags[bin]).abs() <= tol / 2.0 {
                    semivariance[bin] += sq_diff;
                    pair_counts[bin] += 1;
                }
            }
        }
    }

    // γ(h) = (1/2N) Σ (vᵢ - vⱼ)²
    for k in 0..params.n_lags {
        if pair_counts[k] > 0 {
            semivariance[k] /= 2.0 * pair_counts[k] as f64;
        } else {
            semivariance[k] = f64::NAN;
        }
    }

    Ok(EmpiricalVariogram {
        lags,
        semivariance,
        pair_counts,
    })
}

/// Fit a theoretical variogram model to an empirical variogram.
///
/// Weighted least squares with pair-count weights (Cressie-style),
/// searched over a parameter grid for robustness.
pub fn fit_variogram(
    empirical: &EmpiricalVariogram,
    model: VariogramModel,
) -> Result<FittedVariogram> {
    let valid: Vec<(f64, f64, usize)> = empirical
        .lags
        .iter()
        .zip(empirical.semivariance.iter())
        .zip(empirical.pair_counts.iter())
        .filter(|((_, sv), cnt)| !sv.is_nan() && **cnt > 0)
        .map(|((&lag, &sv), &cnt)| (lag, sv, cnt))
        .collect();

    if valid.len() < 3 {
        return Err(Error::Algorithm(
            "Need at least 3 valid lag bins to fit variogram".into(),
        ));
    }

    let max_lag = valid.last().map(|(l, _, _)| *l).unwrap_or(1.0);
    let max_sv = valid.iter().map(|(_, sv, _)| *sv).fold(0.0_f64, f64::max);

    if max_sv <= 0.0 {
        return Err(Error::Algorithm("All semivariance values are zero".into()));
    }

    let n_nugget = 10;
    let n_sill = 10;
    let n_range = 20;

    let mut best_rss = f64::MAX;
    let mut best_nugget = 0.0;
    let mut best_sill = max_sv;
    let mut best_range = max_lag;

    for inug in 0..=n_nugget {
        let nugget = max_sv * inug as f64 / (2.0 * n_nugget as f64);
        for is in 1..=n_sill {
            let sill = max_sv * is as f64 / n_sill as f64;
            if sill <= nugget {
                continue;
            }
            for ir in 1..=n_range {
                let range = max_lag * 2.0 * ir as f64 / n_range as f64;

                let trial = FittedVariogram {
                    model,
                    nugget,
                    sill,
                    range,
                    partial_sill: sill - nugget,
                    rss: 0.0,
                };

                let mut rss = 0.0;
                for &(lag, sv, cnt) in &valid {
                    let residual = sv - trial.evaluate(lag);
                    rss += cnt as f64 * residual * residual;
                }

                if rss < best_rss {
                    best_rss = rss;
                    best_nugget = nugget;
                    best_sill = sill;
                    best_range = range;
                }
            }
        }
    }

    Ok(FittedVariogram {
        model,
        nugget: best_nugget,
        sill: best_sill,
        range: best_range,
        partial_sill: best_sill - best_nugget,
        rss: best_rss,
    })
}

/// Fit all three models and return the best one (lowest RSS).
pub fn fit_best_variogram(empirical: &EmpiricalVariogram) -> Result<FittedVariogram> {
    let models = [
        VariogramModel::Spherical,
        VariogramModel::Exponential,
        VariogramModel::Gaussian,
    ];

    let mut best: Option<FittedVariogram> = None;
    for &model in &models {
        if let Ok(fitted) = fit_variogram(empirical, model)
            && best.as_ref().is_none_or(|b| fitted.rss < b.rss)
        {
            best = Some(fitted);
        }
    }

    best.ok_or_else(|| Error::Algorithm("Could not fit any variogram model".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::generate_points;

    #[test]
    fn test_empirical_variogram_basic() {
        let points = generate_points(100, 42);
        let result = empirical_variogram(&points, &VariogramParams::default()).unwrap();

        assert_eq!(result.lags.len(), 15);
        assert_eq!(result.semivariance.len(), 15);
        assert_eq!(result.pair_counts.len(), 15);
        assert!(result.pair_counts[0] > 0, "First lag should have pairs");

        let valid_sv: Vec<f64> = result
            .semivariance
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        assert!(valid_sv.len() >= 5, "Should have at least 5 valid lags");
        // spatially correlated data: near pairs more similar than far pairs
        assert!(
            valid_sv[0] < *valid_sv.last().unwrap(),
            "Semivariance should increase: first={:.2}, last={:.2}",
            valid_sv[0],
            valid_sv.last().unwrap()
        );
    }

    #[test]
    fn test_empirical_variogram_too_few() {
        let points = vec![SamplePoint3::new(0.0, 0.0, 0.0, 1.0)];
        assert!(empirical_variogram(&points, &VariogramParams::default()).is_err());
    }

    #[test]
    fn test_fit_each_model() {
        let points = generate_points(200, 123);
        let emp = empirical_variogram(&points, &VariogramParams::default()).unwrap();

        for model in [
            VariogramModel::Spherical,
            VariogramModel::Exponential,
            VariogramModel::Gaussian,
        ] {
            let fitted = fit_variogram(&emp, model).unwrap();
            assert!(fitted.nugget >= 0.0, "Nugget should be non-negative");
            assert!(fitted.sill > fitted.nugget, "Sill should exceed nugget");
            assert!(fitted.range > 0.0, "Range should be positive");
            assert!(fitted.rss < f64::MAX, "RSS should be finite");
        }
    }

    #[test]
    fn test_fit_best() {
        let points = generate_points(200, 101);
        let emp = empirical_variogram(&points, &VariogramParams::default()).unwrap();
        let best = fit_best_variogram(&emp).unwrap();

        assert!(best.range > 0.0);
        assert!(best.sill > 0.0);
        assert!(best.rss >= 0.0);
    }

    #[test]
    fn test_model_evaluation() {
        let model = FittedVariogram {
            model: VariogramModel::Spherical,
            nugget: 1.0,
            sill: 10.0,
            range: 50.0,
            partial_sill: 9.0,
            rss: 0.0,
        };

        assert!((model.evaluate(0.0)).abs() < 1e-10);

        let at_range = model.evaluate(50.0);
        assert!(
            (at_range - 10.0).abs() < 0.01,
            "At range, should equal sill: got {at_range:.2}"
        );

        let beyond = model.evaluate(100.0);
        assert!(
            (beyond - 10.0).abs() < 0.01,
            "Beyond range, should be sill: got {beyond:.2}"
        );

        let mid = model.evaluate(25.0);
        assert!(
            mid > 1.0 && mid < 10.0,
            "Mid should be between nugget and sill: {mid:.2}"
        );
    }
}
