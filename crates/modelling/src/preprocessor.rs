//! Data preprocessing ahead of interpolation
//!
//! Transforms run in a fixed order: downsample → normalize → standardize.
//! Normalization parameters are computed on post-downsample data, and
//! downsampling operates on raw physical Z units, so the order matters.
//! Each run returns a *new* [`GridData`] carrying the accumulated
//! [`PreprocessingParams`] record; [`reverse_preprocessing`] undoes the
//! reversible transforms. Downsampling is not invertible.

use volgrid_core::griddata::{
    AxisRange, DownsamplingRecord, NormalizationRecord, StandardizationRecord,
};
use volgrid_core::{Error, GridData, PreprocessingParams, Result, Sample};

/// Aggregation statistic used for Z-block downsampling.
#[derive(Debug, Clone, Copy)]
pub enum DownsamplingStat {
    Mean,
    Min,
    Max,
    Median,
    Sum,
    /// 75th percentile (linear interpolation between order statistics)
    Quantile75,
    /// Caller-supplied aggregation over a block's values
    Custom(fn(&[f64]) -> f64),
}

impl DownsamplingStat {
    fn aggregate(&self, values: &[f64]) -> f64 {
        match self {
            DownsamplingStat::Mean => values.iter().sum::<f64>() / values.len() as f64,
            DownsamplingStat::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            DownsamplingStat::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            DownsamplingStat::Median => quantile(values, 0.5),
            DownsamplingStat::Sum => values.iter().sum(),
            DownsamplingStat::Quantile75 => quantile(values, 0.75),
            DownsamplingStat::Custom(f) => f(values),
        }
    }
}

fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Options controlling a preprocessing run.
#[derive(Debug, Clone, Copy)]
pub struct PreprocessOptions {
    /// Z-block resolution for per-ID downsampling. `None` disables it.
    pub downsampling_res: Option<f64>,
    /// Aggregation statistic for downsampled blocks
    pub downsampling_stat: DownsamplingStat,
    /// Min-max rescale X, Y, Z to [0, 1]
    pub normalize_xyz: bool,
    /// Rescale V to zero mean / unit standard deviation
    pub standardize_v: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            downsampling_res: None,
            downsampling_stat: DownsamplingStat::Mean,
            normalize_xyz: true,
            standardize_v: true,
        }
    }
}

/// Preprocessing pipeline over one [`GridData`].
#[derive(Debug)]
pub struct Preprocessor<'a> {
    griddata: &'a GridData,
    options: PreprocessOptions,
}

impl<'a> Preprocessor<'a> {
    /// Preprocessor with default options (normalize + standardize, no
    /// downsampling).
    pub fn new(griddata: &'a GridData) -> Self {
        Self::with_options(griddata, PreprocessOptions::default())
    }

    pub fn with_options(griddata: &'a GridData, options: PreprocessOptions) -> Self {
        Self { griddata, options }
    }

    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Run the configured transforms and return a new [`GridData`] with
    /// the accumulated parameter record.
    pub fn preprocess(&self) -> Result<GridData> {
        let mut samples = self.griddata.samples().to_vec();
        let mut record = PreprocessingParams::default();

        if let Some(res) = self.options.downsampling_res {
            if !(res > 0.0) {
                return Err(Error::InvalidParameter {
                    name: "downsampling_res",
                    value: res.to_string(),
                    reason: "must be positive".into(),
                });
            }
            samples = downsample(&samples, res, self.options.downsampling_stat)?;
            record.downsampling = Some(DownsamplingRecord { resolution: res });
        }

        if self.options.normalize_xyz {
            record.normalization = Some(normalize_xyz(&mut samples)?);
        }

        if self.options.standardize_v {
            record.standardization = Some(standardize_v(&mut samples)?);
        }

        GridData::from_samples(samples, record)
    }
}

/// Group each ID's samples into Z blocks of the given resolution and
/// aggregate V per block. Block label = `res * round(z / res)`, with
/// ties rounding to even; regularly spaced Z hits exact half-block
/// multiples constantly, so the tie rule is part of the contract. X, Y
/// are carried through per ID; one (X, Y) pair per ID is required.
fn downsample(samples: &[Sample], res: f64, stat: DownsamplingStat) -> Result<Vec<Sample>> {
    let mut out = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for sample in samples {
        if seen.contains(&sample.id.as_str()) {
            continue;
        }
        seen.push(&sample.id);

        let of_id: Vec<&Sample> = samples.iter().filter(|s| s.id == sample.id).collect();
        let (x, y) = (of_id[0].x, of_id[0].y);
        if of_id.iter().any(|s| s.x != x || s.y != y) {
            return Err(Error::Algorithm(format!(
                "downsampling requires a single (X, Y) pair per ID, found several for {}",
                sample.id
            )));
        }

        // blocks keyed by the rounded Z multiple, in Z order
        let mut blocks: Vec<(i64, Vec<f64>)> = Vec::new();
        for s in &of_id {
            let key = (s.z / res).round_ties_even() as i64;
            match blocks.iter_mut().find(|(k, _)| *k == key) {
                Some((_, vs)) => vs.push(s.v),
                None => blocks.push((key, vec![s.v])),
            }
        }

        for (key, vs) in blocks {
            out.push(Sample {
                id: sample.id.clone(),
                x,
                y,
                z: res * key as f64,
                v: stat.aggregate(&vs),
            });
        }
    }

    Ok(out)
}

fn normalize_xyz(samples: &mut [Sample]) -> Result<NormalizationRecord> {
    let range = |get: fn(&Sample) -> f64, label: &str| -> Result<AxisRange> {
        let (min, max) = samples.iter().map(get).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), v| (lo.min(v), hi.max(v)),
        );
        if !(max > min) {
            return Err(Error::Algorithm(format!(
                "cannot normalize axis {label}: min == max"
            )));
        }
        Ok(AxisRange { min, max })
    };

    let x = range(|s| s.x, "X")?;
    let y = range(|s| s.y, "Y")?;
    let z = range(|s| s.z, "Z")?;

    for s in samples.iter_mut() {
        s.x = (s.x - x.min) / (x.max - x.min);
        s.y = (s.y - y.min) / (y.max - y.min);
        s.z = (s.z - z.min) / (z.max - z.min);
    }

    Ok(NormalizationRecord { x, y, z })
}

fn standardize_v(samples: &mut [Sample]) -> Result<StandardizationRecord> {
    let n = samples.len();
    if n < 2 {
        return Err(Error::Algorithm(
            "standardization requires at least 2 samples".into(),
        ));
    }
    let mean = samples.iter().map(|s| s.v).sum::<f64>() / n as f64;
    // sample standard deviation (ddof = 1)
    let var = samples.iter().map(|s| (s.v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = var.sqrt();
    if std == 0.0 {
        return Err(Error::Algorithm(
            "cannot standardize a constant value column".into(),
        ));
    }
    for s in samples.iter_mut() {
        s.v = (s.v - mean) / std;
    }
    Ok(StandardizationRecord { mean, std })
}

/// Undo the reversible transforms recorded on a [`GridData`].
///
/// Standardization is reversed first, then normalization (the reverse of
/// the application order). Downsampling cannot be reversed; its record is
/// simply dropped along with the rest.
///
/// # Errors
/// [`Error::NoPreprocessing`] if the dataset carries no transform record.
pub fn reverse_preprocessing(griddata: &GridData) -> Result<GridData> {
    let record = griddata.preprocessing();
    if record.is_empty() {
        return Err(Error::NoPreprocessing);
    }

    let mut samples = griddata.samples().to_vec();

    if let Some(std) = record.standardization {
        for s in samples.iter_mut() {
            s.v = s.v * std.std + std.mean;
        }
    }

    if let Some(norm) = record.normalization {
        for s in samples.iter_mut() {
            s.x = s.x * (norm.x.max - norm.x.min) + norm.x.min;
            s.y = s.y * (norm.y.max - norm.y.min) + norm.y.min;
            s.z = s.z * (norm.z.max - norm.z.min) + norm.z.min;
        }
    }

    GridData::from_samples(samples, PreprocessingParams::default())
}
