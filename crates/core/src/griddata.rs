//! Canonical point-data container
//!
//! [`GridData`] holds scattered 3D measurements (borehole-like data) in a
//! fixed canonical form: one record per unique `(ID, X, Y, Z)` composite
//! key with a floating point value `V`, sorted descending by that key.
//!
//! A `GridData` is immutable after construction. Preprocessing produces a
//! *new* `GridData` carrying the applied transform parameters in its
//! [`PreprocessingParams`] record, so downstream layers can pick the right
//! prediction grid and reverse the value transform.

use std::cmp::Ordering;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid3d::Axis;
use crate::table::Table;

/// Source column names for the five canonical columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub id: String,
    pub x: String,
    pub y: String,
    pub z: String,
    pub v: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            id: "ID".into(),
            x: "X".into(),
            y: "Y".into(),
            z: "Z".into(),
            v: "V".into(),
        }
    }
}

/// One point measurement in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub v: f64,
}

impl Sample {
    pub fn new(id: impl Into<String>, x: f64, y: f64, z: f64, v: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
            v,
        }
    }
}

/// Total order on the `(ID, X, Y, Z)` composite key.
fn key_cmp(a: &Sample, b: &Sample) -> Ordering {
    a.id.cmp(&b.id)
        .then_with(|| a.x.total_cmp(&b.x))
        .then_with(|| a.y.total_cmp(&b.y))
        .then_with(|| a.z.total_cmp(&b.z))
}

/// Min/max pair recorded for one normalized coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Recorded downsampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownsamplingRecord {
    pub resolution: f64,
}

/// Recorded per-axis normalization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRecord {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl NormalizationRecord {
    pub fn axis(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Recorded value standardization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardizationRecord {
    pub mean: f64,
    pub std: f64,
}

/// Record of the transforms applied to a [`GridData`].
///
/// Presence of an entry signals that the corresponding transform was
/// applied and must be considered (and, where possible, reversed)
/// downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingParams {
    pub downsampling: Option<DownsamplingRecord>,
    pub normalization: Option<NormalizationRecord>,
    pub standardization: Option<StandardizationRecord>,
}

impl PreprocessingParams {
    /// True when no transform has been recorded
    pub fn is_empty(&self) -> bool {
        self.downsampling.is_none()
            && self.normalization.is_none()
            && self.standardization.is_none()
    }
}

/// Canonical point dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GridData {
    samples: Vec<Sample>,
    preprocessing: PreprocessingParams,
}

impl GridData {
    /// Build from a tabular source with the given column mapping.
    ///
    /// Selects exactly the mapped columns, renames them to the canonical
    /// ID/X/Y/Z/V labels, casts V to floating point, and sorts descending
    /// by the `(ID, X, Y, Z)` composite key.
    ///
    /// # Errors
    /// - [`Error::MissingColumn`] if a mapped column is absent
    /// - [`Error::InvalidParameter`] if a coordinate/value column is not
    ///   castable to floating point
    /// - [`Error::DuplicateKey`] if two rows share a composite key
    pub fn new(
        table: &Table,
        columns: &ColumnMap,
        preprocessing: PreprocessingParams,
    ) -> Result<Self> {
        let ids = table.text_column(&columns.id)?;
        let xs = table.numeric_column(&columns.x)?;
        let ys = table.numeric_column(&columns.y)?;
        let zs = table.numeric_column(&columns.z)?;
        let vs = table.numeric_column(&columns.v)?;

        let samples = ids
            .into_iter()
            .zip(xs)
            .zip(ys)
            .zip(zs)
            .zip(vs)
            .map(|((((id, x), y), z), v)| Sample { id, x, y, z, v })
            .collect();

        Self::from_samples(samples, preprocessing)
    }

    /// Build with the default `"ID","X","Y","Z","V"` column names.
    pub fn from_table(table: &Table) -> Result<Self> {
        Self::new(table, &ColumnMap::default(), PreprocessingParams::default())
    }

    /// Build from already-canonical samples (used by the preprocessor and
    /// the inverse-transform utilities). Sorts and enforces key uniqueness.
    pub fn from_samples(
        mut samples: Vec<Sample>,
        preprocessing: PreprocessingParams,
    ) -> Result<Self> {
        // descending composite-key order
        samples.sort_by(|a, b| key_cmp(b, a));
        for pair in samples.windows(2) {
            if key_cmp(&pair[0], &pair[1]) == Ordering::Equal {
                let s = &pair[0];
                return Err(Error::DuplicateKey(format!(
                    "({}, {}, {}, {})",
                    s.id, s.x, s.y, s.z
                )));
            }
        }
        Ok(Self {
            samples,
            preprocessing,
        })
    }

    /// Samples in descending composite-key order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distinct IDs, in storage order
    pub fn unique_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for sample in &self.samples {
            if !ids.contains(&sample.id.as_str()) {
                ids.push(&sample.id);
            }
        }
        ids
    }

    /// Recorded preprocessing parameters (empty if untransformed)
    pub fn preprocessing(&self) -> &PreprocessingParams {
        &self.preprocessing
    }

    /// Spatial and value extents, computed fresh from the current data.
    ///
    /// # Errors
    /// [`Error::Algorithm`] if the dataset is empty.
    pub fn specs(&self) -> Result<GridDataSpecs> {
        if self.samples.is_empty() {
            return Err(Error::Algorithm(
                "Specs can't be calculated without data".into(),
            ));
        }
        let fold = |f: fn(&Sample) -> f64| {
            self.samples.iter().map(f).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), v| (lo.min(v), hi.max(v)),
            )
        };
        let (xmin, xmax) = fold(|s| s.x);
        let (ymin, ymax) = fold(|s| s.y);
        let (zmin, zmax) = fold(|s| s.z);
        let (vmin, vmax) = fold(|s| s.v);
        Ok(GridDataSpecs {
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
            vmin,
            vmax,
        })
    }

    /// Flat numeric export: an N×4 array of (X, Y, Z, V) in index order,
    /// for backends that expect flat coordinate/value arrays.
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.samples.len(), 4));
        for (i, s) in self.samples.iter().enumerate() {
            out[[i, 0]] = s.x;
            out[[i, 1]] = s.y;
            out[[i, 2]] = s.z;
            out[[i, 3]] = s.v;
        }
        out
    }
}

/// Min/max extents of a [`GridData`], driving grid construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDataSpecs {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub vmin: f64,
    pub vmax: f64,
}

impl GridDataSpecs {
    pub fn xsize(&self) -> f64 {
        (self.xmax - self.xmin).abs()
    }

    pub fn ysize(&self) -> f64 {
        (self.ymax - self.ymin).abs()
    }

    pub fn zsize(&self) -> f64 {
        (self.zmax - self.zmin).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_table() -> Table {
        Table::new()
            .with_text("ID", vec!["a".into(), "a".into(), "b".into(), "b".into()])
            .unwrap()
            .with_numeric("X", vec![0.0, 0.0, 10.0, 10.0])
            .unwrap()
            .with_numeric("Y", vec![0.0, 0.0, 5.0, 5.0])
            .unwrap()
            .with_numeric("Z", vec![1.0, 2.0, 1.0, 2.0])
            .unwrap()
            .with_numeric("V", vec![4.0, 3.0, 2.0, 1.0])
            .unwrap()
    }

    #[test]
    fn test_construct_default_columns() {
        let gd = GridData::from_table(&sample_table()).unwrap();
        assert_eq!(gd.len(), 4);
        assert!(gd.preprocessing().is_empty());
    }

    #[test]
    fn test_descending_key_order() {
        let gd = GridData::from_table(&sample_table()).unwrap();
        let ids: Vec<&str> = gd.samples().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "b", "a", "a"]);
        // within one ID, z descends too
        assert!(gd.samples()[0].z > gd.samples()[1].z);
    }

    #[test]
    fn test_custom_column_names_round_trip() {
        let table = Table::new()
            .with_text("hole", vec!["w1".into(), "w2".into()])
            .unwrap()
            .with_numeric("east", vec![100.0, 200.0])
            .unwrap()
            .with_numeric("north", vec![50.0, 60.0])
            .unwrap()
            .with_numeric("depth", vec![-1.0, -2.0])
            .unwrap()
            .with_numeric("grade", vec![0.5, 0.7])
            .unwrap();
        let columns = ColumnMap {
            id: "hole".into(),
            x: "east".into(),
            y: "north".into(),
            z: "depth".into(),
            v: "grade".into(),
        };
        let gd = GridData::new(&table, &columns, PreprocessingParams::default()).unwrap();

        let matrix = gd.to_matrix();
        assert_eq!(matrix.dim(), (2, 4));
        // index order is descending by key, so w2 first
        assert_relative_eq!(matrix[[0, 0]], 200.0);
        assert_relative_eq!(matrix[[0, 3]], 0.7);
        assert_relative_eq!(matrix[[1, 0]], 100.0);
        assert_relative_eq!(matrix[[1, 3]], 0.5);
    }

    #[test]
    fn test_missing_column() {
        let table = Table::new()
            .with_numeric("X", vec![0.0])
            .unwrap()
            .with_numeric("Y", vec![0.0])
            .unwrap();
        let err = GridData::from_table(&table).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let samples = vec![
            Sample::new("a", 0.0, 0.0, 1.0, 1.0),
            Sample::new("a", 0.0, 0.0, 1.0, 2.0),
        ];
        let err = GridData::from_samples(samples, PreprocessingParams::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));
    }

    #[test]
    fn test_specs() {
        let gd = GridData::from_table(&sample_table()).unwrap();
        let specs = gd.specs().unwrap();
        assert_relative_eq!(specs.xmin, 0.0);
        assert_relative_eq!(specs.xmax, 10.0);
        assert_relative_eq!(specs.ymax, 5.0);
        assert_relative_eq!(specs.zmin, 1.0);
        assert_relative_eq!(specs.vmin, 1.0);
        assert_relative_eq!(specs.vmax, 4.0);
        assert_relative_eq!(specs.xsize(), 10.0);
        assert_relative_eq!(specs.ysize(), 5.0);
        assert_relative_eq!(specs.zsize(), 1.0);
    }

    #[test]
    fn test_specs_empty_data() {
        let gd = GridData::from_samples(vec![], PreprocessingParams::default()).unwrap();
        assert!(gd.specs().is_err());
    }

    #[test]
    fn test_unique_ids() {
        let gd = GridData::from_table(&sample_table()).unwrap();
        assert_eq!(gd.unique_ids(), vec!["b", "a"]);
    }

    #[test]
    fn test_params_record_serde() {
        let params = PreprocessingParams {
            downsampling: Some(DownsamplingRecord { resolution: 2.0 }),
            normalization: None,
            standardization: Some(StandardizationRecord {
                mean: 5.0,
                std: 2.0,
            }),
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: PreprocessingParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
        assert!(!back.is_empty());
        assert!(PreprocessingParams::default().is_empty());
    }
}
