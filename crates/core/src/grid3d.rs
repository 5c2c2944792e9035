//! Regular 3D sampling grids
//!
//! [`Grid3D`] composes three [`GridAxis`] instances into the destination
//! sampling domain of an interpolation run. The dense per-axis sample
//! arrays, the 3D mesh and the normalized-coordinate variant are derived
//! views over the immutable axes; attaching [`GridResults`] is the only
//! mutation a grid permits after construction.

use ndarray::{Array1, Array3};

use crate::error::{Error, Result};
use crate::griddata::GridData;

/// Coordinate axis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }

    /// Parse an axis label.
    ///
    /// # Errors
    /// [`Error::InvalidAxis`] for anything other than `X`, `Y`, `Z`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "X" => Ok(Axis::X),
            "Y" => Ok(Axis::Y),
            "Z" => Ok(Axis::Z),
            other => Err(Error::InvalidAxis(other.into())),
        }
    }
}

/// One regularly-spaced coordinate axis.
///
/// The sample sequence is the half-open stepped range `[min, max)` with
/// step `res`, materialized eagerly at construction:
/// `len == ceil((max - min) / res)`, strictly increasing, starting at
/// `min` and ending strictly below `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    name: Axis,
    min: f64,
    max: f64,
    res: f64,
    samples: Array1<f64>,
}

impl GridAxis {
    pub fn new(name: Axis, min: f64, max: f64, res: f64) -> Result<Self> {
        if !(res > 0.0) {
            return Err(Error::InvalidParameter {
                name: "res",
                value: res.to_string(),
                reason: format!("axis {} resolution must be positive", name.as_str()),
            });
        }
        if !(max > min) {
            return Err(Error::InvalidParameter {
                name: "max",
                value: max.to_string(),
                reason: format!("axis {} max must exceed min {}", name.as_str(), min),
            });
        }
        let n = ((max - min) / res).ceil() as usize;
        let samples = Array1::from_iter((0..n).map(|i| min + i as f64 * res));
        Ok(Self {
            name,
            min,
            max,
            res,
            samples,
        })
    }

    pub fn name(&self) -> Axis {
        self.name
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn res(&self) -> f64 {
        self.res
    }

    /// The 1D sample sequence
    pub fn grid(&self) -> &Array1<f64> {
        &self.samples
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Per-axis 1D sample arrays of a [`Grid3D`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridArrays {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub z: Array1<f64>,
}

impl GridArrays {
    pub fn axis(&self, axis: Axis) -> &Array1<f64> {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Dense 3D coordinate mesh, one array per axis.
///
/// Shape is `(ny, nx, nz)` — "xy" indexing with row=Y, col=X, depth=Z,
/// the layout the statistical backend family expects. Interpolation
/// results use the separate canonical `(nx, ny, nz)` order; see
/// [`GridResults`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh3 {
    pub x: Array3<f64>,
    pub y: Array3<f64>,
    pub z: Array3<f64>,
}

/// Grid resolution of a [`Grid3D`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridRes {
    /// All three axes share one resolution
    Uniform(f64),
    /// Per-axis resolutions
    PerAxis { x: f64, y: f64, z: f64 },
}

/// Interpolation output attached to a [`Grid3D`].
///
/// Both surfaces are in the canonical `(nx, ny, nz)` order, index
/// `[ix, iy, iz]` addressing the node `(x[ix], y[iy], z[iz])`. A
/// deterministic backend with no variance surface carries an **empty**
/// variance array, keeping the two-surface schema uniform.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResults {
    pub interpolated: Array3<f64>,
    pub variance: Array3<f64>,
}

impl GridResults {
    /// Whether a variance surface is present (statistical backends only)
    pub fn has_variance(&self) -> bool {
        self.variance.len() > 0
    }
}

/// A 3D sampling domain of three independently regular axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3D {
    x: GridAxis,
    y: GridAxis,
    z: GridAxis,
    results: Option<GridResults>,
}

impl Grid3D {
    /// Build from explicit per-axis bounds and resolutions.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x_min: f64,
        x_max: f64,
        x_res: f64,
        y_min: f64,
        y_max: f64,
        y_res: f64,
        z_min: f64,
        z_max: f64,
        z_res: f64,
    ) -> Result<Self> {
        Ok(Self {
            x: GridAxis::new(Axis::X, x_min, x_max, x_res)?,
            y: GridAxis::new(Axis::Y, y_min, y_max, y_res)?,
            z: GridAxis::new(Axis::Z, z_min, z_max, z_res)?,
            results: None,
        })
    }

    /// Build a regular grid: one shared resolution across all three axes.
    pub fn regular(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        z_min: f64,
        z_max: f64,
        gridres: f64,
    ) -> Result<Self> {
        Self::new(
            x_min, x_max, gridres, y_min, y_max, gridres, z_min, z_max, gridres,
        )
    }

    /// Build a regular grid from a dataset's coordinate extents.
    ///
    /// This is the standard way grids are produced in the pipeline.
    pub fn from_griddata(griddata: &GridData, gridres: f64) -> Result<Self> {
        let specs = griddata.specs()?;
        Self::regular(
            specs.xmin, specs.xmax, specs.ymin, specs.ymax, specs.zmin, specs.zmax, gridres,
        )
    }

    pub fn axis(&self, axis: Axis) -> &GridAxis {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Axis accessor by label.
    ///
    /// # Errors
    /// [`Error::InvalidAxis`] for an unrecognized label.
    pub fn axis_by_name(&self, name: &str) -> Result<&GridAxis> {
        Ok(self.axis(Axis::from_name(name)?))
    }

    /// Canonical result shape `(nx, ny, nz)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.x.len(), self.y.len(), self.z.len())
    }

    /// Total number of grid cells
    pub fn n_cells(&self) -> usize {
        self.x.len() * self.y.len() * self.z.len()
    }

    /// Per-axis 1D sample arrays (cheap clones of the immutable axes)
    pub fn grid(&self) -> GridArrays {
        GridArrays {
            x: self.x.grid().clone(),
            y: self.y.grid().clone(),
            z: self.z.grid().clone(),
        }
    }

    /// Per-axis sample arrays linearly rescaled to `[0, 1]` using each
    /// axis's own sample min/max (the grid's samples, not the source
    /// data's extents). An axis with a single sample maps to 0.0; its
    /// only sample sits at the axis minimum.
    pub fn normalized_grid(&self) -> GridArrays {
        let rescale = |axis: &GridAxis| {
            let g = axis.grid();
            let lo = g[0];
            let hi = g[g.len() - 1];
            if hi == lo {
                return Array1::zeros(g.len());
            }
            g.mapv(|v| (v - lo) / (hi - lo))
        };
        GridArrays {
            x: rescale(&self.x),
            y: rescale(&self.y),
            z: rescale(&self.z),
        }
    }

    /// Dense 3D coordinate mesh in "xy" indexing, shape `(ny, nx, nz)`.
    pub fn mesh(&self) -> Mesh3 {
        let (nx, ny, nz) = self.shape();
        let gx = self.x.grid();
        let gy = self.y.grid();
        let gz = self.z.grid();
        Mesh3 {
            x: Array3::from_shape_fn((ny, nx, nz), |(_, i, _)| gx[i]),
            y: Array3::from_shape_fn((ny, nx, nz), |(j, _, _)| gy[j]),
            z: Array3::from_shape_fn((ny, nx, nz), |(_, _, k)| gz[k]),
        }
    }

    /// Grid resolution: uniform when all axes agree, per-axis otherwise
    pub fn gridres(&self) -> GridRes {
        if self.x.res() == self.y.res() && self.y.res() == self.z.res() {
            GridRes::Uniform(self.x.res())
        } else {
            GridRes::PerAxis {
                x: self.x.res(),
                y: self.y.res(),
                z: self.z.res(),
            }
        }
    }

    /// Attached interpolation results, if a prediction has run
    pub fn results(&self) -> Option<&GridResults> {
        self.results.as_ref()
    }

    /// Attach interpolation results. Last write wins.
    ///
    /// # Errors
    /// [`Error::ResultShape`] if the interpolated surface (or a non-empty
    /// variance surface) does not have the canonical `(nx, ny, nz)` shape.
    pub fn set_results(&mut self, results: GridResults) -> Result<()> {
        let expected = self.shape();
        if results.interpolated.dim() != expected {
            return Err(Error::ResultShape {
                expected,
                got: results.interpolated.dim(),
            });
        }
        if results.has_variance() && results.variance.dim() != expected {
            return Err(Error::ResultShape {
                expected,
                got: results.variance.dim(),
            });
        }
        self.results = Some(results);
        Ok(())
    }
}
