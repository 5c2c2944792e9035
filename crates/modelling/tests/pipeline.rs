//! End-to-end pipeline tests over the public API.

use volgrid_core::{Grid3D, GridData, PreprocessingParams, Sample, Table};
use volgrid_modelling::models::{KrigingParams, ModelParams};
use volgrid_modelling::preprocessor::{PreprocessOptions, Preprocessor, reverse_preprocessing};
use volgrid_modelling::{InterpolateParams, Modeler, interpolate, interpolate_returning_model};

/// Four synthetic boreholes on a 50x50 footprint, four levels each,
/// value increasing with x and depth.
fn borehole_griddata() -> GridData {
    let mut ids = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut zs = Vec::new();
    let mut vs = Vec::new();
    for (i, (x, y)) in [(5.0, 5.0), (45.0, 10.0), (10.0, 45.0), (40.0, 40.0)]
        .into_iter()
        .enumerate()
    {
        for level in 0..4 {
            let z = level as f64 * 5.0;
            ids.push(format!("bh{i}"));
            xs.push(x);
            ys.push(y);
            zs.push(z);
            vs.push(1.0 + 0.05 * x + 0.1 * z);
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
fn idw_pipeline_fills_whole_grid() {
    let griddata = borehole_griddata();
    let expected_shape = Grid3D::from_griddata(&griddata, 5.0).unwrap().shape();
    let params = InterpolateParams {
        hull_restriction: false,
        ..Default::default()
    };
    let out = interpolate(griddata, "idw", 5.0, params).unwrap();
    assert_eq!(out.dim(), expected_shape);
    assert!(
        out.iter().all(|v| v.is_finite()),
        "IDW without a search radius must fill every node"
    );
}

#[test]
fn idw_is_exact_at_sample_nodes() {
    // samples placed exactly on grid nodes of a res-5 grid
    let samples = vec![
        Sample::new("a", 0.0, 0.0, 0.0, 10.0),
        Sample::new("a", 0.0, 0.0, 5.0, 20.0),
        Sample::new("b", 15.0, 10.0, 0.0, 30.0),
        Sample::new("b", 15.0, 10.0, 5.0, 40.0),
    ];
    let griddata = GridData::from_samples(samples, PreprocessingParams::default()).unwrap();
    let grid3d = Grid3D::new(0.0, 20.0, 5.0, 0.0, 15.0, 5.0, 0.0, 10.0, 5.0).unwrap();
    let mut modeler = Modeler::new(griddata, grid3d, "idw", None).unwrap();
    let results = modeler.predict().unwrap();
    assert_eq!(results.interpolated[[0, 0, 0]], 10.0);
    assert_eq!(results.interpolated[[0, 0, 1]], 20.0);
    assert_eq!(results.interpolated[[3, 2, 0]], 30.0);
    assert_eq!(results.interpolated[[3, 2, 1]], 40.0);
}

#[test]
fn kriging_pipeline_returns_variance_everywhere() {
    let griddata = borehole_griddata();
    let params = InterpolateParams {
        model_params: Some(ModelParams::OrdinaryKriging(KrigingParams::default())),
        ..Default::default()
    };
    let (out, modeler) =
        interpolate_returning_model(griddata, "ordinary_kriging", 10.0, params).unwrap();
    let results = modeler.results().expect("results should be stored");
    assert!(results.has_variance());
    assert_eq!(results.variance.dim(), out.dim());
    assert!(
        results
            .variance
            .iter()
            .all(|v| v.is_nan() || *v >= 0.0),
        "kriging variance is non-negative wherever defined"
    );
}

#[test]
fn preprocessed_pipeline_returns_original_scale() {
    let griddata = borehole_griddata();
    let raw_min = griddata
        .samples()
        .iter()
        .map(|s| s.v)
        .fold(f64::INFINITY, f64::min);
    let raw_max = griddata
        .samples()
        .iter()
        .map(|s| s.v)
        .fold(f64::NEG_INFINITY, f64::max);

    let params = InterpolateParams {
        preprocess: Some(PreprocessOptions::default()),
        ..Default::default()
    };
    let out = interpolate(griddata, "idw", 5.0, params).unwrap();
    // IDW estimates are convex combinations, so after reversing the
    // standardization every node lies within the raw value range
    for v in out.iter().filter(|v| v.is_finite()) {
        assert!(
            *v >= raw_min - 1e-9 && *v <= raw_max + 1e-9,
            "node value {v} outside raw range [{raw_min}, {raw_max}]"
        );
    }
}

#[test]
fn preprocess_then_reverse_restores_samples() {
    let griddata = borehole_griddata();
    let options = PreprocessOptions {
        downsampling_res: Some(10.0),
        ..Default::default()
    };
    let processed = Preprocessor::with_options(&griddata, options)
        .preprocess()
        .unwrap();
    assert!(!processed.preprocessing().is_empty());
    // downsampling res 10 over z in {0, 5, 10, 15} leaves 3 blocks per hole
    assert_eq!(processed.len(), 12);

    let reversed = reverse_preprocessing(&processed).unwrap();
    assert!(reversed.preprocessing().is_empty());
    for s in reversed.samples() {
        assert!((0.0..=50.0).contains(&s.x), "x left normalized: {}", s.x);
        assert!(s.v > 0.5, "v left standardized: {}", s.v);
    }
}

#[test]
fn unsupported_model_name_is_reported() {
    let err = interpolate(
        borehole_griddata(),
        "universal_kriging",
        5.0,
        InterpolateParams::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("universal_kriging"));
}

#[test]
fn repeated_predict_replaces_results() {
    let griddata = borehole_griddata();
    let grid3d = Grid3D::from_griddata(&griddata, 10.0).unwrap();
    let mut modeler = Modeler::new(griddata, grid3d, "idw", None).unwrap();
    let first = modeler.predict().unwrap().interpolated.clone();
    let second = modeler.predict().unwrap().interpolated.clone();
    assert_eq!(first, second);
    assert!(modeler.grid3d().results().is_some());
}
