use approx::assert_relative_eq;
use rand::Rng;
use scatter_density::{
    Axis, DensityEngine, DensityError, EngineOptions, ScaleKind, SlotState, StaticScales, Symlog,
};

fn options(downres_factor: u32) -> EngineOptions {
    EngineOptions::new()
        .downres_factor(downres_factor)
        .linthresh(1.0)
        .linscale(1.0)
        .build()
        .unwrap()
}

fn scenario_points() -> (Vec<f64>, Vec<f64>) {
    let x = vec![1.0, 2.0, 3.0, 4.0, 100.0];
    (x.clone(), x)
}

fn random_points(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rng = rand::rng();
    let x = (0..n).map(|_| rng.random_range(-50.0..50.0)).collect();
    let y = (0..n).map(|_| rng.random_range(0.0..10.0)).collect();
    (x, y)
}

fn data_range(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

#[test]
fn test_linear_counts_sum_to_point_count() {
    let (x, y) = random_points(5_000);
    let range = (data_range(&y), data_range(&x));
    let mut engine =
        DensityEngine::new(StaticScales::default(), x, y, None, &options(4)).unwrap();

    for bins in [(1, 1), (7, 13), (64, 32)] {
        let image = engine.compute(bins, range).unwrap();
        assert_eq!(image.shape(), &[bins.0, bins.1]);
        assert_eq!(image.sum(), 5_000.0);
    }
}

#[test]
fn test_scenario_full_and_downres() {
    let (x, y) = scenario_points();
    let mut engine =
        DensityEngine::new(StaticScales::default(), x, y, None, &options(2)).unwrap();
    let range = ((0.0, 100.0), (0.0, 100.0));

    let full = engine.compute((2, 2), range).unwrap();
    assert_eq!(full.shape(), &[2, 2]);
    assert_eq!(full.sum(), 5.0);
    assert_eq!(full[[0, 0]], 4.0);
    assert_eq!(full[[1, 1]], 1.0);

    engine.downres();
    let coarse = engine.compute_histogram((2, 2), range).unwrap();
    assert_eq!(coarse.bins, (1, 1));
    // Stride 4 keeps points 0 and 4
    assert_eq!(coarse.values[[0, 0]], 2.0);

    engine.upres();
    assert_eq!(engine.compute((2, 2), range).unwrap(), full);
}

#[test]
fn test_downres_shrinks_every_grid_by_factor() {
    let (x, y) = random_points(1_000);
    let mut engine =
        DensityEngine::new(StaticScales::default(), x, y, None, &options(3)).unwrap();
    engine.downres();
    let range = ((0.0, 10.0), (-50.0, 50.0));
    for (ny, nx) in [(9, 9), (10, 31), (2, 2)] {
        let grid = engine.compute_histogram((ny, nx), range).unwrap();
        assert_eq!(grid.bins, (ny / 3, nx / 3));
        assert_eq!(grid.values.shape(), &[ny / 3, nx / 3]);
    }
}

#[test]
fn test_set_xy_invalidates_log_cache() {
    let (x, y) = scenario_points();
    let mut engine =
        DensityEngine::new(StaticScales::uniform(ScaleKind::Log), x, y, None, &options(1))
            .unwrap();
    let range = ((1.0, 1000.0), (1.0, 1000.0));

    let before = engine.compute((3, 3), range).unwrap();
    assert_eq!(before[[0, 0]], 4.0);
    assert_eq!(engine.cache_state(Axis::X, ScaleKind::Log), SlotState::Computed);

    engine
        .set_xy(vec![500.0, 600.0, 700.0], vec![500.0, 600.0, 700.0])
        .unwrap();
    assert_eq!(engine.cache_state(Axis::X, ScaleKind::Log), SlotState::Absent);
    assert_eq!(engine.cache_state(Axis::Y, ScaleKind::Log), SlotState::Absent);

    let after = engine.compute((3, 3), range).unwrap();
    assert_eq!(after[[0, 0]], 0.0);
    assert_eq!(after[[2, 2]], 3.0);
    let cached = engine.cached_column(Axis::X, ScaleKind::Log).unwrap();
    assert_relative_eq!(cached.full()[0], 500f64.log10());
}

#[test]
fn test_zero_on_log_axis_is_invalid_not_counted() {
    let x = vec![0.0, 10.0, 100.0];
    let y = vec![1.5, 1.5, 1.5];
    let mut engine =
        DensityEngine::new(StaticScales::new("log", "linear"), x, y, None, &options(1)).unwrap();

    let image = engine.compute((1, 2), ((1.0, 2.0), (1.0, 100.0))).unwrap();
    let transformed = engine.cached_column(Axis::X, ScaleKind::Log).unwrap();
    assert!(!transformed.full()[0].is_finite());
    assert_eq!(image[[0, 0]], 0.0);
    assert_eq!(image[[0, 1]], 2.0);
    assert_eq!(image.sum(), 2.0);
}

#[test]
fn test_negative_values_on_log_axis_become_nan() {
    let x = vec![-5.0, 5.0];
    let mut engine =
        DensityEngine::new(StaticScales::uniform(ScaleKind::Log), x.clone(), x, None, &options(1))
            .unwrap();
    let image = engine.compute((2, 2), ((1.0, 10.0), (1.0, 10.0))).unwrap();
    assert!(engine.cached_column(Axis::Y, ScaleKind::Log).unwrap().full()[0].is_nan());
    assert_eq!(image.sum(), 1.0);
}

#[test]
fn test_unit_weights_reproduce_counts() {
    let (x, y) = random_points(2_000);
    let range = ((0.0, 10.0), (-50.0, 50.0));
    let mut counted =
        DensityEngine::new(StaticScales::default(), x.clone(), y.clone(), None, &options(2))
            .unwrap();
    let mut weighted =
        DensityEngine::new(StaticScales::default(), x, y, Some(vec![1.0; 2_000]), &options(2))
            .unwrap();

    let counts = counted.compute((20, 20), range).unwrap();
    let averages = weighted.compute((20, 20), range).unwrap();
    for (count, average) in counts.iter().zip(averages.iter()) {
        if *count == 0.0 {
            assert!(average.is_nan());
        } else {
            assert_eq!(*average, 1.0);
        }
    }
}

#[test]
fn test_weighted_average_per_bin() {
    let x = vec![10.0, 20.0, 30.0, 90.0];
    let y = vec![10.0, 10.0, 10.0, 90.0];
    let c = vec![1.0, 2.0, 6.0, 5.0];
    let mut engine =
        DensityEngine::new(StaticScales::default(), x, y, Some(c), &options(1)).unwrap();

    let image = engine.compute((2, 2), ((0.0, 100.0), (0.0, 100.0))).unwrap();
    assert_relative_eq!(image[[0, 0]], 3.0);
    assert_relative_eq!(image[[1, 1]], 5.0);
    assert!(image[[0, 1]].is_nan());
    assert!(image[[1, 0]].is_nan());
}

#[test]
fn test_unsupported_scale_is_an_error() {
    let (x, y) = scenario_points();
    let mut engine =
        DensityEngine::new(StaticScales::new("linear", "logit"), x, y, None, &options(2)).unwrap();

    let err = engine
        .compute((2, 2), ((0.0, 100.0), (0.0, 100.0)))
        .unwrap_err();
    assert!(matches!(
        err,
        DensityError::UnsupportedScale { axis: Axis::Y, .. }
    ));

    engine.surface_mut().set_y_scale("linear");
    engine.surface_mut().set_x_scale("exp");
    let err = engine
        .compute((2, 2), ((0.0, 100.0), (0.0, 100.0)))
        .unwrap_err();
    assert!(matches!(
        err,
        DensityError::UnsupportedScale { axis: Axis::X, .. }
    ));
}

#[test]
fn test_scale_change_between_calls_without_new_data() {
    let (x, y) = scenario_points();
    let mut engine =
        DensityEngine::new(StaticScales::default(), x, y, None, &options(1)).unwrap();
    let range = ((1.0, 100.0), (1.0, 100.0));

    let linear = engine.compute((2, 2), range).unwrap();
    assert_eq!(linear[[0, 0]], 4.0);

    engine.surface_mut().set_x_scale("log");
    engine.surface_mut().set_y_scale("log");
    let log = engine.compute((2, 2), range).unwrap();
    // log10 of 1..4 lands below 1 (the midpoint of [0, 2]), 100 at the top edge
    assert_eq!(log[[0, 0]], 4.0);
    assert_eq!(log[[1, 1]], 1.0);

    engine.surface_mut().set_x_scale("symlog");
    let grid = engine.compute_histogram((2, 2), range).unwrap();
    assert_eq!(grid.x_scale, ScaleKind::Symlog);
    assert_eq!(grid.total(), 5.0);
}

#[test]
fn test_symlog_bins_signed_data() {
    let x = vec![-100.0, -0.5, 0.5, 50.0, 100.0];
    let y = vec![0.0; 5];
    let mut engine =
        DensityEngine::new(StaticScales::new("symlog", "linear"), x, y, None, &options(1))
            .unwrap();

    let image = engine.compute((1, 2), ((-1.0, 1.0), (-100.0, 100.0))).unwrap();
    // The transformed range is symmetric, so the sign decides the column
    assert_eq!(image[[0, 0]], 2.0);
    assert_eq!(image[[0, 1]], 3.0);
}

#[test]
fn test_symlog_cache_keeps_old_parameters_until_cleared() {
    let x = vec![50.0];
    let y = vec![0.0];
    let mut engine =
        DensityEngine::new(StaticScales::new("symlog", "linear"), x, y, None, &options(1))
            .unwrap();
    engine.compute((1, 1), ((-1.0, 1.0), (0.0, 100.0))).unwrap();
    let original = Symlog::new(1.0, 1.0, 10.0).forward(50.0);
    assert_relative_eq!(
        engine.cached_column(Axis::X, ScaleKind::Symlog).unwrap().full()[0],
        original
    );

    engine.set_linthresh(Some(10.0));
    let grid = engine
        .compute_histogram((1, 1), ((-1.0, 1.0), (0.0, 100.0)))
        .unwrap();
    // Range bounds follow the new threshold, the cached column does not
    let ((_, _), (_, xmax)) = grid.range;
    assert_relative_eq!(xmax, Symlog::new(10.0, 1.0, 10.0).forward(100.0));
    assert_relative_eq!(
        engine.cached_column(Axis::X, ScaleKind::Symlog).unwrap().full()[0],
        original
    );

    engine.clear_scale_cache();
    engine.compute((1, 1), ((-1.0, 1.0), (0.0, 100.0))).unwrap();
    assert_relative_eq!(
        engine.cached_column(Axis::X, ScaleKind::Symlog).unwrap().full()[0],
        Symlog::new(10.0, 1.0, 10.0).forward(50.0)
    );
}

#[test]
fn test_set_c_uses_current_stride() {
    let (x, y) = random_points(100);
    let mut engine =
        DensityEngine::new(StaticScales::default(), x, y, None, &options(3)).unwrap();
    let c: Vec<f64> = (0..100).map(|i| f64::from(i * i)).collect();
    engine.set_c(Some(c)).unwrap();
    let range = ((0.0, 10.0), (-50.0, 50.0));

    // Mean of i² over all 100 points
    let full = engine.compute((1, 1), range).unwrap();
    assert_relative_eq!(full[[0, 0]], 3283.5);

    // Stride 9 keeps i = 0, 9, .., 99: mean of (9k)² for k in 0..12
    engine.downres();
    let coarse = engine.compute((3, 3), range).unwrap();
    assert_eq!(coarse.shape(), &[1, 1]);
    assert_relative_eq!(coarse[[0, 0]], 3415.5);
}

#[test]
fn test_options_from_json_drive_engine() {
    let options =
        EngineOptions::from_json(r#"{ "downres_factor": 2, "linthresh": 1.0, "linscale": 0.5 }"#)
            .unwrap();
    let (x, y) = scenario_points();
    let engine = DensityEngine::new(StaticScales::default(), x, y, None, &options).unwrap();
    assert_eq!(engine.downres_factor(), 2);
    assert_eq!(engine.stride(), 4);
    assert_eq!(engine.symlog_params().linscale, Some(0.5));
    assert_eq!(engine.len(), 5);
}
