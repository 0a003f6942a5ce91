// tests/data_integration_test.rs
//
// CSV persistence, resampling and thrust map fitting through the public API.

use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;

use thrust_map_analysis::config::DataFilter;
use thrust_map_analysis::data_analysis::polynomial::SurfaceModel;
use thrust_map_analysis::data_analysis::signal_processing::fz_sample;
use thrust_map_analysis::data_analysis::thrust_map::{
    compute_fit_error, fit_thrust_map, store_coefficients,
};
use thrust_map_analysis::data_input::csv_results::{read_csv, save_data, unify_csvs};
use thrust_map_analysis::data_input::stand_data::{
    data_assemble, filter_data, write_stand_csv, DataSource, StandSample,
};

#[test]
fn test_csv_round_trip_preserves_columns() {
    let dir = tempfile::tempdir().unwrap();
    let a = [1.5, -2.25, 3.0];
    let b = [1e-3, 0.0, 12345.678];
    let path = save_data(&[&a, &b], &["A (x)", "B (y)"], "round.csv", &dir.path().join("nested")).unwrap();

    let table = read_csv(&path).unwrap();
    assert_eq!(table.column_names(), vec!["A (x)", "B (y)"]);
    assert_eq!(table.values("A (x)").unwrap(), a.to_vec());
    assert_eq!(table.values("B (y)").unwrap(), b.to_vec());
}

#[test]
fn test_unify_sums_row_counts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("experiment");
    let names = ["x", "y"];
    let sizes = [3usize, 5, 2];
    for (k, &n) in sizes.iter().enumerate() {
        let col: Vec<f64> = (0..n).map(|i| (k * 10 + i) as f64).collect();
        save_data(&[&col, &col], &names, &format!("flight_{k}.csv"), &input).unwrap();
    }

    let (path, rows) = unify_csvs(&input, &dir.path().join("results"), "experiment.csv")
        .unwrap()
        .unwrap();
    assert_eq!(rows, sizes.iter().sum::<usize>());
    let table = read_csv(&path).unwrap();
    assert_eq!(table.row_count(), rows);
    // Files are appended in name order.
    assert_eq!(table.values("x").unwrap()[3], 10.0);
}

#[test]
fn test_resampling_has_no_gaps() {
    let data: Vec<(f64, f64)> = [0.2, 0.7, 1.1, 4.9, 5.3, 9.95]
        .iter()
        .map(|&t| (t, t * 2.0))
        .collect();
    let resampled = fz_sample(&data, 1.0).unwrap();
    assert_eq!(resampled.first().unwrap().0, 0.0);
    assert_eq!(resampled.last().unwrap().0, 9.0);
    for pair in resampled.windows(2) {
        assert_abs_diff_eq!(pair[1].0 - pair[0].0, 1.0, epsilon = 1e-12);
    }
    assert!(resampled.iter().all(|(_, v)| v.is_finite()));
}

fn stand_samples(voltage: f64) -> Vec<StandSample> {
    // Bench convention: pulling thrust is negative.
    (0..20)
        .map(|i| {
            let thrust = 0.5 + i as f64 * 0.4;
            StandSample {
                esc_signal_us: 1000.0 + 60.0 * thrust - 5.0 * voltage + 0.8 * thrust * thrust,
                thrust_n: -thrust,
                current_a: thrust * 1.5,
                voltage_v: voltage,
            }
        })
        .collect()
}

fn write_bench(dir: &Path) {
    for (k, voltage) in [16.4, 15.6, 14.8, 14.0].iter().enumerate() {
        write_stand_csv(&stand_samples(*voltage), &dir.join(format!("run_{k}.csv"))).unwrap();
    }
    fs::write(dir.join("notes.csv"), "comment\nnot a bench export\n").unwrap();
}

#[test]
fn test_stand_data_fit_recovers_surface() {
    let dir = tempfile::tempdir().unwrap();
    write_bench(dir.path());

    let combined = dir.path().join("out").join("combined.csv");
    let samples = data_assemble(&DataSource::Directory(dir.path().to_path_buf()), Some(&combined)).unwrap();
    assert_eq!(samples.len(), 80);
    assert!(combined.exists());

    let filter = DataFilter {
        min_volt: 13.0,
        max_volt: 17.0,
        min_throttle: 900.0,
        max_throttle: 2000.0,
        min_thrust: 0.0,
        max_thrust: 100.0,
    };
    let filtered = filter_data(&samples, &filter);
    assert_eq!(filtered.len(), 80);
    assert!(filtered.iter().all(|s| s.thrust_n > 0.0));

    let fit = fit_thrust_map(&filtered, SurfaceModel::Second).unwrap();
    // a + bT + cV + dT² + eTV + fV²
    let expected = [1000.0, 60.0, -5.0, 0.8, 0.0, 0.0];
    for (c, e) in fit.coefficients.iter().zip(expected) {
        assert_abs_diff_eq!(*c, e, epsilon = 1e-5);
    }
    assert!(compute_fit_error(&filtered, &fit).max_abs_error < 1e-6);

    let report = dir.path().join("results").join("coefficients.txt");
    store_coefficients(&fit, &report).unwrap();
    let text = fs::read_to_string(&report).unwrap();
    assert!(text.starts_with("The polynomial fitted is 2nd order."));
    assert_eq!(text.lines().filter(|l| l.len() > 2 && l.as_bytes()[1] == b':').count(), 6);
}
