// src/processing/results_from_csv.rs
//
// Experiment-level results computed from a unified flight CSV: predicted
// throttle (linear, or thrust map with/without γ), and the error tables.

use std::path::{Path, PathBuf};

use crate::constants::{
    COL_THROTTLE, COL_THRUST_MEASURED, COL_THRUST_SENT, COL_VOLTAGE,
    DEFAULT_CORRECTION_FACTOR_DEGREE, ERROR_CSV_COLUMNS,
};
use crate::data_analysis::compute_results::{
    compute_error, compute_thrust, compute_throttle, ThrottleModel,
};
use crate::data_analysis::curve_fit::fit_polynomial;
use crate::data_analysis::disturbance_estimation::run_correction_factor;
use crate::data_analysis::polynomial::Polynomial1D;
use crate::data_analysis::signal_processing::data1_vs_data2;
use crate::data_input::csv_results::{get_vector_from_csv, read_csv, save_data, CsvTable};
use crate::error::Result;
use crate::plot_functions::plot_fitted_curve::plot_fitted_curve;
use crate::plot_functions::plot_series::{plot_series, AxisLimits};
use crate::types::Series;

/// Column pairings of a flight CSV used by the analysis.
#[derive(Debug, Clone, Default)]
struct FlightColumns {
    /// `(voltage, recorded throttle)`
    voltage_throttle: Series,
    /// `(recorded throttle, commanded thrust)`
    throttle_thrust_commanded: Series,
    /// `(recorded throttle, measured thrust)`
    throttle_thrust_measured: Series,
    /// `(voltage, voltage)`, the battery series keyed by itself
    voltage_voltage: Series,
}

impl FlightColumns {
    fn from_table(table: &CsvTable) -> Result<Self> {
        let voltage = table.column(COL_VOLTAGE)?;
        let throttle = table.column(COL_THROTTLE)?;
        Ok(Self {
            voltage_throttle: get_vector_from_csv(voltage, throttle),
            throttle_thrust_commanded: get_vector_from_csv(throttle, table.column(COL_THRUST_SENT)?),
            throttle_thrust_measured: get_vector_from_csv(throttle, table.column(COL_THRUST_MEASURED)?),
            voltage_voltage: get_vector_from_csv(voltage, voltage),
        })
    }
}

pub struct ResultsFromCsv {
    columns: FlightColumns,
    thrust_map: Vec<f64>,
    correction_factor: Option<Polynomial1D>,
    thrust_max: f64,
    plot_dir: PathBuf,
    /// `(voltage, predicted throttle)` after one of the throttle computations.
    voltage_vs_throttle: Series,
}

impl ResultsFromCsv {
    pub fn new(
        csv_path: &Path,
        thrust_map: Vec<f64>,
        correction_factor: Option<Polynomial1D>,
        thrust_max: f64,
        plot_dir: &Path,
    ) -> Result<Self> {
        let table = read_csv(csv_path)?;
        log::info!(
            "Loaded {} rows from '{}'",
            table.row_count(),
            csv_path.display()
        );
        Ok(Self {
            columns: FlightColumns::from_table(&table)?,
            thrust_map,
            correction_factor,
            thrust_max,
            plot_dir: plot_dir.to_path_buf(),
            voltage_vs_throttle: Vec::new(),
        })
    }

    pub fn correction_factor(&self) -> Option<&Polynomial1D> {
        self.correction_factor.as_ref()
    }

    pub fn voltage_vs_throttle(&self) -> &Series {
        &self.voltage_vs_throttle
    }

    fn set_throttle(&mut self, throttle: Series) {
        self.voltage_vs_throttle = data1_vs_data2(&throttle, &self.columns.voltage_voltage);
    }

    /// Linear approximation `T / t_max · 1000 + 1000` on measured thrust,
    /// corrected by γ(B) when one is configured.
    pub fn linear_approximation(&mut self) {
        let model = ThrottleModel::Linear { thrust_max: self.thrust_max };
        let throttle = compute_throttle(
            &self.columns.throttle_thrust_measured,
            &self.columns.voltage_voltage,
            self.correction_factor.as_ref(),
            &model,
        );
        self.set_throttle(throttle);
    }

    /// Thrust map applied to measured thrust corrected by the configured γ(B).
    /// Without a configured γ(B) the raw thrust is used.
    pub fn thrustmap_with_correction_factor(&mut self) {
        match &self.correction_factor {
            Some(cf) => log::info!("The equation for the correction factor is : {}", cf.equation("x")),
            None => log::warn!("No correction factor configured, using the thrust map alone"),
        }
        let model = ThrottleModel::ThrustMap {
            coefficients: self.thrust_map.clone(),
        };
        let throttle = compute_throttle(
            &self.columns.throttle_thrust_measured,
            &self.columns.voltage_voltage,
            self.correction_factor.as_ref(),
            &model,
        );
        self.set_throttle(throttle);
    }

    /// Fits γ(B) on this experiment, then applies the thrust map to the
    /// uncorrected measured thrust.
    pub fn thrustmap_without_correction_factor(&mut self) -> Result<()> {
        let correction_factor = run_correction_factor(
            &self.columns.throttle_thrust_commanded,
            &self.columns.throttle_thrust_measured,
            &self.columns.voltage_voltage,
        );
        let fit = fit_polynomial(&correction_factor, DEFAULT_CORRECTION_FACTOR_DEGREE)?;
        log::info!(
            "The equation for the correction factor is : {}",
            fit.polynomial.equation("x")
        );

        let model = ThrottleModel::ThrustMap {
            coefficients: self.thrust_map.clone(),
        };
        let throttle = compute_throttle(
            &self.columns.throttle_thrust_measured,
            &self.columns.voltage_voltage,
            None,
            &model,
        );
        self.set_throttle(throttle);

        plot_fitted_curve(&self.plot_dir, &correction_factor, &fit.polynomial)?;
        self.correction_factor = Some(fit.polynomial);
        Ok(())
    }

    /// Thrust and throttle errors of the experiment, written to
    /// `<output_dir>/<name>_errors.csv`.
    pub fn compute_error(&self, name: &str, output_dir: &Path) -> Result<PathBuf> {
        log::info!("Error between thrust commanded and measured");
        let error_thrust = compute_error(
            &self.columns.throttle_thrust_commanded,
            &self.columns.throttle_thrust_measured,
        );
        log::info!("Error throttle vs voltage");
        let error_throttle_vs_voltage =
            compute_error(&self.voltage_vs_throttle, &self.columns.voltage_throttle);
        let error_throttle_vs_thrust = data1_vs_data2(
            &error_throttle_vs_voltage.errors,
            &self.columns.throttle_thrust_measured,
        );

        let voltage: Vec<f64> = self.voltage_vs_throttle.iter().map(|p| p.0).collect();
        let thrust: Vec<f64> = self.columns.throttle_thrust_measured.iter().map(|p| p.1).collect();
        let et_v = error_throttle_vs_voltage.values();
        let et_t: Vec<f64> = error_throttle_vs_thrust.iter().map(|p| p.1).collect();
        let e_thrust = error_thrust.values();

        save_data(
            &[&voltage, &et_v, &thrust, &et_t, &e_thrust],
            &ERROR_CSV_COLUMNS,
            &format!("{name}_errors.csv"),
            output_dir,
        )
    }
}

/// For each flight CSV, plots the thrust the flight should have needed
/// (commanded thrust divided by γ(B)) next to the measured and commanded
/// thrust.
pub fn computed_thrust_expected(
    files: &[PathBuf],
    correction_factor: &Polynomial1D,
    plot_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut plots = Vec::with_capacity(files.len());
    for file in files {
        let columns = FlightColumns::from_table(&read_csv(file)?)?;
        let thrust_expected = compute_thrust(
            &columns.throttle_thrust_commanded,
            &columns.voltage_voltage,
            correction_factor,
            false,
        );
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        plots.push(plot_series(
            plot_dir,
            &format!("Compare Thrust from experiment of {stem}"),
            "Throttle (µs)",
            "Thrust (N)",
            &[
                ("Thrust expected".to_string(), thrust_expected),
                ("Thrust measured".to_string(), columns.throttle_thrust_measured),
                ("Thrust commanded".to_string(), columns.throttle_thrust_commanded),
            ],
            &AxisLimits::default(),
        )?);
    }
    Ok(plots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{COL_ERR_THROTTLE_VS_VOLTAGE, FLIGHT_CSV_COLUMNS};
    use approx::assert_abs_diff_eq;

    fn write_flight_csv(dir: &Path) -> PathBuf {
        let rows = 10;
        let columns: Vec<Vec<f64>> = vec![
            (0..rows).map(|i| 9.0 + i as f64 * 0.1).collect(),
            (0..rows).map(|i| 9.0 + i as f64 * 0.1).collect(),
            (0..rows).map(|i| 16.5 - i as f64 * 0.1).collect(),
            vec![9.81; rows],
            vec![0.96; rows],
            (0..rows).map(|i| 1300.0 + i as f64 * 10.0).collect(),
            vec![3.0; rows],
            (0..rows).map(|i| i as f64).collect(),
        ];
        let slices: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
        save_data(&slices, &FLIGHT_CSV_COLUMNS, "exp.csv", dir).unwrap()
    }

    #[test]
    fn test_linear_approximation_and_error_table() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_flight_csv(dir.path());
        let mut results =
            ResultsFromCsv::new(&csv, vec![0.0; 6], None, 44.0, dir.path()).unwrap();
        results.linear_approximation();

        let throttle = results.voltage_vs_throttle();
        assert_eq!(throttle.len(), 10);
        assert_abs_diff_eq!(throttle[0].0, 16.5);
        assert_abs_diff_eq!(throttle[0].1, 9.0 / 44.0 * 1000.0 + 1000.0, epsilon = 1e-9);

        let errors_dir = dir.path().join("errors");
        let path = results.compute_error("exp", &errors_dir).unwrap();
        assert_eq!(path.file_name().unwrap(), "exp_errors.csv");
        let table = read_csv(&path).unwrap();
        assert_eq!(table.column_names(), ERROR_CSV_COLUMNS.to_vec());
        assert_eq!(table.row_count(), 10);
        let et_v = table.values(COL_ERR_THROTTLE_VS_VOLTAGE).unwrap();
        assert_abs_diff_eq!(et_v[0], (1300.0 - (9.0 / 44.0 * 1000.0 + 1000.0)) / 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_thrustmap_with_configured_correction_factor() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_flight_csv(dir.path());
        let cf = Polynomial1D::from_coefficients(vec![2.0, 0.0, 0.0]).unwrap();
        // throttle = 1000 + 100·T_motor
        let tm = vec![1000.0, 100.0, 0.0, 0.0, 0.0, 0.0];
        let mut results = ResultsFromCsv::new(&csv, tm, Some(cf), 44.0, dir.path()).unwrap();
        results.thrustmap_with_correction_factor();
        // 9.0 N doubled by γ, split over four motors.
        assert_abs_diff_eq!(results.voltage_vs_throttle()[0].1, 1000.0 + 100.0 * 4.5, epsilon = 1e-9);
    }
}
