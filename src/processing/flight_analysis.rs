// src/processing/flight_analysis.rs
//
// Per-flight correction factor analysis: fits γ(B) on one flight, predicts the
// throttle with and without it and compares against what was flown.

use std::path::Path;

use crate::data_analysis::compute_results::{
    compute_error, compute_thrust, compute_throttle, ErrorSeries, ThrottleModel,
};
use crate::data_analysis::curve_fit::{fit_polynomial, CurveFit};
use crate::data_analysis::disturbance_estimation::run_correction_factor;
use crate::data_analysis::signal_processing::{adjust_time_limits, data1_vs_data2};
use crate::error::Result;
use crate::plot_functions::plot_fitted_curve::plot_fitted_curve;
use crate::plot_functions::plot_series::{plot_series, AxisLimits};
use crate::processing::flight_preparation::ProcessedFlight;
use crate::types::{CorrectionFactorSeries, Series};

#[derive(Debug, Clone)]
pub struct FlightAnalysis {
    pub correction_factor: CorrectionFactorSeries,
    pub fit: CurveFit,
    /// Throttle predicted from measured thrust corrected by γ(B).
    pub throttle_with_cf: Series,
    /// Throttle predicted from the raw measured thrust.
    pub throttle_without_cf: Series,
    /// Commanded thrust divided by γ(B).
    pub thrust_commanded_with_cf: Series,
    pub thrust_measured_with_cf: Series,
    pub thrust_error_without_cf_record: ErrorSeries,
    pub thrust_error: ErrorSeries,
    pub throttle_error_without_cf: ErrorSeries,
    pub throttle_error_with_cf: ErrorSeries,
}

impl FlightAnalysis {
    pub fn run(flight: &ProcessedFlight, degree: usize, model: &ThrottleModel) -> Result<Self> {
        log::info!("Analysing flight '{}'", flight.name);

        let correction_factor = run_correction_factor(
            &flight.thrust_commanded,
            &flight.thrust_measured,
            &flight.battery,
        );
        let fit = fit_polynomial(&correction_factor, degree)?;
        let cf = &fit.polynomial;
        log::info!(
            "'{}': γ(B) = {} (rmse {:.5})",
            flight.name,
            cf.equation("B"),
            fit.statistics.rmse
        );

        let throttle_with_cf =
            compute_throttle(&flight.thrust_measured, &flight.battery, Some(cf), model);
        let throttle_without_cf =
            compute_throttle(&flight.thrust_measured, &flight.battery, None, model);

        // Only meaningful for flights recorded without the correction factor.
        let thrust_commanded_with_cf =
            compute_thrust(&flight.thrust_commanded, &flight.battery, cf, false);
        let thrust_measured_with_cf =
            compute_thrust(&flight.thrust_measured, &flight.battery, cf, true);

        log::info!("Thrust error, commanded with γ(B) vs measured");
        let thrust_error_without_cf_record =
            compute_error(&flight.thrust_measured, &thrust_commanded_with_cf);
        log::info!("Thrust error, commanded vs measured");
        let thrust_error = compute_error(&flight.thrust_measured, &flight.thrust_commanded);

        log::info!("Throttle error without γ(B)");
        let throttle_error_without_cf = compute_error(
            &flight.throttle_commanded,
            &adjust_time_limits(&flight.throttle_commanded, &throttle_without_cf),
        );
        log::info!("Throttle error with γ(B)");
        let throttle_error_with_cf = compute_error(
            &flight.throttle_commanded,
            &adjust_time_limits(&flight.throttle_commanded, &throttle_with_cf),
        );

        Ok(Self {
            correction_factor,
            fit,
            throttle_with_cf,
            throttle_without_cf,
            thrust_commanded_with_cf,
            thrust_measured_with_cf,
            thrust_error_without_cf_record,
            thrust_error,
            throttle_error_without_cf,
            throttle_error_with_cf,
        })
    }

    /// Fitted γ(B) curve plus thrust, throttle error and throttle against
    /// battery voltage.
    pub fn plot_results(&self, flight: &ProcessedFlight, plot_dir: &Path) -> Result<()> {
        plot_fitted_curve(plot_dir, &self.correction_factor, &self.fit.polynomial)?;

        let battery = &flight.battery;
        let vs_battery = |data: &Series| data1_vs_data2(data, battery);
        let limits = AxisLimits::default();

        plot_series(
            plot_dir,
            "Thrust commanded vs Thrust measured",
            "Battery (V)",
            "Thrust (N)",
            &[
                ("Thrust commanded (N)".to_string(), vs_battery(&flight.thrust_commanded)),
                ("Thrust measured (N)".to_string(), vs_battery(&flight.thrust_measured)),
            ],
            &limits,
        )?;
        plot_series(
            plot_dir,
            "Throttle error vs Battery",
            "Battery (V)",
            "Throttle error (%)",
            &[
                ("Throttle error with γ(B)".to_string(), vs_battery(&self.throttle_error_with_cf.errors)),
                ("Throttle error without γ(B)".to_string(), vs_battery(&self.throttle_error_without_cf.errors)),
            ],
            &limits,
        )?;
        plot_series(
            plot_dir,
            "Throttle vs Battery",
            "Battery (V)",
            "Throttle (%)",
            &[
                ("Throttle with γ(B)".to_string(), vs_battery(&self.throttle_with_cf)),
                ("Throttle without γ(B)".to_string(), vs_battery(&self.throttle_without_cf)),
                ("Throttle commanded".to_string(), vs_battery(&flight.throttle_commanded)),
            ],
            &limits,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flight() -> ProcessedFlight {
        let n = 30;
        let time = |i: usize| 1000.0 + i as f64;
        let voltage = |i: usize| 16.8 - i as f64 * 0.05;
        // Commanded thrust exceeds measured by γ(V) = 0.5 + 0.03·V.
        let gamma = |v: f64| 0.5 + 0.03 * v;
        ProcessedFlight {
            name: "synthetic".to_string(),
            thrust_measured: (0..n).map(|i| (time(i), 9.5)).collect(),
            thrust_commanded: (0..n).map(|i| (time(i), 9.5 * gamma(voltage(i)))).collect(),
            battery: (0..n).map(|i| (time(i), voltage(i))).collect(),
            throttle_commanded: (0..n).map(|i| (time(i), 1400.0)).collect(),
            acceleration: (0..n).map(|i| (time(i), 9.5)).collect(),
            position: (0..n).map(|i| (time(i), 3.0)).collect(),
            logged_mass: 0.96,
        }
    }

    #[test]
    fn test_flight_analysis_recovers_gamma() {
        let flight = flight();
        let model = ThrottleModel::Linear { thrust_max: 44.0 };
        let analysis = FlightAnalysis::run(&flight, 2, &model).unwrap();

        let coeffs = analysis.fit.polynomial.coefficients();
        assert_abs_diff_eq!(coeffs[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(coeffs[1], 0.03, epsilon = 1e-6);
        assert_abs_diff_eq!(coeffs[2], 0.0, epsilon = 1e-6);

        // Commanded thrust divided by γ(B) equals the measured thrust.
        assert!(analysis.thrust_error_without_cf_record.mean < 1e-6);
        assert_eq!(analysis.thrust_error.errors.len(), flight.thrust_measured.len());
        assert_eq!(analysis.throttle_without_cf.len(), flight.battery.len());
        assert_abs_diff_eq!(
            analysis.throttle_without_cf[0].1,
            9.5 / 44.0 * 1000.0 + 1000.0,
            epsilon = 1e-9
        );
    }
}
