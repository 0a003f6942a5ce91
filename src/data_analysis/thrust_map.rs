// src/data_analysis/thrust_map.rs
//
// Thrust map fitted on thrust-stand data: ESC signal as a polynomial surface
// of thrust and battery voltage, plus its text reports.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::data_analysis::curve_fit::{fit_surface, FitStatistics, SurfaceFit};
use crate::data_analysis::polynomial::SurfaceModel;
use crate::data_input::stand_data::{esc_signal_values, thrust_values, voltage_values, StandSample};
use crate::error::Result;

/// Fits `ESC signal = f(thrust, voltage)` on filtered stand samples.
pub fn fit_thrust_map(samples: &[StandSample], model: SurfaceModel) -> Result<SurfaceFit> {
    log::info!("Fitting {} thrust map on {} samples", model, samples.len());
    let fit = fit_surface(
        &thrust_values(samples),
        &voltage_values(samples),
        &esc_signal_values(samples),
        model,
    )?;
    log::info!(
        "Fitted curve (mean |error| {:.3} µs, max {:.3} µs)",
        fit.statistics.mean_abs_error,
        fit.statistics.max_abs_error
    );
    Ok(fit)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes the coefficient report, one lettered line per coefficient.
pub fn store_coefficients(fit: &SurfaceFit, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut file = fs::File::create(path)?;
    writeln!(file, "The polynomial fitted is {} order.", fit.model.degree_name())?;
    writeln!(file, "Coefficients: ")?;
    for (letter, c) in ('a'..='z').zip(&fit.coefficients) {
        writeln!(file, "{letter}: {c}")?;
    }
    log::info!("Coefficients stored in '{}'", path.display());
    Ok(())
}

/// Evaluates the fitted map on every sample and returns the residual
/// statistics (computed − recorded ESC signal).
pub fn compute_fit_error(samples: &[StandSample], fit: &SurfaceFit) -> FitStatistics {
    let residuals: Vec<f64> = samples
        .iter()
        .map(|s| fit.evaluate(s.thrust_n, s.voltage_v) - s.esc_signal_us)
        .collect();
    FitStatistics::from_residuals(&residuals)
}

/// Writes the fitting error report.
pub fn store_error_report(statistics: &FitStatistics, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut file = fs::File::create(path)?;
    writeln!(file, "Mean Error Mutli: {}", statistics.mean_abs_error)?;
    writeln!(file, "Standard Deviation of Error Multi: {}", statistics.std_error)?;
    log::info!(
        "Fitting error report stored in '{}' (mean {}, std {})",
        path.display(),
        statistics.mean_abs_error,
        statistics.std_error
    );
    Ok(())
}
