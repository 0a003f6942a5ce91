// src/plot_functions/plot_experiments.rs
//
// Overlays of several experiment CSVs: throttle/thrust errors, hover height
// and battery discharge.

use std::path::{Path, PathBuf};

use crate::constants::{
    COL_ERR_THROTTLE_VS_THRUST, COL_ERR_THROTTLE_VS_VOLTAGE, COL_ERR_THRUST,
    COL_ERR_THRUST_PERCENT, COL_ERR_VOLTAGE, COL_POSITION_Z, COL_TIME, COL_VOLTAGE,
};
use crate::data_input::csv_results::{get_vector_from_csv, read_csv};
use crate::error::{AnalysisError, Result};
use crate::plot_functions::plot_series::{plot_series, AxisLimits};
use crate::types::Series;

/// Default hover height reference (m).
pub const DEFAULT_POSITION_REFERENCE_M: f64 = 3.0;
const POSITION_PLOT_TIME_LIMIT_S: f64 = 200.0;

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Column shifted so its first value is zero. Missing cells stay missing.
pub fn synchronize_time(time: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some(t0) = time.iter().flatten().next().copied() else {
        return time.to_vec();
    };
    time.iter().map(|t| t.map(|t| t - t0)).collect()
}

/// Error overlays, one series per error CSV.
pub fn plot_errors(plot_dir: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut errors_v = Vec::new();
    let mut errors_t = Vec::new();
    let mut errors_thrust = Vec::new();

    for file in files {
        let table = read_csv(file)?;
        let label = file_label(file);
        errors_v.push((
            label.clone(),
            get_vector_from_csv(table.column(COL_ERR_VOLTAGE)?, table.column(COL_ERR_THROTTLE_VS_VOLTAGE)?),
        ));
        errors_t.push((
            label.clone(),
            get_vector_from_csv(table.column(COL_ERR_THRUST)?, table.column(COL_ERR_THROTTLE_VS_THRUST)?),
        ));
        errors_thrust.push((
            label,
            get_vector_from_csv(table.column(COL_ERR_VOLTAGE)?, table.column(COL_ERR_THRUST_PERCENT)?),
        ));
    }

    let limits = AxisLimits::default();
    Ok(vec![
        plot_series(plot_dir, "Throttle error vs Battery", "Battery (V)", "Throttle error (%)", &errors_v, &limits)?,
        plot_series(plot_dir, "Throttle error vs Thrust", "Thrust (N)", "Throttle error (%)", &errors_t, &limits)?,
        plot_series(plot_dir, "Thrust error vs Battery", "Battery (V)", "Thrust error (%)", &errors_thrust, &limits)?,
    ])
}

/// Height over time of every flight, time-aligned to each flight's start,
/// with a constant reference line.
pub fn plot_position_z(plot_dir: &Path, files: &[PathBuf], reference: f64) -> Result<PathBuf> {
    let mut curves: Vec<(String, Series)> = Vec::new();
    let mut first_time: Option<Vec<Option<f64>>> = None;

    for (i, file) in files.iter().enumerate() {
        let table = read_csv(file)?;
        let time = synchronize_time(table.column(COL_TIME)?);
        let z = get_vector_from_csv(&time, table.column(COL_POSITION_Z)?);
        curves.push((format!("Curve {}", i + 1), z));
        first_time.get_or_insert(time);
    }

    let Some(time) = first_time else {
        return Err(AnalysisError::NoData("no flight CSV files to plot".to_string()));
    };
    let reference_curve: Series = time.iter().flatten().map(|&t| (t, reference)).collect();
    curves.push(("Reference".to_string(), reference_curve));

    plot_series(
        plot_dir,
        "Hover stability",
        "Time (s)",
        "z (m)",
        &curves,
        &AxisLimits::x(0.0..POSITION_PLOT_TIME_LIMIT_S),
    )
}

/// Battery voltage over time; every flight is drawn against the first
/// flight's time axis.
pub fn plot_bat_vs_time(plot_dir: &Path, files: &[PathBuf]) -> Result<PathBuf> {
    let Some(first) = files.first() else {
        return Err(AnalysisError::NoData("no flight CSV files to plot".to_string()));
    };
    let time = synchronize_time(read_csv(first)?.column(COL_TIME)?);

    let mut curves: Vec<(String, Series)> = Vec::new();
    for (i, file) in files.iter().enumerate() {
        let table = read_csv(file)?;
        curves.push((
            format!("Curve {}", i + 1),
            get_vector_from_csv(&time, table.column(COL_VOLTAGE)?),
        ));
    }

    plot_series(
        plot_dir,
        "Battery vs Time",
        "Time (s)",
        "Battery (V)",
        &curves,
        &AxisLimits::default(),
    )
}


// src/plot_functions/plot_experiments.rs
