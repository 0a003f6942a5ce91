// src/plot_functions/plot_fitted_curve.rs

use std::path::{Path, PathBuf};

use crate::constants::{
    COLOR_EXPERIMENTAL_DATA, COLOR_FITTED_CURVE, FITTED_CURVE_SAMPLES, LINE_WIDTH_PLOT,
};
use crate::data_analysis::polynomial::Polynomial1D;
use crate::error::Result;
use crate::plot_framework::{
    draw_single_plot, finite_bounds, plot_path, series_ranges, PlotConfig, PlotSeries,
};
use crate::types::CorrectionFactorSeries;

/// Plots the correction factor samples against battery voltage together with
/// the fitted polynomial. The voltage axis decreases to the right, following
/// the battery discharge over a flight.
pub fn plot_fitted_curve(
    plot_dir: &Path,
    correction_factor: &CorrectionFactorSeries,
    polynomial: &Polynomial1D,
) -> Result<PathBuf> {
    let title = format!(
        "Correction Factor Fitted to a {}-Degree Polynomial Curve",
        polynomial.degree_label()
    );

    let mut series = vec![PlotSeries::points(
        correction_factor.clone(),
        "Experimental data",
        *COLOR_EXPERIMENTAL_DATA,
    )];

    if let Some((v_min, v_max)) = finite_bounds(correction_factor.iter().map(|p| p.0)) {
        let steps = (FITTED_CURVE_SAMPLES - 1) as f64;
        let curve = (0..FITTED_CURVE_SAMPLES)
            .map(|i| {
                let v = v_min + (v_max - v_min) * i as f64 / steps;
                (v, polynomial.evaluate(v))
            })
            .collect();
        series.push(PlotSeries::line(
            curve,
            format!("γ(B) = {}", polynomial.equation("B")),
            *COLOR_FITTED_CURVE,
            LINE_WIDTH_PLOT,
        ));
    }

    let (x_range, y_range) = series_ranges(&series).unwrap_or((0.0..1.0, 0.0..1.0));
    let config = PlotConfig {
        title: title.clone(),
        x_range,
        y_range,
        series,
        x_label: "Battery (V)".to_string(),
        y_label: "γ".to_string(),
        invert_x: true,
    };
    draw_single_plot(&plot_path(plot_dir, &title), &config)
}

// src/plot_functions/plot_fitted_curve.rs
