// src/plot_functions/plot_series.rs

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::constants::{
    series_color, COLOR_LINE_ONLY, LINE_ONLY_SAMPLES, LINE_WIDTH_PLOT,
};
use crate::error::Result;
use crate::plot_framework::{draw_single_plot, plot_path, series_ranges, PlotConfig, PlotSeries};
use crate::types::{ChartData, Series};

/// Optional fixed axis limits; unset axes are fitted to the data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisLimits {
    pub x: Option<Range<f64>>,
    pub y: Option<Range<f64>>,
}

impl AxisLimits {
    pub fn x(range: Range<f64>) -> Self {
        Self {
            x: Some(range),
            y: None,
        }
    }
}

/// Scatter plot of several labelled series on one chart, saved under
/// `plot_dir` with a file name derived from the title.
pub fn plot_series(
    plot_dir: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[(String, Series)],
    limits: &AxisLimits,
) -> Result<PathBuf> {
    let plot_series: Vec<PlotSeries> = series
        .iter()
        .enumerate()
        .map(|(i, (label, data))| PlotSeries::points(data.clone(), label.as_str(), series_color(i)))
        .collect();

    let (x_range, y_range) = series_ranges(&plot_series).unwrap_or((0.0..1.0, 0.0..1.0));
    let chart: ChartData = (
        title.to_string(),
        limits.x.clone().unwrap_or(x_range),
        limits.y.clone().unwrap_or(y_range),
        plot_series,
        x_label.to_string(),
        y_label.to_string(),
    );
    draw_single_plot(&plot_path(plot_dir, title), &PlotConfig::from(chart))
}

/// Draws the line `y = m·x + b` over `[x_min, x_max]`.
pub fn plot_line_only(
    plot_dir: &Path,
    m: f64,
    b: f64,
    x_min: f64,
    x_max: f64,
    title: &str,
) -> Result<PathBuf> {
    let steps = (LINE_ONLY_SAMPLES - 1) as f64;
    let data: Series = (0..LINE_ONLY_SAMPLES)
        .map(|i| {
            let x = x_min + (x_max - x_min) * i as f64 / steps;
            (x, m * x + b)
        })
        .collect();

    let line = PlotSeries::line(
        data,
        format!("y = {m:.4}x + {b:.2}"),
        *COLOR_LINE_ONLY,
        LINE_WIDTH_PLOT,
    );
    let (x_range, y_range) = series_ranges(std::slice::from_ref(&line)).unwrap_or((0.0..1.0, 0.0..1.0));
    let chart: ChartData = (
        title.to_string(),
        x_range,
        y_range,
        vec![line],
        "Time (s)".to_string(),
        "Value".to_string(),
    );
    draw_single_plot(&plot_path(plot_dir, title), &PlotConfig::from(chart))
}

// src/plot_functions/plot_series.rs
