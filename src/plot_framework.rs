// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::constants::{
    FONT_SIZE_AXIS_LABEL, FONT_SIZE_CHART_TITLE, FONT_SIZE_LEGEND, FONT_SIZE_MESSAGE,
    LINE_WIDTH_LEGEND, MARKER_SIZE_POINT, PLOT_HEIGHT, PLOT_WIDTH,
};
use crate::error::{AnalysisError, Result};
use crate::types::ChartData;

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Smallest and largest finite value of an iterator, if any.
pub fn finite_bounds(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Padded x and y ranges covering every finite point of `series`.
pub fn series_ranges(series: &[PlotSeries]) -> Option<(Range<f64>, Range<f64>)> {
    let points = || series.iter().flat_map(|s| s.data.iter());
    let (x_min, x_max) = finite_bounds(points().map(|p| p.0))?;
    let (y_min, y_max) = finite_bounds(points().map(|p| p.1))?;
    let (x0, x1) = calculate_range(x_min, x_max);
    let (y0, y1) = calculate_range(y_min, y_max);
    Some((x0..x1, y0..y1))
}

/// File path for a chart, derived from its title.
pub fn plot_path(plot_dir: &Path, title: &str) -> PathBuf {
    let mut stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    while stem.contains("__") {
        stem = stem.replace("__", "_");
    }
    let stem = stem.trim_matches('_');
    plot_dir.join(format!("{}.png", if stem.is_empty() { "plot" } else { stem }))
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    plot_title: &str,
    reason: &str,
) -> std::result::Result<(), Box<dyn Error>> {
    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (
        (x_range.end - x_range.start) as u32,
        (y_range.end - y_range.start) as u32,
    );
    let message = format!("{plot_title} Data Unavailable:\n{reason}");

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;

    let lines: Vec<&str> = message.split('\n').collect();
    let max_line_length = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let estimated_text_width = max_line_length.saturating_mul(estimated_char_width as usize) as i32;
    let estimated_text_height = lines.len().saturating_mul(estimated_line_height as usize) as i32;

    let center_x = width as i32 / 2 - estimated_text_width / 2;
    let center_y = height as i32 / 2 - estimated_text_height / 2;

    let text_style = ("sans-serif", FONT_SIZE_MESSAGE).into_font().color(&RED);
    area.draw(&Text::new(message, (center_x, center_y), text_style))?;
    Ok(())
}

/// How a series is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeriesStyle {
    Line,
    Points,
}

#[derive(Clone)]
pub struct PlotSeries {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
    pub style: SeriesStyle,
}

impl PlotSeries {
    pub fn points(data: Vec<(f64, f64)>, label: impl Into<String>, color: RGBColor) -> Self {
        Self {
            data,
            label: label.into(),
            color,
            stroke_width: MARKER_SIZE_POINT,
            style: SeriesStyle::Points,
        }
    }

    pub fn line(
        data: Vec<(f64, f64)>,
        label: impl Into<String>,
        color: RGBColor,
        stroke_width: u32,
    ) -> Self {
        Self {
            data,
            label: label.into(),
            color,
            stroke_width,
            style: SeriesStyle::Line,
        }
    }
}

#[derive(Clone)]
pub struct PlotConfig {
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub series: Vec<PlotSeries>,
    pub x_label: String,
    pub y_label: String,
    /// Draw the x axis decreasing from left to right.
    pub invert_x: bool,
}

impl From<ChartData> for PlotConfig {
    fn from((title, x_range, y_range, series, x_label, y_label): ChartData) -> Self {
        Self {
            title,
            x_range,
            y_range,
            series,
            x_label,
            y_label,
            invert_x: false,
        }
    }
}

fn format_tick(v: f64) -> String {
    if v.abs() >= 1000.0 || v.fract() == 0.0 {
        format!("{v:.0}")
    } else if v.abs() < 10.0 {
        format!("{v:.2}")
    } else {
        format!("{v:.1}")
    }
}

/// Draws one chart. An inverted x axis is drawn on negated coordinates with
/// the tick labels flipped back.
fn draw_chart_with_config(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    plot_config: &PlotConfig,
) -> std::result::Result<(), Box<dyn Error>> {
    let sign = if plot_config.invert_x { -1.0 } else { 1.0 };
    let x_range = if plot_config.invert_x {
        -plot_config.x_range.end..-plot_config.x_range.start
    } else {
        plot_config.x_range.clone()
    };

    let mut chart = ChartBuilder::on(area)
        .caption(&plot_config.title, ("sans-serif", FONT_SIZE_CHART_TITLE))
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, plot_config.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(&plot_config.x_label)
        .y_desc(&plot_config.y_label)
        .x_labels(20)
        .y_labels(10)
        .x_label_formatter(&|x| format_tick(sign * x))
        .y_label_formatter(&|y| format_tick(*y))
        .light_line_style(WHITE.mix(0.7))
        .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
        .draw()?;

    let mut legend_series_count = 0;

    for s in &plot_config.series {
        let data: Vec<(f64, f64)> = s
            .data
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|&(x, y)| (sign * x, y))
            .collect();
        if data.is_empty() {
            continue;
        }
        let color = s.color;

        match s.style {
            SeriesStyle::Line => {
                let series = chart.draw_series(LineSeries::new(
                    data,
                    color.stroke_width(s.stroke_width),
                ))?;
                if !s.label.is_empty() {
                    series.label(&s.label).legend(move |(x, y)| {
                        PathElement::new(
                            vec![(x, y), (x + 20, y)],
                            color.stroke_width(LINE_WIDTH_LEGEND),
                        )
                    });
                    legend_series_count += 1;
                }
            }
            SeriesStyle::Points => {
                let radius = s.stroke_width;
                let series = chart.draw_series(
                    data.into_iter()
                        .map(move |p| Circle::new(p, radius, color.filled())),
                )?;
                if !s.label.is_empty() {
                    series
                        .label(&s.label)
                        .legend(move |(x, y)| Circle::new((x + 10, y), radius + 1, color.filled()));
                    legend_series_count += 1;
                }
            }
        }
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", FONT_SIZE_LEGEND))
            .draw()?;
    }

    Ok(())
}

fn draw_single_plot_inner(
    output_path: &Path,
    plot_config: &PlotConfig,
) -> std::result::Result<bool, Box<dyn Error>> {
    let root_area = BitMapBackend::new(output_path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let has_data = plot_config.series.iter().any(|s| !s.data.is_empty());
    let valid_ranges = plot_config.x_range.end > plot_config.x_range.start
        && plot_config.y_range.end > plot_config.y_range.start;

    let plotted = if has_data && valid_ranges {
        draw_chart_with_config(&root_area, plot_config)?;
        true
    } else {
        let reason = if !has_data { "No data points" } else { "Invalid ranges" };
        draw_unavailable_message(&root_area, &plot_config.title, reason)?;
        false
    };
    root_area.present()?;
    Ok(plotted)
}

/// Renders one chart to `output_path`, creating the parent directory.
pub fn draw_single_plot(output_path: &Path, plot_config: &PlotConfig) -> Result<PathBuf> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let plotted = draw_single_plot_inner(output_path, plot_config).map_err(AnalysisError::plot)?;
    if plotted {
        log::info!("  Plot saved as '{}'.", output_path.display());
    } else {
        log::warn!(
            "  '{}' saved with a placeholder message: no data available to plot.",
            output_path.display()
        );
    }
    Ok(output_path.to_path_buf())
}

/// Maps `value` in `[min, max]` onto the viridis color map.
pub fn map_value_to_color(value: f64, min: f64, max: f64) -> RGBColor {
    if !value.is_finite() || !min.is_finite() || !max.is_finite() {
        return RGBColor(0, 0, 0);
    }
    let (lo, hi) = (min.min(max), min.max(max));
    let span = (hi - lo).max(1e-9);
    let t = ((value.clamp(lo, hi) - lo) / span).clamp(0.0, 1.0);
    let color = colorous::VIRIDIS.eval_continuous(t);
    RGBColor(color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_range_pads() {
        let (lo, hi) = calculate_range(0.0, 10.0);
        assert!((lo + 1.5).abs() < 1e-12);
        assert!((hi - 11.5).abs() < 1e-12);
        assert_eq!(calculate_range(2.0, 2.0), (1.5, 2.5));
    }

    #[test]
    fn test_series_ranges_ignore_nan() {
        let series = vec![PlotSeries::points(
            vec![(1.0, 2.0), (f64::NAN, 5.0), (3.0, 4.0)],
            "a",
            RGBColor(0, 0, 0),
        )];
        let (x, y) = series_ranges(&series).unwrap();
        assert!(x.start < 1.0 && x.end > 3.0);
        assert!(y.start < 2.0 && y.end > 5.0);
        assert!(series_ranges(&[]).is_none());
    }

    #[test]
    fn test_plot_path_from_title() {
        let path = plot_path(Path::new("plots"), "Throttle vs Battery (V)");
        assert_eq!(path, PathBuf::from("plots/throttle_vs_battery_v.png"));
    }

    #[test]
    fn test_viridis_endpoints() {
        let low = map_value_to_color(0.0, 0.0, 1.0);
        let high = map_value_to_color(1.0, 0.0, 1.0);
        assert_ne!(low, high);
        assert_eq!(map_value_to_color(f64::NAN, 0.0, 1.0), RGBColor(0, 0, 0));
    }
}

// src/plot_framework.rs
