// src/plot_functions/plot_thrust_map.rs

use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::Path;

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::drawing::IntoDrawingArea;
use plotters::element::{Circle, Rectangle, Text};
use plotters::series::SurfaceSeries;
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::{Color, IntoFont, RGBColor, ShapeStyle};

use crate::constants::{
    FONT_SIZE_AXIS_LABEL, FONT_SIZE_CHART_TITLE, FONT_SIZE_LEGEND, MARKER_SIZE_POINT,
    SURFACE_GRID_STEPS, SURFACE_PLOT_SIZE,
};
use crate::data_analysis::curve_fit::SurfaceFit;
use crate::data_input::stand_data::StandSample;
use crate::error::{AnalysisError, Result};
use crate::plot_framework::{calculate_range, draw_unavailable_message, finite_bounds, map_value_to_color};

const SURFACE_OPACITY: f64 = 0.5;

fn axis_range(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (lo, hi) = finite_bounds(values)?;
    if hi > lo {
        Some(lo..hi)
    } else {
        let (lo, hi) = calculate_range(lo, hi);
        Some(lo..hi)
    }
}

fn linspace(range: &Range<f64>, steps: usize) -> Vec<f64> {
    (0..=steps)
        .map(|i| range.start + (range.end - range.start) * i as f64 / steps as f64)
        .collect()
}

fn draw_thrust_map(
    output_path: &Path,
    samples: &[StandSample],
    fit: Option<&SurfaceFit>,
    color: RGBColor,
) -> std::result::Result<bool, Box<dyn Error>> {
    let title = "Thrust map";
    let root_area = BitMapBackend::new(output_path, (SURFACE_PLOT_SIZE, SURFACE_PLOT_SIZE))
        .into_drawing_area();
    root_area.fill(&WHITE)?;

    let ranges = (
        axis_range(samples.iter().map(|s| s.thrust_n)),
        axis_range(samples.iter().map(|s| s.esc_signal_us)),
        axis_range(samples.iter().map(|s| s.voltage_v)),
    );
    let (Some(thrust_range), Some(esc_range), Some(voltage_range)) = ranges else {
        draw_unavailable_message(&root_area, title, "No data points")?;
        root_area.present()?;
        return Ok(false);
    };

    root_area.draw(&Text::new(
        "x: Thrust (N)   y: ESC signal (µs)   z: Voltage (V)",
        (20, 20),
        ("sans-serif", FONT_SIZE_AXIS_LABEL).into_font().color(&BLACK),
    ))?;

    let mut chart = ChartBuilder::on(&root_area)
        .caption(title, ("sans-serif", FONT_SIZE_CHART_TITLE))
        .margin(40)
        .build_cartesian_3d(thrust_range.clone(), esc_range.clone(), voltage_range.clone())?;

    chart.with_projection(|mut pb| {
        pb.pitch = 0.35;
        pb.yaw = 0.6;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
        .draw()?;

    if let Some(fit) = fit {
        let (esc_min, esc_max) = (esc_range.start, esc_range.end);
        let style = move |esc: &f64| -> ShapeStyle {
            map_value_to_color(*esc, esc_min, esc_max)
                .mix(SURFACE_OPACITY)
                .filled()
        };
        chart
            .draw_series(
                SurfaceSeries::xoz(
                    linspace(&thrust_range, SURFACE_GRID_STEPS).into_iter(),
                    linspace(&voltage_range, SURFACE_GRID_STEPS).into_iter(),
                    |thrust, voltage| fit.evaluate(thrust, voltage),
                )
                .style_func(&style),
            )?
            .label(format!("Fitted {} order surface", fit.model))
            .legend(move |(x, y)| {
                Rectangle::new(
                    [(x, y - 5), (x + 20, y + 5)],
                    map_value_to_color(esc_max, esc_min, esc_max).filled(),
                )
            });
    }

    chart
        .draw_series(samples.iter().map(|s| {
            Circle::new(
                (s.thrust_n, s.esc_signal_us, s.voltage_v),
                MARKER_SIZE_POINT,
                color.filled(),
            )
        }))?
        .label("Data from multirotor experiments")
        .legend(move |(x, y)| Circle::new((x + 10, y), MARKER_SIZE_POINT + 1, color.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", FONT_SIZE_LEGEND))
        .draw()?;

    root_area.present()?;
    Ok(true)
}

/// 3-D scatter of the stand samples (thrust, ESC signal, voltage), with the
/// fitted surface drawn under them when given.
pub fn plot_thrust_map(
    output_path: &Path,
    samples: &[StandSample],
    fit: Option<&SurfaceFit>,
    color: RGBColor,
) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let plotted =
        draw_thrust_map(output_path, samples, fit, color).map_err(AnalysisError::plot)?;
    if plotted {
        log::info!("  Thrust map plot saved as '{}'.", output_path.display());
    } else {
        log::warn!("  No stand samples to plot in '{}'.", output_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_range_degenerate() {
        assert_eq!(axis_range(vec![1.0, 3.0]), Some(1.0..3.0));
        assert_eq!(axis_range(vec![2.0, 2.0]), Some(1.5..2.5));
        assert_eq!(axis_range(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_linspace_endpoints() {
        let grid = linspace(&(10.0..20.0), 4);
        assert_eq!(grid, vec![10.0, 12.5, 15.0, 17.5, 20.0]);
    }
}

// src/plot_functions/plot_thrust_map.rs
