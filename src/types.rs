// src/types.rs
// Type aliases shared across the analysis pipeline

/// Ordered `(timestamp_s, value)` pairs, or `(x, y)` pairs once re-keyed.
pub type Series = Vec<(f64, f64)>;

/// Correction factor samples keyed by battery voltage: `(voltage_v, gamma)`.
pub type CorrectionFactorSeries = Vec<(f64, f64)>;

/// Plot data for one chart:
/// (title, x_range, y_range, series, x_label, y_label)
pub type ChartData = (
    String,
    std::ops::Range<f64>,
    std::ops::Range<f64>,
    Vec<crate::plot_framework::PlotSeries>,
    String,
    String,
);
