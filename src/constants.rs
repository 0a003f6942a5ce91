// src/constants.rs

// Import specific colors needed
use plotters::style::colors::full_palette::{
    BLUE, BROWN, CYAN, GREEN, LIGHTBLUE, ORANGE, PINK, PURPLE, RED,
};
use plotters::style::RGBColor;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1920;
pub const PLOT_HEIGHT: u32 = 1080;
pub const SURFACE_PLOT_SIZE: u32 = 1600;

// Font sizes.
pub const FONT_SIZE_CHART_TITLE: i32 = 22;
pub const FONT_SIZE_AXIS_LABEL: i32 = 16;
pub const FONT_SIZE_LEGEND: i32 = 16;
pub const FONT_SIZE_MESSAGE: i32 = 24;

// Stroke widths and marker sizes.
pub const LINE_WIDTH_PLOT: u32 = 2;
pub const LINE_WIDTH_LEGEND: u32 = 2;
pub const MARKER_SIZE_POINT: u32 = 3;

// Sample count used when drawing fitted curves and surfaces.
pub const FITTED_CURVE_SAMPLES: usize = 300;
pub const LINE_ONLY_SAMPLES: usize = 100;
pub const SURFACE_GRID_STEPS: usize = 100;

// --- Signal processing ---
pub const DEFAULT_RESAMPLE_FREQ_HZ: f64 = 1.0;
/// Platform status value meaning the aircraft is airborne.
pub const PLATFORM_STATE_FLYING: f64 = 3.0;
/// RC command channel that carries the throttle.
pub const RC_THROTTLE_CHANNEL: usize = 2;

// --- Physics / thrust map ---
pub const DEFAULT_VEHICLE_MASS_KG: f64 = 0.972;
pub const DEFAULT_LOGGED_MASS_KG: f64 = 0.96;
pub const DEFAULT_LINEAR_THRUST_MAX_N: f64 = 44.0;
pub const THROTTLE_MIN_US: f64 = 1000.0;
pub const THROTTLE_SPAN_US: f64 = 1000.0;
pub const MOTOR_COUNT: f64 = 4.0;
/// Scale applied to absolute differences when reporting them as percentages.
pub const ERROR_PERCENT_DIVISOR: f64 = 10.0;
/// Degree of the correction factor polynomial fitted when none is configured.
pub const DEFAULT_CORRECTION_FACTOR_DEGREE: usize = 2;

// --- Flight CSV column headers ---
pub const COL_THRUST_SENT: &str = "Thrust sended (N)";
pub const COL_THRUST_MEASURED: &str = "Thrust measured (N)";
pub const COL_VOLTAGE: &str = "Voltage (V)";
pub const COL_ACC: &str = "Acc (m/s²)";
pub const COL_MASS: &str = "m (Kg)";
pub const COL_THROTTLE: &str = "Throttle (%)";
pub const COL_POSITION_Z: &str = "Position_z (m)";
pub const COL_TIME: &str = "Time (s)";

pub const FLIGHT_CSV_COLUMNS: [&str; 8] = [
    COL_THRUST_SENT,
    COL_THRUST_MEASURED,
    COL_VOLTAGE,
    COL_ACC,
    COL_MASS,
    COL_THROTTLE,
    COL_POSITION_Z,
    COL_TIME,
];

// --- Error CSV column headers ---
pub const COL_ERR_VOLTAGE: &str = "V (V)";
pub const COL_ERR_THROTTLE_VS_VOLTAGE: &str = "ET_V (%)";
pub const COL_ERR_THRUST: &str = "T (N)";
pub const COL_ERR_THROTTLE_VS_THRUST: &str = "ET_T (%)";
pub const COL_ERR_THRUST_PERCENT: &str = "E_Thrust (%)";

pub const ERROR_CSV_COLUMNS: [&str; 5] = [
    COL_ERR_VOLTAGE,
    COL_ERR_THROTTLE_VS_VOLTAGE,
    COL_ERR_THRUST,
    COL_ERR_THROTTLE_VS_THRUST,
    COL_ERR_THRUST_PERCENT,
];

// --- Test-stand CSV column headers ---
pub const COL_STAND_ESC: &str = "ESC signal (µs)";
pub const COL_STAND_THRUST: &str = "Thrust (N)";
pub const COL_STAND_CURRENT: &str = "Current (A)";
pub const COL_STAND_VOLTAGE: &str = "Voltage (V)";

pub const STAND_CSV_COLUMNS: [&str; 4] = [
    COL_STAND_ESC,
    COL_STAND_THRUST,
    COL_STAND_CURRENT,
    COL_STAND_VOLTAGE,
];

// --- Plot Color Assignments ---
pub const COLOR_EXPERIMENTAL_DATA: &RGBColor = &BLUE;
pub const COLOR_FITTED_CURVE: &RGBColor = &ORANGE;
pub const COLOR_LINE_ONLY: &RGBColor = &RED;

/// Cycle used for multi-series overlays (one color per file/curve).
pub const SERIES_PALETTE: [&RGBColor; 8] =
    [&BLUE, &ORANGE, &GREEN, &RED, &PURPLE, &BROWN, &PINK, &CYAN];

pub const COLOR_STAND_SCATTER_DEFAULT: &RGBColor = &LIGHTBLUE;

/// Color for series index `i`, wrapping around the palette.
pub fn series_color(i: usize) -> RGBColor {
    *SERIES_PALETTE[i % SERIES_PALETTE.len()]
}

// src/constants.rs
