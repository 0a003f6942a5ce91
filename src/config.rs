// src/config.rs
//
// YAML configuration for the correction-factor pipeline and the thrust-map tools.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::constants::{
    COLOR_STAND_SCATTER_DEFAULT, DEFAULT_LINEAR_THRUST_MAX_N, DEFAULT_LOGGED_MASS_KG,
    DEFAULT_RESAMPLE_FREQ_HZ, DEFAULT_VEHICLE_MASS_KG,
};
use crate::data_analysis::polynomial::SurfaceModel;
use crate::error::{AnalysisError, Result};

/// Reads and deserializes a YAML config file. A missing file is reported as
/// [`AnalysisError::ConfigNotFound`].
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(AnalysisError::ConfigNotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    let config = serde_yaml::from_reader(reader)?;
    log::debug!("Loaded config from '{}'", path.display());
    Ok(config)
}

/// Correction factor polynomial `a2 + a1·B + a0·B²`. `a2` is the constant
/// term and `a0` the quadratic one.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct CorrectionFactorParameters {
    pub a2: f64,
    pub a1: f64,
    pub a0: f64,
}

impl CorrectionFactorParameters {
    /// Coefficients in ascending power order (`a2, a1, a0`).
    pub fn ascending(&self) -> Vec<f64> {
        vec![self.a2, self.a1, self.a0]
    }
}

/// Second-order thrust map coefficients, `a + b·T + c·V + d·T² + e·T·V + f·V²`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ThrustMapParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl ThrustMapParameters {
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_plot_dir() -> PathBuf {
    PathBuf::from("plots")
}

fn default_vehicle_mass() -> f64 {
    DEFAULT_VEHICLE_MASS_KG
}

fn default_logged_mass() -> f64 {
    DEFAULT_LOGGED_MASS_KG
}

fn default_resample_freq() -> f64 {
    DEFAULT_RESAMPLE_FREQ_HZ
}

fn default_linear_thrust_max() -> f64 {
    DEFAULT_LINEAR_THRUST_MAX_N
}

/// Config for the flight-log correction-factor pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionFactorConfig {
    /// Experiment name → bag directory or `.db3` file.
    #[serde(default)]
    pub rosbags: BTreeMap<String, PathBuf>,
    pub folder_experiment: String,
    /// When set, throttle is computed with the linear approximation using this
    /// value as the maximum thrust (N).
    #[serde(default)]
    pub t_max: Option<f64>,
    #[serde(default)]
    pub cf_parameters: Option<CorrectionFactorParameters>,
    pub tm_parameters: ThrustMapParameters,
    /// Mass used to turn IMU acceleration into measured thrust.
    #[serde(default = "default_vehicle_mass")]
    pub mass: f64,
    /// Mass recorded in the `m (Kg)` column of the flight CSVs.
    #[serde(default = "default_logged_mass")]
    pub logged_mass: f64,
    #[serde(default = "default_resample_freq")]
    pub resample_freq_hz: f64,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,
}

impl CorrectionFactorConfig {
    pub fn linear_thrust_max(&self) -> f64 {
        self.t_max.unwrap_or_else(default_linear_thrust_max)
    }
}

/// Open (exclusive) bounds applied to test-stand samples.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct DataFilter {
    pub min_volt: f64,
    pub max_volt: f64,
    pub min_throttle: f64,
    pub max_throttle: f64,
    pub min_thrust: f64,
    pub max_thrust: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlottingConfig {
    #[serde(default)]
    pub color: Option<String>,
}

impl PlottingConfig {
    pub fn color(&self) -> RGBColor {
        match &self.color {
            Some(name) => parse_color(name).unwrap_or_else(|| {
                log::warn!("Unknown plot color '{name}', using default");
                *COLOR_STAND_SCATTER_DEFAULT
            }),
            None => *COLOR_STAND_SCATTER_DEFAULT,
        }
    }
}

fn default_coefficients_file() -> PathBuf {
    PathBuf::from("coefficients.txt")
}

fn default_error_report_file() -> PathBuf {
    PathBuf::from("fitting_error_report.txt")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

/// Config for the thrust-stand fitting and preparation tools.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrustMapConfig {
    /// Combined CSV written by the fitting tool.
    #[serde(default)]
    pub combined_data_file: Option<PathBuf>,
    /// Combined CSV written by the preparation tool.
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_coefficients_file")]
    pub coefficients_file: PathBuf,
    #[serde(default = "default_error_report_file")]
    pub error_report_file: PathBuf,
    #[serde(default)]
    pub poly_deg: Option<SurfaceModel>,
    pub data_filter: DataFilter,
    #[serde(default)]
    pub compute_error: bool,
    #[serde(default)]
    pub plot_results: bool,
    #[serde(default)]
    pub plotting: PlottingConfig,
    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,
}

/// Parses a named color (matplotlib-style basic names) or a `#rrggbb` hex string.
pub fn parse_color(name: &str) -> Option<RGBColor> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(RGBColor(channel(0)?, channel(2)?, channel(4)?));
    }
    let rgb = match name.to_ascii_lowercase().as_str() {
        "blue" => RGBColor(31, 119, 180),
        "orange" => RGBColor(255, 127, 14),
        "green" => RGBColor(44, 160, 44),
        "red" => RGBColor(214, 39, 40),
        "purple" => RGBColor(148, 103, 189),
        "brown" => RGBColor(140, 86, 75),
        "pink" => RGBColor(227, 119, 194),
        "gray" | "grey" => RGBColor(127, 127, 127),
        "olive" => RGBColor(188, 189, 34),
        "cyan" => RGBColor(23, 190, 207),
        "black" => RGBColor(0, 0, 0),
        _ => return None,
    };
    Some(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_analysis::polynomial::Polynomial1D;

    const CF_YAML: &str = r#"
rosbags:
  flight_1: rosbags/flight_1
  flight_2: rosbags/flight_2
folder_experiment: hover_test
cf_parameters:
  a2: 0.01
  a1: -0.2
  a0: 1.9
tm_parameters:
  a: 1000.0
  b: 40.0
  c: -10.0
  d: -0.5
  e: 0.2
  f: 0.1
"#;

    #[test]
    fn test_correction_factor_config_defaults() {
        let config: CorrectionFactorConfig = serde_yaml::from_str(CF_YAML).unwrap();
        assert_eq!(config.rosbags.len(), 2);
        assert_eq!(config.folder_experiment, "hover_test");
        assert!(config.t_max.is_none());
        assert_eq!(config.mass, DEFAULT_VEHICLE_MASS_KG);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.linear_thrust_max(), DEFAULT_LINEAR_THRUST_MAX_N);
        let cf = config.cf_parameters.unwrap();
        assert_eq!(cf.ascending(), vec![0.01, -0.2, 1.9]);
        assert_eq!(config.tm_parameters.to_vec().len(), 6);
    }

    #[test]
    fn test_correction_factor_constant_term_is_a2() {
        let cf = CorrectionFactorParameters { a2: 1.0, a1: 0.0, a0: 0.5 };
        let gamma = Polynomial1D::from_coefficients(cf.ascending()).unwrap();
        // 1 + 0.5·16²
        assert_eq!(gamma.evaluate(16.0), 129.0);

        let cf = CorrectionFactorParameters { a2: 0.9, a1: 0.02, a0: 0.0 };
        let gamma = Polynomial1D::from_coefficients(cf.ascending()).unwrap();
        assert!((gamma.evaluate(15.0) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_thrust_map_config_parses_degree() {
        let yaml = r#"
combined_data_file: combined.csv
coefficients_file: coeffs.txt
poly_deg: 3rd
compute_error: true
plot_results: false
data_filter:
  min_volt: 13.0
  max_volt: 17.0
  min_throttle: 1050
  max_throttle: 2000
  min_thrust: 0.1
  max_thrust: 12
plotting:
  color: green
"#;
        let config: ThrustMapConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.poly_deg, Some(SurfaceModel::Third));
        assert!(config.compute_error);
        assert_eq!(config.data_filter.min_throttle, 1050.0);
        assert_eq!(config.plotting.color(), RGBColor(44, 160, 44));
    }

    #[test]
    fn test_thrust_map_config_rejects_bad_degree() {
        let yaml = r#"
poly_deg: 5th
data_filter: {min_volt: 0, max_volt: 1, min_throttle: 0, max_throttle: 1, min_thrust: 0, max_thrust: 1}
"#;
        assert!(serde_yaml::from_str::<ThrustMapConfig>(yaml).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config::<ThrustMapConfig>(Path::new("/nonexistent/config.yaml"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigNotFound(_)));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff0080"), Some(RGBColor(255, 0, 128)));
        assert_eq!(parse_color("Orange"), Some(RGBColor(255, 127, 14)));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }
}
