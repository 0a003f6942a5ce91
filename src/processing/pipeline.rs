// src/processing/pipeline.rs
//
// Correction factor pipeline: bag → flight CSV per experiment, then the
// unified experiment CSV → predicted throttle and error table.

use std::path::{Path, PathBuf};

use crate::config::CorrectionFactorConfig;
use crate::constants::DEFAULT_CORRECTION_FACTOR_DEGREE;
use crate::data_analysis::compute_results::ThrottleModel;
use crate::data_analysis::polynomial::Polynomial1D;
use crate::data_input::csv_results::unify_csvs;
use crate::data_input::log_data::LogData;
use crate::error::{AnalysisError, Result};
use crate::processing::flight_analysis::FlightAnalysis;
use crate::processing::flight_preparation::{PreprocessingParams, ProcessedFlight};
use crate::processing::results_from_csv::ResultsFromCsv;

/// How throttle is predicted for the unified experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsMode {
    /// `t_max` configured: linear approximation.
    Linear,
    /// `cf_parameters` configured: thrust map on γ-corrected thrust.
    ThrustMapWithCorrectionFactor,
    /// Neither: γ is fitted on the experiment, thrust map on raw thrust.
    ThrustMapWithoutCorrectionFactor,
}

impl ResultsMode {
    pub fn from_config(config: &CorrectionFactorConfig) -> Self {
        if config.t_max.is_some() {
            ResultsMode::Linear
        } else if config.cf_parameters.is_some() {
            ResultsMode::ThrustMapWithCorrectionFactor
        } else {
            ResultsMode::ThrustMapWithoutCorrectionFactor
        }
    }
}

pub fn preprocessing_params(config: &CorrectionFactorConfig) -> PreprocessingParams {
    PreprocessingParams {
        mass: config.mass,
        logged_mass: config.logged_mass,
        resample_freq_hz: config.resample_freq_hz,
    }
}

/// Throttle model used for per-flight analysis.
pub fn throttle_model(config: &CorrectionFactorConfig) -> ThrottleModel {
    match config.t_max {
        Some(thrust_max) => ThrottleModel::Linear { thrust_max },
        None => ThrottleModel::ThrustMap {
            coefficients: config.tm_parameters.to_vec(),
        },
    }
}

pub fn configured_correction_factor(
    config: &CorrectionFactorConfig,
) -> Result<Option<Polynomial1D>> {
    config
        .cf_parameters
        .map(|cf| Polynomial1D::from_coefficients(cf.ascending()))
        .transpose()
}

/// `<data_dir>/<folder_experiment>`
pub fn experiment_dir(config: &CorrectionFactorConfig) -> PathBuf {
    config.data_dir.join(&config.folder_experiment)
}

/// Reads one bag, preprocesses it and writes
/// `<data_dir>/<folder_experiment>/<name>.csv`.
pub fn process_rosbag(
    name: &str,
    bag_path: &Path,
    config: &CorrectionFactorConfig,
) -> Result<(ProcessedFlight, PathBuf)> {
    log::info!("Processing '{}' from '{}'", name, bag_path.display());
    let log_data = LogData::from_bag(bag_path)?;
    if log_data.is_empty() {
        log::warn!("'{}' holds none of the expected topics", bag_path.display());
    }
    let flight = ProcessedFlight::run_preprocessing(name, &log_data, &preprocessing_params(config))?;
    let csv_path = flight.save_results(&experiment_dir(config))?;
    log::info!("Saved '{}'", csv_path.display());
    Ok((flight, csv_path))
}

/// Correction factor analysis of one preprocessed flight, plotted under
/// `<plot_dir>/<name>`.
pub fn analyse_flight(flight: &ProcessedFlight, config: &CorrectionFactorConfig) -> Result<FlightAnalysis> {
    let analysis = FlightAnalysis::run(flight, DEFAULT_CORRECTION_FACTOR_DEGREE, &throttle_model(config))?;
    analysis.plot_results(flight, &config.plot_dir.join(&flight.name))?;
    Ok(analysis)
}

/// Output files of [`get_results`].
#[derive(Debug, Clone)]
pub struct ExperimentResults {
    pub mode: ResultsMode,
    pub unified_csv: PathBuf,
    pub rows: usize,
    pub errors_csv: PathBuf,
    pub correction_factor: Option<Polynomial1D>,
}

/// Unifies the experiment's flight CSVs into
/// `<data_dir>/results/<folder_experiment>.csv`, predicts the throttle and
/// writes `<data_dir>/errors/<folder_experiment>_errors.csv`.
pub fn get_results(config: &CorrectionFactorConfig) -> Result<ExperimentResults> {
    let folder = &config.folder_experiment;
    let results_dir = config.data_dir.join("results");
    let Some((unified_csv, rows)) =
        unify_csvs(&experiment_dir(config), &results_dir, &format!("{folder}.csv"))?
    else {
        return Err(AnalysisError::NoData(format!(
            "no flight CSV files in '{}'",
            experiment_dir(config).display()
        )));
    };

    let mode = ResultsMode::from_config(config);
    log::info!("Computing results for '{folder}' ({mode:?})");

    let mut results = ResultsFromCsv::new(
        &unified_csv,
        config.tm_parameters.to_vec(),
        configured_correction_factor(config)?,
        config.linear_thrust_max(),
        &config.plot_dir,
    )?;
    match mode {
        ResultsMode::Linear => results.linear_approximation(),
        ResultsMode::ThrustMapWithCorrectionFactor => results.thrustmap_with_correction_factor(),
        ResultsMode::ThrustMapWithoutCorrectionFactor => {
            results.thrustmap_without_correction_factor()?
        }
    }

    let errors_csv = results.compute_error(folder, &config.data_dir.join("errors"))?;
    log::info!("Errors saved in '{}'", errors_csv.display());

    Ok(ExperimentResults {
        mode,
        unified_csv,
        rows,
        errors_csv,
        correction_factor: results.correction_factor().cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml_extra: &str) -> CorrectionFactorConfig {
        let yaml = format!(
            r#"
folder_experiment: hover
tm_parameters: {{a: 1000.0, b: 40.0, c: -10.0, d: -0.5, e: 0.2, f: 0.1}}
{yaml_extra}
"#
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_results_mode_priority() {
        assert_eq!(
            ResultsMode::from_config(&config("t_max: 40.0\ncf_parameters: {a2: 1.0, a1: 0.0, a0: 0.0}")),
            ResultsMode::Linear
        );
        assert_eq!(
            ResultsMode::from_config(&config("cf_parameters: {a2: 1.0, a1: 0.0, a0: 0.0}")),
            ResultsMode::ThrustMapWithCorrectionFactor
        );
        assert_eq!(
            ResultsMode::from_config(&config("")),
            ResultsMode::ThrustMapWithoutCorrectionFactor
        );
    }

    #[test]
    fn test_throttle_model_from_config() {
        assert_eq!(
            throttle_model(&config("t_max: 40.0")),
            ThrottleModel::Linear { thrust_max: 40.0 }
        );
        assert!(matches!(
            throttle_model(&config("")),
            ThrottleModel::ThrustMap { coefficients } if coefficients.len() == 6
        ));
    }

    #[test]
    fn test_get_results_without_flights() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config("");
        cfg.data_dir = dir.path().to_path_buf();
        std::fs::create_dir_all(experiment_dir(&cfg)).unwrap();
        assert!(matches!(get_results(&cfg), Err(AnalysisError::NoData(_))));
    }
}
