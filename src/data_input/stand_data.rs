// src/data_input/stand_data.rs
//
// Thrust-stand bench exports: assembling several runs into one sample set and
// filtering them to the operating envelope used for the thrust-map fit.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::config::DataFilter;
use crate::constants::STAND_CSV_COLUMNS;
use crate::data_input::csv_results::csv_files_in;
use crate::error::{AnalysisError, Result};

/// One bench row. Extra columns in the export are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandSample {
    #[serde(rename = "ESC signal (µs)")]
    pub esc_signal_us: f64,
    #[serde(rename = "Thrust (N)")]
    pub thrust_n: f64,
    #[serde(rename = "Current (A)")]
    pub current_a: f64,
    #[serde(rename = "Voltage (V)")]
    pub voltage_v: f64,
}

/// Where the bench exports come from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Every `*.csv` in a directory.
    Directory(PathBuf),
    /// An explicit list of files.
    Files(Vec<PathBuf>),
}

impl DataSource {
    fn files(&self) -> Result<Vec<PathBuf>> {
        match self {
            DataSource::Directory(dir) => {
                log::info!("Combining all .csv data from directory: {}", dir.display());
                csv_files_in(dir)
            }
            DataSource::Files(files) => {
                log::info!("Reading data from {} input files", files.len());
                Ok(files.clone())
            }
        }
    }
}

/// Reads the four stand columns from one export.
pub fn read_stand_csv(path: &Path) -> Result<Vec<StandSample>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    if let Some(missing) = STAND_CSV_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(AnalysisError::MissingColumn(missing.to_string()));
    }

    let mut samples = Vec::new();
    for (row, record) in reader.deserialize::<StandSample>().enumerate() {
        match record {
            Ok(sample) => samples.push(sample),
            // A row with blank or non-numeric cells would be dropped by the
            // envelope filter anyway.
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => log::debug!("Skipping row {} of '{}': {e}", row + 1, path.display()),
        }
    }
    Ok(samples)
}

pub fn write_stand_csv(samples: &[StandSample], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = WriterBuilder::new().from_path(path)?;
    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

/// Concatenates the bench exports of `source`, skipping files that cannot be
/// read. When `output_file` is given the combined samples are written there.
pub fn data_assemble(source: &DataSource, output_file: Option<&Path>) -> Result<Vec<StandSample>> {
    let mut combined = Vec::new();
    let mut processed = 0;

    for file in source.files()? {
        match read_stand_csv(&file) {
            Ok(samples) => {
                log::info!("Processed: {} ({} rows)", file.display(), samples.len());
                combined.extend(samples);
                processed += 1;
            }
            Err(e) => log::warn!("Skipping {} due to error: {e}", file.display()),
        }
    }

    if processed == 0 {
        log::error!("No data processed. Check your folder or column names.");
        return Err(AnalysisError::NoData(
            "no readable thrust-stand CSV files".to_string(),
        ));
    }

    if let Some(path) = output_file {
        write_stand_csv(&combined, path)?;
        log::info!("Combined CSV saved to {}", path.display());
    }

    Ok(combined)
}

/// Flips the bench's thrust sign and keeps samples strictly inside every bound.
pub fn filter_data(samples: &[StandSample], filter: &DataFilter) -> Vec<StandSample> {
    let inside = |v: f64, min: f64, max: f64| v > min && v < max;

    let filtered: Vec<StandSample> = samples
        .iter()
        .map(|s| StandSample {
            thrust_n: -s.thrust_n,
            ..*s
        })
        .filter(|s| {
            inside(s.voltage_v, filter.min_volt, filter.max_volt)
                && inside(s.esc_signal_us, filter.min_throttle, filter.max_throttle)
                && inside(s.thrust_n, filter.min_thrust, filter.max_thrust)
        })
        .collect();

    match filtered.iter().map(|s| s.thrust_n).reduce(f64::max) {
        Some(max) => log::info!("Max thrust value: {max}"),
        None => log::warn!("No samples left after filtering"),
    }
    filtered
}

/// Column views used by the fit and the plots.
pub fn thrust_values(samples: &[StandSample]) -> Vec<f64> {
    samples.iter().map(|s| s.thrust_n).collect()
}

pub fn voltage_values(samples: &[StandSample]) -> Vec<f64> {
    samples.iter().map(|s| s.voltage_v).collect()
}

pub fn esc_signal_values(samples: &[StandSample]) -> Vec<f64> {
    samples.iter().map(|s| s.esc_signal_us).collect()
}
