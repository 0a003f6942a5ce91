// src/processing/flight_preparation.rs
//
// Turns one decoded flight log into the 1 Hz series the correction factor
// analysis works on, and stores them as the flight CSV.

use std::path::{Path, PathBuf};

use crate::constants::FLIGHT_CSV_COLUMNS;
use crate::data_analysis::disturbance_estimation::run_thrust_reference;
use crate::data_analysis::signal_processing::{
    adjust_time_limits, fz_sample, get_data, interval_flying,
};
use crate::data_input::csv_results::save_data;
use crate::data_input::log_data::LogData;
use crate::error::Result;
use crate::types::Series;

/// Settings of the preprocessing step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessingParams {
    /// Mass used for `m · a_z` (kg).
    pub mass: f64,
    /// Mass written to the `m (Kg)` column.
    pub logged_mass: f64,
    pub resample_freq_hz: f64,
}

/// Resampled flight series, all trimmed to the flying window.
#[derive(Debug, Clone, Default)]
pub struct ProcessedFlight {
    pub name: String,
    pub thrust_commanded: Series,
    pub thrust_measured: Series,
    pub throttle_commanded: Series,
    pub battery: Series,
    pub acceleration: Series,
    pub position: Series,
    pub logged_mass: f64,
}

impl ProcessedFlight {
    /// Extracts, trims to the FLYING interval and resamples every signal,
    /// then derives the measured thrust from the vertical acceleration.
    pub fn run_preprocessing(
        name: &str,
        log_data: &LogData,
        params: &PreprocessingParams,
    ) -> Result<Self> {
        let imu = get_data(&log_data.imu)?;
        let thrust = get_data(&log_data.thrust)?;
        let battery = get_data(&log_data.battery)?;
        let status = get_data(&log_data.platform_info)?;
        let throttle = get_data(&log_data.rc_command)?;
        let position = get_data(&log_data.position)?;

        let flying = interval_flying(&status);
        if flying.is_empty() {
            log::warn!("'{name}': platform never reports FLYING, all series will be empty");
        } else {
            log::info!(
                "'{name}': flying from {:.2} s to {:.2} s",
                flying[0].0,
                flying[flying.len() - 1].0
            );
        }

        let freq = params.resample_freq_hz;
        let resample = |data: &Series| fz_sample(&adjust_time_limits(&flying, data), freq);

        let acceleration = resample(&imu)?;
        let thrust_measured = run_thrust_reference(&acceleration, params.mass)?;

        let flight = Self {
            name: name.to_string(),
            thrust_commanded: resample(&thrust)?,
            thrust_measured,
            throttle_commanded: resample(&throttle)?,
            battery: resample(&battery)?,
            acceleration,
            position: resample(&position)?,
            logged_mass: params.logged_mass,
        };
        log::debug!(
            "'{name}': {} thrust, {} imu, {} battery, {} throttle, {} position samples after resampling",
            flight.thrust_commanded.len(),
            flight.acceleration.len(),
            flight.battery.len(),
            flight.throttle_commanded.len(),
            flight.position.len()
        );
        Ok(flight)
    }

    /// Writes `<output_dir>/<name>.csv` with the flight columns.
    pub fn save_results(&self, output_dir: &Path) -> Result<PathBuf> {
        let values = |s: &Series| s.iter().map(|&(_, v)| v).collect::<Vec<f64>>();

        let thrust_commanded = values(&self.thrust_commanded);
        let thrust_measured = values(&self.thrust_measured);
        let battery = values(&self.battery);
        let acceleration = values(&self.acceleration);
        let mass = vec![self.logged_mass; battery.len()];
        let throttle = values(&self.throttle_commanded);
        let position = values(&self.position);
        let time: Vec<f64> = self.position.iter().map(|&(t, _)| t).collect();

        let columns: [&[f64]; 8] = [
            &thrust_commanded,
            &thrust_measured,
            &battery,
            &acceleration,
            &mass,
            &throttle,
            &position,
            &time,
        ];
        if let Some((name, _)) = FLIGHT_CSV_COLUMNS
            .iter()
            .zip(columns.iter())
            .find(|(_, c)| c.is_empty())
        {
            log::warn!("'{}': column '{name}' is empty, the CSV will have no rows", self.name);
        }

        save_data(
            &columns,
            &FLIGHT_CSV_COLUMNS,
            &format!("{}.csv", self.name),
            output_dir,
        )
    }
}
