// src/data_analysis/disturbance_estimation.rs
//
// Vertical force balance: measured thrust from mass and acceleration, and the
// correction factor between commanded and measured thrust.

use crate::error::{AnalysisError, Result};
use crate::types::{CorrectionFactorSeries, Series};

/// Tracks mass and thrust estimates for one vehicle.
#[derive(Debug, Clone, Default)]
pub struct DisturbanceEstimator {
    pub real_mass: f64,
    pub mass_error_history: Vec<f64>,
    pub thrust_error_history: Vec<f64>,
}

impl DisturbanceEstimator {
    pub fn new(real_mass: f64) -> Self {
        Self {
            real_mass,
            ..Default::default()
        }
    }

    /// Mass that would explain `thrust` at acceleration `acceleration`.
    pub fn compute_mass(&self, thrust: f64, acceleration: f64) -> f64 {
        thrust / acceleration
    }

    /// `m · a_z`. Zero acceleration is rejected.
    pub fn compute_thrust(&self, mass: f64, acceleration: f64) -> Result<f64> {
        if acceleration == 0.0 {
            return Err(AnalysisError::ZeroAcceleration);
        }
        Ok(mass * acceleration)
    }

    pub fn compute_mass_error(&mut self, real_mass: f64, estimate_mass: f64) -> f64 {
        let error = (estimate_mass - real_mass).abs();
        self.mass_error_history.push(error);
        error
    }

    pub fn compute_thrust_error(&mut self, actuator_thrust: f64, estimate_thrust: f64) -> f64 {
        let error = (estimate_thrust - actuator_thrust).abs();
        self.thrust_error_history.push(error);
        error
    }

    pub fn correction_factor_mass(&self, real_mass: f64, estimate_mass: f64) -> f64 {
        real_mass / estimate_mass
    }

    /// γ = commanded / measured.
    pub fn correction_factor_thrust(&self, commanded: f64, measured: f64) -> f64 {
        commanded / measured
    }

    /// Root mean square of the recorded mass errors, 0 with no history.
    pub fn rmse(&self) -> f64 {
        if self.mass_error_history.is_empty() {
            return 0.0;
        }
        let mean_sq = self.mass_error_history.iter().map(|e| e * e).sum::<f64>()
            / self.mass_error_history.len() as f64;
        mean_sq.sqrt()
    }
}

/// Pairs the correction factor of each sample with the battery voltage at the
/// same position: `(voltage, γ)`. The three series are zipped positionally.
pub fn run_correction_factor(
    thrust_sent: &[(f64, f64)],
    thrust_measured: &[(f64, f64)],
    battery: &[(f64, f64)],
) -> CorrectionFactorSeries {
    let estimator = DisturbanceEstimator::default();
    thrust_sent
        .iter()
        .zip(thrust_measured)
        .zip(battery)
        .map(|((&(_, sent), &(_, measured)), &(_, voltage))| {
            (voltage, estimator.correction_factor_thrust(sent, measured))
        })
        .collect()
}

/// Measured thrust `m · a_z` from an acceleration series. NaN samples (gaps
/// the resampler could not fill) are dropped.
pub fn run_thrust_reference(acceleration: &[(f64, f64)], real_mass: f64) -> Result<Series> {
    let estimator = DisturbanceEstimator::new(real_mass);
    acceleration
        .iter()
        .filter(|(_, a)| !a.is_nan())
        .map(|&(t, a)| Ok((t, estimator.compute_thrust(real_mass, a)?)))
        .collect()
}
