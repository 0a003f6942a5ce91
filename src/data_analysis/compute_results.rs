// src/data_analysis/compute_results.rs
//
// Throttle prediction from thrust and battery voltage, with or without the
// correction factor, and comparison of predicted and recorded series.

use ndarray::Array1;

use crate::constants::{ERROR_PERCENT_DIVISOR, MOTOR_COUNT, THROTTLE_MIN_US, THROTTLE_SPAN_US};
use crate::data_analysis::polynomial::{Polynomial1D, SurfaceModel};
use crate::types::Series;

/// Maps a total thrust and a voltage to an ESC throttle command.
#[derive(Debug, Clone, PartialEq)]
pub enum ThrottleModel {
    /// `thrust / thrust_max · 1000 + 1000`.
    Linear { thrust_max: f64 },
    /// Second-order thrust map `a + bT + cV + dT² + eTV + fV²` evaluated on
    /// per-motor thrust.
    ThrustMap { coefficients: Vec<f64> },
}

impl ThrottleModel {
    pub fn throttle(&self, thrust: f64, voltage: f64) -> f64 {
        match self {
            ThrottleModel::Linear { thrust_max } => {
                thrust / thrust_max * THROTTLE_SPAN_US + THROTTLE_MIN_US
            }
            ThrottleModel::ThrustMap { coefficients } => {
                SurfaceModel::Second.evaluate(thrust / MOTOR_COUNT, voltage, coefficients)
            }
        }
    }
}

/// Applies the correction factor γ(V) to a thrust series.
///
/// With `apply` the thrust is multiplied by γ (commanded → measured scale),
/// otherwise divided by it. Series are paired positionally.
pub fn compute_thrust(
    thrust: &[(f64, f64)],
    battery: &[(f64, f64)],
    correction_factor: &Polynomial1D,
    apply: bool,
) -> Series {
    thrust
        .iter()
        .zip(battery)
        .map(|(&(t, value), &(_, voltage))| {
            let gamma = correction_factor.evaluate(voltage);
            if apply {
                (t, value * gamma)
            } else {
                (t, value / gamma)
            }
        })
        .collect()
}

/// Predicts the throttle for each thrust sample. When `correction_factor` is
/// given the thrust is first multiplied by γ(V).
pub fn compute_throttle(
    thrust: &[(f64, f64)],
    battery: &[(f64, f64)],
    correction_factor: Option<&Polynomial1D>,
    model: &ThrottleModel,
) -> Series {
    let corrected;
    let thrust_input = match correction_factor {
        Some(cf) => {
            corrected = compute_thrust(thrust, battery, cf, true);
            corrected.as_slice()
        }
        None => thrust,
    };

    thrust_input
        .iter()
        .zip(battery)
        .map(|(&(t, thrust_value), &(_, voltage))| {
            let throttle = model.throttle(thrust_value, voltage);
            if throttle.is_nan() {
                log::warn!("NaN value at: Thrust {thrust_value}, Voltage {voltage}");
            }
            (t, throttle)
        })
        .collect()
}

/// Error series between two aligned series and its summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSeries {
    /// `(key, |v1 − v2| / 10)` for every pair with equal keys.
    pub errors: Series,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl ErrorSeries {
    pub fn values(&self) -> Vec<f64> {
        self.errors.iter().map(|&(_, e)| e).collect()
    }
}

/// Compares two series pairwise. Only pairs whose keys are equal contribute.
pub fn compute_error(data1: &[(f64, f64)], data2: &[(f64, f64)]) -> ErrorSeries {
    let errors: Series = data1
        .iter()
        .zip(data2)
        .filter(|((k1, _), (k2, _))| k1 == k2)
        .map(|(&(k, v1), &(_, v2))| {
            let error = (v1 - v2).abs() / ERROR_PERCENT_DIVISOR;
            if error.is_nan() {
                log::warn!("NaN error between {v1} and {v2}");
            }
            (k, error)
        })
        .collect();

    let values = Array1::from_iter(errors.iter().map(|&(_, e)| e));
    let mean = values.mean().unwrap_or(f64::NAN);
    let std = if values.is_empty() { f64::NAN } else { values.std(0.0) };
    log::info!("Error : {mean} | {std}");

    ErrorSeries { errors, mean, std }
}
