// src/data_analysis/curve_fit.rs
//
// Least-squares fits for the correction factor curve and the thrust map surface.
// Both models are linear in their coefficients, so the solve is a single SVD of
// the column-scaled design matrix.

use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::data_analysis::polynomial::{Polynomial1D, SurfaceModel};
use crate::error::{AnalysisError, Result};

const SVD_EPSILON: f64 = 1e-12;

/// Residual statistics of a fit (residual = model − observed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    pub mean_abs_error: f64,
    /// Sample standard deviation (n − 1) of the signed residuals.
    pub std_error: f64,
    pub rmse: f64,
    pub max_abs_error: f64,
    pub samples: usize,
}

impl FitStatistics {
    pub fn from_residuals(residuals: &[f64]) -> Self {
        if residuals.is_empty() {
            return Self {
                mean_abs_error: 0.0,
                std_error: 0.0,
                rmse: 0.0,
                max_abs_error: 0.0,
                samples: 0,
            };
        }
        let r = Array1::from_vec(residuals.to_vec());
        let abs = r.mapv(f64::abs);
        let std_error = if r.len() > 1 { r.std(1.0) } else { 0.0 };
        Self {
            mean_abs_error: abs.mean().unwrap_or(0.0),
            std_error,
            rmse: r.mapv(|v| v * v).mean().unwrap_or(0.0).sqrt(),
            max_abs_error: *abs.max().unwrap_or(&0.0),
            samples: r.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurveFit {
    pub polynomial: Polynomial1D,
    pub statistics: FitStatistics,
}

#[derive(Debug, Clone)]
pub struct SurfaceFit {
    pub model: SurfaceModel,
    pub coefficients: Vec<f64>,
    pub statistics: FitStatistics,
}

impl SurfaceFit {
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.model.evaluate(x, y, &self.coefficients)
    }
}

/// Solves `min ||A c - b||` for the rows of `design`.
fn solve_least_squares(design: Vec<Vec<f64>>, targets: &[f64]) -> Result<Vec<f64>> {
    let rows = design.len();
    let cols = design.first().map(|r| r.len()).unwrap_or(0);
    if rows < cols || cols == 0 {
        return Err(AnalysisError::InsufficientData {
            needed: cols.max(1),
            got: rows,
        });
    }

    let mut a = DMatrix::from_fn(rows, cols, |i, j| design[i][j]);

    // Scale columns to unit norm so high powers of the voltage do not swamp the SVD threshold.
    let mut scales = Vec::with_capacity(cols);
    for mut column in a.column_iter_mut() {
        let norm = column.norm();
        let scale = if norm > 0.0 { norm } else { 1.0 };
        column /= scale;
        scales.push(scale);
    }

    let b = DVector::from_column_slice(targets);
    let svd = a.svd(true, true);
    let solution = svd
        .solve(&b, SVD_EPSILON)
        .map_err(|e| AnalysisError::FitFailed(e.to_string()))?;

    let coefficients: Vec<f64> = solution
        .iter()
        .zip(&scales)
        .map(|(c, s)| c / s)
        .collect();

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(AnalysisError::FitFailed(
            "non-finite coefficient in solution".to_string(),
        ));
    }
    Ok(coefficients)
}

/// Fits `y = c0 + c1 x + ... + c_d x^d` to `(x, y)` points. `degree` must be 1, 2 or 3.
pub fn fit_polynomial(points: &[(f64, f64)], degree: usize) -> Result<CurveFit> {
    if !(1..=3).contains(&degree) {
        return Err(AnalysisError::UnsupportedFitDegree(degree));
    }
    let finite: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if finite.len() < points.len() {
        log::warn!(
            "Ignoring {} non-finite points in curve fit",
            points.len() - finite.len()
        );
    }

    let design: Vec<Vec<f64>> = finite
        .iter()
        .map(|(x, _)| (0..=degree).map(|p| x.powi(p as i32)).collect())
        .collect();
    let targets: Vec<f64> = finite.iter().map(|(_, y)| *y).collect();

    let coefficients = solve_least_squares(design, &targets)?;
    let polynomial = Polynomial1D::from_coefficients(coefficients)?;

    let residuals: Vec<f64> = finite
        .iter()
        .map(|(x, y)| polynomial.evaluate(*x) - y)
        .collect();

    Ok(CurveFit {
        statistics: FitStatistics::from_residuals(&residuals),
        polynomial,
    })
}

/// Fits `z = f(x, y)` with the given surface model.
pub fn fit_surface(x: &[f64], y: &[f64], z: &[f64], model: SurfaceModel) -> Result<SurfaceFit> {
    let n = x.len().min(y.len()).min(z.len());
    if n != x.len() || n != y.len() || n != z.len() {
        log::warn!(
            "Surface fit inputs have different lengths ({}, {}, {}), using the first {n}",
            x.len(),
            y.len(),
            z.len()
        );
    }

    let design: Vec<Vec<f64>> = (0..n).map(|i| model.basis(x[i], y[i])).collect();
    let coefficients = solve_least_squares(design, &z[..n])?;

    let residuals: Vec<f64> = (0..n)
        .map(|i| model.evaluate(x[i], y[i], &coefficients) - z[i])
        .collect();

    Ok(SurfaceFit {
        model,
        coefficients,
        statistics: FitStatistics::from_residuals(&residuals),
    })
}
