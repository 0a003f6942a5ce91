// src/data_analysis/polynomial.rs
//
// Polynomial models used by the fits: 1-D correction factor γ(B) and 2-D thrust
// map surfaces ESC = f(thrust, voltage).

use std::fmt;

use serde::Deserialize;

use crate::error::{AnalysisError, Result};

/// Powers `(i, j)` of `x^i · y^j` for each surface term, in coefficient order.
const GRADED_TERMS: [(u8, u8); 15] = [
    (0, 0),
    (1, 0),
    (0, 1),
    (2, 0),
    (1, 1),
    (0, 2),
    (3, 0),
    (2, 1),
    (1, 2),
    (0, 3),
    (4, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 4),
];

const SECOND_TRUNCATED_TERMS: [(u8, u8); 4] = [(0, 0), (1, 0), (0, 1), (2, 0)];

const THIRD_TRUNCATED_TERMS: [(u8, u8); 7] =
    [(0, 0), (1, 0), (0, 1), (2, 0), (1, 1), (0, 2), (0, 3)];

/// 2-D polynomial surface families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SurfaceModel {
    First,
    Second,
    SecondTruncated,
    Third,
    ThirdTruncated,
    Fourth,
}

impl SurfaceModel {
    /// Parses the degree names used in config files.
    pub fn from_degree_name(name: &str) -> Result<Self> {
        match name.trim() {
            "1st" => Ok(SurfaceModel::First),
            "2nd" => Ok(SurfaceModel::Second),
            "2nd_truncated" => Ok(SurfaceModel::SecondTruncated),
            "3rd" => Ok(SurfaceModel::Third),
            "3rd_truncated" => Ok(SurfaceModel::ThirdTruncated),
            "4th" => Ok(SurfaceModel::Fourth),
            other => Err(AnalysisError::InvalidPolynomialDegree(other.to_string())),
        }
    }

    /// Maps a coefficient count back to the full (non-truncated) model.
    pub fn from_coefficient_count(count: usize) -> Result<Self> {
        match count {
            3 => Ok(SurfaceModel::First),
            6 => Ok(SurfaceModel::Second),
            10 => Ok(SurfaceModel::Third),
            15 => Ok(SurfaceModel::Fourth),
            other => Err(AnalysisError::InvalidCoefficientCount(other)),
        }
    }

    pub fn terms(&self) -> &'static [(u8, u8)] {
        match self {
            SurfaceModel::First => &GRADED_TERMS[..3],
            SurfaceModel::Second => &GRADED_TERMS[..6],
            SurfaceModel::SecondTruncated => &SECOND_TRUNCATED_TERMS,
            SurfaceModel::Third => &GRADED_TERMS[..10],
            SurfaceModel::ThirdTruncated => &THIRD_TRUNCATED_TERMS,
            SurfaceModel::Fourth => &GRADED_TERMS,
        }
    }

    pub fn term_count(&self) -> usize {
        self.terms().len()
    }

    pub fn degree_name(&self) -> &'static str {
        match self {
            SurfaceModel::First => "1st",
            SurfaceModel::Second | SurfaceModel::SecondTruncated => "2nd",
            SurfaceModel::Third | SurfaceModel::ThirdTruncated => "3rd",
            SurfaceModel::Fourth => "4th",
        }
    }

    /// Row of basis values `x^i · y^j` for this model.
    pub fn basis(&self, x: f64, y: f64) -> Vec<f64> {
        self.terms()
            .iter()
            .map(|&(i, j)| x.powi(i as i32) * y.powi(j as i32))
            .collect()
    }

    /// Evaluates the surface. Missing trailing coefficients count as zero.
    pub fn evaluate(&self, x: f64, y: f64, coefficients: &[f64]) -> f64 {
        self.terms()
            .iter()
            .zip(coefficients)
            .map(|(&(i, j), c)| c * x.powi(i as i32) * y.powi(j as i32))
            .sum()
    }
}

impl TryFrom<String> for SurfaceModel {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self> {
        SurfaceModel::from_degree_name(&value)
    }
}

impl fmt::Display for SurfaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degree_name())
    }
}

/// Evaluates a thrust map from any full-graded coefficient vector (up to 4th
/// order) by zero-padding it to 15 terms.
pub fn thrustmap(thrust: f64, voltage: f64, coefficients: &[f64]) -> f64 {
    let mut padded = [0.0; 15];
    for (slot, c) in padded.iter_mut().zip(coefficients) {
        *slot = *c;
    }
    SurfaceModel::Fourth.evaluate(thrust, voltage, &padded)
}

/// 1-D polynomial in ascending power order: `c0 + c1·x + c2·x² + ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial1D {
    coefficients: Vec<f64>,
}

impl Polynomial1D {
    /// Accepts 2, 3 or 4 coefficients (degree 1 to 3).
    pub fn from_coefficients(coefficients: Vec<f64>) -> Result<Self> {
        match coefficients.len() {
            2..=4 => Ok(Self { coefficients }),
            other => Err(AnalysisError::InvalidCoefficientCount(other)),
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        // Horner
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn degree_label(&self) -> &'static str {
        match self.degree() {
            1 => "First",
            2 => "Second",
            _ => "Third",
        }
    }

    /// Human readable form with the highest power first, e.g.
    /// `0.0100 * B^2 + -0.2000 * B + 1.9000`.
    pub fn equation(&self, variable: &str) -> String {
        self.coefficients
            .iter()
            .enumerate()
            .rev()
            .map(|(power, c)| match power {
                0 => format!("{c:.4}"),
                1 => format!("{c:.4}{variable}"),
                p => format!("{c:.4}{variable}^{p}"),
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_counts() {
        assert_eq!(SurfaceModel::First.term_count(), 3);
        assert_eq!(SurfaceModel::Second.term_count(), 6);
        assert_eq!(SurfaceModel::SecondTruncated.term_count(), 4);
        assert_eq!(SurfaceModel::Third.term_count(), 10);
        assert_eq!(SurfaceModel::ThirdTruncated.term_count(), 7);
        assert_eq!(SurfaceModel::Fourth.term_count(), 15);
    }

    #[test]
    fn test_degree_names() {
        assert_eq!(SurfaceModel::from_degree_name("2nd").unwrap(), SurfaceModel::Second);
        assert_eq!(SurfaceModel::from_degree_name("4th").unwrap(), SurfaceModel::Fourth);
        assert_eq!(
            SurfaceModel::from_degree_name("3rd_truncated").unwrap(),
            SurfaceModel::ThirdTruncated
        );
        let err = SurfaceModel::from_degree_name("5th").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPolynomialDegree(_)));
        let message = err.to_string();
        for name in ["1st", "2nd", "2nd_truncated", "3rd", "3rd_truncated", "4th"] {
            assert!(message.contains(&format!("'{name}'")), "{message}");
        }
        assert_eq!(SurfaceModel::from_coefficient_count(10).unwrap(), SurfaceModel::Third);
        assert!(SurfaceModel::from_coefficient_count(7).is_err());
    }

    #[test]
    fn test_second_order_surface_evaluation() {
        // a + b x + c y + d x² + e xy + f y²
        let coeffs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let (x, y) = (2.0, 3.0);
        let expected = 1.0 + 2.0 * x + 3.0 * y + 4.0 * x * x + 5.0 * x * y + 6.0 * y * y;
        assert_eq!(SurfaceModel::Second.evaluate(x, y, &coeffs), expected);
        assert_eq!(thrustmap(x, y, &coeffs), expected);
    }

    #[test]
    fn test_fourth_order_term_order() {
        let basis = SurfaceModel::Fourth.basis(2.0, 3.0);
        assert_eq!(basis.len(), 15);
        assert_eq!(basis[6], 8.0); // x³
        assert_eq!(basis[7], 12.0); // x²y
        assert_eq!(basis[12], 36.0); // x²y²
        assert_eq!(basis[14], 81.0); // y⁴
    }

    #[test]
    fn test_polynomial_1d() {
        let p = Polynomial1D::from_coefficients(vec![1.0, -2.0, 0.5]).unwrap();
        assert_eq!(p.degree(), 2);
        assert_eq!(p.evaluate(2.0), 1.0 - 4.0 + 2.0);
        assert_eq!(p.equation("B"), "0.5000B^2 + -2.0000B + 1.0000");
        assert!(Polynomial1D::from_coefficients(vec![1.0]).is_err());
        assert!(Polynomial1D::from_coefficients(vec![0.0; 5]).is_err());
    }
}
