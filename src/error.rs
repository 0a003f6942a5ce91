// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading logs, processing signals, fitting or writing results.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("bag storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("config file does not exist: {0}")]
    ConfigNotFound(PathBuf),

    #[error("{0} is not a bag directory or .db3 file")]
    NotABag(PathBuf),

    #[error("CDR decode error at byte {offset}: {reason}")]
    CdrDecode { offset: usize, reason: String },

    #[error("unsupported message type '{type_name}' on topic '{topic}' (expected '{expected}')")]
    UnsupportedMessageType {
        topic: String,
        type_name: String,
        expected: &'static str,
    },

    #[error("message is missing field '{0}'")]
    MissingField(&'static str),

    #[error("acceleration cannot be zero to compute thrust")]
    ZeroAcceleration,

    #[error("column '{column}' has {len} values but '{reference}' has {reference_len}")]
    ColumnLengthMismatch {
        column: String,
        len: usize,
        reference: String,
        reference_len: usize,
    },

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error(
        "invalid polynomial degree '{0}'. Valid degrees are '1st', '2nd', '2nd_truncated', '3rd', '3rd_truncated', '4th'"
    )]
    InvalidPolynomialDegree(String),

    #[error("cannot fit a polynomial of degree {0}, expected 1, 2 or 3")]
    UnsupportedFitDegree(usize),

    #[error("invalid resampling frequency {0} Hz")]
    InvalidFrequency(f64),

    #[error("no polynomial model has {0} coefficients")]
    InvalidCoefficientCount(usize),

    #[error("need at least {needed} points to fit, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("no data: {0}")]
    NoData(String),

    #[error("least-squares solve failed: {0}")]
    FitFailed(String),

    #[error("plotting error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub(crate) fn plot<E: std::fmt::Display>(err: E) -> Self {
        AnalysisError::Plot(err.to_string())
    }
}
