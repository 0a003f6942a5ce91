// src/data_analysis/mod.rs

pub mod compute_results;
pub mod curve_fit;
pub mod disturbance_estimation;
pub mod polynomial;
pub mod signal_processing;
pub mod thrust_map;

// src/data_analysis/mod.rs
