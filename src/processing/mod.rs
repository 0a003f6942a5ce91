// src/processing/mod.rs

pub mod flight_analysis;
pub mod flight_preparation;
pub mod pipeline;
pub mod results_from_csv;

// src/processing/mod.rs
