// src/plot_functions/mod.rs

pub mod plot_experiments;
pub mod plot_fitted_curve;
pub mod plot_series;
pub mod plot_thrust_map;

// src/plot_functions/mod.rs
