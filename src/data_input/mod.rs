// src/data_input/mod.rs

pub mod bag_reader;
pub mod cdr;
pub mod csv_results;
pub mod log_data;
pub mod messages;
pub mod stand_data;

// src/data_input/mod.rs
