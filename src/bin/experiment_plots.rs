// src/bin/experiment_plots.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use thrust_map_analysis::config::{load_config, CorrectionFactorConfig};
use thrust_map_analysis::data_input::csv_results::csv_files_in;
use thrust_map_analysis::plot_functions::plot_experiments::{
    plot_bat_vs_time, plot_errors, plot_position_z, DEFAULT_POSITION_REFERENCE_M,
};
use thrust_map_analysis::plot_functions::plot_series::plot_line_only;
use thrust_map_analysis::processing::pipeline::configured_correction_factor;
use thrust_map_analysis::processing::results_from_csv::computed_thrust_expected;

#[derive(Parser, Debug)]
#[command(version, about = "Overlay plots of experiment and error CSVs")]
struct Args {
    #[arg(short, long, default_value = "correction_factor/config/config_default.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Throttle and thrust errors of several error CSVs.
    Errors {
        /// Error CSVs; defaults to every CSV in `<data_dir>/errors`.
        files: Vec<PathBuf>,
    },
    /// Height of several flights against a reference.
    Position {
        files: Vec<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_POSITION_REFERENCE_M)]
        reference: f64,
    },
    /// Battery voltage of several flights over time.
    Battery { files: Vec<PathBuf> },
    /// Thrust expected from the configured γ(B) against measured and commanded thrust.
    ThrustExpected { files: Vec<PathBuf> },
    /// The line `y = m·x + b`.
    Line {
        #[arg(short, long, allow_negative_numbers = true)]
        m: f64,
        #[arg(short, long, allow_negative_numbers = true)]
        b: f64,
        #[arg(long, allow_negative_numbers = true)]
        x_min: f64,
        #[arg(long, allow_negative_numbers = true)]
        x_max: f64,
        #[arg(long, default_value = "Line")]
        title: String,
    },
}

/// Explicit files, or every CSV of `default_dir`.
fn input_files(files: Vec<PathBuf>, default_dir: PathBuf) -> Result<Vec<PathBuf>> {
    if !files.is_empty() {
        return Ok(files);
    }
    log::info!("No files given, using the CSVs in '{}'", default_dir.display());
    csv_files_in(&default_dir).with_context(|| format!("listing '{}'", default_dir.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config: CorrectionFactorConfig = load_config(&args.config)
        .with_context(|| format!("loading config '{}'", args.config.display()))?;
    let plot_dir = &config.plot_dir;
    let experiment_dir = config.data_dir.join(&config.folder_experiment);

    match args.command {
        Command::Errors { files } => {
            let files = input_files(files, config.data_dir.join("errors"))?;
            for path in plot_errors(plot_dir, &files)? {
                log::info!("Saved '{}'", path.display());
            }
        }
        Command::Position { files, reference } => {
            let files = input_files(files, experiment_dir)?;
            let path = plot_position_z(plot_dir, &files, reference)?;
            log::info!("Saved '{}'", path.display());
        }
        Command::Battery { files } => {
            let files = input_files(files, experiment_dir)?;
            let path = plot_bat_vs_time(plot_dir, &files)?;
            log::info!("Saved '{}'", path.display());
        }
        Command::ThrustExpected { files } => {
            let files = input_files(files, experiment_dir)?;
            let cf = configured_correction_factor(&config)?
                .context("thrust-expected needs cf_parameters in the config")?;
            for path in computed_thrust_expected(&files, &cf, plot_dir)? {
                log::info!("Saved '{}'", path.display());
            }
        }
        Command::Line { m, b, x_min, x_max, title } => {
            let path = plot_line_only(plot_dir, m, b, x_min, x_max, &title)?;
            log::info!("Saved '{}'", path.display());
        }
    }

    Ok(())
}

// src/bin/experiment_plots.rs
