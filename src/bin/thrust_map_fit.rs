// src/bin/thrust_map_fit.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use thrust_map_analysis::config::{load_config, ThrustMapConfig};
use thrust_map_analysis::data_analysis::polynomial::SurfaceModel;
use thrust_map_analysis::data_analysis::thrust_map::{
    compute_fit_error, fit_thrust_map, store_coefficients, store_error_report,
};
use thrust_map_analysis::data_input::stand_data::{data_assemble, filter_data, DataSource};
use thrust_map_analysis::plot_functions::plot_thrust_map::plot_thrust_map;

#[derive(Parser, Debug)]
#[command(version, about = "Fit a thrust map surface to thrust-stand CSV data")]
#[command(group(ArgGroup::new("input").required(true).args(["files", "directory"])))]
struct Args {
    /// Stand CSV files to combine.
    #[arg(short, long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Directory whose CSV files are combined.
    #[arg(short, long)]
    directory: Option<PathBuf>,

    #[arg(short, long, default_value = "thrust_map/config/config_fit.yaml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config: ThrustMapConfig = load_config(&args.config)
        .with_context(|| format!("loading config '{}'", args.config.display()))?;

    let source = match args.directory {
        Some(dir) => DataSource::Directory(dir),
        None => DataSource::Files(args.files),
    };
    let samples = data_assemble(&source, config.combined_data_file.as_deref())
        .context("assembling thrust-stand data")?;
    let filtered = filter_data(&samples, &config.data_filter);

    let model = config.poly_deg.unwrap_or_else(|| {
        log::warn!("No polynomial degree configured, fitting a {} order surface", SurfaceModel::Second);
        SurfaceModel::Second
    });
    let fit = fit_thrust_map(&filtered, model).context("fitting thrust map")?;

    let coefficients_path = config.results_dir.join(&config.coefficients_file);
    store_coefficients(&fit, &coefficients_path)?;

    if config.compute_error {
        let statistics = compute_fit_error(&filtered, &fit);
        log::info!(
            "Mean error {:.4} µs, standard deviation {:.4} µs",
            statistics.mean_abs_error,
            statistics.std_error
        );
        store_error_report(&statistics, &config.results_dir.join(&config.error_report_file))?;
    }

    if config.plot_results {
        plot_thrust_map(
            &config.plot_dir.join("thrust_map_fit.png"),
            &filtered,
            Some(&fit),
            config.plotting.color(),
        )?;
    }

    Ok(())
}

// src/bin/thrust_map_fit.rs
