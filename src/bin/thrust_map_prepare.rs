// src/bin/thrust_map_prepare.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use thrust_map_analysis::config::{load_config, ThrustMapConfig};
use thrust_map_analysis::data_input::stand_data::{data_assemble, filter_data, DataSource};
use thrust_map_analysis::plot_functions::plot_thrust_map::plot_thrust_map;

#[derive(Parser, Debug)]
#[command(version, about = "Combine, filter and plot thrust-stand CSV data")]
#[command(group(ArgGroup::new("input").required(true).args(["files", "directory"])))]
struct Args {
    /// Stand CSV files to combine.
    #[arg(short, long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Directory whose CSV files are combined.
    #[arg(short, long)]
    directory: Option<PathBuf>,

    #[arg(short, long, default_value = "thrust_map/config/config_prepare.yaml")]
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
    let samples = data_assemble(&source, config.output_file.as_deref())
        .context("assembling thrust-stand data")?;
    let filtered = filter_data(&samples, &config.data_filter);
    log::info!("{} of {} samples inside the filter bounds", filtered.len(), samples.len());

    plot_thrust_map(
        &config.plot_dir.join("thrust_map_data.png"),
        &filtered,
        None,
        config.plotting.color(),
    )?;

    Ok(())
}

// src/bin/thrust_map_prepare.rs
