// src/main.rs

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use thrust_map_analysis::config::{load_config, CorrectionFactorConfig};
use thrust_map_analysis::crate_version;
use thrust_map_analysis::processing::pipeline::{analyse_flight, get_results, process_rosbag};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Battery correction factor analysis of multirotor flight logs"
)]
struct Args {
    /// YAML config with the bags, the experiment folder and the model parameters.
    #[arg(short, long, default_value = "correction_factor/config/config_default.yaml")]
    config: PathBuf,

    /// Also fit γ(B) on every flight and plot its throttle comparison.
    #[arg(long)]
    per_flight: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("thrust-map-analysis {}", crate_version());

    let config: CorrectionFactorConfig = load_config(&args.config)
        .with_context(|| format!("loading config '{}'", args.config.display()))?;

    if config.rosbags.is_empty() {
        log::warn!("No rosbags configured, using the existing flight CSVs");
    }

    // --- Per-bag preprocessing ---
    for (name, bag_path) in &config.rosbags {
        if !bag_path.exists() {
            bail!("The rosbag '{}' does not exist", bag_path.display());
        }
        let (flight, _) = process_rosbag(name, bag_path, &config)
            .with_context(|| format!("processing rosbag '{}'", bag_path.display()))?;

        if args.per_flight {
            let analysis = analyse_flight(&flight, &config)
                .with_context(|| format!("analysing flight '{name}'"))?;
            log::info!(
                "'{name}': throttle error with γ(B) {:.3} ± {:.3}, without {:.3} ± {:.3}",
                analysis.throttle_error_with_cf.mean,
                analysis.throttle_error_with_cf.std,
                analysis.throttle_error_without_cf.mean,
                analysis.throttle_error_without_cf.std
            );
        }
    }

    // --- Experiment results ---
    let results = get_results(&config).context("computing experiment results")?;
    log::info!(
        "Unified {} rows into '{}', errors in '{}'",
        results.rows,
        results.unified_csv.display(),
        results.errors_csv.display()
    );
    if let Some(cf) = &results.correction_factor {
        log::info!("Correction factor: {}", cf.equation("B"));
    }

    Ok(())
}

// src/main.rs
