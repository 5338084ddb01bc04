//! WRF surface verification service.
//!
//! Matches surface station observations against WRF model output and
//! reports statistics:
//! - Whole-run summary tables per variable and configuration
//! - Optional hourly time-series rollups with CSV tables and plots
//! - Land-type corrections applied at the coast, reported at the end

mod config;
mod csvout;
mod plot;
mod png;
mod report;
mod sources;
mod summary;
mod timeseries;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use matcher::LandCorrections;

use config::VerifyConfig;
use sources::{CsvObsProvider, JsonModelProvider};

#[derive(Parser, Debug)]
#[command(name = "verifier")]
#[command(about = "WRF surface verification against station observations")]
struct Args {
    /// Verification run configuration
    #[arg(short, long, env = "VERIFY_CONFIG", default_value = "config/verify.yaml")]
    config: PathBuf,

    /// Run the hourly time-series analysis regardless of the config setting
    #[arg(long)]
    timeseries: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = VerifyConfig::load(&args.config)?;
    cfg.validate()?;
    info!(
        cases = cfg.cases.len(),
        configurations = cfg.configurations.len(),
        variables = cfg.variables.len(),
        domain = %cfg.domain,
        "starting verification run"
    );

    let models = JsonModelProvider::new(&cfg.model_dir);
    let observations = CsvObsProvider::new(&cfg.obs_dir);
    let mut corrections = LandCorrections::new();

    if cfg.time_series_analysis || args.timeseries {
        timeseries::run(&cfg, &models, &observations, &mut corrections)?;
    } else {
        summary::run(&cfg, &models, &observations, &mut corrections)?;
    }

    report::print_land_corrections(&corrections);
    info!("verification run complete");
    Ok(())
}
