//! Sea-breeze front detection service.
//!
//! Scans WRF potential-temperature output for sea-breeze fronts: per time
//! step the field is coarsened, differenced west-east, thresholded and
//! cluster-filtered, then each row is scanned east to west for the leading
//! edge. Found fronts land in one CSV per (case, configuration).

mod config;
mod driver;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use verify_common::JsonModelProvider;

use config::DetectConfig;

#[derive(Parser, Debug)]
#[command(name = "front-finder")]
#[command(about = "Sea-breeze front detection over WRF model output")]
struct Args {
    /// Detection run configuration
    #[arg(short, long, env = "DETECT_CONFIG", default_value = "config/detect.yaml")]
    config: PathBuf,

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

    let cfg = DetectConfig::load(&args.config)?;
    cfg.validate()?;
    info!(
        cases = cfg.cases.len(),
        configurations = cfg.configurations.len(),
        domain = %cfg.domain,
        "starting detection run"
    );

    let models = JsonModelProvider::new(&cfg.model_dir);
    driver::run(&cfg, &models)?;

    info!("detection run complete");
    Ok(())
}
