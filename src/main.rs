//! runlog - train ElasticNet on the wine-quality dataset and track the run
//!
//! ```text
//! runlog [ALPHA] [L1_RATIO]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use elasticnet_runlog::config::PipelineConfig;
use elasticnet_runlog::data::{load_dataset, PreparedData, DEFAULT_TEST_FRACTION, LABEL_COLUMN};
use elasticnet_runlog::logging::LogChannel;
use elasticnet_runlog::pipeline::RunOrchestrator;
use elasticnet_runlog::tracking::{TrackingService, DEFAULT_TRACKING_URI};

/// Train an ElasticNet wine-quality model and log it to experiment tracking
#[derive(Parser, Debug)]
#[command(name = "runlog", version, about)]
struct Cli {
    /// Regularization strength (defaults to DEFAULT_ALPHA)
    alpha: Option<f64>,

    /// L1/L2 mixing ratio in [0, 1] (defaults to DEFAULT_L1_RATIO)
    l1_ratio: Option<f64>,
}

fn setup_logging(config: &PipelineConfig) -> Result<LogChannel> {
    let channel = LogChannel::builder(&config.log_dir).build();
    channel
        .initialize(config.log_level)
        .with_context(|| format!("Failed to initialize logging in {}", config.log_dir.display()))?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(channel.layer().with_filter(filter))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(channel)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = PipelineConfig::load(Path::new(".")).context("Failed to load configuration")?;
    let channel = setup_logging(&config)?;
    let log = channel.get_named_channel("main")?;

    let alpha = cli.alpha.unwrap_or(config.default_alpha);
    let l1_ratio = cli.l1_ratio.unwrap_or(config.default_l1_ratio);

    log.info("Starting pipeline");

    let dataset = load_dataset(&config.dataset_url, &log).context("Failed to load dataset")?;
    let data = PreparedData::from_dataset(
        &dataset,
        LABEL_COLUMN,
        DEFAULT_TEST_FRACTION,
        Some(config.random_state),
    )
    .context("Failed to split dataset")?;

    log.info(&format!(
        "Data prepared. train shape: ({}, {}), test shape: ({}, {})",
        data.train_features.n_rows(),
        data.train_features.n_features(),
        data.test_features.n_rows(),
        data.test_features.n_features(),
    ));

    let mut tracking = TrackingService::connect(DEFAULT_TRACKING_URI)
        .context("Failed to open default tracking store")?
        .with_experiment(config.experiment_id.clone());

    let orchestrator = RunOrchestrator::new(channel, config)?;
    let run_id = orchestrator
        .train_and_log(
            &mut tracking,
            &data.train_features,
            &data.train_labels,
            &data.test_features,
            &data.test_labels,
            alpha,
            l1_ratio,
        )
        .context("Training run failed")?;

    log.info(&format!("Pipeline finished. Run id: {run_id}"));
    Ok(())
}
