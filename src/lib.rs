//! # elasticnet-runlog: ElasticNet training with run-scoped log files
//!
//! Loads the red-wine quality dataset, fits an ElasticNet regression, and
//! records parameters, metrics and the fitted model to an experiment
//! tracking store. The run identifier assigned by the store only becomes
//! known once the run has started; at that point the logging channel
//! retargets its file sink so the rest of the run is written to
//! `run_<identifier>.log`.
//!
//! ## Design Principles
//!
//! - **Explicit context**: the logging channel is a value passed to whoever
//!   logs, never a process global
//! - **Scoped runs**: a tracking run is an RAII guard, so early returns and
//!   panics still finalize it
//! - **Columnar data**: the dataset lives in an Arrow `RecordBatch` until it
//!   is split into feature columns
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use elasticnet_runlog::config::PipelineConfig;
//! use elasticnet_runlog::data::{load_dataset, PreparedData, LABEL_COLUMN};
//! use elasticnet_runlog::logging::LogChannel;
//! use elasticnet_runlog::pipeline::RunOrchestrator;
//! use elasticnet_runlog::tracking::{TrackingService, DEFAULT_TRACKING_URI};
//!
//! let config = PipelineConfig::default();
//! let channel = LogChannel::builder(&config.log_dir).build();
//! channel.initialize(config.log_level)?;
//!
//! let log = channel.get_named_channel("main")?;
//! let dataset = load_dataset(&config.dataset_url, &log)?;
//! let data = PreparedData::from_dataset(&dataset, LABEL_COLUMN, 0.25, Some(config.random_state))?;
//!
//! let mut tracking = TrackingService::connect(DEFAULT_TRACKING_URI)?;
//! let orchestrator = RunOrchestrator::new(channel, config)?;
//! let run_id = orchestrator.train_and_log(
//!     &mut tracking,
//!     &data.train_features,
//!     &data.train_labels,
//!     &data.test_features,
//!     &data.test_labels,
//!     0.5,
//!     0.5,
//! )?;
//! println!("logged run {run_id}");
//! # Ok::<(), elasticnet_runlog::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod data;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod tracking;

pub use error::{Error, Result};
