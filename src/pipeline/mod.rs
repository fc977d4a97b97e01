//! Training run orchestration
//!
//! [`RunOrchestrator::train_and_log`] ties a tracking run to the logging
//! channel: the run is opened, its identifier retargets the channel's file
//! sink, and everything from fitting to model logging lands in
//! `run_<identifier>.log`.

mod orchestrator;

pub use orchestrator::{RunOrchestrator, MODEL_ARTIFACT_PATH, MODEL_CHANNEL_NAME};
