//! Experiment Tracking Schema
//!
//! Records written by every tracking backend, following MLflow's entities.
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentRecord (1) ──< RunRecord (N)
//!                              │
//!                              ├──< ParamRecord (N)
//!                              ├──< MetricRecord (N)
//!                              └──< ArtifactRecord (N) ──> ModelVersionRecord (0..1)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use elasticnet_runlog::experiment::{
//!     ExperimentStore, MetricRecord, ParamRecord, RunRecord, RunStatus,
//! };
//!
//! let mut store = ExperimentStore::new();
//! store.ensure_experiment("0");
//! store.add_run(RunRecord::start("run-001", "0"));
//!
//! store.add_param(ParamRecord::new("run-001", "alpha", "0.5"));
//! store.add_metric(MetricRecord::new("run-001", "rmse", 0.72));
//!
//! store.finish_run("run-001", RunStatus::Finished);
//! ```

mod artifact_record;
mod experiment_record;
mod metric_record;
mod param_record;
mod run_record;
mod store;

pub use artifact_record::{ArtifactRecord, ModelVersionRecord};
pub use experiment_record::{ExperimentRecord, DEFAULT_EXPERIMENT_ID, DEFAULT_EXPERIMENT_NAME};
pub use metric_record::MetricRecord;
pub use param_record::ParamRecord;
pub use run_record::{RunRecord, RunStatus};
pub use store::ExperimentStore;
