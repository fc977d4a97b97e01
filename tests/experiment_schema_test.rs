//! Experiment Schema Tests
//!
//! Records and the in-memory store every tracking backend builds on.

use elasticnet_runlog::experiment::{
    ArtifactRecord, ExperimentRecord, ExperimentStore, MetricRecord, ModelVersionRecord,
    ParamRecord, RunRecord, RunStatus,
};

// =============================================================================
// ExperimentRecord Tests
// =============================================================================

#[test]
fn test_experiment_record_creation() {
    let record = ExperimentRecord::new("exp-001", "Wine Quality");

    assert_eq!(record.experiment_id(), "exp-001");
    assert_eq!(record.name(), "Wine Quality");
    assert!(record.created_at().timestamp() > 0);
    assert!(record.artifact_location().is_none());
}

#[test]
fn test_experiment_record_serialization() {
    let record = ExperimentRecord::new("exp-003", "Serialization Test")
        .with_artifact_location("/srv/mlruns/exp-003");

    let json = serde_json::to_string(&record).expect("serialization failed");
    let deserialized: ExperimentRecord =
        serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(record, deserialized);
}

// =============================================================================
// RunRecord Tests
// =============================================================================

#[test]
fn test_run_record_starts_running() {
    let run = RunRecord::start("run-001", "0");

    assert_eq!(run.run_id(), "run-001");
    assert_eq!(run.experiment_id(), "0");
    assert_eq!(run.status(), RunStatus::Running);
    assert!(run.end_time().is_none());
    assert!(run.run_name().is_none());
}

#[test]
fn test_run_record_finish() {
    let mut run = RunRecord::start("run-002", "0").with_run_name("nightly");
    run.finish(RunStatus::Finished);

    assert_eq!(run.status(), RunStatus::Finished);
    assert_eq!(run.run_name(), Some("nightly"));
    assert!(run.end_time().unwrap() >= run.start_time());
}

#[test]
fn test_run_record_terminal_status_is_sticky() {
    let mut run = RunRecord::start("run-003", "0");
    run.finish(RunStatus::Finished);
    let ended = run.end_time();

    run.finish(RunStatus::Failed);

    assert_eq!(run.status(), RunStatus::Finished);
    assert_eq!(run.end_time(), ended);
}

#[test]
fn test_run_status_wire_names() {
    assert_eq!(serde_json::to_string(&RunStatus::Running).unwrap(), "\"RUNNING\"");
    assert_eq!(serde_json::to_string(&RunStatus::Finished).unwrap(), "\"FINISHED\"");
    assert_eq!(RunStatus::Failed.as_str(), "FAILED");
    assert_eq!(RunStatus::Killed.as_str(), "KILLED");
    assert!(!RunStatus::Running.is_terminal());
    assert!(RunStatus::Killed.is_terminal());
}

// =============================================================================
// Param / Metric Tests
// =============================================================================

#[test]
fn test_param_record() {
    let param = ParamRecord::new("run-001", "l1_ratio", "0.5");
    assert_eq!(param.run_id(), "run-001");
    assert_eq!(param.key(), "l1_ratio");
    assert_eq!(param.value(), "0.5");
}

#[test]
fn test_metric_record_defaults_to_step_zero() {
    let metric = MetricRecord::new("run-001", "rmse", 0.71);

    assert_eq!(metric.step(), 0);
    assert!((metric.value() - 0.71).abs() < f64::EPSILON);
    assert_eq!(metric.timestamp_millis(), metric.timestamp().timestamp_millis());
}

#[test]
fn test_metrics_for_run_sorted_by_step() {
    let mut store = ExperimentStore::new();
    store.add_metric(MetricRecord::new("run-001", "rmse", 0.8).at_step(2));
    store.add_metric(MetricRecord::new("run-001", "rmse", 1.0));
    store.add_metric(MetricRecord::new("run-001", "rmse", 0.9).at_step(1));
    store.add_metric(MetricRecord::new("run-001", "mae", 0.5));
    store.add_metric(MetricRecord::new("run-002", "rmse", 0.1));

    let steps: Vec<u64> = store
        .get_metrics_for_run("run-001", "rmse")
        .iter()
        .map(MetricRecord::step)
        .collect();
    assert_eq!(steps, vec![0, 1, 2]);
    assert_eq!(store.metrics_for_run("run-001").len(), 4);
}

// =============================================================================
// Artifact / Registry Tests
// =============================================================================

#[test]
fn test_artifact_record_registration() {
    let plain = ArtifactRecord::new("run-001", "model", "elasticnet", 512);
    assert!(plain.registered_model_name().is_none());
    assert_eq!(plain.size_bytes(), 512);

    let registered = plain.clone().registered_as("ElasticnetWineModel");
    assert_eq!(registered.registered_model_name(), Some("ElasticnetWineModel"));
    assert_eq!(registered.flavor(), "elasticnet");
}

#[test]
fn test_model_versions_increment_per_name() {
    let mut store = ExperimentStore::new();
    assert_eq!(store.register_model_version("wine", "run-1", "runs:/run-1/model"), 1);
    assert_eq!(store.register_model_version("wine", "run-2", "runs:/run-2/model"), 2);
    assert_eq!(store.register_model_version("other", "run-3", "runs:/run-3/model"), 1);

    let versions: Vec<u32> = store
        .model_versions("wine")
        .into_iter()
        .map(ModelVersionRecord::version)
        .collect();
    assert_eq!(versions, vec![1, 2]);
    assert_eq!(store.model_version_count(), 3);
}

// =============================================================================
// ExperimentStore Tests
// =============================================================================

#[test]
fn test_store_lifecycle() {
    let mut store = ExperimentStore::new();
    assert!(store.is_empty());

    store.ensure_experiment("0");
    store.ensure_experiment("0");
    assert_eq!(store.experiment_count(), 1);
    assert_eq!(store.get_experiment("0").unwrap().name(), "Default");

    store.add_run(RunRecord::start("run-001", "0"));
    store.add_param(ParamRecord::new("run-001", "alpha", "0.5"));
    store.add_artifact(ArtifactRecord::new("run-001", "model", "elasticnet", 10));
    assert!(store.finish_run("run-001", RunStatus::Finished));
    assert!(!store.finish_run("run-404", RunStatus::Finished));

    assert_eq!(store.run_count(), 1);
    assert_eq!(store.param_count(), 1);
    assert_eq!(store.artifact_count(), 1);
    assert_eq!(store.get_runs_for_experiment("0").len(), 1);
    assert!(store.get_runs_for_experiment("7").is_empty());
}

#[test]
fn test_store_names_non_default_experiments() {
    let mut store = ExperimentStore::new();
    store.ensure_experiment("12");
    assert_eq!(store.get_experiment("12").unwrap().name(), "experiment-12");
}
