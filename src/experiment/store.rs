//! Experiment Store - in-memory storage for experiment tracking data
//!
//! Backs the in-memory tracking backend and holds everything a run records:
//! parameters, metrics, artifacts and registry versions.

use std::collections::HashMap;

use super::{
    ArtifactRecord, ExperimentRecord, MetricRecord, ModelVersionRecord, ParamRecord, RunRecord,
    RunStatus,
};

/// In-memory store for experiment tracking data.
///
/// Runs and experiments are keyed by ID; records logged against runs are kept
/// in insertion order.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    experiments: HashMap<String, ExperimentRecord>,
    runs: HashMap<String, RunRecord>,
    params: Vec<ParamRecord>,
    metrics: Vec<MetricRecord>,
    artifacts: Vec<ArtifactRecord>,
    model_versions: Vec<ModelVersionRecord>,
}

impl ExperimentStore {
    /// Create a new empty experiment store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store holds nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
            && self.runs.is_empty()
            && self.params.is_empty()
            && self.metrics.is_empty()
            && self.artifacts.is_empty()
    }

    /// Number of experiments.
    #[must_use]
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Number of runs.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Number of parameter records.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Number of metric records.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    /// Number of artifact records.
    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Number of model registry versions across all names.
    #[must_use]
    pub fn model_version_count(&self) -> usize {
        self.model_versions.len()
    }

    /// Add an experiment, replacing any with the same ID.
    pub fn add_experiment(&mut self, experiment: ExperimentRecord) {
        self.experiments
            .insert(experiment.experiment_id().to_string(), experiment);
    }

    /// Make sure an experiment with `experiment_id` exists.
    pub fn ensure_experiment(&mut self, experiment_id: &str) {
        if !self.experiments.contains_key(experiment_id) {
            let name = if experiment_id == super::DEFAULT_EXPERIMENT_ID {
                super::DEFAULT_EXPERIMENT_NAME.to_string()
            } else {
                format!("experiment-{experiment_id}")
            };
            self.add_experiment(ExperimentRecord::new(experiment_id, name));
        }
    }

    /// Get an experiment by ID.
    #[must_use]
    pub fn get_experiment(&self, experiment_id: &str) -> Option<&ExperimentRecord> {
        self.experiments.get(experiment_id)
    }

    /// Add a run to the store.
    pub fn add_run(&mut self, run: RunRecord) {
        self.runs.insert(run.run_id().to_string(), run);
    }

    /// Get a run by ID.
    #[must_use]
    pub fn get_run(&self, run_id: &str) -> Option<&RunRecord> {
        self.runs.get(run_id)
    }

    /// Finalize a run. Returns `false` if the run is unknown.
    pub fn finish_run(&mut self, run_id: &str, status: RunStatus) -> bool {
        self.runs.get_mut(run_id).map_or(false, |run| {
            run.finish(status);
            true
        })
    }

    /// Get all runs for an experiment.
    #[must_use]
    pub fn get_runs_for_experiment(&self, experiment_id: &str) -> Vec<&RunRecord> {
        self.runs
            .values()
            .filter(|run| run.experiment_id() == experiment_id)
            .collect()
    }

    /// Add a parameter record.
    pub fn add_param(&mut self, param: ParamRecord) {
        self.params.push(param);
    }

    /// Parameters logged against a run, in logging order.
    #[must_use]
    pub fn params_for_run(&self, run_id: &str) -> Vec<&ParamRecord> {
        self.params.iter().filter(|p| p.run_id() == run_id).collect()
    }

    /// Add a metric record.
    pub fn add_metric(&mut self, metric: MetricRecord) {
        self.metrics.push(metric);
    }

    /// All metrics logged against a run, in logging order.
    #[must_use]
    pub fn metrics_for_run(&self, run_id: &str) -> Vec<&MetricRecord> {
        self.metrics.iter().filter(|m| m.run_id() == run_id).collect()
    }

    /// Get metrics for a specific run and key, ordered by step.
    ///
    /// ```rust
    /// use elasticnet_runlog::experiment::{ExperimentStore, MetricRecord};
    ///
    /// let mut store = ExperimentStore::new();
    /// store.add_metric(MetricRecord::new("run-001", "rmse", 0.9).at_step(1));
    /// store.add_metric(MetricRecord::new("run-001", "rmse", 1.2));
    ///
    /// let curve = store.get_metrics_for_run("run-001", "rmse");
    /// assert_eq!(curve[0].step(), 0);
    /// ```
    #[must_use]
    pub fn get_metrics_for_run(&self, run_id: &str, key: &str) -> Vec<MetricRecord> {
        let mut metrics: Vec<MetricRecord> = self
            .metrics
            .iter()
            .filter(|m| m.run_id() == run_id && m.key() == key)
            .cloned()
            .collect();
        metrics.sort_by_key(MetricRecord::step);
        metrics
    }

    /// Add an artifact record.
    pub fn add_artifact(&mut self, artifact: ArtifactRecord) {
        self.artifacts.push(artifact);
    }

    /// Artifacts logged against a run.
    #[must_use]
    pub fn artifacts_for_run(&self, run_id: &str) -> Vec<&ArtifactRecord> {
        self.artifacts.iter().filter(|a| a.run_id() == run_id).collect()
    }

    /// Register a new version of `name` and return its version number.
    pub fn register_model_version(&mut self, name: &str, run_id: &str, source: &str) -> u32 {
        let version = self
            .model_versions
            .iter()
            .filter(|v| v.name() == name)
            .map(ModelVersionRecord::version)
            .max()
            .unwrap_or(0)
            + 1;
        self.model_versions
            .push(ModelVersionRecord::new(name, version, run_id, source));
        version
    }

    /// Versions registered under `name`, oldest first.
    #[must_use]
    pub fn model_versions(&self, name: &str) -> Vec<&ModelVersionRecord> {
        self.model_versions.iter().filter(|v| v.name() == name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_default() {
        let store = ExperimentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.run_count(), 0);
        assert_eq!(store.model_version_count(), 0);
    }

    #[test]
    fn test_finish_unknown_run() {
        let mut store = ExperimentStore::new();
        assert!(!store.finish_run("missing", RunStatus::Finished));
    }

    #[test]
    fn test_ensure_default_experiment() {
        let mut store = ExperimentStore::new();
        store.ensure_experiment("0");
        store.ensure_experiment("0");
        assert_eq!(store.experiment_count(), 1);
        assert_eq!(store.get_experiment("0").unwrap().name(), "Default");
    }

    #[test]
    fn test_model_versions_increment_per_name() {
        let mut store = ExperimentStore::new();
        assert_eq!(store.register_model_version("wine", "run-1", "runs:/run-1/model"), 1);
        assert_eq!(store.register_model_version("wine", "run-2", "runs:/run-2/model"), 2);
        assert_eq!(store.register_model_version("other", "run-2", "runs:/run-2/model"), 1);
        assert_eq!(store.model_versions("wine").len(), 2);
    }
}
