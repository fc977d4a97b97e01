//! In-process tracking backend over an [`ExperimentStore`]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{new_run_id, TrackingBackend};
use crate::experiment::{ArtifactRecord, ExperimentStore, MetricRecord, ParamRecord, RunRecord, RunStatus};
use crate::model::ModelArtifact;
use crate::{Error, Result};

/// Tracking backend keeping everything in memory.
///
/// The store is shared, so callers can keep a handle from
/// [`store`](Self::store) and inspect what a run recorded after the backend
/// has been moved into a [`TrackingService`](super::TrackingService).
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Arc<Mutex<ExperimentStore>>,
    registry: bool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty store with registry support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(ExperimentStore::new())),
            registry: true,
        }
    }

    /// Empty store that rejects model registration.
    #[must_use]
    pub fn without_registry() -> Self {
        Self {
            registry: false,
            ..Self::new()
        }
    }

    /// Shared handle to the underlying store.
    #[must_use]
    pub fn store(&self) -> Arc<Mutex<ExperimentStore>> {
        Arc::clone(&self.store)
    }

    fn lock(&self) -> MutexGuard<'_, ExperimentStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_run(store: &ExperimentStore, run_id: &str) -> Result<()> {
        if store.get_run(run_id).is_none() {
            return Err(Error::Tracking(format!("run '{run_id}' not found")));
        }
        Ok(())
    }
}

impl TrackingBackend for MemoryBackend {
    fn create_run(&self, experiment_id: &str) -> Result<String> {
        let run_id = new_run_id();
        let mut store = self.lock();
        store.ensure_experiment(experiment_id);
        store.add_run(RunRecord::start(run_id.clone(), experiment_id));
        Ok(run_id)
    }

    fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        let mut store = self.lock();
        Self::require_run(&store, run_id)?;
        store.add_param(ParamRecord::new(run_id, key, value));
        Ok(())
    }

    fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<()> {
        let mut store = self.lock();
        Self::require_run(&store, run_id)?;
        store.add_metric(MetricRecord::new(run_id, key, value));
        Ok(())
    }

    fn log_model(
        &self,
        run_id: &str,
        artifact: &ModelArtifact,
        artifact_path: &str,
        registered_model_name: Option<&str>,
    ) -> Result<()> {
        if registered_model_name.is_some() && !self.registry {
            return Err(Error::RegistryUnsupported("memory:".to_string()));
        }
        let mut store = self.lock();
        Self::require_run(&store, run_id)?;

        let mut record =
            ArtifactRecord::new(run_id, artifact_path, artifact.flavor(), artifact.size_bytes());
        if let Some(name) = registered_model_name {
            store.register_model_version(name, run_id, &format!("runs:/{run_id}/{artifact_path}"));
            record = record.registered_as(name);
        }
        store.add_artifact(record);
        Ok(())
    }

    fn end_run(&self, run_id: &str, status: RunStatus) -> Result<()> {
        if self.lock().finish_run(run_id, status) {
            Ok(())
        } else {
            Err(Error::Tracking(format!("run '{run_id}' not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_against_known_run() {
        let backend = MemoryBackend::new();
        let run_id = backend.create_run("0").unwrap();
        backend.log_param(&run_id, "alpha", "0.5").unwrap();
        backend.log_metric(&run_id, "rmse", 0.7).unwrap();

        let store = backend.store();
        let store = store.lock().unwrap();
        assert_eq!(store.params_for_run(&run_id).len(), 1);
        assert_eq!(store.metrics_for_run(&run_id).len(), 1);
    }

    #[test]
    fn test_unknown_run_rejected() {
        let backend = MemoryBackend::new();
        assert!(backend.log_param("ghost", "alpha", "0.5").is_err());
        assert!(backend.end_run("ghost", RunStatus::Finished).is_err());
    }

    #[test]
    fn test_registration_can_be_disabled() {
        let backend = MemoryBackend::without_registry();
        let run_id = backend.create_run("0").unwrap();
        let artifact = ModelArtifact::new("elasticnet", b"{}".to_vec());

        let err = backend
            .log_model(&run_id, &artifact, "model", Some("WineModel"))
            .unwrap_err();
        assert!(matches!(err, Error::RegistryUnsupported(_)));
        backend.log_model(&run_id, &artifact, "model", None).unwrap();
    }
}
