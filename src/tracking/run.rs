//! Scoped run guard

use super::TrackingBackend;
use crate::experiment::RunStatus;
use crate::model::ModelArtifact;
use crate::Result;

/// An open tracking run.
///
/// Call [`finish`](Self::finish) on success. Dropping the guard without
/// finishing (an early `?` return or a panic) marks the run `FAILED`.
pub struct ActiveRun<'a> {
    backend: &'a dyn TrackingBackend,
    run_id: String,
    ended: bool,
}

impl<'a> ActiveRun<'a> {
    pub(super) fn new(backend: &'a dyn TrackingBackend, run_id: String) -> Self {
        Self {
            backend,
            run_id,
            ended: false,
        }
    }

    /// Identifier assigned by the tracking backend.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Record a parameter on this run.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub fn log_param(&self, key: &str, value: impl ToString) -> Result<()> {
        self.backend.log_param(&self.run_id, key, &value.to_string())
    }

    /// Record a metric on this run.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub fn log_metric(&self, key: &str, value: f64) -> Result<()> {
        self.backend.log_metric(&self.run_id, key, value)
    }

    /// Store a model artifact, optionally registering it.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub fn log_model(
        &self,
        artifact: &ModelArtifact,
        artifact_path: &str,
        registered_model_name: Option<&str>,
    ) -> Result<()> {
        self.backend
            .log_model(&self.run_id, artifact, artifact_path, registered_model_name)
    }

    /// Finalize the run as `FINISHED`.
    ///
    /// # Errors
    ///
    /// Propagates the backend error. The run then stays open and the guard
    /// marks it `FAILED` as it drops.
    pub fn finish(mut self) -> Result<String> {
        self.backend.end_run(&self.run_id, RunStatus::Finished)?;
        self.ended = true;
        Ok(std::mem::take(&mut self.run_id))
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        if !self.ended {
            let _ = self.backend.end_run(&self.run_id, RunStatus::Failed);
        }
    }
}

impl std::fmt::Debug for ActiveRun<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRun")
            .field("run_id", &self.run_id)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}
