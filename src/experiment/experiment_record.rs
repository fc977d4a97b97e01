//! Experiment Record - groups runs under a named experiment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the experiment runs land in when none is configured.
pub const DEFAULT_EXPERIMENT_ID: &str = "0";

/// Name given to the default experiment.
pub const DEFAULT_EXPERIMENT_NAME: &str = "Default";

/// Experiment Record represents a tracked experiment.
///
/// Each experiment can have multiple runs; stores create the default
/// experiment lazily on the first run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentRecord {
    experiment_id: String,
    name: String,
    artifact_location: Option<String>,
    created_at: DateTime<Utc>,
}

impl ExperimentRecord {
    /// Create a new experiment record with the given ID and name.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            name: name.into(),
            artifact_location: None,
            created_at: Utc::now(),
        }
    }

    /// The experiment used when nothing else is configured.
    #[must_use]
    pub fn default_experiment() -> Self {
        Self::new(DEFAULT_EXPERIMENT_ID, DEFAULT_EXPERIMENT_NAME)
    }

    /// Set the root URI under which run artifacts are stored.
    #[must_use]
    pub fn with_artifact_location(mut self, location: impl Into<String>) -> Self {
        self.artifact_location = Some(location.into());
        self
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the artifact root, if any.
    #[must_use]
    pub fn artifact_location(&self) -> Option<&str> {
        self.artifact_location.as_deref()
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
