//! Artifact Record - model artifacts and registry versions produced by a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artifact Record represents a model logged under a run's artifact root.
///
/// ## Artifact Path
///
/// `artifact_path` is relative to the run's artifact root, e.g. `model`
/// resolves to `<artifact root>/model/model.json` in the local file store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    run_id: String,
    artifact_path: String,
    flavor: String,
    size_bytes: u64,
    registered_model_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    /// Create a new artifact record.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the parent run
    /// * `artifact_path` - Path under the run's artifact root (e.g., "model")
    /// * `flavor` - Model flavor that produced the payload (e.g., "elasticnet")
    /// * `size_bytes` - Size of the serialized payload in bytes
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        artifact_path: impl Into<String>,
        flavor: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            artifact_path: artifact_path.into(),
            flavor: flavor.into(),
            size_bytes,
            registered_model_name: None,
            created_at: Utc::now(),
        }
    }

    /// Record the registry name this artifact was registered under.
    #[must_use]
    pub fn registered_as(mut self, name: impl Into<String>) -> Self {
        self.registered_model_name = Some(name.into());
        self
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the artifact path.
    #[must_use]
    pub fn artifact_path(&self) -> &str {
        &self.artifact_path
    }

    /// Get the model flavor.
    #[must_use]
    pub fn flavor(&self) -> &str {
        &self.flavor
    }

    /// Get the payload size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Get the registered model name, if the artifact was registered.
    #[must_use]
    pub fn registered_model_name(&self) -> Option<&str> {
        self.registered_model_name.as_deref()
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A version of a registered model, pointing back at the run that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelVersionRecord {
    name: String,
    version: u32,
    run_id: String,
    source: String,
    created_at: DateTime<Utc>,
}

impl ModelVersionRecord {
    /// Create a model version record.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: u32,
        run_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            run_id: run_id.into(),
            source: source.into(),
            created_at: Utc::now(),
        }
    }

    /// Registered model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version number, starting at 1 per name.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Run that produced the model.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Artifact location of the model.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_record_new() {
        let artifact = ArtifactRecord::new("run-1", "model", "elasticnet", 1000);
        assert_eq!(artifact.run_id(), "run-1");
        assert_eq!(artifact.artifact_path(), "model");
        assert_eq!(artifact.flavor(), "elasticnet");
        assert_eq!(artifact.size_bytes(), 1000);
        assert!(artifact.registered_model_name().is_none());
    }

    #[test]
    fn test_artifact_registered_as() {
        let artifact =
            ArtifactRecord::new("run-1", "model", "elasticnet", 10).registered_as("WineModel");
        assert_eq!(artifact.registered_model_name(), Some("WineModel"));
    }
}
