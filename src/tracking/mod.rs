//! Experiment tracking service
//!
//! [`TrackingService`] is the facade the pipeline talks to. It holds the
//! current endpoint URI and a [`TrackingBackend`] chosen from that URI's
//! scheme:
//!
//! | scheme            | backend                 | model registry |
//! |-------------------|-------------------------|----------------|
//! | `file`, bare path | [`FileStoreBackend`]    | no             |
//! | `http`, `https`   | [`RestBackend`] (MLflow)| yes            |
//! | `memory`          | [`MemoryBackend`]       | yes            |
//!
//! Runs are scoped: [`TrackingService::start_run`] returns an [`ActiveRun`]
//! guard that finalizes the run when dropped.

mod file_store;
mod memory;
mod rest;
mod run;

use std::path::PathBuf;

use reqwest::Url;

pub use file_store::FileStoreBackend;
pub use memory::MemoryBackend;
pub use rest::RestBackend;
pub use run::ActiveRun;

use crate::experiment::{RunStatus, DEFAULT_EXPERIMENT_ID};
use crate::model::ModelArtifact;
use crate::{Error, Result};

/// Endpoint used when none is configured.
pub const DEFAULT_TRACKING_URI: &str = "file:./mlruns";

/// Operations every tracking store supports.
pub trait TrackingBackend: Send {
    /// Create a run under `experiment_id` and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the run.
    fn create_run(&self, experiment_id: &str) -> Result<String>;

    /// Record a parameter.
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the write.
    fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()>;

    /// Record a metric at step 0.
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the write.
    fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<()>;

    /// Store a model under `artifact_path` and optionally register it.
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the write, or
    /// `RegistryUnsupported` if registration is requested from a store
    /// without a registry.
    fn log_model(
        &self,
        run_id: &str,
        artifact: &ModelArtifact,
        artifact_path: &str,
        registered_model_name: Option<&str>,
    ) -> Result<()>;

    /// Finalize a run.
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the update.
    fn end_run(&self, run_id: &str, status: RunStatus) -> Result<()>;
}

/// Scheme of a tracking URI. Bare filesystem paths count as `file`.
#[must_use]
pub fn tracking_scheme(uri: &str) -> String {
    match Url::parse(uri) {
        // single letters are Windows drive prefixes
        Ok(url) if url.scheme().len() > 1 => url.scheme().to_string(),
        _ => "file".to_string(),
    }
}

/// Whether the endpoint is treated as having a model registry.
///
/// Only `file` stores are excluded; every other scheme, including unknown
/// ones, is assumed to accept registrations.
#[must_use]
pub fn supports_registry(uri: &str) -> bool {
    tracking_scheme(uri) != "file"
}

/// Filesystem root of a `file:` URI or bare path.
///
/// # Errors
///
/// Returns `Tracking` if a `file://` URL does not name a local path.
pub fn local_store_root(uri: &str) -> Result<PathBuf> {
    if let Some(rest) = uri.strip_prefix("file:") {
        if rest.starts_with("//") {
            return Url::parse(uri)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| Error::Tracking(format!("'{uri}' is not a local path")));
        }
        return Ok(PathBuf::from(rest));
    }
    Ok(PathBuf::from(uri))
}

/// Build the backend for `uri`.
///
/// # Errors
///
/// Returns `Tracking` for unsupported schemes or malformed URIs.
pub fn open_backend(uri: &str) -> Result<Box<dyn TrackingBackend>> {
    match tracking_scheme(uri).as_str() {
        "file" => Ok(Box::new(FileStoreBackend::open(local_store_root(uri)?)?)),
        "http" | "https" => Ok(Box::new(RestBackend::new(uri)?)),
        "memory" => Ok(Box::new(MemoryBackend::new())),
        other => Err(Error::Tracking(format!(
            "no tracking backend for scheme '{other}'"
        ))),
    }
}

/// Tracking facade: current endpoint plus its backend.
pub struct TrackingService {
    endpoint: String,
    experiment_id: String,
    backend: Box<dyn TrackingBackend>,
}

impl TrackingService {
    /// Connect to `uri`.
    ///
    /// # Errors
    ///
    /// See [`open_backend`].
    pub fn connect(uri: &str) -> Result<Self> {
        Ok(Self::with_backend(uri, open_backend(uri)?))
    }

    /// Use an already-built backend, reporting `endpoint` as its URI.
    #[must_use]
    pub fn with_backend(endpoint: impl Into<String>, backend: Box<dyn TrackingBackend>) -> Self {
        Self {
            endpoint: endpoint.into(),
            experiment_id: DEFAULT_EXPERIMENT_ID.to_string(),
            backend,
        }
    }

    /// Log runs under `experiment_id` instead of the default experiment.
    #[must_use]
    pub fn with_experiment(mut self, experiment_id: impl Into<String>) -> Self {
        self.experiment_id = experiment_id.into();
        self
    }

    /// Point the service at a different endpoint.
    ///
    /// # Errors
    ///
    /// See [`open_backend`]; on error the previous endpoint stays active.
    pub fn set_endpoint(&mut self, uri: &str) -> Result<()> {
        self.backend = open_backend(uri)?;
        self.endpoint = uri.to_string();
        Ok(())
    }

    /// Current endpoint URI.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Experiment new runs are created in.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Whether the current endpoint is treated as registry-capable.
    #[must_use]
    pub fn supports_registry(&self) -> bool {
        supports_registry(&self.endpoint)
    }

    /// Open a scoped run.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot create the run.
    pub fn start_run(&self) -> Result<ActiveRun<'_>> {
        let run_id = self.backend.create_run(&self.experiment_id)?;
        Ok(ActiveRun::new(self.backend.as_ref(), run_id))
    }
}

impl std::fmt::Debug for TrackingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingService")
            .field("endpoint", &self.endpoint)
            .field("experiment_id", &self.experiment_id)
            .finish_non_exhaustive()
    }
}

/// Fresh run identifier: 32 lowercase hex characters.
#[must_use]
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
