//! Local file-store tracking backend
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<experiment_id>/meta.json
//! <root>/<experiment_id>/<run_id>/meta.json
//! <root>/<experiment_id>/<run_id>/params/<key>
//! <root>/<experiment_id>/<run_id>/metrics/<key>        "<epoch ms> <value> <step>" per line
//! <root>/<experiment_id>/<run_id>/artifacts/<path>/model.json
//! <root>/<experiment_id>/<run_id>/artifacts/<path>/artifact.json
//! ```

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{new_run_id, TrackingBackend};
use crate::experiment::{ArtifactRecord, ExperimentRecord, MetricRecord, RunRecord, RunStatus};
use crate::model::{ModelArtifact, MODEL_FILE_NAME};
use crate::{Error, Result};

const META_FILE: &str = "meta.json";
const ARTIFACT_META_FILE: &str = "artifact.json";

/// Tracking backend writing plain files under a local directory.
///
/// Has no model registry: registration requests fail with
/// `RegistryUnsupported`.
#[derive(Debug)]
pub struct FileStoreBackend {
    root: PathBuf,
    run_dirs: Mutex<HashMap<String, PathBuf>>,
}

impl FileStoreBackend {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns error if the root directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            run_dirs: Mutex::new(HashMap::new()),
        })
    }

    /// Store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a run created by this backend.
    ///
    /// # Errors
    ///
    /// Returns `Tracking` if the run is unknown.
    pub fn run_dir(&self, run_id: &str) -> Result<PathBuf> {
        self.run_dirs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(run_id)
            .cloned()
            .ok_or_else(|| Error::Tracking(format!("run '{run_id}' not found")))
    }

    fn ensure_experiment(&self, experiment_id: &str) -> Result<PathBuf> {
        let dir = self.root.join(checked_segment(experiment_id)?);
        let meta = dir.join(META_FILE);
        if !meta.exists() {
            fs::create_dir_all(&dir)?;
            let record = ExperimentRecord::new(
                experiment_id,
                if experiment_id == crate::experiment::DEFAULT_EXPERIMENT_ID {
                    crate::experiment::DEFAULT_EXPERIMENT_NAME.to_string()
                } else {
                    format!("experiment-{experiment_id}")
                },
            )
            .with_artifact_location(dir.display().to_string());
            fs::write(&meta, serde_json::to_vec_pretty(&record)?)?;
        }
        Ok(dir)
    }
}

/// Reject names that would escape their directory.
fn checked_segment(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::Tracking(format!("'{name}' is not a valid store key")));
    }
    Ok(name)
}

/// Reject relative artifact paths that would escape the artifact root.
fn checked_artifact_path(path: &str) -> Result<PathBuf> {
    let mut out = PathBuf::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push(checked_segment(segment)?);
    }
    if out.as_os_str().is_empty() {
        return Err(Error::Tracking("empty artifact path".to_string()));
    }
    Ok(out)
}

impl TrackingBackend for FileStoreBackend {
    fn create_run(&self, experiment_id: &str) -> Result<String> {
        let experiment_dir = self.ensure_experiment(experiment_id)?;
        let run_id = new_run_id();
        let run_dir = experiment_dir.join(&run_id);
        for sub in ["params", "metrics", "artifacts"] {
            fs::create_dir_all(run_dir.join(sub))?;
        }
        let record = RunRecord::start(run_id.clone(), experiment_id);
        fs::write(run_dir.join(META_FILE), serde_json::to_vec_pretty(&record)?)?;

        self.run_dirs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(run_id.clone(), run_dir);
        Ok(run_id)
    }

    fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        let path = self.run_dir(run_id)?.join("params").join(checked_segment(key)?);
        fs::write(path, value)?;
        Ok(())
    }

    fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<()> {
        let path = self.run_dir(run_id)?.join("metrics").join(checked_segment(key)?);
        let metric = MetricRecord::new(run_id, key, value);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(
            file,
            "{} {} {}",
            metric.timestamp_millis(),
            metric.value(),
            metric.step()
        )?;
        Ok(())
    }

    fn log_model(
        &self,
        run_id: &str,
        artifact: &ModelArtifact,
        artifact_path: &str,
        registered_model_name: Option<&str>,
    ) -> Result<()> {
        if registered_model_name.is_some() {
            return Err(Error::RegistryUnsupported(format!(
                "file:{}",
                self.root.display()
            )));
        }
        let dir = self
            .run_dir(run_id)?
            .join("artifacts")
            .join(checked_artifact_path(artifact_path)?);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(MODEL_FILE_NAME), artifact.payload())?;

        let record =
            ArtifactRecord::new(run_id, artifact_path, artifact.flavor(), artifact.size_bytes());
        fs::write(dir.join(ARTIFACT_META_FILE), serde_json::to_vec_pretty(&record)?)?;
        Ok(())
    }

    fn end_run(&self, run_id: &str, status: RunStatus) -> Result<()> {
        let meta = self.run_dir(run_id)?.join(META_FILE);
        let mut record: RunRecord = serde_json::from_slice(&fs::read(&meta)?)?;
        record.finish(status);
        fs::write(meta, serde_json::to_vec_pretty(&record)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_layout() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileStoreBackend::open(dir.path().join("mlruns")).unwrap();
        let run_id = backend.create_run("0").unwrap();

        backend.log_param(&run_id, "alpha", "0.5").unwrap();
        backend.log_metric(&run_id, "rmse", 0.75).unwrap();
        backend
            .log_model(&run_id, &ModelArtifact::new("elasticnet", b"{}".to_vec()), "model", None)
            .unwrap();
        backend.end_run(&run_id, RunStatus::Finished).unwrap();

        let run_dir = backend.run_dir(&run_id).unwrap();
        assert_eq!(run_dir, dir.path().join("mlruns").join("0").join(&run_id));
        assert_eq!(fs::read_to_string(run_dir.join("params/alpha")).unwrap(), "0.5");
        let metric_line = fs::read_to_string(run_dir.join("metrics/rmse")).unwrap();
        assert!(metric_line.trim_end().ends_with(" 0.75 0"));
        assert!(run_dir.join("artifacts/model/model.json").exists());

        let meta: RunRecord =
            serde_json::from_slice(&fs::read(run_dir.join(META_FILE)).unwrap()).unwrap();
        assert_eq!(meta.status(), RunStatus::Finished);
        assert!(dir.path().join("mlruns/0/meta.json").exists());
    }

    #[test]
    fn test_registration_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileStoreBackend::open(dir.path()).unwrap();
        let run_id = backend.create_run("0").unwrap();
        let err = backend
            .log_model(
                &run_id,
                &ModelArtifact::new("elasticnet", Vec::new()),
                "model",
                Some("WineModel"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::RegistryUnsupported(_)));
    }

    #[test]
    fn test_keys_cannot_escape_run_dir() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileStoreBackend::open(dir.path()).unwrap();
        let run_id = backend.create_run("0").unwrap();
        assert!(backend.log_param(&run_id, "../alpha", "1").is_err());
        assert!(backend
            .log_model(&run_id, &ModelArtifact::new("x", Vec::new()), "../../m", None)
            .is_err());
    }
}
