//! MLflow REST API (v2.0) tracking backend

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};

use super::TrackingBackend;
use crate::experiment::RunStatus;
use crate::model::{ModelArtifact, MODEL_FILE_NAME};
use crate::{Error, Result};

const API_PREFIX: &str = "api/2.0/mlflow";
const ARTIFACT_PREFIX: &str = "api/2.0/mlflow-artifacts/artifacts";
const ALREADY_EXISTS: &str = "RESOURCE_ALREADY_EXISTS";

/// Tracking backend talking to an MLflow tracking server over HTTP.
///
/// Model files are uploaded through the server's artifact proxy and
/// registered through its model registry endpoints.
#[derive(Debug)]
pub struct RestBackend {
    base: String,
    http: Client,
    experiments: Mutex<HashMap<String, String>>,
}

impl RestBackend {
    /// Client for the server at `uri` (e.g. `http://localhost:5000`).
    ///
    /// # Errors
    ///
    /// Returns `Tracking` if the URI is not http(s), or `Http` if the client
    /// cannot be built.
    pub fn new(uri: &str) -> Result<Self> {
        let url = reqwest::Url::parse(uri).map_err(|e| Error::Tracking(format!("{uri}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Tracking(format!("'{uri}' is not an http(s) endpoint")));
        }
        Ok(Self {
            base: uri.trim_end_matches('/').to_string(),
            http: Client::builder().build()?,
            experiments: Mutex::new(HashMap::new()),
        })
    }

    /// Server base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let response = self.http.post(api_url(&self.base, endpoint)).json(body).send()?;
        read_json(endpoint, response)
    }

    fn experiment_of(&self, run_id: &str) -> Result<String> {
        self.experiments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(run_id)
            .cloned()
            .ok_or_else(|| Error::Tracking(format!("run '{run_id}' not started by this client")))
    }

    fn upload(&self, url: String, payload: &[u8]) -> Result<()> {
        let response = self.http.put(url).body(payload.to_vec()).send()?;
        read_json("artifacts", response).map(|_| ())
    }

    fn register(&self, name: &str, run_id: &str, source: &str) -> Result<()> {
        match self.post("registered-models/create", &json!({ "name": name })) {
            Ok(_) => {}
            Err(Error::Tracking(msg)) if msg.contains(ALREADY_EXISTS) => {}
            Err(e) => return Err(e),
        }
        self.post(
            "model-versions/create",
            &json!({ "name": name, "source": source, "run_id": run_id }),
        )?;
        Ok(())
    }
}

/// Full URL of an MLflow API endpoint.
pub(crate) fn api_url(base: &str, endpoint: &str) -> String {
    format!("{}/{API_PREFIX}/{endpoint}", base.trim_end_matches('/'))
}

/// Artifact-proxy URL of one file in a run's artifact tree.
pub(crate) fn artifact_url(
    base: &str,
    experiment_id: &str,
    run_id: &str,
    artifact_path: &str,
    file_name: &str,
) -> String {
    format!(
        "{}/{ARTIFACT_PREFIX}/{experiment_id}/{run_id}/artifacts/{}/{file_name}",
        base.trim_end_matches('/'),
        artifact_path.trim_matches('/')
    )
}

/// Extract `run.info.run_id` from a `runs/create` response.
pub(crate) fn parse_run_id(body: &Value) -> Result<String> {
    body.pointer("/run/info/run_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Tracking("runs/create response has no run id".to_string()))
}

fn read_json(endpoint: &str, response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text()?;
    if !status.is_success() {
        let detail = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                let code = v.get("error_code")?.as_str()?.to_string();
                let message = v.get("message").and_then(Value::as_str).unwrap_or_default();
                Some(format!("{code}: {message}"))
            })
            .unwrap_or(text);
        return Err(Error::Tracking(format!("{endpoint} returned {status}: {detail}")));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

impl TrackingBackend for RestBackend {
    fn create_run(&self, experiment_id: &str) -> Result<String> {
        let body = self.post(
            "runs/create",
            &json!({
                "experiment_id": experiment_id,
                "start_time": Utc::now().timestamp_millis(),
            }),
        )?;
        let run_id = parse_run_id(&body)?;
        self.experiments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(run_id.clone(), experiment_id.to_string());
        Ok(run_id)
    }

    fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.post(
            "runs/log-parameter",
            &json!({ "run_id": run_id, "key": key, "value": value }),
        )?;
        Ok(())
    }

    fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<()> {
        self.post(
            "runs/log-metric",
            &json!({
                "run_id": run_id,
                "key": key,
                "value": value,
                "timestamp": Utc::now().timestamp_millis(),
                "step": 0,
            }),
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
        let experiment_id = self.experiment_of(run_id)?;
        let url = artifact_url(&self.base, &experiment_id, run_id, artifact_path, MODEL_FILE_NAME);
        self.upload(url, artifact.payload())?;

        if let Some(name) = registered_model_name {
            let source = format!("runs:/{run_id}/{}", artifact_path.trim_matches('/'));
            self.register(name, run_id, &source)?;
        }
        Ok(())
    }

    fn end_run(&self, run_id: &str, status: RunStatus) -> Result<()> {
        self.post(
            "runs/update",
            &json!({
                "run_id": run_id,
                "status": status.as_str(),
                "end_time": Utc::now().timestamp_millis(),
            }),
        )?;
        Ok(())
    }
}
