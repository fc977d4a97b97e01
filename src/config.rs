//! Pipeline configuration
//!
//! Values come from the process environment, overlaid on an optional `.env`
//! file in the working directory. The environment wins over the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::Level;

use crate::logging::DEFAULT_LOG_DIR;
use crate::model::{DEFAULT_MAX_ITER, DEFAULT_TOL};
use crate::{Error, Result};

/// Registered model name used when `MLFLOW_MODEL_NAME` is unset.
pub const DEFAULT_MODEL_NAME: &str = "ElasticnetWineModel";

/// Red-wine quality dataset used when `DATASET_URL` is unset.
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/mlflow/mlflow/master/tests/datasets/winequality-red.csv";

/// File read for overrides before the environment is consulted.
pub const DOTENV_FILE: &str = ".env";

/// Resolved pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Tracking endpoint; `None` leaves the service on its default store.
    pub tracking_uri: Option<String>,
    /// Name models are registered under on registry-capable endpoints.
    pub model_name: String,
    /// Experiment new runs are created in.
    pub experiment_id: String,
    /// Dataset location (http(s) URL or local path).
    pub dataset_url: String,
    /// Regularization strength used when the CLI gives none.
    pub default_alpha: f64,
    /// L1/L2 mixing ratio used when the CLI gives none.
    pub default_l1_ratio: f64,
    /// Seed for the train/test split.
    pub random_state: u64,
    /// Cap on coordinate-descent sweeps.
    pub max_iter: usize,
    /// Coordinate-descent stopping tolerance.
    pub tol: f64,
    /// Directory holding run log files.
    pub log_dir: PathBuf,
    /// Minimum severity for log sinks.
    pub log_level: Level,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tracking_uri: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            experiment_id: crate::experiment::DEFAULT_EXPERIMENT_ID.to_string(),
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            default_alpha: 0.5,
            default_l1_ratio: 0.5,
            random_state: 42,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_level: Level::INFO,
        }
    }
}

impl PipelineConfig {
    /// Load from the environment over `<dir>/.env`.
    ///
    /// # Errors
    ///
    /// Returns `Config` for unparseable values, or `Io` if the `.env` file
    /// exists but cannot be read.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(DOTENV_FILE);
        let file_values = if path.exists() {
            parse_dotenv(&std::fs::read_to_string(&path)?)
        } else {
            HashMap::new()
        };
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_values.get(key).cloned())
        })
    }

    /// Build from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the first key whose value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_iter: usize = parse_or(&get, "MAX_ITER", defaults.max_iter)?;
        if max_iter == 0 {
            return Err(Error::Config {
                key: "MAX_ITER".to_string(),
                value: "0".to_string(),
            });
        }
        let tol: f64 = parse_or(&get, "TOL", defaults.tol)?;
        if !tol.is_finite() || tol < 0.0 {
            return Err(Error::Config {
                key: "TOL".to_string(),
                value: tol.to_string(),
            });
        }

        Ok(Self {
            tracking_uri: get("MLFLOW_TRACKING_URI"),
            model_name: get("MLFLOW_MODEL_NAME").unwrap_or(defaults.model_name),
            experiment_id: get("MLFLOW_EXPERIMENT_ID").unwrap_or(defaults.experiment_id),
            dataset_url: get("DATASET_URL").unwrap_or(defaults.dataset_url),
            default_alpha: parse_or(&get, "DEFAULT_ALPHA", defaults.default_alpha)?,
            default_l1_ratio: parse_or(&get, "DEFAULT_L1_RATIO", defaults.default_l1_ratio)?,
            random_state: parse_or(&get, "RANDOM_STATE", defaults.random_state)?,
            max_iter,
            tol,
            log_dir: get("LOG_DIR").map_or(defaults.log_dir, PathBuf::from),
            log_level: parse_or(&get, "LOG_LEVEL", defaults.log_level)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| Error::Config {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

/// Parse `KEY=value` lines. Blank lines and `#` comments are skipped; an
/// `export ` prefix and matching surrounding quotes are stripped.
#[must_use]
pub fn parse_dotenv(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let value = value.trim();
            let value = ['"', '\'']
                .iter()
                .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))
                .unwrap_or(value);
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(config.tracking_uri.is_none());
        assert_eq!(config.model_name, "ElasticnetWineModel");
        assert_eq!(config.random_state, 42);
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("MLFLOW_TRACKING_URI", "http://localhost:5000"),
            ("DEFAULT_ALPHA", "0.1"),
            ("RANDOM_STATE", "7"),
            ("LOG_LEVEL", "debug"),
            ("LOG_DIR", "/tmp/runlogs"),
        ]))
        .unwrap();
        assert_eq!(config.tracking_uri.as_deref(), Some("http://localhost:5000"));
        assert!((config.default_alpha - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.random_state, 7);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/runlogs"));
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let err = PipelineConfig::from_lookup(lookup(&[("DEFAULT_L1_RATIO", "half")])).unwrap_err();
        match err {
            Error::Config { key, value } => {
                assert_eq!(key, "DEFAULT_L1_RATIO");
                assert_eq!(value, "half");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_solver_settings() {
        let config =
            PipelineConfig::from_lookup(lookup(&[("MAX_ITER", "250"), ("TOL", "1e-6")])).unwrap();
        assert_eq!(config.max_iter, 250);
        assert!((config.tol - 1e-6).abs() < f64::EPSILON);

        let defaults = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(defaults.max_iter, DEFAULT_MAX_ITER);
        assert!((defaults.tol - DEFAULT_TOL).abs() < f64::EPSILON);
    }

    #[test]
    fn test_solver_settings_reject_nonsense() {
        for pair in [("MAX_ITER", "0"), ("MAX_ITER", "-3"), ("TOL", "-0.1"), ("TOL", "NaN")] {
            match PipelineConfig::from_lookup(lookup(&[pair])).unwrap_err() {
                Error::Config { key, .. } => assert_eq!(key, pair.0),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let config = PipelineConfig::from_lookup(lookup(&[("MLFLOW_TRACKING_URI", "")])).unwrap();
        assert!(config.tracking_uri.is_none());
    }

    #[test]
    fn test_parse_dotenv() {
        let values = parse_dotenv(
            "# tracking\nMLFLOW_TRACKING_URI=\"http://mlflow:5000\"\n\nexport RANDOM_STATE=3\nnot a pair\n",
        );
        assert_eq!(values.get("MLFLOW_TRACKING_URI").unwrap(), "http://mlflow:5000");
        assert_eq!(values.get("RANDOM_STATE").unwrap(), "3");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_load_reads_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DOTENV_FILE), "MLFLOW_MODEL_NAME=FromDotenv\n").unwrap();
        let config = PipelineConfig::load(dir.path()).unwrap();
        // the process environment may override, but never with an empty name
        assert!(!config.model_name.is_empty());
        if std::env::var("MLFLOW_MODEL_NAME").is_err() {
            assert_eq!(config.model_name, "FromDotenv");
        }
    }
}
