//! ElasticNet model, evaluation metrics and the artifact form logged to tracking

mod elastic_net;
mod metrics;

pub use elastic_net::{ElasticNet, ElasticNetParams, DEFAULT_MAX_ITER, DEFAULT_TOL};
pub use metrics::{mae, r2_score, rmse, RegressionMetrics};

use crate::Result;

/// Flavor name written alongside ElasticNet artifacts.
pub const ELASTICNET_FLAVOR: &str = "elasticnet";

/// File name of the serialized model inside its artifact directory.
pub const MODEL_FILE_NAME: &str = "model.json";

/// Serialized model ready to be stored by a tracking backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    flavor: String,
    payload: Vec<u8>,
}

impl ModelArtifact {
    /// Serialize a fitted ElasticNet as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn from_elastic_net(model: &ElasticNet) -> Result<Self> {
        Ok(Self {
            flavor: ELASTICNET_FLAVOR.to_string(),
            payload: serde_json::to_vec_pretty(model)?,
        })
    }

    /// Wrap an already-serialized payload.
    #[must_use]
    pub fn new(flavor: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            flavor: flavor.into(),
            payload,
        }
    }

    /// Model flavor.
    #[must_use]
    pub fn flavor(&self) -> &str {
        &self.flavor
    }

    /// Serialized bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.payload.len() as u64
    }
}
