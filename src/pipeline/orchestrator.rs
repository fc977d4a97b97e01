//! Run Orchestrator - one scoped training run

use crate::config::PipelineConfig;
use crate::data::Features;
use crate::logging::{LogChannel, NamedChannel};
use crate::model::{ElasticNetParams, ModelArtifact, RegressionMetrics};
use crate::tracking::TrackingService;
use crate::Result;

/// Channel name the orchestrator logs under (`<root>.model`).
pub const MODEL_CHANNEL_NAME: &str = "model";

/// Artifact path the fitted model is stored under inside a run.
pub const MODEL_ARTIFACT_PATH: &str = "model";

/// Runs ElasticNet training inside a tracking run.
#[derive(Debug, Clone)]
pub struct RunOrchestrator {
    channel: LogChannel,
    log: NamedChannel,
    config: PipelineConfig,
}

impl RunOrchestrator {
    /// Create an orchestrator logging through `channel`.
    ///
    /// # Errors
    ///
    /// Returns error if the channel has to be initialized and that fails.
    pub fn new(channel: LogChannel, config: PipelineConfig) -> Result<Self> {
        let log = channel.get_named_channel(MODEL_CHANNEL_NAME)?;
        Ok(Self {
            channel,
            log,
            config,
        })
    }

    /// Fit, evaluate and record one model; returns the run identifier.
    ///
    /// The run is finalized as `FINISHED` on success. Any error after the run
    /// has started leaves it `FAILED` and is returned unchanged.
    ///
    /// # Errors
    ///
    /// Tracking, logging, fitting and evaluation errors all propagate.
    #[allow(clippy::too_many_arguments)]
    pub fn train_and_log(
        &self,
        tracking: &mut TrackingService,
        train_features: &Features,
        train_labels: &[f64],
        test_features: &Features,
        test_labels: &[f64],
        alpha: f64,
        l1_ratio: f64,
    ) -> Result<String> {
        if let Some(uri) = &self.config.tracking_uri {
            tracking.set_endpoint(uri)?;
            self.log.info("Set tracking URI from config.");
        }

        let run = tracking.start_run()?;
        let run_id = run.run_id().to_string();

        self.channel.retarget(&run_id, self.config.log_level)?;
        self.log.info(&format!(
            "Started run id: {run_id} - training ElasticNet(alpha={alpha}, l1_ratio={l1_ratio})"
        ));

        let params = ElasticNetParams::new(alpha, l1_ratio)?
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol);
        let model = params.fit(train_features, train_labels)?;
        self.log.debug(&format!(
            "Coordinate descent stopped after {} iterations",
            model.n_iter()
        ));
        for (name, coef) in model.feature_names().iter().zip(model.coefficients()) {
            self.log.debug(&format!("Coefficient {name} = {coef:.6}"));
        }

        let predictions = model.predict(test_features)?;
        let metrics = RegressionMetrics::evaluate(test_labels, &predictions)?;
        self.log.info(&format!(
            "Metrics - RMSE: {:.4}, MAE: {:.4}, R2: {:.4}",
            metrics.rmse, metrics.mae, metrics.r2
        ));

        run.log_param("alpha", alpha)?;
        run.log_param("l1_ratio", l1_ratio)?;
        for (key, value) in metrics.as_pairs() {
            run.log_metric(key, value)?;
        }

        let artifact = ModelArtifact::from_elastic_net(&model)?;
        if tracking.supports_registry() {
            run.log_model(&artifact, MODEL_ARTIFACT_PATH, Some(&self.config.model_name))?;
            self.log.info("Model logged to registry.");
        } else {
            run.log_model(&artifact, MODEL_ARTIFACT_PATH, None)?;
            self.log.info("Model logged as artifact (local file store).");
        }

        self.log.info(&format!("Run completed: {run_id}"));
        run.finish()
    }
}
