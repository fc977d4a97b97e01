//! ElasticNet regression fitted by cyclic coordinate descent
//!
//! Minimizes
//!
//! ```text
//! 1 / (2 n) * ||y - Xw - b||^2 + alpha * l1_ratio * ||w||_1
//!     + 0.5 * alpha * (1 - l1_ratio) * ||w||^2
//! ```
//!
//! with the intercept `b` recovered from centered data.

use serde::{Deserialize, Serialize};

use crate::data::Features;
use crate::{Error, Result};

/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Default convergence tolerance on the relative coefficient update.
pub const DEFAULT_TOL: f64 = 1e-4;

/// ElasticNet hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetParams {
    alpha: f64,
    l1_ratio: f64,
    max_iter: usize,
    tol: f64,
}

impl ElasticNetParams {
    /// Create hyperparameters with default iteration settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless `alpha >= 0` and `0 <= l1_ratio <= 1`.
    pub fn new(alpha: f64, l1_ratio: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(Error::InvalidInput(format!(
                "alpha must be a non-negative number, got {alpha}"
            )));
        }
        if !(0.0..=1.0).contains(&l1_ratio) {
            return Err(Error::InvalidInput(format!(
                "l1_ratio must be in [0, 1], got {l1_ratio}"
            )));
        }
        Ok(Self {
            alpha,
            l1_ratio,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
        })
    }

    /// Override the iteration cap.
    #[must_use]
    pub const fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Override the convergence tolerance.
    #[must_use]
    pub const fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Regularization strength.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// L1 share of the penalty.
    #[must_use]
    pub const fn l1_ratio(&self) -> f64 {
        self.l1_ratio
    }

    /// Fit on `features` / `labels`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty input or a label count that does not
    /// match the number of rows.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(&self, features: &Features, labels: &[f64]) -> Result<ElasticNet> {
        let n = features.n_rows();
        if n == 0 {
            return Err(Error::InvalidInput("cannot fit on zero rows".to_string()));
        }
        if labels.len() != n {
            return Err(Error::InvalidInput(format!(
                "{} labels for {n} rows",
                labels.len()
            )));
        }

        let n_f = n as f64;
        let y_mean = labels.iter().sum::<f64>() / n_f;
        let x_means: Vec<f64> = features
            .columns()
            .map(|col| col.iter().sum::<f64>() / n_f)
            .collect();
        let centered: Vec<Vec<f64>> = features
            .columns()
            .zip(&x_means)
            .map(|(col, mean)| col.iter().map(|v| v - mean).collect())
            .collect();
        let col_norms: Vec<f64> = centered.iter().map(|c| dot(c, c)).collect();

        let l1_reg = self.alpha * self.l1_ratio * n_f;
        let l2_reg = self.alpha * (1.0 - self.l1_ratio) * n_f;

        let mut weights = vec![0.0; centered.len()];
        let mut residual: Vec<f64> = labels.iter().map(|y| y - y_mean).collect();
        let mut n_iter = 0;

        while n_iter < self.max_iter {
            n_iter += 1;
            let mut w_max = 0.0_f64;
            let mut d_w_max = 0.0_f64;

            for (j, column) in centered.iter().enumerate() {
                if col_norms[j] == 0.0 {
                    continue;
                }
                let w_old = weights[j];
                if w_old != 0.0 {
                    axpy(w_old, column, &mut residual);
                }
                let rho = dot(column, &residual);
                let w_new = soft_threshold(rho, l1_reg) / (col_norms[j] + l2_reg);
                if w_new != 0.0 {
                    axpy(-w_new, column, &mut residual);
                }
                weights[j] = w_new;
                d_w_max = d_w_max.max((w_new - w_old).abs());
                w_max = w_max.max(w_new.abs());
            }

            if w_max == 0.0 || d_w_max / w_max < self.tol {
                break;
            }
        }

        let intercept = y_mean - dot(&x_means, &weights);
        Ok(ElasticNet {
            params: *self,
            feature_names: features.names().to_vec(),
            coefficients: weights,
            intercept,
            n_iter,
        })
    }
}

/// A fitted ElasticNet model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticNet {
    params: ElasticNetParams,
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    n_iter: usize,
}

impl ElasticNet {
    /// Hyperparameters used for fitting.
    #[must_use]
    pub const fn params(&self) -> &ElasticNetParams {
        &self.params
    }

    /// Coefficients in feature order.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Intercept.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coordinate-descent sweeps performed.
    #[must_use]
    pub const fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Feature names seen at fit time.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Predict one value per row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the feature count differs from fit time.
    pub fn predict(&self, features: &Features) -> Result<Vec<f64>> {
        if features.n_features() != self.coefficients.len() {
            return Err(Error::InvalidInput(format!(
                "model expects {} features, got {}",
                self.coefficients.len(),
                features.n_features()
            )));
        }
        let mut predictions = vec![self.intercept; features.n_rows()];
        for (column, w) in features.columns().zip(&self.coefficients) {
            axpy(*w, column, &mut predictions);
        }
        Ok(predictions)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `out += scale * x`
fn axpy(scale: f64, x: &[f64], out: &mut [f64]) {
    for (o, v) in out.iter_mut().zip(x) {
        *o += scale * v;
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    value.signum() * (value.abs() - threshold).max(0.0)
}
