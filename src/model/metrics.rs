//! Regression metrics

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Evaluation metrics logged for every run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Coefficient of determination
    pub r2: f64,
}

impl RegressionMetrics {
    /// Compute all three metrics.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty or mismatched inputs.
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        Ok(Self {
            rmse: rmse(actual, predicted)?,
            mae: mae(actual, predicted)?,
            r2: r2_score(actual, predicted)?,
        })
    }

    /// `(name, value)` pairs in logging order.
    #[must_use]
    pub const fn as_pairs(&self) -> [(&'static str, f64); 3] {
        [("rmse", self.rmse), ("mae", self.mae), ("r2", self.r2)]
    }
}

fn check(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.is_empty() {
        return Err(Error::InvalidInput("no samples to evaluate".to_string()));
    }
    if actual.len() != predicted.len() {
        return Err(Error::InvalidInput(format!(
            "{} targets for {} predictions",
            actual.len(),
            predicted.len()
        )));
    }
    #[allow(clippy::cast_precision_loss)]
    Ok(actual.len() as f64)
}

/// Root mean squared error.
///
/// # Errors
///
/// Returns `InvalidInput` for empty or mismatched inputs.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    let n = check(actual, predicted)?;
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok((sse / n).sqrt())
}

/// Mean absolute error.
///
/// # Errors
///
/// Returns `InvalidInput` for empty or mismatched inputs.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    let n = check(actual, predicted)?;
    let sae: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    Ok(sae / n)
}

/// Coefficient of determination.
///
/// A constant target gives 1.0 for a perfect fit and 0.0 otherwise.
///
/// # Errors
///
/// Returns `InvalidInput` for empty or mismatched inputs.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    let n = check(actual, predicted)?;
    let mean = actual.iter().sum::<f64>() / n;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let actual = [3.0, -0.5, 2.0, 7.0];
        let predicted = [2.5, 0.0, 2.0, 8.0];
        assert!((mae(&actual, &predicted).unwrap() - 0.5).abs() < 1e-12);
        assert!((rmse(&actual, &predicted).unwrap() - 0.375_f64.sqrt()).abs() < 1e-12);
        assert!((r2_score(&actual, &predicted).unwrap() - 0.948_608_137_044_967_9).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target() {
        assert!((r2_score(&[1.0, 1.0], &[1.0, 1.0]).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(r2_score(&[1.0, 1.0], &[1.0, 2.0]).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(RegressionMetrics::evaluate(&[1.0], &[1.0, 2.0]).is_err());
        assert!(RegressionMetrics::evaluate(&[], &[]).is_err());
    }
}
