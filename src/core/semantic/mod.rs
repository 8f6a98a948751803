//! Semantic bias estimation: the collaborator interface the analyzer scores with.
//!
//! Estimators are optional. Any failure here degrades the analysis to
//! term-only scoring; it never fails the analysis itself.

mod embedding;
mod loader;

use std::time::Duration;

use async_trait::async_trait;

pub use embedding::{Embedder, EmbeddingEstimator, HashingEmbedder};
pub use loader::LoadingEstimator;

/// Errors from a semantic estimator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimatorError {
    /// Network failure, timeout, or an unusable reply.
    #[error("Semantic estimator failed: {0}")]
    Transient(String),
    /// The model has not finished loading.
    #[error("Semantic model is not loaded yet")]
    ModelUnavailable,
}

/// Produces a bias score in [0,1] for a text.
#[async_trait]
pub trait SemanticBiasEstimator: Send + Sync {
    /// Short name for logs and `config` output.
    fn name(&self) -> &str;

    async fn estimate(&self, text: &str) -> Result<f32, EstimatorError>;
}

/// Run `estimator` with a deadline. A timeout is reported as a transient failure,
/// and out-of-range or non-finite scores are rejected.
pub async fn estimate_with_timeout(
    estimator: &dyn SemanticBiasEstimator,
    text: &str,
    timeout: Duration,
) -> Result<f32, EstimatorError> {
    let score = tokio::time::timeout(timeout, estimator.estimate(text))
        .await
        .map_err(|_| {
            EstimatorError::Transient(format!(
                "{} timed out after {} ms",
                estimator.name(),
                timeout.as_millis()
            ))
        })??;
    if !score.is_finite() {
        return Err(EstimatorError::Transient(format!(
            "{} returned a non-finite score",
            estimator.name()
        )));
    }
    Ok(score.clamp(0.0, 1.0))
}
