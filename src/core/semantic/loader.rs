//! Estimator slot filled in the background at startup.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::{EstimatorError, SemanticBiasEstimator};

/// Reports [`EstimatorError::ModelUnavailable`] until a model has been loaded into it.
#[derive(Clone, Default)]
pub struct LoadingEstimator {
    slot: Arc<OnceCell<Arc<dyn SemanticBiasEstimator>>>,
}

impl LoadingEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the slot. Returns false if a model was already loaded.
    pub fn set(&self, estimator: Arc<dyn SemanticBiasEstimator>) -> bool {
        self.slot.set(estimator).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.initialized()
    }

    /// Load a model on the runtime without blocking the caller.
    /// A failed load is logged and leaves the slot empty.
    pub fn spawn_load<F>(&self, load: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = Result<Arc<dyn SemanticBiasEstimator>, EstimatorError>>
            + Send
            + 'static,
    {
        let this = self.clone();
        tokio::spawn(async move {
            match load.await {
                Ok(estimator) => {
                    log::info!("Semantic model loaded: {}", estimator.name());
                    this.set(estimator);
                }
                Err(e) => log::warn!("Semantic model failed to load: {}", e),
            }
        })
    }
}

#[async_trait]
impl SemanticBiasEstimator for LoadingEstimator {
    fn name(&self) -> &str {
        match self.slot.get() {
            Some(estimator) => estimator.name(),
            None => "loading",
        }
    }

    async fn estimate(&self, text: &str) -> Result<f32, EstimatorError> {
        let estimator = self.slot.get().ok_or(EstimatorError::ModelUnavailable)?;
        estimator.estimate(text).await
    }
}
