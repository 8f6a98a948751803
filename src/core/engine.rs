//! Analysis pipeline: strategy suggestions, term score, optional semantic score, explanation.
//!
//! Every tracked analysis gets a sequence number. Issuing a new one cancels the one in
//! flight, and a result is only handed back while its number is still the latest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::config::{Config, ConfigError, SemanticKind, StrategyKind};
use crate::core::llm::{ChatEstimator, ChatModel};
use crate::core::matcher;
use crate::core::score::BiasAssessment;
use crate::core::semantic::{
    self, EmbeddingEstimator, HashingEmbedder, LoadingEstimator, SemanticBiasEstimator,
};
use crate::core::strategy::{ModelStrategy, StrategyError, SuggestionStrategy, TableStrategy};
use crate::core::terms::GenderedTermTable;
use crate::core::text;

/// An assessment tagged with the request that produced it and the text it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub seq: u64,
    pub text: String,
    pub assessment: BiasAssessment,
}

/// Handle for one tracked request.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub seq: u64,
    token: CancellationToken,
}

impl Ticket {
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Issues monotonically increasing sequence numbers; newest request wins.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl RequestTracker {
    /// Start a request, cancelling the previous one. Numbering and token swap happen
    /// under one lock, so the newest ticket always holds the live token.
    pub fn issue(&self) -> Ticket {
        let token = CancellationToken::new();
        let mut current = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
        }
        Ticket { seq, token }
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

/// Stateless analyzer over an immutable term table.
pub struct Analyzer {
    table: Arc<GenderedTermTable>,
    strategy: Arc<dyn SuggestionStrategy>,
    estimator: Option<Arc<dyn SemanticBiasEstimator>>,
    timeout: Duration,
    tracker: RequestTracker,
}

impl Analyzer {
    /// Table strategy, no semantic estimator.
    pub fn new(table: Arc<GenderedTermTable>) -> Self {
        Self {
            strategy: Arc::new(TableStrategy::new(table.clone())),
            table,
            estimator: None,
            timeout: Duration::from_millis(crate::core::config::DEFAULT_TIMEOUT_MS),
            tracker: RequestTracker::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn SuggestionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn SemanticBiasEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wire strategy and estimator as configured. The embedding model loads in the
    /// background, so this must be called inside a Tokio runtime.
    pub fn from_config(
        config: &Config,
        table: Arc<GenderedTermTable>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let model = if config.needs_model() {
            Some(Arc::new(ChatModel::from_config(config)?))
        } else {
            None
        };

        let mut analyzer = Analyzer::new(table).with_timeout(config.timeout);
        if let (StrategyKind::Model, Some(model)) = (config.strategy, &model) {
            analyzer = analyzer.with_strategy(Arc::new(ModelStrategy::new(model.clone())));
        }
        match (config.semantic, &model) {
            (SemanticKind::Embedding, _) => {
                let loading = LoadingEstimator::new();
                loading.spawn_load(async {
                    Ok(Arc::new(EmbeddingEstimator::new(HashingEmbedder::default()))
                        as Arc<dyn SemanticBiasEstimator>)
                });
                analyzer = analyzer.with_estimator(Arc::new(loading));
            }
            (SemanticKind::Model, Some(model)) => {
                analyzer = analyzer.with_estimator(Arc::new(ChatEstimator::new(model.clone())));
            }
            _ => {}
        }
        log::info!(
            "Analyzer ready: strategy={}, semantic={}",
            analyzer.strategy.name(),
            analyzer
                .estimator
                .as_ref()
                .map(|e| e.name().to_string())
                .unwrap_or_else(|| "off".to_string())
        );
        Ok(analyzer)
    }

    pub fn table(&self) -> &GenderedTermTable {
        &self.table
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// Term-only analysis against the table. Pure and synchronous.
    pub fn analyze_terms(&self, text: &str) -> BiasAssessment {
        let matches = matcher::match_terms(text, &self.table);
        BiasAssessment::new(matches.term_score, matches.suggestions, None)
    }

    /// Full analysis, untracked. Collaborator failures degrade the result, never fail it.
    pub async fn analyze(&self, text: &str) -> BiasAssessment {
        // Untracked: nothing else holds this token, so it is never cancelled.
        let token = CancellationToken::new();
        self.run(text, &token)
            .await
            .unwrap_or_else(|_| self.analyze_terms(text))
    }

    /// Tracked analysis. Returns `None` if a newer request was issued before this one finished.
    pub async fn analyze_latest(&self, text: &str) -> Option<Analysis> {
        let ticket = self.tracker.issue();
        self.analyze_ticket(&ticket, text).await
    }

    /// Run the analysis for an already-issued ticket.
    pub async fn analyze_ticket(&self, ticket: &Ticket, text: &str) -> Option<Analysis> {
        let result = self.run(text, &ticket.token).await;
        if !self.tracker.is_latest(ticket.seq) {
            log::debug!("Dropping superseded analysis #{}", ticket.seq);
            return None;
        }
        let assessment = result.ok()?;
        Some(Analysis {
            seq: ticket.seq,
            text: text.to_string(),
            assessment,
        })
    }

    async fn run(
        &self,
        text: &str,
        cancel_token: &CancellationToken,
    ) -> Result<BiasAssessment, Superseded> {
        let token_count = text::tokenize(text).len();
        if token_count == 0 {
            return Ok(BiasAssessment::empty());
        }

        let mut degraded = false;
        let suggest = self.strategy.suggest(text, cancel_token);
        let suggested = tokio::time::timeout(self.timeout, suggest)
            .await
            .unwrap_or_else(|_| {
                Err(StrategyError::Failed(format!(
                    "{} timed out after {} ms",
                    self.strategy.name(),
                    self.timeout.as_millis()
                )))
            });
        let suggestions = match suggested {
            Ok(s) => s,
            Err(StrategyError::Cancelled) => return Err(Superseded),
            Err(e) => {
                log::warn!("{}; falling back to term table", e);
                degraded = true;
                matcher::match_terms(text, &self.table).suggestions
            }
        };
        let term_score = matcher::term_score(suggestions.len(), token_count);

        let semantic_score = match &self.estimator {
            None => None,
            Some(estimator) => {
                let estimate =
                    semantic::estimate_with_timeout(estimator.as_ref(), text, self.timeout);
                let result = tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => return Err(Superseded),
                    result = estimate => result,
                };
                match result {
                    Ok(score) => Some(score),
                    Err(e) => {
                        log::warn!("{}; scoring from terms only", e);
                        degraded = true;
                        None
                    }
                }
            }
        };

        let mut assessment = BiasAssessment::new(term_score, suggestions, semantic_score);
        assessment.degraded = degraded;
        Ok(assessment)
    }
}

/// The request was cancelled because a newer one was issued.
#[derive(Debug)]
struct Superseded;
