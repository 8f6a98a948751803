//! Suggestion strategies: one `Suggestion`-producing interface, table- or model-backed.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::llm::{self, ChatModel, LlmError};
use crate::core::matcher::{self, Suggestion};
use crate::core::terms::GenderedTermTable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error("Suggestion request cancelled")]
    Cancelled,
    #[error("Suggestion strategy failed: {0}")]
    Failed(String),
}

impl From<LlmError> for StrategyError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Cancelled => StrategyError::Cancelled,
            other => StrategyError::Failed(other.to_string()),
        }
    }
}

/// Produces positioned suggestions for a text, in token order.
#[async_trait]
pub trait SuggestionStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn suggest(
        &self,
        text: &str,
        cancel_token: &CancellationToken,
    ) -> Result<Vec<Suggestion>, StrategyError>;
}

/// Exact lookup in the gendered term table.
pub struct TableStrategy {
    table: Arc<GenderedTermTable>,
}

impl TableStrategy {
    pub fn new(table: Arc<GenderedTermTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl SuggestionStrategy for TableStrategy {
    fn name(&self) -> &str {
        "table"
    }

    async fn suggest(
        &self,
        text: &str,
        _cancel_token: &CancellationToken,
    ) -> Result<Vec<Suggestion>, StrategyError> {
        Ok(matcher::match_terms(text, &self.table).suggestions)
    }
}

/// Asks the chat model to rewrite the text and parses its reply line by line.
pub struct ModelStrategy {
    model: Arc<ChatModel>,
}

impl ModelStrategy {
    pub fn new(model: Arc<ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl SuggestionStrategy for ModelStrategy {
    fn name(&self) -> &str {
        "model"
    }

    async fn suggest(
        &self,
        text: &str,
        cancel_token: &CancellationToken,
    ) -> Result<Vec<Suggestion>, StrategyError> {
        let reply = self
            .model
            .complete(&llm::rewrite_prompt(text), Some(cancel_token))
            .await?;
        let suggestions = llm::parse_suggestion_lines(&reply, text);
        log::debug!(
            "{} suggested {} replacement(s)",
            self.model.model(),
            suggestions.len()
        );
        Ok(suggestions)
    }
}
