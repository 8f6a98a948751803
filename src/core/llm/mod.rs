//! Chat model collaborator: streamed one-shot completions over an OpenAI-compatible API.
//!
//! Used by the model-based suggestion strategy and the chat bias estimator.
//! Requests race against a cancellation token so a superseded analysis stops early.

mod error;
mod rating;
mod stream;
mod suggestions;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use futures::StreamExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::core::config::{Config, ConfigError};

pub use error::{LlmError, map_api_error};
pub use rating::{ChatEstimator, parse_rating};
pub use suggestions::{parse_suggestion_lines, rewrite_prompt};

/// Client bound to one model.
pub struct ChatModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl ChatModel {
    /// Build a client from configuration. Errors if no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            client: Client::with_config(config.openai_config()?),
            model: config.model_id.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user message and collect the streamed reply.
    pub async fn complete(
        &self,
        prompt: &str,
        cancel_token: Option<&CancellationToken>,
    ) -> Result<String, LlmError> {
        if cancel_token.is_some_and(|t| t.is_cancelled()) {
            return Err(LlmError::Cancelled);
        }
        log::debug!("Calling {} ({} prompt bytes)", self.model, prompt.len());

        // Start the streaming API call, racing against cancellation.
        let chat_api = self.client.chat();
        let stream_future = chat_api.create_stream_byot::<_, Value>(json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": true,
        }));

        let stream_result = if let Some(token) = cancel_token {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return Err(LlmError::Cancelled);
                }
                result = stream_future => result,
            }
        } else {
            stream_future.await
        };

        let mut stream = stream_result.map_err(map_api_error)?;
        let mut content = String::new();

        loop {
            let chunk_opt = if let Some(token) = cancel_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        return Err(LlmError::Cancelled);
                    }
                    chunk = stream.next() => chunk,
                }
            } else {
                stream.next().await
            };

            let Some(chunk_result) = chunk_opt else { break };
            let chunk = chunk_result.map_err(map_api_error)?;

            if let Some(msg) = stream::chunk_error(&chunk) {
                return Err(LlmError::ApiMessage(msg));
            }
            if let Some(piece) = stream::delta_content(&chunk)
                && !stream::push_bounded(&mut content, piece)
            {
                log::warn!("Reply from {} truncated", self.model);
                break;
            }
        }

        Ok(content)
    }
}
