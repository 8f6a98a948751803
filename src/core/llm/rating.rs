//! Chat-model bias rating used as a semantic estimator.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use crate::core::semantic::{EstimatorError, SemanticBiasEstimator};

use super::ChatModel;

const RATING_PROMPT: &str = "Rate how gender-biased the following content is, \
from 0 (fully gender-neutral) to 1 (strongly gender-biased). \
Reply with only the number.";

/// First number in a reply, accepted only if it lies in [0,1].
pub fn parse_rating(reply: &str) -> Option<f32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"-?\d*\.?\d+").expect("number pattern is valid"));
    let value: f32 = re.find(reply)?.as_str().parse().ok()?;
    (0.0..=1.0).contains(&value).then_some(value)
}

/// Asks the chat model to rate the text.
pub struct ChatEstimator {
    model: Arc<ChatModel>,
}

impl ChatEstimator {
    pub fn new(model: Arc<ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl SemanticBiasEstimator for ChatEstimator {
    fn name(&self) -> &str {
        "chat-rating"
    }

    async fn estimate(&self, text: &str) -> Result<f32, EstimatorError> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }
        let prompt = format!("{}\n\nContent: {}", RATING_PROMPT, text);
        let reply = self.model.complete(&prompt, None).await?;
        parse_rating(&reply).ok_or_else(|| {
            EstimatorError::Transient(format!(
                "unusable rating from {}: {:?}",
                self.model.model(),
                reply.trim()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rating_plain_and_wrapped() {
        assert_eq!(parse_rating("0.7"), Some(0.7));
        assert_eq!(parse_rating("Rating: .25\n"), Some(0.25));
        assert_eq!(parse_rating("1"), Some(1.0));
    }

    #[test]
    fn parse_rating_rejects_out_of_range() {
        assert_eq!(parse_rating("7 out of 10"), None);
        assert_eq!(parse_rating("no idea"), None);
        assert_eq!(parse_rating("-1"), None);
        assert_eq!(parse_rating("Rating: -0.5"), None);
    }
}
