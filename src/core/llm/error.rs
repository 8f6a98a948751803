//! Chat model error types.

use crate::core::semantic::EstimatorError;

/// Errors from a chat completion request.
#[derive(Debug)]
pub enum LlmError {
    ApiAuth(String),
    ApiMessage(String),
    /// The request was superseded by a newer analysis.
    Cancelled,
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::ApiAuth(msg) => write!(f, "{}", msg),
            LlmError::ApiMessage(msg) => write!(f, "API error: {}", msg),
            LlmError::Cancelled => write!(f, "Request cancelled"),
            LlmError::Other(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::Other(e) => e.source(),
            LlmError::Cancelled | LlmError::ApiAuth(_) | LlmError::ApiMessage(_) => None,
        }
    }
}

impl From<LlmError> for EstimatorError {
    fn from(e: LlmError) -> Self {
        EstimatorError::Transient(e.to_string())
    }
}

/// Map async-openai or API errors into LlmError.
pub fn map_api_error<E>(e: E) -> LlmError
where
    E: std::fmt::Display + Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    let s = e.to_string();
    if s.contains("401") || s.contains("invalid_api_key") {
        return LlmError::ApiAuth(
            "API error (401): the API key was rejected. Check EQUALSPEAK_API_KEY or run `equalspeak set-key`.".to_string(),
        );
    }
    if s.contains("\"error\"")
        && let Some((_, rest)) = s.split_once("\"message\":\"")
        && let Some((msg, _)) = rest.split_once('"')
    {
        return LlmError::ApiMessage(msg.to_string());
    }
    LlmError::Other(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_api_error_401() {
        let e = std::io::Error::other("status 401: invalid_api_key");
        match map_api_error(e) {
            LlmError::ApiAuth(msg) => assert!(msg.contains("EQUALSPEAK_API_KEY")),
            other => panic!("expected ApiAuth, got {:?}", other),
        }
    }

    #[test]
    fn map_api_error_json_message() {
        let e = std::io::Error::other(r#"{"error":{"message":"Rate limit reached"}}"#);
        match map_api_error(e) {
            LlmError::ApiMessage(msg) => assert_eq!(msg, "Rate limit reached"),
            other => panic!("expected ApiMessage, got {:?}", other),
        }
    }

    #[test]
    fn map_api_error_generic() {
        let e = std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out");
        assert!(matches!(map_api_error(e), LlmError::Other(_)));
    }

    #[test]
    fn converts_to_transient_estimator_error() {
        let err: EstimatorError = LlmError::Cancelled.into();
        assert_eq!(err, EstimatorError::Transient("Request cancelled".to_string()));
    }
}
