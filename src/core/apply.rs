//! Applying a suggestion to the text it was generated from.
//!
//! Beyond plain token replacement, this keeps surrounding punctuation and
//! capitalization, and rejects a suggestion whose word is no longer at its position.

use crate::core::matcher::Suggestion;
use crate::core::text;

/// Why a suggestion could not be applied. Either way the caller should re-analyze.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error(
        "Suggestion position {position} is out of range for {token_count} tokens; re-run analysis"
    )]
    OutOfRange { position: usize, token_count: usize },
    #[error("Suggestion for '{expected}' no longer matches '{found}' at position {position}; re-run analysis")]
    Stale {
        position: usize,
        expected: String,
        found: String,
    },
}

/// Replace the token at `suggestion.position` and rejoin tokens with single spaces.
///
/// Punctuation around the word is kept, and a capitalized word gets a capitalized
/// replacement. Fails if the position is out of range or the token there is no
/// longer `suggestion.original`.
pub fn apply_suggestion(text: &str, suggestion: &Suggestion) -> Result<String, ApplyError> {
    let mut tokens: Vec<String> = text::tokenize(text).into_iter().map(String::from).collect();
    let token_count = tokens.len();
    let Some(token) = tokens.get_mut(suggestion.position) else {
        return Err(ApplyError::OutOfRange {
            position: suggestion.position,
            token_count,
        });
    };

    let parts = text::split_token(token);
    if parts.word.to_lowercase() != suggestion.original.to_lowercase() {
        return Err(ApplyError::Stale {
            position: suggestion.position,
            expected: suggestion.original.clone(),
            found: parts.word.to_string(),
        });
    }

    let replacement = match_case(parts.word, &suggestion.replacement);
    *token = format!("{}{}{}", parts.prefix, replacement, parts.suffix);
    Ok(tokens.join(" "))
}

/// Capitalize `replacement` when `word` starts with an uppercase letter.
fn match_case(word: &str, replacement: &str) -> String {
    let capitalized = word.chars().next().is_some_and(char::is_uppercase);
    if !capitalized {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
