//! Tokenization shared by matching and suggestion application.

/// Split text into whitespace-delimited tokens. Runs of whitespace count as one separator.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// A token split into leading punctuation, the word itself, and trailing punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParts<'a> {
    pub prefix: &'a str,
    pub word: &'a str,
    pub suffix: &'a str,
}

/// Strip leading and trailing non-letter characters from a token.
/// A token without letters yields an empty word and keeps everything in `prefix`.
pub fn split_token(token: &str) -> TokenParts<'_> {
    let Some(start) = token.find(char::is_alphabetic) else {
        return TokenParts {
            prefix: token,
            word: "",
            suffix: "",
        };
    };
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(token.len());
    TokenParts {
        prefix: &token[..start],
        word: &token[start..end],
        suffix: &token[end..],
    }
}

/// Lower-cased word part of a token, used as the lookup key.
pub fn normalize_token(token: &str) -> String {
    split_token(token).word.to_lowercase()
}
