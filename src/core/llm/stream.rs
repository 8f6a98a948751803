//! Streaming completion chunks: content deltas, inline errors, size limit.

use serde_json::Value;

/// Max reply size (256KB). Suggestion lists and ratings are far smaller.
pub(super) const MAX_CONTENT_BYTES: usize = 256 * 1024;

/// Text delta of the first choice in a streaming chunk.
pub(super) fn delta_content(chunk: &Value) -> Option<&str> {
    chunk
        .get("choices")?
        .as_array()?
        .first()?
        .get("delta")?
        .get("content")?
        .as_str()
}

/// Error message carried inside a chunk (some providers report errors mid-stream).
pub(super) fn chunk_error(chunk: &Value) -> Option<String> {
    let err = chunk.get("error")?;
    Some(
        err.get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string(),
    )
}

/// Append `piece` unless it would exceed [`MAX_CONTENT_BYTES`]. Returns false when full.
pub(super) fn push_bounded(buf: &mut String, piece: &str) -> bool {
    if buf.len() + piece.len() > MAX_CONTENT_BYTES {
        return false;
    }
    buf.push_str(piece);
    true
}
