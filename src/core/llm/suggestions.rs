//! Model-based suggestions: the rewrite prompt and parsing of line-oriented replies.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::matcher::Suggestion;
use crate::core::text;

const REWRITE_PROMPT: &str = "Remove gender bias in the following content. \
List each word you would change on its own line as `original -> replacement`. \
Only list single words, and reply with nothing else.";

/// Prompt asking the model for word-level replacements in `content`.
pub fn rewrite_prompt(content: &str) -> String {
    format!("{}\n\nContent: {}", REWRITE_PROMPT, content)
}

fn arrow_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[-*•]|\d+[.)])?\s*(.+?)\s*(?:->|→|=>)\s*(.+?)\s*$")
            .expect("arrow pattern is valid")
    })
}

fn replace_with_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:[-*•]|\d+[.)])?\s*replace\s+(.+?)\s+with\s+(.+?)\s*$")
            .expect("replace pattern is valid")
    })
}

fn clean(side: &str) -> &str {
    side.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’' | '`' | '*' | '.'))
        .trim()
}

/// Parse one reply line into `(original, replacement)`.
pub(crate) fn parse_pair(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    let caps = replace_with_pattern()
        .captures(line)
        .or_else(|| arrow_pattern().captures(line))?;
    let original = clean(caps.get(1)?.as_str());
    let replacement = clean(caps.get(2)?.as_str());
    if original.is_empty() || replacement.is_empty() {
        return None;
    }
    if original.eq_ignore_ascii_case(replacement) {
        return None;
    }
    Some((original.to_lowercase(), replacement.to_string()))
}

/// Turn a model reply into suggestions positioned against `content`.
///
/// The reply is split on line breaks; unparseable lines, multi-word originals, and
/// words absent from `content` are dropped. Repeated words claim successive tokens.
/// Output is in token order.
pub fn parse_suggestion_lines(reply: &str, content: &str) -> Vec<Suggestion> {
    let words: Vec<String> = text::tokenize(content)
        .into_iter()
        .map(text::normalize_token)
        .collect();
    let mut claimed = HashSet::new();
    let mut out = Vec::new();

    for line in reply.lines() {
        let Some((original, replacement)) = parse_pair(line) else {
            continue;
        };
        if original.split_whitespace().count() != 1 {
            log::debug!("Skipping multi-word suggestion '{}'", original);
            continue;
        }
        let original = text::normalize_token(&original);
        let position = words
            .iter()
            .enumerate()
            .position(|(i, w)| *w == original && !claimed.contains(&i));
        let Some(position) = position else {
            log::debug!("Suggested word '{}' not found in text", original);
            continue;
        };
        claimed.insert(position);
        out.push(Suggestion {
            original,
            replacement,
            position,
        });
    }

    out.sort_by_key(|s| s.position);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_content() {
        let p = rewrite_prompt("The chairman spoke");
        assert!(p.starts_with("Remove gender bias in the following content"));
        assert!(p.ends_with("Content: The chairman spoke"));
    }

    #[test]
    fn parse_pair_formats() {
        let expected = Some(("chairman".to_string(), "chairperson".to_string()));
        assert_eq!(parse_pair("chairman -> chairperson"), expected);
        assert_eq!(parse_pair("- \"Chairman\" → \"chairperson\""), expected);
        assert_eq!(parse_pair("2. chairman => chairperson."), expected);
        assert_eq!(parse_pair("Replace \"chairman\" with \"chairperson\""), expected);
    }

    #[test]
    fn parse_pair_rejects_noise() {
        assert_eq!(parse_pair("Here are the changes:"), None);
        assert_eq!(parse_pair(""), None);
        assert_eq!(parse_pair("team -> team"), None);
    }

    #[test]
    fn positions_follow_the_text() {
        let reply = "Here you go:\nmankind -> humanity\nchairman -> chairperson\n";
        let out = parse_suggestion_lines(reply, "The chairman will address mankind");
        assert_eq!(
            out,
            vec![
                Suggestion {
                    original: "chairman".to_string(),
                    replacement: "chairperson".to_string(),
                    position: 1,
                },
                Suggestion {
                    original: "mankind".to_string(),
                    replacement: "humanity".to_string(),
                    position: 4,
                },
            ]
        );
    }

    #[test]
    fn repeated_words_claim_successive_tokens() {
        let reply = "guys -> everyone\nguys -> folks";
        let out = parse_suggestion_lines(reply, "Hey guys, thanks guys!");
        let positions: Vec<usize> = out.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 3]);
    }

    #[test]
    fn unknown_and_multi_word_originals_dropped() {
        let reply = "cleaning lady -> cleaner\nwaiter -> server";
        assert!(parse_suggestion_lines(reply, "The waitress smiled").is_empty());
    }
}
