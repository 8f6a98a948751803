//! Term matching: positioned suggestions and the term-derived score.

use serde::{Deserialize, Serialize};

use crate::core::terms::GenderedTermTable;
use crate::core::text;

/// A proposed word-level replacement at a token position of the analyzed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub original: String,
    pub replacement: String,
    pub position: usize,
}

/// Output of [`match_terms`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TermMatches {
    pub suggestions: Vec<Suggestion>,
    pub term_score: f32,
}

/// Fraction of tokens flagged, clamped to 1.0. Zero tokens score 0.
pub fn term_score(hits: usize, token_count: usize) -> f32 {
    if token_count == 0 {
        return 0.0;
    }
    (hits as f32 / token_count as f32).min(1.0)
}

/// Scan `text` for table terms. Suggestions come back in token order.
pub fn match_terms(text: &str, table: &GenderedTermTable) -> TermMatches {
    let lowered = text.to_lowercase();
    let tokens = text::tokenize(&lowered);

    let suggestions: Vec<Suggestion> = tokens
        .iter()
        .enumerate()
        .filter_map(|(position, token)| {
            let word = text::split_token(token).word;
            let replacement = table.lookup(word)?;
            Some(Suggestion {
                original: word.to_string(),
                replacement: replacement.to_string(),
                position,
            })
        })
        .collect();

    TermMatches {
        term_score: term_score(suggestions.len(), tokens.len()),
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::terms;

    fn suggestion(original: &str, replacement: &str, position: usize) -> Suggestion {
        Suggestion {
            original: original.to_string(),
            replacement: replacement.to_string(),
            position,
        }
    }

    #[test]
    fn chairman_and_mankind() {
        let table = terms::builtin_table();
        let out = match_terms("The chairman will address mankind", &table);
        assert_eq!(
            out.suggestions,
            vec![
                suggestion("chairman", "chairperson", 1),
                suggestion("mankind", "humanity", 4),
            ]
        );
        assert!((out.term_score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn empty_text_scores_zero() {
        let out = match_terms("", &terms::builtin_table());
        assert!(out.suggestions.is_empty());
        assert_eq!(out.term_score, 0.0);
    }

    #[test]
    fn no_matches_scores_zero() {
        let out = match_terms("The committee met on Tuesday", &terms::builtin_table());
        assert!(out.suggestions.is_empty());
        assert_eq!(out.term_score, 0.0);
    }

    #[test]
    fn all_matches_score_one() {
        let out = match_terms("Chairman fireman, MANKIND!", &terms::builtin_table());
        assert_eq!(out.suggestions.len(), 3);
        assert_eq!(out.term_score, 1.0);
    }

    #[test]
    fn punctuation_is_stripped_before_lookup() {
        let out = match_terms("Call the fireman, quickly.", &terms::builtin_table());
        assert_eq!(out.suggestions, vec![suggestion("fireman", "firefighter", 2)]);
    }

    #[test]
    fn positions_count_whitespace_runs_once() {
        let out = match_terms("  the   chairman\n\tspoke ", &terms::builtin_table());
        assert_eq!(out.suggestions[0].position, 1);
        assert!((out.term_score - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn repeated_terms_are_each_reported() {
        let out = match_terms("fireman and fireman", &terms::builtin_table());
        let positions: Vec<usize> = out.suggestions.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn term_score_clamps() {
        assert_eq!(term_score(5, 3), 1.0);
        assert_eq!(term_score(0, 0), 0.0);
    }
}
