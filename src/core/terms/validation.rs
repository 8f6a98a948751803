//! Term table validation: disk format and conversion to the lookup map.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::TermsError;

/// JSON structure of the user terms file on disk.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TermsFile {
    pub(super) terms: Vec<TermEntry>,
}

/// One gendered word and its neutral replacement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,
    pub replacement: String,
}

/// Validate user entries (one file) and lower-case their terms.
pub(crate) fn validate_entries(entries: Vec<TermEntry>) -> Result<Vec<TermEntry>, TermsError> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(entries.len());

    for (i, entry) in entries.into_iter().enumerate() {
        let term = entry.term.trim().to_lowercase();
        if term.is_empty() {
            return Err(TermsError::Validation(format!(
                "Term at index {}: term cannot be empty",
                i
            )));
        }
        // Matching strips leading/trailing non-letters, so a key must start and end with one.
        let starts_with_letter = term.chars().next().is_some_and(char::is_alphabetic);
        let ends_with_letter = term.chars().last().is_some_and(char::is_alphabetic);
        if !starts_with_letter
            || !ends_with_letter
            || !term
                .chars()
                .all(|c| c.is_alphabetic() || c == '-' || c == '\'')
        {
            return Err(TermsError::Validation(format!(
                "Term '{}': must be a single word of letters, hyphens, and apostrophes",
                entry.term
            )));
        }
        if !seen.insert(term.clone()) {
            return Err(TermsError::Validation(format!(
                "Duplicate term '{}'",
                entry.term
            )));
        }
        let replacement = entry.replacement.trim().to_string();
        if replacement.is_empty() {
            return Err(TermsError::Validation(format!(
                "Term '{}': replacement cannot be empty",
                entry.term
            )));
        }
        result.push(TermEntry { term, replacement });
    }

    Ok(result)
}

/// Merge `overrides` over `base` and check that no replacement is itself a key.
pub(crate) fn merge(
    base: &[TermEntry],
    overrides: &[TermEntry],
) -> Result<HashMap<String, String>, TermsError> {
    let mut map: HashMap<String, String> = base
        .iter()
        .map(|e| (e.term.clone(), e.replacement.clone()))
        .collect();
    for entry in overrides {
        map.insert(entry.term.clone(), entry.replacement.clone());
    }

    for (term, replacement) in &map {
        if let Some(word) = replacement
            .split_whitespace()
            .map(str::to_lowercase)
            .find(|w| map.contains_key(w))
        {
            return Err(TermsError::Validation(format!(
                "Term '{}': replacement '{}' contains gendered term '{}'",
                term, replacement, word
            )));
        }
    }
    Ok(map)
}
