//! Gendered term table: built-in entries plus optional user terms.
//!
//! Built-in terms are loaded from `config/builtin-terms.json` (embedded at compile time).
//! User terms live in `~/.config/equalspeak/terms.json` and are merged over the built-ins.
//! The active table is built once per process and never mutated afterwards.

mod validation;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

pub use validation::TermEntry;

use crate::core::paths;

/// Immutable mapping from a lowercase gendered word to its neutral replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenderedTermTable {
    entries: HashMap<String, String>,
}

/// Error loading or validating a term table.
#[derive(Debug, thiserror::Error)]
pub enum TermsError {
    #[error("Failed to read terms file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl TermsError {
    /// User-friendly message when falling back to the built-in table.
    pub fn safe_mode_message(&self) -> String {
        let detail = match self {
            TermsError::Io(_) => "could not read file".to_string(),
            TermsError::Json(_) => "invalid JSON".to_string(),
            TermsError::Validation(msg) => format!("validation error: {}", msg),
        };
        format!("terms.json: {} (using built-in terms only)", detail)
    }
}

impl GenderedTermTable {
    /// Build a table from entries. Terms are lower-cased; duplicates and
    /// replacements that are themselves keys are rejected.
    pub fn from_entries(entries: Vec<TermEntry>) -> Result<Self, TermsError> {
        let entries = validation::validate_entries(entries)?;
        let entries = validation::merge(&entries, &[])?;
        Ok(Self { entries })
    }

    /// Case-insensitive lookup of an already-normalized word.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        if let Some(r) = self.entries.get(word) {
            return Some(r.as_str());
        }
        self.entries.get(&word.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by term.
    pub fn entries(&self) -> Vec<TermEntry> {
        let mut out: Vec<TermEntry> = self
            .entries
            .iter()
            .map(|(term, replacement)| TermEntry {
                term: term.clone(),
                replacement: replacement.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.term.cmp(&b.term));
        out
    }
}

fn load_builtin_entries() -> Vec<TermEntry> {
    let json = include_str!("../../../config/builtin-terms.json");
    // build.rs validates this file; a parse failure here can only mean a broken build.
    serde_json::from_str(json).unwrap_or_default()
}

static BUILTIN_ENTRIES: OnceLock<Vec<TermEntry>> = OnceLock::new();

/// Returns the built-in entries, parsing them on first access.
pub fn builtin_entries() -> &'static [TermEntry] {
    BUILTIN_ENTRIES.get_or_init(load_builtin_entries)
}

/// Built-in table only (no user terms).
pub fn builtin_table() -> GenderedTermTable {
    GenderedTermTable {
        entries: builtin_entries()
            .iter()
            .map(|e| (e.term.clone(), e.replacement.clone()))
            .collect(),
    }
}

/// Path of the user terms file (`~/.config/equalspeak/terms.json`).
pub fn user_terms_path() -> Option<std::path::PathBuf> {
    paths::config_dir().map(|d| d.join("terms.json"))
}

/// Load user terms from a file. Returns an empty vec if the file is absent.
pub fn load_user_terms(path: &Path) -> Result<Vec<TermEntry>, TermsError> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let content = fs::read_to_string(path)?;
    let file: validation::TermsFile = serde_json::from_str(&content)?;
    validation::validate_entries(file.terms)
}

/// Built-in table with the user terms at `path` merged over it.
pub fn load_table(path: Option<&Path>) -> Result<GenderedTermTable, TermsError> {
    let user = match path {
        Some(p) => load_user_terms(p)?,
        None => vec![],
    };
    let entries = validation::merge(builtin_entries(), &user)?;
    Ok(GenderedTermTable { entries })
}

/// Save user terms to `path`. Creates the parent directory if needed.
pub fn save_user_terms(path: &Path, terms: &[TermEntry]) -> Result<(), TermsError> {
    let terms = validation::validate_entries(terms.to_vec())?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = validation::TermsFile { terms };
    fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}

static ACTIVE_TABLE: OnceLock<Arc<GenderedTermTable>> = OnceLock::new();

/// The process-wide table: built-ins plus user terms, built on first access.
/// An invalid user file is logged and the built-in table is used instead.
pub fn active() -> Arc<GenderedTermTable> {
    ACTIVE_TABLE
        .get_or_init(|| {
            let path = user_terms_path();
            let table = load_table(path.as_deref()).unwrap_or_else(|e| {
                log::warn!("{}", e.safe_mode_message());
                builtin_table()
            });
            log::debug!("Term table ready: {} entries", table.len());
            Arc::new(table)
        })
        .clone()
}

#[cfg(test)]
mod tests;
