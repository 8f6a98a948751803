//! Build script: validates builtin-terms.json at compile time.

use std::collections::HashSet;
use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "builtin-terms.json"]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", config_path.display());
    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. builtin-terms.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    #[derive(serde::Deserialize)]
    struct BuiltinTermEntry {
        term: String,
        replacement: String,
    }
    let entries: Vec<BuiltinTermEntry> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "builtin-terms.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });

    let mut keys = HashSet::new();
    for entry in &entries {
        if entry.term.is_empty() || entry.term != entry.term.to_lowercase() {
            panic!("builtin-terms.json: '{}' must be non-empty lowercase", entry.term);
        }
        if entry.term.split_whitespace().count() != 1 {
            panic!("builtin-terms.json: '{}' must be a single word", entry.term);
        }
        if !keys.insert(entry.term.as_str()) {
            panic!("builtin-terms.json: duplicate term '{}'", entry.term);
        }
    }
    for entry in &entries {
        if entry
            .replacement
            .split_whitespace()
            .any(|w| keys.contains(w.to_lowercase().as_str()))
        {
            panic!(
                "builtin-terms.json: replacement '{}' for '{}' is itself a gendered term",
                entry.replacement, entry.term
            );
        }
    }
}
