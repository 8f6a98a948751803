use super::validation::{TermsFile, merge, validate_entries};
use super::*;

fn entry(term: &str, replacement: &str) -> TermEntry {
    TermEntry {
        term: term.to_string(),
        replacement: replacement.to_string(),
    }
}

#[test]
fn builtin_table_contains_core_terms() {
    let table = builtin_table();
    assert_eq!(table.lookup("chairman"), Some("chairperson"));
    assert_eq!(table.lookup("mankind"), Some("humanity"));
    assert_eq!(table.lookup("fireman"), Some("firefighter"));
}

#[test]
fn lookup_is_case_insensitive() {
    let table = builtin_table();
    assert_eq!(table.lookup("ChairMan"), Some("chairperson"));
    assert!(!table.contains("chair"));
}

#[test]
fn replacements_are_never_keys() {
    let table = builtin_table();
    for e in table.entries() {
        for word in e.replacement.split_whitespace() {
            assert!(
                !table.contains(word),
                "replacement '{}' of '{}' is itself a key",
                e.replacement,
                e.term
            );
        }
    }
}

#[test]
fn builtin_terms_are_unique_lowercase() {
    let entries = builtin_entries();
    assert_eq!(builtin_table().len(), entries.len());
    assert!(entries.iter().all(|e| e.term == e.term.to_lowercase()));
}

#[test]
fn validate_rejects_duplicate_terms() {
    let err = validate_entries(vec![entry("Doorman", "door attendant"), entry("doorman", "x")])
        .unwrap_err();
    assert!(err.to_string().contains("Duplicate"));
}

#[test]
fn validate_rejects_multi_word_term() {
    let err = validate_entries(vec![entry("cleaning lady", "cleaner")]).unwrap_err();
    assert!(err.to_string().contains("single word"));
}

#[test]
fn validate_rejects_trailing_punctuation() {
    let err = validate_entries(vec![entry("doorman!", "door attendant")]).unwrap_err();
    assert!(err.to_string().contains("single word"));
}

#[test]
fn validate_rejects_empty_replacement() {
    let err = validate_entries(vec![entry("doorman", "  ")]).unwrap_err();
    assert!(err.to_string().contains("cannot be empty"));
}

#[test]
fn validate_lowercases_terms() {
    let out = validate_entries(vec![entry("Doorman", "door attendant")]).unwrap();
    assert_eq!(out[0].term, "doorman");
}

#[test]
fn merge_rejects_replacement_that_is_a_key() {
    let err = merge(&[entry("chairman", "chairperson")], &[entry("chairperson", "chair")])
        .unwrap_err();
    assert!(err.to_string().contains("contains gendered term"));
}

#[test]
fn merge_user_terms_override_builtins() {
    let map = merge(&[entry("guys", "everyone")], &[entry("guys", "folks")]).unwrap();
    assert_eq!(map.get("guys").map(String::as_str), Some("folks"));
}

#[test]
fn load_table_missing_file_uses_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let table = load_table(Some(&dir.path().join("terms.json"))).unwrap();
    assert_eq!(table, builtin_table());
}

#[test]
fn save_and_load_user_terms() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("terms.json");
    save_user_terms(&path, &[entry("doorman", "door attendant")]).unwrap();

    let table = load_table(Some(&path)).unwrap();
    assert_eq!(table.lookup("doorman"), Some("door attendant"));
    assert_eq!(table.lookup("chairman"), Some("chairperson"));
}

#[test]
fn load_table_invalid_json_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terms.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = load_table(Some(&path)).unwrap_err();
    assert!(err.safe_mode_message().contains("invalid JSON"));
}

#[test]
fn terms_file_shape() {
    let file: TermsFile =
        serde_json::from_str(r#"{"terms":[{"term":"doorman","replacement":"door attendant"}]}"#)
            .unwrap();
    let table = GenderedTermTable::from_entries(file.terms).unwrap();
    assert_eq!(table.len(), 1);
}
