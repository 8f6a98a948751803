//! API key storage: load and persist the chat model key in the config directory.
//!
//! The key never lives in source or in the binary. It comes from `EQUALSPEAK_API_KEY`
//! or from a dedicated file with restrictive permissions (0o600 on Unix).

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

use crate::core::paths;

/// Errors when storing the API key.
#[derive(Debug, thiserror::Error)]
pub enum ApiKeyError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("API key is empty")]
    Empty,
    #[error("Failed to store API key: {0}")]
    Io(#[from] io::Error),
}

/// Path to the API key file in the config directory.
pub fn credentials_path() -> Option<PathBuf> {
    paths::config_dir().map(|d| d.join("api-key"))
}

/// Load the API key from the config directory.
/// Returns `None` if the file is absent, empty, or unreadable.
pub fn load_api_key() -> Option<String> {
    let path = credentials_path()?;
    let content = fs::read_to_string(&path).ok()?;
    let key = content.trim().to_string();
    if key.is_empty() { None } else { Some(key) }
}

/// Store the API key in the config directory, creating it if needed.
/// On Unix the file is created with mode 0o600 and tightened if it already existed.
pub fn store_api_key(key: &str) -> Result<PathBuf, ApiKeyError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(ApiKeyError::Empty);
    }
    let path = credentials_path().ok_or(ApiKeyError::NoConfigDir)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(&path)?;
    file.write_all(trimmed.as_bytes())?;
    file.write_all(b"\n")?;

    #[cfg(unix)]
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;

    Ok(path)
}
