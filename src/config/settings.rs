//! Settings file management.
//!
//! Loads and saves `~/.govstore/config.json`. Every field is optional; a
//! missing file is the same as an empty one.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Remote endpoint (e.g. `https://<project>.supabase.co`).
    pub remote_url: Option<String>,
    /// Remote access (anon) key.
    pub remote_key: Option<String>,
    /// Local cache key prefix.
    pub prefix: Option<String>,
    /// Byte cap for the local cache.
    pub quota_bytes: Option<usize>,
    /// Remote request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Get the config file path.
///
/// `GOVSTORE_CONFIG` overrides the default `~/.govstore/config.json`.
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = super::env_nonempty("GOVSTORE_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    super::global_govstore_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or(Error::Config("Could not determine home directory".into()))
}

/// Load settings from the default location.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&config_path()?)
}

/// Load settings from `path`.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Save settings to `path`, creating parent directories.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

    fs::write(path, content).map_err(|e| Error::Config(format!("Failed to write config file: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let settings = Settings {
            remote_url: Some("https://abc.supabase.co".into()),
            quota_bytes: Some(5 * 1024 * 1024),
            ..Settings::default()
        };
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"prefix": "test_"}"#).unwrap();
        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.prefix.as_deref(), Some("test_"));
        assert!(settings.remote_url.is_none());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{nope").unwrap();
        assert!(matches!(load_settings_from(&path), Err(Error::Config(_))));
    }
}
