//! Configuration management.
//!
//! Resolves where the local cache lives, which key prefix it uses, and how
//! to reach the remote store. Every value follows the same priority:
//! explicit flag, then environment variable, then `config.json`, then the
//! built-in default.

mod settings;

pub use settings::{Settings, config_path, load_settings, load_settings_from, save_settings_to};

use crate::error::Result;
use crate::hybrid::HybridStore;
use crate::remote::{BoxedRemote, PostgrestRemote, RemoteConfig};
use crate::storage::{DEFAULT_PREFIX, LocalCache, SqliteKv};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable lookup that ignores empty values.
pub(crate) fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get the global govstore directory (`~/.govstore/`).
#[must_use]
pub fn global_govstore_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".govstore"))
}

/// Resolve the cache database path.
///
/// Priority:
/// 1. `explicit_path` (the `--db` flag)
/// 2. `GOVSTORE_DB` environment variable
/// 3. `~/.govstore/data/cache.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Some(db_path) = env_nonempty("GOVSTORE_DB") {
        return Some(PathBuf::from(db_path));
    }

    global_govstore_dir().map(|dir| dir.join("data").join("cache.db"))
}

/// Resolve the local cache key prefix.
#[must_use]
pub fn resolve_prefix(explicit: Option<&str>, settings: &Settings) -> String {
    explicit
        .map(String::from)
        .or_else(|| env_nonempty("GOVSTORE_PREFIX"))
        .or_else(|| settings.prefix.clone())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
}

/// Resolve the local cache byte quota, if any.
#[must_use]
pub fn resolve_quota(settings: &Settings) -> Option<usize> {
    env_nonempty("GOVSTORE_QUOTA_BYTES")
        .and_then(|v| v.trim().parse().ok())
        .or(settings.quota_bytes)
}

/// Resolve the remote connection from the process environment.
#[must_use]
pub fn resolve_remote_config(settings: &Settings) -> RemoteConfig {
    resolve_remote_config_with(env_nonempty, settings)
}

/// Resolve the remote connection using `lookup` for environment values.
///
/// Priority for each of URL and key: `GOVSTORE_REMOTE_*`, then the web
/// app's `NEXT_PUBLIC_SUPABASE_*`, then the settings file.
pub fn resolve_remote_config_with<F>(lookup: F, settings: &Settings) -> RemoteConfig
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup("GOVSTORE_REMOTE_URL")
        .or_else(|| lookup("NEXT_PUBLIC_SUPABASE_URL"))
        .or_else(|| settings.remote_url.clone());
    let key = lookup("GOVSTORE_REMOTE_KEY")
        .or_else(|| lookup("NEXT_PUBLIC_SUPABASE_ANON_KEY"))
        .or_else(|| settings.remote_key.clone());

    match (&url, &key) {
        (Some(url), Some(key)) => {
            debug!(url = %url, key_length = key.len(), "Remote store configured");
        }
        _ => warn!("Missing remote store URL or key; running on the local cache only"),
    }

    let timeout = settings
        .timeout_secs
        .map_or(crate::remote::DEFAULT_TIMEOUT, Duration::from_secs);

    RemoteConfig { url, key, timeout }
}

/// Options for [`open_store`].
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub db_path: Option<PathBuf>,
    pub prefix: Option<String>,
    /// Ignore any remote configuration.
    pub offline: bool,
}

/// Build a [`HybridStore`] from flags, environment and settings.
///
/// # Errors
///
/// Returns an error if the settings file is invalid or the cache database
/// cannot be opened.
pub fn open_store(options: &StoreOptions) -> Result<HybridStore> {
    let settings = load_settings()?;
    let db_path = resolve_db_path(options.db_path.as_deref()).ok_or_else(|| {
        crate::Error::Config("Could not determine cache database location".into())
    })?;

    let kv = SqliteKv::open(&db_path)?.with_quota(resolve_quota(&settings));
    let local = LocalCache::new(kv).with_prefix(resolve_prefix(options.prefix.as_deref(), &settings));

    let remote = if options.offline {
        None
    } else {
        let config = resolve_remote_config(&settings);
        config
            .is_configured()
            .then(|| BoxedRemote::new(PostgrestRemote::new(config)))
    };

    Ok(HybridStore::new(local).with_boxed_remote(remote))
}
