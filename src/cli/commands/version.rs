//! Version command implementation.
//!
//! Besides the crate version, reports the cache layout version and default
//! key prefix, which decide whether two builds can share a cache file.

use crate::error::Result;
use crate::storage::DEFAULT_PREFIX;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;

#[derive(Serialize, Debug, PartialEq, Eq)]
struct VersionInfo {
    version: &'static str,
    cache_schema: i32,
    default_prefix: &'static str,
    profile: &'static str,
}

fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
        cache_schema: CURRENT_SCHEMA_VERSION,
        default_prefix: DEFAULT_PREFIX,
        profile: if cfg!(debug_assertions) { "debug" } else { "release" },
    }
}

/// Print version and cache compatibility details.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let info = version_info();

    if json {
        println!("{}", serde_json::to_string(&info)?);
    } else {
        println!(
            "govstore {} ({}, cache schema v{}, prefix {})",
            info.version, info.profile, info.cache_schema, info.default_prefix
        );
    }
    Ok(())
}
