//! Status command implementation.

use crate::config::{StoreOptions, open_store, resolve_db_path};
use crate::error::Result;
use crate::remote::RemoteInfo;
use colored::Colorize;
use serde::Serialize;

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput {
    db_path: Option<String>,
    prefix: String,
    offline: bool,
    remote: Option<RemoteInfo>,
    remote_configured: bool,
    table_count: usize,
    row_count: usize,
}

/// Execute status command.
///
/// # Errors
///
/// Returns an error if the settings file is invalid or the cache cannot be
/// opened.
pub fn execute(store_opts: &StoreOptions, json: bool) -> Result<()> {
    let db_path = resolve_db_path(store_opts.db_path.as_deref());
    let store = open_store(store_opts)?;
    let tables = store.local().tables();

    let output = StatusOutput {
        db_path: db_path.map(|p| p.display().to_string()),
        prefix: store.local().prefix().to_string(),
        offline: store_opts.offline,
        remote: store.remote().map(crate::remote::BoxedRemote::info),
        remote_configured: store.is_remote_configured(),
        table_count: tables.len(),
        row_count: tables.iter().map(|(_, rows)| rows).sum(),
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("govstore Status");
    println!("===============");
    println!();
    println!("Cache:   {}", output.db_path.as_deref().unwrap_or("(unknown)"));
    println!("Prefix:  {}", output.prefix);
    println!("Tables:  {} ({} rows)", output.table_count, output.row_count);

    let remote = match (&output.remote, output.offline) {
        (_, true) => "offline".yellow(),
        (Some(info), false) if info.configured => info
            .endpoint
            .clone()
            .unwrap_or_else(|| info.name.clone())
            .green(),
        _ => "not configured (local cache only)".yellow(),
    };
    println!("Remote:  {remote}");
    Ok(())
}
