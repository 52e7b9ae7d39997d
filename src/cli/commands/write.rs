//! Insert, upsert and update command implementations.
//!
//! Writes always land in the local cache first. The remote outcome is
//! reported, and the command fails only when the write landed nowhere.

use crate::cli::{InsertArgs, UpdateArgs, UpsertArgs};
use crate::config::{StoreOptions, open_store};
use crate::error::{Error, Result};
use crate::hybrid::SyncStatus;
use crate::model::{Record, Rows};
use crate::storage::LocalStatus;
use colored::Colorize;
use serde::Serialize;

use super::{block_on, parse_filter, parse_rows, sync_label};

#[derive(Serialize)]
struct WriteOutput<'a> {
    table: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a [Record]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    local: &'a LocalStatus,
    sync: &'a SyncStatus,
}

/// Execute the insert command.
///
/// # Errors
///
/// Returns an error for invalid JSON, an unopenable store, or a write
/// that reached neither store.
pub fn execute_insert(args: &InsertArgs, store_opts: &StoreOptions, json: bool) -> Result<()> {
    let rows = parse_rows(&args.data)?;
    let store = open_store(store_opts)?;
    let result = block_on(store.execute_insert(&args.table, rows))?;

    check_landed(&result.local, &result.sync)?;

    if json {
        let output = WriteOutput {
            table: &args.table,
            data: Some(result.data.as_slice()),
            count: Some(result.data.len()),
            local: &result.local,
            sync: &result.sync,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!(
        "Inserted {} row(s) into {} ({})",
        result.data.len(),
        args.table.bold(),
        sync_label(&result.sync)
    );
    print_ids(&result.data, store.id_field());
    print_sync_reason(&result.sync);
    Ok(())
}

/// Execute the upsert command.
///
/// # Errors
///
/// Returns an error for invalid JSON, an unopenable store, or a write
/// that reached neither store.
pub fn execute_upsert(args: &UpsertArgs, store_opts: &StoreOptions, json: bool) -> Result<()> {
    let rows = parse_rows(&args.data)?;
    let count = rows.len();
    let store = open_store(store_opts)?;
    let result = block_on(store.execute_upsert(&args.table, rows, &args.on_conflict))?;

    check_landed(&result.local, &result.sync)?;

    if json {
        let output = WriteOutput {
            table: &args.table,
            data: None,
            count: Some(count),
            local: &result.local,
            sync: &result.sync,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!(
        "Upserted {count} row(s) into {} on {} ({})",
        args.table.bold(),
        args.on_conflict,
        sync_label(&result.sync)
    );
    print_sync_reason(&result.sync);
    Ok(())
}

/// Execute the update command.
///
/// # Errors
///
/// Returns an error for an invalid patch or filter, an unopenable store,
/// or a write that reached neither store.
pub fn execute_update(args: &UpdateArgs, store_opts: &StoreOptions, json: bool) -> Result<()> {
    let patch = match parse_rows(&args.patch)? {
        Rows::One(patch) => patch,
        Rows::Many(_) => {
            return Err(Error::InvalidArgument("update patch must be a single JSON object".into()));
        }
    };
    let filter = parse_filter(&args.eq)?;
    let store = open_store(store_opts)?;
    let result = block_on(store.execute_update(&args.table, &patch, &filter))?;

    check_landed(&result.local, &result.sync)?;

    if json {
        let output = WriteOutput {
            table: &args.table,
            data: None,
            count: None,
            local: &result.local,
            sync: &result.sync,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let local = if result.local == LocalStatus::Written {
        "updated locally".green()
    } else {
        "no local match".dimmed()
    };
    println!(
        "{} where {} = {}: {local} ({})",
        args.table.bold(),
        filter.column,
        filter.value,
        sync_label(&result.sync)
    );
    print_sync_reason(&result.sync);
    Ok(())
}

/// Fail when the cache rejected the write and the remote did not take it.
fn check_landed(local: &LocalStatus, sync: &SyncStatus) -> Result<()> {
    match local {
        LocalStatus::Failed(reason) if !sync.is_synced() => {
            Err(Error::Cache(format!("write failed: {reason}")))
        }
        _ => Ok(()),
    }
}

fn print_ids(rows: &Rows, id_field: &str) {
    for row in rows.as_slice() {
        if let Some(id) = row.get(id_field) {
            println!("  {}", id.to_string().trim_matches('"').dimmed());
        }
    }
}

fn print_sync_reason(sync: &SyncStatus) {
    if let SyncStatus::Failed(reason) = sync {
        eprintln!("  {} {reason}", "Remote:".yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_landed() {
        assert!(check_landed(&LocalStatus::Written, &SyncStatus::Skipped).is_ok());
        assert!(check_landed(&LocalStatus::Unchanged, &SyncStatus::Failed("503".into())).is_ok());
        assert!(check_landed(&LocalStatus::Failed("quota".into()), &SyncStatus::Synced).is_ok());
        let err = check_landed(&LocalStatus::Failed("quota".into()), &SyncStatus::Skipped).unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
