//! Tables and clear command implementations.

use crate::config::{StoreOptions, open_store};
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct TableEntry {
    table: String,
    rows: usize,
}

#[derive(Serialize)]
struct ClearOutput<'a> {
    table: &'a str,
    removed: bool,
}

/// List cached tables.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn execute_list(store_opts: &StoreOptions, json: bool) -> Result<()> {
    let store = open_store(store_opts)?;
    let tables: Vec<TableEntry> = store
        .local()
        .tables()
        .into_iter()
        .map(|(table, rows)| TableEntry { table, rows })
        .collect();

    if json {
        println!("{}", serde_json::to_string(&tables)?);
        return Ok(());
    }

    if tables.is_empty() {
        println!("No cached tables.");
        return Ok(());
    }

    let width = tables.iter().map(|t| t.table.len()).max().unwrap_or(0);
    for entry in &tables {
        println!(
            "{}  {}",
            format!("{:<width$}", entry.table).bold(),
            format!("{} rows", entry.rows).dimmed()
        );
    }
    Ok(())
}

/// Drop one table from the local cache.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or written.
pub fn execute_clear(table: &str, store_opts: &StoreOptions, json: bool) -> Result<()> {
    let store = open_store(store_opts)?;
    let removed = store.local().clear(table)?;

    if json {
        let output = ClearOutput { table, removed };
        println!("{}", serde_json::to_string(&output)?);
    } else if removed {
        println!("Cleared {}", table.bold());
    } else {
        println!("{} was not cached", table.bold());
    }
    Ok(())
}
