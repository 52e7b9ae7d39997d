//! Select command implementation.

use crate::cli::SelectArgs;
use crate::config::{StoreOptions, open_store};
use crate::error::Result;
use crate::hybrid::{SelectOptions, SyncStatus};
use crate::model::{Order, Record, parse_columns};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use super::{block_on, parse_filter, sync_label};

#[derive(Serialize)]
struct SelectOutput<'a, T: Serialize> {
    table: &'a str,
    data: T,
    sync: &'a SyncStatus,
}

/// Execute the select command.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the store cannot be
/// opened. With `--single`, also returns the read error when no row exists.
pub fn execute(args: &SelectArgs, store_opts: &StoreOptions, json: bool) -> Result<()> {
    let options = SelectOptions {
        columns: parse_columns(&args.columns),
        filter: args.eq.as_deref().map(parse_filter).transpose()?,
        order: args.order.as_ref().map(|column| Order {
            column: column.clone(),
            ascending: !args.desc,
        }),
    };

    let store = open_store(store_opts)?;

    if args.single {
        let result = block_on(store.execute_single(&args.table, &options))?;
        let sync = result.sync.clone();
        let row = result.into_result()?;

        if json {
            let output = SelectOutput {
                table: &args.table,
                data: &row,
                sync: &sync,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else if let Some(row) = row {
            println!("{}", serde_json::to_string_pretty(&row)?);
            println!("{}", format!("({})", sync_label(&sync)).dimmed());
        }
        return Ok(());
    }

    let result = block_on(store.execute_select(&args.table, &options))?;

    if json {
        let output = SelectOutput {
            table: &args.table,
            data: &result.data,
            sync: &result.sync,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    print_rows(&args.table, &result.data);
    println!(
        "{}",
        format!("{} row(s) ({})", result.data.len(), sync_label(&result.sync)).dimmed()
    );
    Ok(())
}

fn print_rows(table: &str, rows: &[Record]) {
    if rows.is_empty() {
        println!("No rows in {}.", table.bold());
        return;
    }
    for row in rows {
        println!("{}", Value::Object(row.clone()));
    }
}
