//! Pull command implementation.

use crate::config::{StoreOptions, open_store};
use crate::error::{Error, Result};
use colored::Colorize;
use serde::Serialize;

use super::block_on;

#[derive(Serialize)]
struct PullOutput {
    tables: Vec<PulledTable>,
}

#[derive(Serialize)]
struct PulledTable {
    table: String,
    rows: usize,
}

/// Execute the pull command.
///
/// Tables are pulled in order; the first failure stops the run.
///
/// # Errors
///
/// Returns an error if `--offline` is set, no remote is configured, or a
/// fetch or cache write fails.
pub fn execute(tables: &[String], store_opts: &StoreOptions, json: bool) -> Result<()> {
    if store_opts.offline {
        return Err(Error::InvalidArgument("pull needs the remote store; drop --offline".into()));
    }

    let store = open_store(store_opts)?;
    let pulled = block_on(async {
        let mut pulled = Vec::with_capacity(tables.len());
        for table in tables {
            let rows = store.sync_table(table).await?;
            pulled.push(PulledTable {
                table: table.clone(),
                rows,
            });
        }
        Ok::<_, Error>(pulled)
    })??;

    if json {
        let output = PullOutput { tables: pulled };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    for entry in &pulled {
        println!("{} {} ({} rows)", "Pulled".green(), entry.table.bold(), entry.rows);
    }
    Ok(())
}
