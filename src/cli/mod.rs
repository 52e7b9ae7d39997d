//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// govstore - local-first record store with best-effort remote sync
#[derive(Parser, Debug)]
#[command(name = "govstore", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Cache database path (default: ~/.govstore/data/cache.db)
    #[arg(long, global = true, env = "GOVSTORE_DB")]
    pub db: Option<PathBuf>,

    /// Key prefix for cached tables (default: govchain_db_)
    #[arg(long, global = true, env = "GOVSTORE_PREFIX")]
    pub prefix: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Never contact the remote store
    #[arg(long, global = true)]
    pub offline: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read rows from the remote store and the local cache, merged
    Select(SelectArgs),

    /// Insert rows (ids are generated when missing)
    Insert(InsertArgs),

    /// Insert rows or merge them into existing ones
    Upsert(UpsertArgs),

    /// Patch rows matching a filter
    Update(UpdateArgs),

    /// Copy remote rows into the local cache
    Pull {
        /// Tables to pull
        #[arg(required = true)]
        tables: Vec<String>,
    },

    /// List cached tables with row counts
    Tables,

    /// Drop a table from the local cache
    Clear {
        /// Table to drop
        table: String,
    },

    /// Show cache location and remote configuration
    Status,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Table name
    pub table: String,

    /// Comma-separated columns to return
    #[arg(long, short = 'c', default_value = "*")]
    pub columns: String,

    /// Equality filter as field=value (value parsed as JSON when possible)
    #[arg(long)]
    pub eq: Option<String>,

    /// Column to sort by
    #[arg(long)]
    pub order: Option<String>,

    /// Sort descending (with --order)
    #[arg(long, requires = "order")]
    pub desc: bool,

    /// Return only the first row; fail if there is none
    #[arg(long)]
    pub single: bool,
}

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// Table name
    pub table: String,

    /// JSON object or array of objects ("-" reads stdin)
    pub data: String,
}

#[derive(Args, Debug)]
pub struct UpsertArgs {
    /// Table name
    pub table: String,

    /// JSON object or array of objects ("-" reads stdin)
    pub data: String,

    /// Field identifying an existing row
    #[arg(long, default_value = "id")]
    pub on_conflict: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Table name
    pub table: String,

    /// JSON object with the fields to change ("-" reads stdin)
    pub patch: String,

    /// Rows to patch, as field=value
    #[arg(long, required = true)]
    pub eq: String,
}
