//! govstore CLI entry point.

use clap::Parser;
use govstore::cli::commands;
use govstore::cli::{Cli, Commands};
use govstore::config::StoreOptions;
use govstore::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info,reqwest=info,hyper_util=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let store = StoreOptions {
        db_path: cli.db.clone(),
        prefix: cli.prefix.clone(),
        offline: cli.offline,
    };

    match &cli.command {
        Commands::Select(args) => commands::select::execute(args, &store, json),
        Commands::Insert(args) => commands::write::execute_insert(args, &store, json),
        Commands::Upsert(args) => commands::write::execute_upsert(args, &store, json),
        Commands::Update(args) => commands::write::execute_update(args, &store, json),
        Commands::Pull { tables } => commands::pull::execute(tables, &store, json),

        // Local cache maintenance
        Commands::Tables => commands::tables::execute_list(&store, json),
        Commands::Clear { table } => commands::tables::execute_clear(table, &store, json),

        Commands::Status => commands::status::execute(&store, json),
        Commands::Version => commands::version::execute(json),

        // Shell completions
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
