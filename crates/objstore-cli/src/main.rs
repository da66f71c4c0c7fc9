//! objstore CLI
//!
//! The command-line interface for the UUID-addressed object store engine.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::{CliError, Result};
use objstore_core::{ObjectStorage, StoreConfig};

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            report_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}

fn report_error(e: &CliError) {
    eprintln!("{} {}", "error:".red().bold(), e);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("failed to set tracing subscriber");
        tracing::debug!("verbose mode enabled");
    }

    let Some(cmd) = cli.command else {
        println!("{} object store CLI", "objstore".green().bold());
        println!();
        println!("Run {} for available commands.", "objstore --help".cyan());
        return Ok(());
    };

    let mut storage = match &cli.config {
        Some(path) => {
            let config = StoreConfig::load(path)?;
            ObjectStorage::open_with_config(&cli.dir, &config)
        }
        None => ObjectStorage::open(&cli.dir),
    };
    // The CLI has no fixed schema to register classes against; every
    // stored class name resolves as itself rather than Placeholder.
    storage.set_allow_unknown_classes(true);
    execute_command(&storage, cmd, cli.json)
}

fn execute_command(storage: &ObjectStorage, cmd: Commands, json: bool) -> Result<()> {
    match cmd {
        Commands::List { class, limit } => commands::list::run(storage, class.as_deref(), limit, json),
        Commands::Get { uuid } => commands::get::run(storage, &uuid, json),
        Commands::Put { class, fields, ttl } => commands::put::run(storage, &class, &fields, ttl, json),
        Commands::Delete { uuid, force } => commands::delete::run(storage, &uuid, force, json),
        Commands::Check => commands::check::run(storage, json),
        Commands::Stats => commands::stats::run(storage, json),
        Commands::Safemode { action } => commands::safemode::run(storage, action, json),
        Commands::Lifetime { action } => commands::lifetime::run(storage, action, json),
    }
}
