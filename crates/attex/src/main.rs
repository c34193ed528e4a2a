//! Attex CLI - Rally workspace attachment archival.
//!
//! Provides commands for:
//! - `export`: Export every attachment in a workspace to local files

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ExportArgs;
use output::Output;

/// Attex - archive Rally workspace attachments.
#[derive(Parser)]
#[command(name = "attex", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all workspace attachments to local files.
    Export(ExportArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default
    let verbose = matches!(&cli.command, Commands::Export(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Export(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
