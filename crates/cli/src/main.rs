//! Revmark CLI
//!
//! Command-line interface for annotating document revisions

use clap::{Parser, Subcommand};
use revmark_core::logging::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "revmark")]
#[command(about = "Revmark - highlight what changed between two versions of a page", long_about = None)]
struct Cli {
    /// Emit JSON structured logs on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotate a new document against its previous version
    Diff(commands::diff::DiffArgs),
    /// Annotate every page of a directory against a previous build
    Batch(commands::batch::BatchArgs),
    /// Flag navigation links that point at changed pages
    Refs(commands::refs::RefsArgs),
    /// Remove change markers from an annotated document
    Strip(commands::strip::StripArgs),
}

fn main() {
    let cli = Cli::parse();

    logging::init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Batch(args) => commands::batch::execute(args),
        Commands::Refs(args) => commands::refs::execute(args),
        Commands::Strip(args) => commands::strip::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
