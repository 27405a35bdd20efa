//! MaveDB Worker main executable

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

use mavedb_worker::{common, variants};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "MaveDB variant dataset heavy lifting",
    long_about = "This tool validates and merges uploaded variant score and count tables"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Variant dataset related commands.
    Variants(Variants),
}

/// Parsing of "variants *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Variants {
    /// The sub command to run
    #[command(subcommand)]
    command: VariantsCommands,
}

/// Enum supporting the parsing of "variants *" sub commands.
#[derive(Debug, Subcommand)]
enum VariantsCommands {
    Ingest(variants::cli::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Variants(cmd) => match &cmd.command {
                VariantsCommands::Ingest(args) => {
                    if let Err(e) = variants::cli::run(&cli.common, args) {
                        tracing::error!("{}", e);
                        return Err(e);
                    }
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
