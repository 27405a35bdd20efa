//! Implementation of the `variants ingest` subcommand.

use std::io::Write;

use thousands::Separable;

use crate::common::{self, io::open_write_maybe_gz, io::read_to_cursor, worker_version};

use super::assemble::{ingest, TableSource};
use super::conf::IngestConfig;

/// Command line arguments for `variants ingest` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "ingest variant score and count tables", long_about = None)]
pub struct Args {
    /// Path to the score data CSV file, may be gzip-compressed.
    #[clap(long)]
    pub path_scores: String,
    /// Path to the count data CSV file, may be gzip-compressed; optional.
    #[clap(long)]
    pub path_counts: Option<String>,
    /// Path to the output JSON file, gzip-compressed if ending in `.gz`.
    #[clap(long)]
    pub path_output: String,
    /// Path to the TOML configuration; optional.
    #[clap(long)]
    pub path_config: Option<String>,
}

/// Main entry point for `variants ingest` sub command.
pub fn run(args_common: &common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("mavedb-worker {}", worker_version());
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    common::trace_rss_now();

    let config = match &args.path_config {
        Some(path) => IngestConfig::from_path(path)?,
        None => IngestConfig::default(),
    };
    tracing::debug!("config = {:#?}", &config);

    tracing::info!("reading input files...");
    let mut scores = read_to_cursor(&args.path_scores)?;
    let mut counts = args.path_counts.as_ref().map(read_to_cursor).transpose()?;

    tracing::info!("ingesting...");
    let output = ingest(
        &config,
        &mut scores,
        counts.as_mut().map(|c| c as &mut dyn TableSource),
    )
    .map_err(|e| anyhow::anyhow!("ingestion failed: {}", e))?;
    tracing::info!(
        "... ingested {} variants with {} score and {} count columns",
        output.variants.len().separate_with_commas(),
        output.dataset_columns.score_columns.len(),
        output.dataset_columns.count_columns.len()
    );

    tracing::info!("writing output to {}...", &args.path_output);
    {
        let mut writer = open_write_maybe_gz(&args.path_output).map_err(|e| {
            anyhow::anyhow!("could not open {} for writing: {}", &args.path_output, e)
        })?;
        serde_json::to_writer_pretty(&mut writer, &output)?;
        writeln!(writer)?;
        writer.flush()?;
    }

    common::trace_rss_now();
    tracing::info!(
        "All of `variants ingest` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
