//! Common functionality.

use bytesize::ByteSize;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper to print the current memory resident set size via `tracing`.
pub fn trace_rss_now() {
    match procfs::process::Process::myself().and_then(|me| me.stat()) {
        Ok(stat) => tracing::debug!(
            "RSS now: {}",
            ByteSize::b(stat.rss * procfs::page_size()).to_string_as(true)
        ),
        Err(e) => tracing::debug!("could not determine RSS: {}", e),
    }
}

/// Return the version of the `mavedb-worker` crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        env!("CARGO_PKG_VERSION")
    }
}
