//! Thumbsheet CLI - build a PDF contact sheet from a folder of images.
//!
//! Every image in the folder is drawn as a thumbnail with its file name,
//! type, size, creation date, pixel dimensions and resolution underneath,
//! several to an A4 page.
//!
//! # Usage
//!
//! ```bash
//! # Default 3x3 grid
//! thumbsheet ./photos report.pdf
//!
//! # Denser grid, also keep the thumbnails and a JSON Lines manifest
//! thumbsheet ./photos report.pdf --columns 4 --rows 5 \
//!     --thumbnails-dir ./thumbs --manifest report.jsonl
//! ```

use clap::Parser;
use std::path::PathBuf;

mod cli;
mod logging;

/// Thumbsheet - paginated PDF report of the images in a folder.
#[derive(Parser, Debug)]
#[command(name = "thumbsheet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,

    #[command(flatten)]
    report: cli::ReportArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = cli::load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("thumbsheet v{}", thumbsheet_core::VERSION);

    cli::execute(cli.report, config)
}
