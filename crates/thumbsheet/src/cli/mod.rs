//! Report command: argument handling, config loading and the run itself.

mod summary;

use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};

use thumbsheet_core::pipeline::FileDiscovery;
use thumbsheet_core::{
    Config, DocumentWriter, PdfDocumentWriter, RecordingWriter, RunEvent, RunReport, Thumbsheet,
};

/// Positional inputs and config overrides.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Folder containing the images
    pub input: PathBuf,

    /// PDF file to write (overwritten if it exists)
    pub output: PathBuf,

    /// Thumbnails per row
    #[arg(long)]
    pub columns: Option<u32>,

    /// Rows per page
    #[arg(long)]
    pub rows: Option<u32>,

    /// Longest thumbnail edge in pixels
    #[arg(long, value_name = "PX")]
    pub thumbnail_size: Option<u32>,

    /// Also save each thumbnail into this directory
    #[arg(long, value_name = "DIR")]
    pub thumbnails_dir: Option<PathBuf>,

    /// Also write per-image records as JSON (.json) or JSON Lines (.jsonl)
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Descend into sub-directories
    #[arg(long)]
    pub recursive: bool,

    /// Scan and lay out without writing the PDF
    #[arg(long)]
    pub dry_run: bool,
}

impl ReportArgs {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(columns) = self.columns {
            config.report.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.report.rows = rows;
        }
        if let Some(size) = self.thumbnail_size {
            config.thumbnail.size = size;
        }
        if let Some(dir) = &self.thumbnails_dir {
            config.thumbnail.save_dir = Some(dir.clone());
        }
        if self.recursive {
            config.processing.recursive = true;
        }
    }
}

/// Load the config file.
///
/// An explicitly given file must load; a broken file at the default
/// location only produces a warning and the defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        return Config::load_from(&expanded)
            .with_context(|| format!("Failed to load config from {:?}", expanded));
    }

    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config from {:?}: {e}\n  Using default configuration.",
                Config::default_path()
            );
            Ok(Config::default())
        }
    }
}

/// Generate the report described by `args`.
pub fn execute(args: ReportArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply_overrides(&mut config);
    let sheet = Thumbsheet::new(config).context("Invalid configuration")?;

    // Counting first gives the progress bar a length and surfaces a bad
    // input folder before anything is written.
    let files: Vec<_> = sheet.processor().discover(&args.input)?.collect();
    let total = files.len();
    tracing::info!(
        "Found {} image(s), {:.1} MB in {:?}",
        total,
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0,
        args.input
    );
    drop(files);

    if args.dry_run {
        let run = generate(&sheet, &args, RecordingWriter::new(), total)?;
        write_manifest(&args, &run)?;
        summary::print_summary(&run.stats, None);
    } else {
        let writer = PdfDocumentWriter::new(&sheet.config().report.title);
        let run = generate(&sheet, &args, writer, total)?;
        write_manifest(&args, &run)?;
        tracing::info!("Report written to {:?}", run.output.path);
        summary::print_summary(&run.stats, Some(&run.output));
    }

    Ok(())
}

fn generate<W: DocumentWriter>(
    sheet: &Thumbsheet,
    args: &ReportArgs,
    writer: W,
    total: usize,
) -> anyhow::Result<RunReport<W::Output>> {
    let progress = summary::create_progress_bar(total as u64);
    let start = std::time::Instant::now();
    let mut seen = 0u64;

    let result = sheet.generate(&args.input, &args.output, writer, |event| {
        if let RunEvent::Skipped { path, .. } = event {
            progress.println(format!("  skipped {}", path.display()));
        }
        seen += 1;
        progress.inc(1);
        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} img/sec", seen as f64 / elapsed));
        }
    });

    progress.finish_and_clear();
    result.with_context(|| format!("Failed to generate report {:?}", args.output))
}

fn write_manifest<O>(args: &ReportArgs, run: &RunReport<O>) -> anyhow::Result<()> {
    if let Some(path) = &args.manifest {
        thumbsheet_core::write_manifest(path, &run.summaries)
            .with_context(|| format!("Failed to write manifest {:?}", path))?;
        tracing::info!("Manifest written to {:?}", path);
    }
    Ok(())
}
