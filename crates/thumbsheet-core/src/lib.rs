//! Thumbsheet Core - turn a folder of images into a paginated PDF contact sheet.
//!
//! Each image is decoded once, reduced to a thumbnail plus a handful of
//! metadata fields, and drawn into the next free cell of an A4 grid:
//!
//! ```text
//! Folder → Discover → Validate → Decode → EXIF / DPI → Thumbnail → Layout → PDF
//! ```
//!
//! Unreadable files are logged and skipped; only a bad input folder, invalid
//! configuration or a failure writing the output aborts a run.
//!
//! # Usage
//!
//! ```rust,no_run
//! use thumbsheet_core::{Config, Thumbsheet};
//! use std::path::Path;
//!
//! fn main() -> thumbsheet_core::Result<()> {
//!     let sheet = Thumbsheet::new(Config::load()?)?;
//!     let run = sheet.generate_pdf(Path::new("./photos"), Path::new("report.pdf"))?;
//!     println!("{} images on {} pages", run.stats.succeeded, run.stats.pages);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod types;

#[cfg(test)]
mod test_helpers;

use std::path::Path;
use std::time::Instant;

pub use config::Config;
pub use error::{
    ConfigError, PipelineError, PipelineResult, ReportError, ReportResult, Result,
    ThumbsheetError,
};
pub use output::{write_manifest, ManifestWriter, OutputFormat};
pub use pipeline::{DiscoveredFile, ExifReader, ImageDecoder, ImageProcessor};
pub use report::{
    DocumentWriter, LayoutEngine, LayoutState, PageGrid, PdfDocumentWriter, RecordedPage,
    RecordingWriter, WrittenReport,
};
pub use types::{
    DocumentType, Dpi, ExifData, ImageRecord, ImageSummary, Placement, ProcessingStats, Thumbnail,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Progress notifications emitted while a report is generated.
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// A file was read and drawn into the report
    Processed {
        path: &'a Path,
        placement: Placement,
    },
    /// A file could not be read and was left out
    Skipped {
        path: &'a Path,
        error: &'a PipelineError,
    },
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport<O> {
    pub stats: ProcessingStats,
    /// One entry per drawn image, in report order
    pub summaries: Vec<ImageSummary>,
    /// Whatever the document writer produced
    pub output: O,
}

/// Report generator - the main entry point.
pub struct Thumbsheet {
    config: Config,
    processor: ImageProcessor,
}

impl Thumbsheet {
    /// Validate `config` and build a generator with the default decoders.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let processor = ImageProcessor::new(&config);
        tracing::debug!("Initializing thumbsheet v{}", VERSION);
        Ok(Self { config, processor })
    }

    /// Build a generator around a custom [`ImageProcessor`].
    pub fn with_processor(config: Config, processor: ImageProcessor) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, processor })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn processor(&self) -> &ImageProcessor {
        &self.processor
    }

    /// Scan `input` and write the PDF report to `output`.
    pub fn generate_pdf(&self, input: &Path, output: &Path) -> Result<RunReport<WrittenReport>> {
        let writer = PdfDocumentWriter::new(&self.config.report.title);
        self.generate(input, output, writer, |_| {})
    }

    /// Scan `input`, lay every readable image out through `writer` and finish it at `output`.
    ///
    /// Files are handled one at a time in name order; each record is dropped
    /// as soon as it has been drawn. `on_event` sees every processed or
    /// skipped file.
    pub fn generate<W, F>(
        &self,
        input: &Path,
        output: &Path,
        writer: W,
        mut on_event: F,
    ) -> Result<RunReport<W::Output>>
    where
        W: DocumentWriter,
        F: FnMut(RunEvent<'_>),
    {
        let start = Instant::now();
        let files = self.processor.discover(input)?;

        let grid = PageGrid::from_config(&self.config.report)?;
        let mut layout = LayoutEngine::new(grid, self.config.report.title.clone(), writer);

        let mut stats = ProcessingStats::default();
        let mut summaries = Vec::new();

        for file in files {
            match self.processor.process(&file.path) {
                Ok(record) => {
                    let placement = layout.place(&record)?;
                    stats.succeeded += 1;
                    stats.total_bytes += record.file_size;
                    summaries.push(ImageSummary::new(&record, placement));
                    on_event(RunEvent::Processed {
                        path: &file.path,
                        placement,
                    });
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    stats.skipped += 1;
                    tracing::warn!("Skipping {:?}: {}", file.path, e);
                    on_event(RunEvent::Skipped {
                        path: &file.path,
                        error: &e,
                    });
                }
            }
        }

        let (summary, output) = layout.finish(output)?;
        stats.pages = summary.pages;
        stats.total_seconds = start.elapsed().as_secs_f64();

        tracing::info!(
            "Report complete: {} image(s) on {} page(s), {} skipped",
            stats.succeeded,
            stats.pages,
            stats.skipped
        );

        Ok(RunReport {
            stats,
            summaries,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::EMPTY_REPORT_TEXT;
    use crate::test_helpers::{write_corrupt, write_jpeg, write_png};

    fn dry_run(input: &Path, config: Config) -> (RunReport<Vec<RecordedPage>>, Vec<String>) {
        let sheet = Thumbsheet::new(config).unwrap();
        let mut skipped = Vec::new();
        let run = sheet
            .generate(input, Path::new("unused.pdf"), RecordingWriter::new(), |event| {
                if let RunEvent::Skipped { path, .. } = event {
                    skipped.push(path.file_name().unwrap().to_string_lossy().into_owned());
                }
            })
            .unwrap();
        (run, skipped)
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.report.columns = 0;
        assert!(matches!(
            Thumbsheet::new(config),
            Err(ThumbsheetError::Config(_))
        ));
    }

    #[test]
    fn test_generate_orders_by_name_and_skips_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", 60, 40);
        write_jpeg(dir.path(), "a.jpg", 40, 60);
        write_corrupt(dir.path(), "c.jpg");
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let (run, skipped) = dry_run(dir.path(), Config::default());

        let names: Vec<&str> = run.summaries.iter().map(|s| s.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
        assert_eq!(skipped, vec!["c.jpg"]);
        assert_eq!(run.stats.succeeded, 2);
        assert_eq!(run.stats.skipped, 1);
        assert_eq!(run.stats.pages, 1);
        assert_eq!(run.output[0].images.len(), 2);
    }

    #[test]
    fn test_generate_paginates() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_png(dir.path(), &format!("img{i}.png"), 30, 30);
        }
        let mut config = Config::default();
        config.report.columns = 2;
        config.report.rows = 2;

        let (run, _) = dry_run(dir.path(), config);
        assert_eq!(run.stats.pages, 2);
        assert_eq!(run.output.len(), 2);
        assert_eq!(run.summaries[4].placement.page, 2);
    }

    #[test]
    fn test_generate_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        let (run, _) = dry_run(dir.path(), Config::default());

        assert_eq!(run.stats.succeeded, 0);
        assert_eq!(run.stats.pages, 1);
        assert!(run.output[0].has_text(EMPTY_REPORT_TEXT));
    }

    #[test]
    fn test_generate_missing_folder_is_fatal() {
        let sheet = Thumbsheet::new(Config::default()).unwrap();
        let result = sheet.generate(
            Path::new("/nonexistent/folder"),
            Path::new("unused.pdf"),
            RecordingWriter::new(),
            |_| {},
        );
        assert!(matches!(
            result,
            Err(ThumbsheetError::Pipeline(PipelineError::InputNotFound(_)))
        ));
    }
}
