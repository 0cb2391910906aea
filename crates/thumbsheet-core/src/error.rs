//! Error types for the thumbsheet report pipeline.
//!
//! Errors are split by stage. Only [`PipelineError::InputNotFound`],
//! [`PipelineError::NotADirectory`], configuration errors and
//! [`ReportError`]s abort a run; every other pipeline error is scoped to a
//! single file and reported as a skip.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for thumbsheet operations.
#[derive(Error, Debug)]
pub enum ThumbsheetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scanning or per-file processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Layout or PDF output errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors (manifest output)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input folder does not exist
    #[error("Input folder not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path exists but is not a directory
    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Reading the file from disk failed
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Writing a thumbnail copy to the save directory failed
    #[error("Cannot save thumbnail {path}: {source}")]
    ThumbnailSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl PipelineError {
    /// Whether this error concerns the input folder as a whole rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InputNotFound(_) | Self::NotADirectory(_))
    }
}

/// Errors raised while laying out or writing the report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// PDF object construction or serialization failed
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Writing the output file failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A drawing call arrived while no page was open
    #[error("No page is open for drawing")]
    NoOpenPage,

    /// The layout engine was used after it finished
    #[error("Report already finished")]
    Finished,
}

/// Convenience type alias for thumbsheet results.
pub type Result<T> = std::result::Result<T, ThumbsheetError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Convenience type alias for report-specific results.
pub type ReportResult<T> = std::result::Result<T, ReportError>;
