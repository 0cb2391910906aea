//! Core data types for the thumbsheet pipeline.
//!
//! An [`ImageRecord`] is built once per readable source file, handed to the
//! layout engine, and dropped after it has been drawn. [`ImageSummary`] is the
//! lightweight, serializable trace of a record that survives the run.

use chrono::NaiveDateTime;
use image::RgbImage;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Format string used for creation dates in the report ("05 March 2021 at 14:30").
pub const DATE_DISPLAY_FORMAT: &str = "%d %B %Y at %H:%M";

/// Placeholder rendered for metadata that could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Everything the report needs to know about one source image.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Document type, classified from the file extension
    pub document_type: DocumentType,

    /// File size in bytes
    pub file_size: u64,

    /// Capture/creation time, if known
    pub creation_date: Option<NaiveDateTime>,

    /// Where `creation_date` came from
    pub creation_source: DateSource,

    /// Source width in pixels
    pub width: u32,

    /// Source height in pixels
    pub height: u32,

    /// Resolution in dots per inch
    pub dpi: Dpi,

    /// Downscaled bitmap drawn in the report
    pub thumbnail: Thumbnail,
}

impl ImageRecord {
    /// File size in mebibytes.
    pub fn file_size_mb(&self) -> f64 {
        self.file_size as f64 / (1024.0 * 1024.0)
    }

    /// Creation date formatted for display, or `N/A`.
    pub fn creation_date_display(&self) -> String {
        match self.creation_date {
            Some(dt) => dt.format(DATE_DISPLAY_FORMAT).to_string(),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Document type label derived from the file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentType {
    Jpeg,
    Png,
    Tiff,
    Bmp,
    Gif,
    WebP,
    /// Any other extension, upper-cased
    Other(String),
}

impl DocumentType {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" | "jpe" => Self::Jpeg,
            "png" => Self::Png,
            "tif" | "tiff" => Self::Tiff,
            "bmp" => Self::Bmp,
            "gif" => Self::Gif,
            "webp" => Self::WebP,
            "" => Self::Other("UNKNOWN".to_string()),
            other => Self::Other(other.to_uppercase()),
        }
    }

    /// Label shown in the report.
    pub fn label(&self) -> &str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Tiff => "TIFF",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::WebP => "WEBP",
            Self::Other(label) => label,
        }
    }

    /// Whether a content-detected format agrees with this label.
    pub fn matches_format(&self, format: image::ImageFormat) -> bool {
        use image::ImageFormat;
        matches!(
            (self, format),
            (Self::Jpeg, ImageFormat::Jpeg)
                | (Self::Png, ImageFormat::Png)
                | (Self::Tiff, ImageFormat::Tiff)
                | (Self::Bmp, ImageFormat::Bmp)
                | (Self::Gif, ImageFormat::Gif)
                | (Self::WebP, ImageFormat::WebP)
        )
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Horizontal and vertical resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dpi {
    pub x: u32,
    pub y: u32,
    pub source: DpiSource,
}

impl Dpi {
    /// Fallback resolution used when the file carries none.
    pub fn fallback(value: u32) -> Self {
        Self {
            x: value,
            y: value,
            source: DpiSource::Default,
        }
    }
}

impl fmt::Display for Dpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} dpi", self.x, self.y)
    }
}

/// Where a [`Dpi`] value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DpiSource {
    /// Container header (PNG pHYs, JPEG JFIF density)
    Header,
    /// EXIF XResolution / YResolution
    Exif,
    /// Configured default
    Default,
}

/// Where a creation date was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSource {
    Exif,
    FileSystem,
    Missing,
}

/// The subset of EXIF tags thumbsheet reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    /// DateTimeOriginal, falling back to DateTime
    pub captured_at: Option<NaiveDateTime>,

    /// XResolution in `resolution_unit`s
    pub x_resolution: Option<f64>,

    /// YResolution in `resolution_unit`s
    pub y_resolution: Option<f64>,

    /// ResolutionUnit (2 = inch, 3 = centimetre)
    pub resolution_unit: Option<u32>,
}

impl ExifData {
    /// True when no tag of interest was present.
    pub fn is_empty(&self) -> bool {
        self.captured_at.is_none()
            && self.x_resolution.is_none()
            && self.y_resolution.is_none()
            && self.resolution_unit.is_none()
    }
}

/// An in-memory RGB thumbnail.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pixels: RgbImage,
}

impl Thumbnail {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Raw interleaved RGB8 samples, row-major.
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.pixels
    }
}

/// Position of a record in the report grid (1-based page, 0-based row/column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub page: usize,
    pub row: u32,
    pub column: u32,
}

/// Serializable summary of a drawn record, used for manifests and run reports.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub file_path: PathBuf,
    pub file_name: String,
    pub document_type: DocumentType,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<NaiveDateTime>,
    pub creation_source: DateSource,
    pub width: u32,
    pub height: u32,
    pub dpi: Dpi,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub placement: Placement,
}

impl ImageSummary {
    pub fn new(record: &ImageRecord, placement: Placement) -> Self {
        Self {
            file_path: record.file_path.clone(),
            file_name: record.file_name.clone(),
            document_type: record.document_type.clone(),
            file_size: record.file_size,
            creation_date: record.creation_date,
            creation_source: record.creation_source,
            width: record.width,
            height: record.height,
            dpi: record.dpi,
            thumbnail_width: record.thumbnail.width(),
            thumbnail_height: record.thumbnail.height(),
            placement,
        }
    }
}

/// Processing statistics for a report run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingStats {
    /// Images drawn into the report
    pub succeeded: usize,

    /// Images skipped because they could not be read
    pub skipped: usize,

    /// Pages in the finished report
    pub pages: usize,

    /// Total bytes of the drawn source files
    pub total_bytes: u64,

    /// Total processing time in seconds
    pub total_seconds: f64,
}

impl ProcessingStats {
    /// Processing rate in images per second.
    pub fn images_per_second(&self) -> f64 {
        if self.total_seconds > 0.0 {
            self.succeeded as f64 / self.total_seconds
        } else {
            0.0
        }
    }
}
