//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// File extensions treated as images (case-insensitive)
    pub supported_formats: Vec<String>,

    /// Descend into sub-directories of the input folder
    pub recursive: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["jpg", "jpeg", "png", "tif", "tiff", "bmp", "gif", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            recursive: false,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 200,
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Bound on the longest edge, in pixels
    pub size: u32,

    /// Also write each thumbnail to this directory (supports `~`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: 200,
            save_dir: None,
        }
    }
}

/// Metadata fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// DPI reported when neither the header nor EXIF carries one
    pub default_dpi: u32,

    /// Use the file-system creation time when EXIF has no date
    pub file_time_fallback: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            default_dpi: 72,
            file_time_fallback: false,
        }
    }
}

/// Page grid and typography.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Grid cells per row
    pub columns: u32,

    /// Grid rows per page
    pub rows: u32,

    /// Page margin in points
    pub margin_pt: f32,

    /// Caption font size in points
    pub font_size: f32,

    /// Title printed at the top of every page
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 3,
            margin_pt: 36.0,
            font_size: 7.0,
            title: "Image report".to_string(),
        }
    }
}

impl ReportConfig {
    /// Number of records that fit on one page.
    pub fn cells_per_page(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
