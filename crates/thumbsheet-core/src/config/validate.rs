//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::report::PageGrid;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.thumbnail.size == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnail.size must be > 0".into(),
            ));
        }
        if self.metadata.default_dpi == 0 {
            return Err(ConfigError::ValidationError(
                "metadata.default_dpi must be > 0".into(),
            ));
        }
        if self.report.columns == 0 || self.report.rows == 0 {
            return Err(ConfigError::ValidationError(
                "report.columns and report.rows must be > 0".into(),
            ));
        }
        if !(4.0..=24.0).contains(&self.report.font_size) {
            return Err(ConfigError::ValidationError(
                "report.font_size must be between 4 and 24".into(),
            ));
        }
        if !(0.0..=144.0).contains(&self.report.margin_pt) {
            return Err(ConfigError::ValidationError(
                "report.margin_pt must be between 0 and 144".into(),
            ));
        }

        // Columns/rows that leave no room for a thumbnail are rejected here
        // rather than producing an unreadable report.
        PageGrid::from_config(&self.report)?;
        Ok(())
    }
}
