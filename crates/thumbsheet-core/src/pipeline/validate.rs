//! Cheap checks run before a file is read into memory.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

/// Smallest file that can hold any supported image header.
const MIN_IMAGE_BYTES: u64 = 8;

/// Validates files before processing.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check the file is readable and within the size limit; returns its size.
    pub fn validate(&self, path: &Path) -> PipelineResult<u64> {
        let metadata = std::fs::metadata(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let size = metadata.len();

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if size > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: size / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if size < MIN_IMAGE_BYTES {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_returns_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, vec![0u8; 100]).unwrap();

        let validator = Validator::new(LimitsConfig::default());
        assert_eq!(validator.validate(&path).unwrap(), 100);
    }

    #[test]
    fn test_validate_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();

        let validator = Validator::new(LimitsConfig::default());
        let err = validator.validate(&path).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, vec![0u8; 2 * 1024 * 1024]).unwrap();

        let validator = Validator::new(LimitsConfig {
            max_file_size_mb: 1,
        });
        let err = validator.validate(&path).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FileTooLarge {
                size_mb: 2,
                max_mb: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_missing_file() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator
            .validate(Path::new("/nonexistent/file.jpg"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }
}
