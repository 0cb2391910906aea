//! File discovery for finding images in the input folder.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};

/// Discovers image files in a folder.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Lazily list the supported image files in `folder`, sorted by file name.
    ///
    /// The iterator is restartable by calling `discover` again. Entries that
    /// cannot be read and files with unsupported extensions are skipped.
    pub fn discover<'a>(
        &'a self,
        folder: &Path,
    ) -> PipelineResult<impl Iterator<Item = DiscoveredFile> + 'a> {
        if !folder.exists() {
            return Err(PipelineError::InputNotFound(folder.to_path_buf()));
        }
        if !folder.is_dir() {
            return Err(PipelineError::NotADirectory(folder.to_path_buf()));
        }

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name();

        Ok(walker.into_iter().filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {e}");
                    return None;
                }
            };
            if !entry.file_type().is_file() || !self.is_supported(entry.path()) {
                return None;
            }
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            Some(DiscoveredFile {
                path: entry.into_path(),
                size,
            })
        }))
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}
