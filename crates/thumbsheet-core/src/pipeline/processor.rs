//! Per-file orchestration: validate, read, decode, extract metadata, thumbnail.

use std::path::Path;
use std::time::Instant;

use crate::config::{Config, MetadataConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::types::{DateSource, DocumentType, DpiSource, ExifData, ImageRecord};
use chrono::NaiveDateTime;

use super::decode::{ImageDecoder, ImageRsDecoder};
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::metadata::{self, ExifReader, MetadataExtractor};
use super::resolution;
use super::thumbnail::ThumbnailGenerator;
use super::validate::Validator;

/// Turns image files into [`ImageRecord`]s.
///
/// Decoding and EXIF reading go through the [`ImageDecoder`] and
/// [`ExifReader`] capabilities so they can be replaced in tests.
pub struct ImageProcessor {
    decoder: Box<dyn ImageDecoder>,
    exif: Box<dyn ExifReader>,
    thumbnail_gen: ThumbnailGenerator,
    validator: Validator,
    discovery: FileDiscovery,
    metadata: MetadataConfig,
}

impl ImageProcessor {
    /// Create a processor using the `image` and `kamadak-exif` backends.
    pub fn new(config: &Config) -> Self {
        Self::with_capabilities(
            config,
            Box::new(ImageRsDecoder),
            Box::new(MetadataExtractor),
        )
    }

    /// Create a processor with explicit decoding and EXIF capabilities.
    pub fn with_capabilities(
        config: &Config,
        decoder: Box<dyn ImageDecoder>,
        exif: Box<dyn ExifReader>,
    ) -> Self {
        Self {
            decoder,
            exif,
            thumbnail_gen: ThumbnailGenerator::new(config.thumbnail.clone(), config.thumbnail_dir()),
            validator: Validator::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone()),
            metadata: config.metadata.clone(),
        }
    }

    /// Lazily list the image files in `folder`, sorted by name.
    pub fn discover<'a>(
        &'a self,
        folder: &Path,
    ) -> PipelineResult<impl Iterator<Item = DiscoveredFile> + 'a> {
        self.discovery.discover(folder)
    }

    /// Build the record for one file.
    ///
    /// The file is read once; its bytes and the decoded pixels are dropped
    /// before this returns, whether or not processing succeeds.
    pub fn process(&self, path: &Path) -> PipelineResult<ImageRecord> {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", path);

        self.validator.validate(path)?;

        let bytes = std::fs::read(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_size = bytes.len() as u64;

        let decoded = self.decoder.decode(&bytes, path)?;
        let exif = self.exif.read(&bytes);
        drop(bytes);
        tracing::trace!("  Decode + EXIF: {:?}", start.elapsed());

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        let document_type = DocumentType::from_path(path);
        if !document_type.matches_format(decoded.format) {
            tracing::debug!(
                "{:?}: extension says {}, content looks like {:?}",
                file_name,
                document_type,
                decoded.format
            );
        }

        let dpi = resolution::resolve(
            decoded.native_dpi,
            exif.as_ref(),
            self.metadata.default_dpi,
        );
        if dpi.source == DpiSource::Default {
            tracing::debug!("{:?}: no resolution metadata, using {}", file_name, dpi);
        }

        let (creation_date, creation_source) = self.creation_date(path, exif.as_ref());

        let thumb_start = Instant::now();
        let thumbnail = self.thumbnail_gen.generate(&decoded.image);
        tracing::trace!("  Thumbnail: {:?}", thumb_start.elapsed());

        let (width, height) = (decoded.width, decoded.height);
        drop(decoded);

        if let Some(result) = self.thumbnail_gen.save(&thumbnail, &file_name) {
            match result {
                Ok(saved) => tracing::debug!("Saved thumbnail {:?}", saved),
                Err(e) => tracing::warn!("Failed to save thumbnail for {:?}: {e}", file_name),
            }
        }

        tracing::debug!(
            "Processed {:?} in {:?} ({}x{})",
            file_name,
            start.elapsed(),
            width,
            height
        );

        Ok(ImageRecord {
            file_path: path.to_path_buf(),
            file_name,
            document_type,
            file_size,
            creation_date,
            creation_source,
            width,
            height,
            dpi,
            thumbnail,
        })
    }

    fn creation_date(
        &self,
        path: &Path,
        exif: Option<&ExifData>,
    ) -> (Option<NaiveDateTime>, DateSource) {
        if let Some(dt) = exif.and_then(|e| e.captured_at) {
            return (Some(dt), DateSource::Exif);
        }
        if self.metadata.file_time_fallback {
            if let Some(dt) = metadata::file_time(path) {
                return (Some(dt), DateSource::FileSystem);
            }
        }
        tracing::debug!("{:?}: no creation date", path);
        (None, DateSource::Missing)
    }

    /// Longest-edge thumbnail bound in pixels.
    pub fn thumbnail_bound(&self) -> u32 {
        self.thumbnail_gen.bound()
    }
}
