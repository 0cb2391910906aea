//! Image decoding with format detection and header resolution lookup.

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

use super::resolution::{self, HeaderDpi};
use crate::error::{PipelineError, PipelineResult};

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Resolution declared in the container header, if any
    pub native_dpi: Option<HeaderDpi>,
}

/// Decodes raw file bytes into pixels.
///
/// The production implementation is [`ImageRsDecoder`]; tests substitute
/// fakes to exercise the pipeline without real image data.
pub trait ImageDecoder {
    /// Decode `bytes` read from `path`. The path is only used for format
    /// fallback and error messages.
    fn decode(&self, bytes: &[u8], path: &Path) -> PipelineResult<DecodedImage>;
}

/// Decoder backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRsDecoder;

impl ImageDecoder for ImageRsDecoder {
    fn decode(&self, bytes: &[u8], path: &Path) -> PipelineResult<DecodedImage> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        // Formats without magic bytes (TGA) fall back to the extension.
        let format = match reader.format() {
            Some(f) => f,
            None => {
                let f = ImageFormat::from_path(path).map_err(|_| {
                    PipelineError::UnsupportedFormat {
                        path: path.to_path_buf(),
                        format: path
                            .extension()
                            .and_then(|e| e.to_str())
                            .unwrap_or("unknown")
                            .to_string(),
                    }
                })?;
                reader.set_format(f);
                f
            }
        };
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            native_dpi: resolution::from_header(bytes, format),
        })
    }
}
