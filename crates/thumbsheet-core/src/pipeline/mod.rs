//! Image processing pipeline components.
//!
//! - **discovery**: Find image files in the input folder
//! - **validate**: Size checks before a file is read
//! - **decode**: Decode images and detect their format
//! - **resolution**: DPI from container headers and EXIF
//! - **metadata**: Extract EXIF metadata
//! - **thumbnail**: Proportional thumbnails
//! - **processor**: Builds one `ImageRecord` per file

pub mod decode;
pub mod discovery;
pub mod metadata;
pub mod processor;
pub mod resolution;
pub mod thumbnail;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder, ImageRsDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use metadata::{ExifReader, MetadataExtractor};
pub use processor::ImageProcessor;
pub use thumbnail::{fit_within, ThumbnailGenerator};
pub use validate::Validator;
