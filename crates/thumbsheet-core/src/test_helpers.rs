//! Shared test utilities for the thumbsheet-core unit tests.
//!
//! Fixtures are generated on the fly with the `image` crate so tests never
//! depend on binary files checked into the repository.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};

use crate::types::{DateSource, DocumentType, Dpi, ImageRecord, Thumbnail};

/// A fully populated record with a 200x150 thumbnail and no creation date.
pub fn sample_record(name: &str) -> ImageRecord {
    ImageRecord {
        file_path: PathBuf::from("/photos").join(name),
        file_name: name.to_string(),
        document_type: DocumentType::from_path(Path::new(name)),
        file_size: 3 * 1024 * 1024 / 2,
        creation_date: None,
        creation_source: DateSource::Missing,
        width: 4000,
        height: 3000,
        dpi: Dpi::fallback(72),
        thumbnail: Thumbnail::new(RgbImage::new(200, 150)),
    }
}

/// A gradient so encoders produce non-trivial data.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Write a PNG of the given size into `dir`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient(width, height)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

/// Encode a JPEG of the given size into memory.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 85)
        .encode_image(&gradient(width, height))
        .unwrap();
    bytes
}

/// Write a JPEG of the given size into `dir`.
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, jpeg_bytes(width, height)).unwrap();
    path
}

/// Write a file with an image extension but garbage content.
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"this is not an image at all").unwrap();
    path
}

/// Build a TIFF-structured EXIF blob carrying `DateTimeOriginal` and a resolution.
pub fn exif_blob(datetime: &str, dpi: u32) -> Vec<u8> {
    use exif::experimental::Writer;
    use exif::{Field, In, Rational, Tag, Value};

    let date = Field {
        tag: Tag::DateTimeOriginal,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![datetime.as_bytes().to_vec()]),
    };
    let x_res = Field {
        tag: Tag::XResolution,
        ifd_num: In::PRIMARY,
        value: Value::Rational(vec![Rational { num: dpi, denom: 1 }]),
    };
    let y_res = Field {
        tag: Tag::YResolution,
        ifd_num: In::PRIMARY,
        value: Value::Rational(vec![Rational { num: dpi, denom: 1 }]),
    };
    let unit = Field {
        tag: Tag::ResolutionUnit,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![2]),
    };

    let mut writer = Writer::new();
    writer.push_field(&date);
    writer.push_field(&x_res);
    writer.push_field(&y_res);
    writer.push_field(&unit);

    let mut buf = std::io::Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    buf.into_inner()
}

/// Insert an EXIF APP1 segment right after the JPEG SOI marker.
pub fn jpeg_with_exif(width: u32, height: u32, exif: &[u8]) -> Vec<u8> {
    let jpeg = jpeg_bytes(width, height);
    let payload_len = (2 + 6 + exif.len()) as u16;

    let mut out = Vec::with_capacity(jpeg.len() + exif.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&payload_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(exif);
    out.extend_from_slice(&jpeg[2..]);
    out
}
