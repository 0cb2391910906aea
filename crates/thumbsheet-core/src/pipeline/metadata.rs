//! EXIF metadata extraction and creation-date fallbacks.

use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;
use std::path::Path;

use crate::types::ExifData;

/// EXIF timestamp layout ("2021:03:05 14:30:00").
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Reads the EXIF tags thumbsheet cares about.
///
/// Implementations are lenient: missing or malformed EXIF yields `None`,
/// never an error.
pub trait ExifReader {
    fn read(&self, bytes: &[u8]) -> Option<ExifData>;
}

/// [`ExifReader`] backed by `kamadak-exif`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataExtractor;

impl ExifReader for MetadataExtractor {
    fn read(&self, bytes: &[u8]) -> Option<ExifData> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .ok()?;

        let data = ExifData {
            captured_at: Self::get_datetime(&exif),
            x_resolution: Self::get_rational(&exif, Tag::XResolution),
            y_resolution: Self::get_rational(&exif, Tag::YResolution),
            resolution_unit: Self::get_u32(&exif, Tag::ResolutionUnit),
        };

        // Only return if we have at least some data
        if data.is_empty() {
            None
        } else {
            Some(data)
        }
    }
}

impl MetadataExtractor {
    /// Get the capture datetime, preferring DateTimeOriginal over DateTime.
    fn get_datetime(exif: &exif::Exif) -> Option<NaiveDateTime> {
        [Tag::DateTimeOriginal, Tag::DateTime]
            .into_iter()
            .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
            .find_map(|field| match &field.value {
                Value::Ascii(values) => values.first().and_then(|raw| parse_exif_datetime(raw)),
                _ => None,
            })
    }

    /// Get a u32 field from EXIF data.
    fn get_u32(exif: &exif::Exif, tag: Tag) -> Option<u32> {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
    }

    /// Get the first rational of a field as a float.
    fn get_rational(exif: &exif::Exif, tag: Tag) -> Option<f64> {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Rational(v) => v.first().map(|r| r.to_f64()),
                _ => None,
            })
            .filter(|v| v.is_finite())
    }
}

/// Parse a raw EXIF ASCII timestamp. Returns `None` for blank or malformed values.
pub fn parse_exif_datetime(raw: &[u8]) -> Option<NaiveDateTime> {
    let text = std::str::from_utf8(raw).ok()?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(text, EXIF_DATETIME_FORMAT).ok()
}

/// File-system creation time, or modification time where creation time is unavailable.
pub fn file_time(path: &Path) -> Option<NaiveDateTime> {
    let meta = std::fs::metadata(path).ok()?;
    let time = meta.created().or_else(|_| meta.modified()).ok()?;
    Some(DateTime::<Local>::from(time).naive_local())
}
