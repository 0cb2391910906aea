//! Resolution (DPI) lookup.
//!
//! The `image` crate does not surface density information, so the PNG `pHYs`
//! chunk and the JPEG JFIF `APP0` segment are read straight from the file
//! bytes. EXIF resolution tags are the second source, the configured default
//! the last.

use image::ImageFormat;

use crate::types::{Dpi, DpiSource, ExifData};

const INCHES_PER_METRE: f64 = 39.370_078_740_157_48;
const CM_PER_INCH: f64 = 2.54;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Resolution declared by a container header, in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderDpi {
    pub x: f64,
    pub y: f64,
}

/// Read the resolution from the container header, if the format carries one.
pub fn from_header(bytes: &[u8], format: ImageFormat) -> Option<HeaderDpi> {
    match format {
        ImageFormat::Png => png_phys(bytes),
        ImageFormat::Jpeg => jfif_density(bytes),
        _ => None,
    }
}

/// Parse the PNG `pHYs` chunk (pixels per unit; unit 1 = metre).
fn png_phys(bytes: &[u8]) -> Option<HeaderDpi> {
    if bytes.len() < 8 || bytes[..8] != PNG_SIGNATURE {
        return None;
    }

    let mut pos = 8;
    while pos + 8 <= bytes.len() {
        let len = u32::from_be_bytes(bytes[pos..pos + 4].try_into().ok()?) as usize;
        let kind = &bytes[pos + 4..pos + 8];
        let data_start = pos + 8;
        let data_end = data_start.checked_add(len)?;
        if data_end > bytes.len() {
            return None;
        }

        match kind {
            b"pHYs" if len >= 9 => {
                let data = &bytes[data_start..data_end];
                let x = u32::from_be_bytes(data[0..4].try_into().ok()?);
                let y = u32::from_be_bytes(data[4..8].try_into().ok()?);
                // Unit 0 only declares an aspect ratio
                if data[8] != 1 {
                    return None;
                }
                return Some(HeaderDpi {
                    x: x as f64 / INCHES_PER_METRE,
                    y: y as f64 / INCHES_PER_METRE,
                });
            }
            // pHYs must precede the image data
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }

        // length + type + data + crc
        pos = data_end + 4;
    }
    None
}

/// Parse the JFIF `APP0` density fields (units 1 = inch, 2 = centimetre).
fn jfif_density(bytes: &[u8]) -> Option<HeaderDpi> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        // Start of scan: no more header segments
        if marker == 0xDA {
            return None;
        }
        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let seg_start = pos + 4;
        let seg_end = pos + 2 + len;
        if len < 2 || seg_end > bytes.len() {
            return None;
        }

        let segment = &bytes[seg_start..seg_end];
        if marker == 0xE0 && segment.len() >= 12 && segment.starts_with(b"JFIF\0") {
            let units = segment[7];
            let x = u16::from_be_bytes([segment[8], segment[9]]) as f64;
            let y = u16::from_be_bytes([segment[10], segment[11]]) as f64;
            return match units {
                1 => Some(HeaderDpi { x, y }),
                2 => Some(HeaderDpi {
                    x: x * CM_PER_INCH,
                    y: y * CM_PER_INCH,
                }),
                _ => None,
            };
        }
        pos = seg_end;
    }
    None
}

/// Resolution from EXIF X/YResolution, converted to inches.
pub fn from_exif(exif: &ExifData) -> Option<HeaderDpi> {
    let x = exif.x_resolution?;
    let y = exif.y_resolution.unwrap_or(x);
    match exif.resolution_unit.unwrap_or(2) {
        // 2 = inch is also the TIFF default when the tag is absent
        2 => Some(HeaderDpi { x, y }),
        3 => Some(HeaderDpi {
            x: x * CM_PER_INCH,
            y: y * CM_PER_INCH,
        }),
        _ => None,
    }
}

/// Pick the resolution: container header, then EXIF, then `default_dpi`.
pub fn resolve(header: Option<HeaderDpi>, exif: Option<&ExifData>, default_dpi: u32) -> Dpi {
    let candidates = [
        (header, DpiSource::Header),
        (exif.and_then(from_exif), DpiSource::Exif),
    ];

    for (candidate, source) in candidates {
        if let Some(dpi) = candidate.and_then(to_whole_dpi) {
            return Dpi {
                x: dpi.0,
                y: dpi.1,
                source,
            };
        }
    }
    Dpi::fallback(default_dpi)
}

fn to_whole_dpi(dpi: HeaderDpi) -> Option<(u32, u32)> {
    let valid = |v: f64| v.is_finite() && v >= 0.5 && v <= u32::MAX as f64;
    if valid(dpi.x) && valid(dpi.y) {
        Some((dpi.x.round() as u32, dpi.y.round() as u32))
    } else {
        None
    }
}
