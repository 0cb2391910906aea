//! Caption text: the metadata lines under each thumbnail and fitting them to a cell.
//!
//! Widths are estimated from Helvetica's metrics by character class; the
//! report uses the base-14 font, so no font file is embedded or measured.

use crate::types::ImageRecord;

const ELLIPSIS: &str = "...";

/// The caption lines for one record, in drawing order.
pub fn caption_lines(record: &ImageRecord) -> Vec<String> {
    vec![
        format!("File name: {}", record.file_name),
        format!("Document type: {}", record.document_type),
        format!("File size: {:.2} MB", record.file_size_mb()),
        format!("Creation date: {}", record.creation_date_display()),
        format!("Image size: {} x {} px", record.width, record.height),
        format!("Image DPI: {}", record.dpi),
    ]
}

/// Approximate advance width of `c` in Helvetica, in ems.
fn glyph_width_em(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' => 0.22,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'I' | 'f' | 't' | '/' | '\\' | '[' | ']' => 0.28,
        'r' | '(' | ')' | '-' | '"' => 0.33,
        'm' | 'M' => 0.83,
        'w' | 'W' | '@' | '%' => 0.89,
        'A'..='Z' => 0.67,
        '0'..='9' => 0.556,
        _ => 0.556,
    }
}

/// Estimated rendered width of `text` at `font_size` points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(glyph_width_em).sum::<f32>() * font_size
}

/// Shorten `text` with a trailing "..." so it fits in `max_width` points.
///
/// Text that already fits is returned unchanged. If not even the ellipsis
/// fits, the result is empty.
pub fn fit_to_width(text: &str, max_width: f32, font_size: f32) -> String {
    if text_width(text, font_size) <= max_width {
        return text.to_string();
    }

    let budget = max_width - text_width(ELLIPSIS, font_size);
    if budget < 0.0 {
        return String::new();
    }

    let mut used = 0.0;
    let mut out = String::new();
    for c in text.chars() {
        let w = glyph_width_em(c) * font_size;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.truncate(out.trim_end().len());
    out.push_str(ELLIPSIS);
    out
}

/// Encode `text` for a WinAnsi (Latin-1 range) font; other characters become `?`.
pub fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_record;
    use chrono::NaiveDate;

    #[test]
    fn test_caption_lines_content() {
        let mut record = sample_record("beach.png");
        record.creation_date =
            NaiveDate::from_ymd_opt(2021, 3, 5).and_then(|d| d.and_hms_opt(14, 30, 0));

        let lines = caption_lines(&record);
        assert_eq!(lines.len(), super::super::CAPTION_LINES);
        assert_eq!(lines[0], "File name: beach.png");
        assert_eq!(lines[1], "Document type: PNG");
        assert_eq!(lines[2], "File size: 1.50 MB");
        assert_eq!(lines[3], "Creation date: 05 March 2021 at 14:30");
        assert_eq!(lines[4], format!("Image size: {} x {} px", record.width, record.height));
        assert_eq!(lines[5], "Image DPI: 72 x 72 dpi");
    }

    #[test]
    fn test_caption_missing_date() {
        let lines = caption_lines(&sample_record("a.jpg"));
        assert_eq!(lines[3], "Creation date: N/A");
    }

    #[test]
    fn test_fit_short_text_unchanged() {
        assert_eq!(fit_to_width("File name: a.jpg", 200.0, 7.0), "File name: a.jpg");
    }

    #[test]
    fn test_fit_long_text_truncated() {
        let long = format!("File name: {}.jpg", "x".repeat(200));
        let fitted = fit_to_width(&long, 150.0, 7.0);
        assert!(fitted.ends_with("..."));
        assert!(fitted.starts_with("File name: xxx"));
        assert!(text_width(&fitted, 7.0) <= 150.0);
    }

    #[test]
    fn test_fit_handles_multibyte_chars() {
        let fitted = fit_to_width(&"é".repeat(100), 40.0, 7.0);
        assert!(fitted.ends_with("..."));
    }

    #[test]
    fn test_fit_nothing_fits() {
        assert_eq!(fit_to_width("anything", 1.0, 7.0), "");
    }

    #[test]
    fn test_win_ansi_bytes() {
        assert_eq!(win_ansi_bytes("abc"), b"abc".to_vec());
        assert_eq!(win_ansi_bytes("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(win_ansi_bytes("日本"), b"??".to_vec());
    }
}
