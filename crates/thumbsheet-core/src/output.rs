//! Manifest output: the per-image summaries of a run as JSON or JSON Lines.

use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{Result, ThumbsheetError};
use crate::types::ImageSummary;

/// Manifest format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One pretty-printed JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Pick the format from a file extension; anything unrecognised is JSON.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::parse)
            .unwrap_or(Self::Json)
    }
}

/// Serializes [`ImageSummary`] items to a writer.
pub struct ManifestWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    items_written: usize,
}

impl<W: Write> ManifestWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            items_written: 0,
        }
    }

    /// Write all summaries.
    ///
    /// JSON produces a single array; JSON Lines one object per line.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.writer, items).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                for item in items {
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                    writeln!(self.writer)?;
                }
            }
        }
        self.items_written += items.len();
        Ok(())
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Write `summaries` to `path`, choosing the format from its extension.
pub fn write_manifest(path: &Path, summaries: &[ImageSummary]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut writer = ManifestWriter::new(BufWriter::new(file), OutputFormat::from_path(path));
    writer.write_all(summaries)?;
    writer.into_inner().map_err(ThumbsheetError::Io)?;
    tracing::debug!("Wrote manifest with {} entries to {:?}", summaries.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_record;
    use crate::types::Placement;

    fn summaries() -> Vec<ImageSummary> {
        ["a.jpg", "b.png"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                ImageSummary::new(
                    &sample_record(name),
                    Placement {
                        page: 1,
                        row: 0,
                        column: i as u32,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("m.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("m.JSONL")), OutputFormat::JsonLines);
        assert_eq!(OutputFormat::from_path(Path::new("m.ndjson")), OutputFormat::JsonLines);
        assert_eq!(OutputFormat::from_path(Path::new("manifest")), OutputFormat::Json);
    }

    #[test]
    fn test_json_array() {
        let mut writer = ManifestWriter::new(Vec::new(), OutputFormat::Json);
        writer.write_all(&summaries()).unwrap();
        assert_eq!(writer.items_written(), 2);

        let bytes = writer.into_inner().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["file_name"], "b.png");
        assert_eq!(items[1]["placement"]["column"], 1);
    }

    #[test]
    fn test_json_lines() {
        let mut writer = ManifestWriter::new(Vec::new(), OutputFormat::JsonLines);
        writer.write_all(&summaries()).unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let types: Vec<String> = lines
            .iter()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["document_type"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(types, vec!["JPEG", "PNG"]);
    }

    #[test]
    fn test_write_manifest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("manifest.jsonl");
        write_manifest(&path, &summaries()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"file_name\":\"a.jpg\""));
    }
}
