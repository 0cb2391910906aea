//! Document backends the layout engine draws into.
//!
//! [`PdfDocumentWriter`] builds a real PDF with `lopdf`; [`RecordingWriter`]
//! only records the drawing calls, which is what tests and dry runs use.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::grid::Rect;
use super::text::win_ansi_bytes;
use crate::error::{ReportError, ReportResult};
use crate::types::Thumbnail;

/// Resource name of the single text font.
const FONT_NAME: &str = "F1";

/// Drawing surface for a paginated report.
///
/// Calls arrive as `begin_page`, any number of draws, `end_page`, repeated,
/// and finally one `finish`. Drawing without an open page is an error.
pub trait DocumentWriter {
    /// What `finish` hands back once the document is complete.
    type Output;

    fn begin_page(&mut self, width: f32, height: f32) -> ReportResult<()>;

    fn draw_image(&mut self, thumbnail: &Thumbnail, rect: Rect) -> ReportResult<()>;

    /// Draw one line of text with its baseline starting at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) -> ReportResult<()>;

    fn end_page(&mut self) -> ReportResult<()>;

    /// Complete the document and persist it to `path`.
    fn finish(self, path: &Path) -> ReportResult<Self::Output>;
}

/// Result of writing a PDF to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReport {
    pub path: PathBuf,
    pub pages: usize,
    pub bytes: u64,
}

struct OpenPage {
    width: f32,
    height: f32,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// [`DocumentWriter`] producing a PDF 1.5 file.
///
/// Thumbnails are embedded as RGB image XObjects, Flate-compressed as they
/// are drawn, and text uses the built-in Helvetica font. The document is
/// kept in memory until `finish`, so the retained size grows with the
/// compressed thumbnails and page content streams.
pub struct PdfDocumentWriter {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<ObjectId>,
    current: Option<OpenPage>,
    image_count: usize,
}

impl PdfDocumentWriter {
    /// Start an empty document; `title` goes into the document info dictionary.
    pub fn new(title: &str) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(win_ansi_bytes(title), StringFormat::Literal),
            "Producer" => Object::string_literal(concat!("thumbsheet ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Info", Object::Reference(info_id));

        Self {
            doc,
            pages_id,
            font_id,
            page_ids: Vec::new(),
            current: None,
            image_count: 0,
        }
    }

    fn page_mut(&mut self) -> ReportResult<&mut OpenPage> {
        self.current.as_mut().ok_or(ReportError::NoOpenPage)
    }

    /// Serialize to a sibling temp file, then rename over `path`.
    fn save_atomically(&mut self, path: &Path) -> ReportResult<u64> {
        let write_err = |source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".partial");
        let tmp = path.with_file_name(tmp_name);

        let result = (|| {
            let file = std::fs::File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            self.doc
                .save_to(&mut writer)
                .map_err(std::io::Error::other)?;
            writer.flush()?;
            drop(writer);
            std::fs::rename(&tmp, path)?;
            std::fs::metadata(path).map(|m| m.len())
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        result.map_err(write_err)
    }
}

impl DocumentWriter for PdfDocumentWriter {
    type Output = WrittenReport;

    fn begin_page(&mut self, width: f32, height: f32) -> ReportResult<()> {
        if self.current.is_some() {
            self.end_page()?;
        }
        self.current = Some(OpenPage {
            width,
            height,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        });
        Ok(())
    }

    fn draw_image(&mut self, thumbnail: &Thumbnail, rect: Rect) -> ReportResult<()> {
        self.page_mut()?;
        let mut image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => thumbnail.width() as i64,
                "Height" => thumbnail.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            thumbnail.as_rgb_bytes().to_vec(),
        );
        // Deflate now so the document never holds raw pixels between pages.
        image.compress()?;
        let image_id = self.doc.add_object(image);
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        let page = self.page_mut()?;
        page.xobjects.set(name.clone(), Object::Reference(image_id));
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    rect.width.into(),
                    0.into(),
                    0.into(),
                    rect.height.into(),
                    rect.x.into(),
                    rect.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) -> ReportResult<()> {
        let page = self.page_mut()?;
        page.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_NAME.into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi_bytes(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn end_page(&mut self) -> ReportResult<()> {
        let page = self.current.take().ok_or(ReportError::NoOpenPage)?;

        let content = Content {
            operations: page.operations,
        };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), page.width.into(), page.height.into()]),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { FONT_NAME => self.font_id },
                "XObject" => page.xobjects,
            },
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish(mut self, path: &Path) -> ReportResult<WrittenReport> {
        if self.current.is_some() {
            self.end_page()?;
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|id| (*id).into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let bytes = self.save_atomically(path)?;
        tracing::debug!(
            "Wrote {} page(s), {} image(s) to {:?}",
            self.page_ids.len(),
            self.image_count,
            path
        );

        Ok(WrittenReport {
            path: path.to_path_buf(),
            pages: self.page_ids.len(),
            bytes,
        })
    }
}

/// An image draw captured by [`RecordingWriter`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedImage {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub rect: Rect,
}

/// A text draw captured by [`RecordingWriter`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// One page as seen by [`RecordingWriter`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordedPage {
    pub width: f32,
    pub height: f32,
    pub images: Vec<RecordedImage>,
    pub texts: Vec<RecordedText>,
}

impl RecordedPage {
    /// Whether any text on the page equals `text`.
    pub fn has_text(&self, text: &str) -> bool {
        self.texts.iter().any(|t| t.text == text)
    }
}

/// [`DocumentWriter`] that keeps the drawing calls in memory and writes nothing.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    pages: Vec<RecordedPage>,
    current: Option<RecordedPage>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn page_mut(&mut self) -> ReportResult<&mut RecordedPage> {
        self.current.as_mut().ok_or(ReportError::NoOpenPage)
    }
}

impl DocumentWriter for RecordingWriter {
    type Output = Vec<RecordedPage>;

    fn begin_page(&mut self, width: f32, height: f32) -> ReportResult<()> {
        if self.current.is_some() {
            self.end_page()?;
        }
        self.current = Some(RecordedPage {
            width,
            height,
            ..Default::default()
        });
        Ok(())
    }

    fn draw_image(&mut self, thumbnail: &Thumbnail, rect: Rect) -> ReportResult<()> {
        let image = RecordedImage {
            pixel_width: thumbnail.width(),
            pixel_height: thumbnail.height(),
            rect,
        };
        self.page_mut()?.images.push(image);
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) -> ReportResult<()> {
        let text = RecordedText {
            text: text.to_string(),
            x,
            y,
            size,
        };
        self.page_mut()?.texts.push(text);
        Ok(())
    }

    fn end_page(&mut self) -> ReportResult<()> {
        let page = self.current.take().ok_or(ReportError::NoOpenPage)?;
        self.pages.push(page);
        Ok(())
    }

    fn finish(mut self, _path: &Path) -> ReportResult<Vec<RecordedPage>> {
        if self.current.is_some() {
            self.end_page()?;
        }
        Ok(self.pages)
    }
}
