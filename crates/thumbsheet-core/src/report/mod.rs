//! Report stage: lay records out on A4 pages and write the document.
//!
//! ```text
//! ImageRecord → LayoutEngine (grid cell, caption) → DocumentWriter → PDF
//! ```

pub mod grid;
pub mod layout;
pub mod text;
pub mod writer;

pub use grid::{PageGrid, Rect, A4_HEIGHT_PT, A4_WIDTH_PT, CAPTION_LINES};
pub use layout::{LayoutEngine, LayoutState, LayoutSummary, EMPTY_REPORT_TEXT};
pub use text::{caption_lines, fit_to_width};
pub use writer::{
    DocumentWriter, PdfDocumentWriter, RecordedImage, RecordedPage, RecordedText,
    RecordingWriter, WrittenReport,
};
