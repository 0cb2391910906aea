//! Streaming page layout.
//!
//! Records are placed one at a time into the next free grid cell. A page is
//! flushed to the writer as soon as its last cell is filled. The engine keeps
//! no records of its own; what the writer retains is up to the writer
//! (the PDF backend holds compressed thumbnails until `finish`).

use std::path::Path;

use super::grid::{PageGrid, TITLE_SIZE_PT};
use super::text::{caption_lines, fit_to_width};
use super::writer::DocumentWriter;
use crate::error::{ReportError, ReportResult};
use crate::types::{ImageRecord, Placement};

/// Text drawn on the single page of a report with no images.
pub const EMPTY_REPORT_TEXT: &str = "No images found";

/// Where the layout engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    /// Nothing placed yet; no page open
    Ready,
    /// `filled` cells of page `page` are used
    AccumulatingOnCurrentPage { page: usize, filled: usize },
    /// Page `page` was filled and flushed; the next record opens a new page
    PageFull { page: usize },
    /// The document was finished with `pages` pages
    Done { pages: usize },
}

/// Totals reported when the layout finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSummary {
    pub pages: usize,
    pub records: usize,
}

/// Places records into a [`PageGrid`] and drives a [`DocumentWriter`].
pub struct LayoutEngine<W: DocumentWriter> {
    grid: PageGrid,
    title: String,
    writer: Option<W>,
    state: LayoutState,
    records: usize,
}

impl<W: DocumentWriter> LayoutEngine<W> {
    pub fn new(grid: PageGrid, title: impl Into<String>, writer: W) -> Self {
        Self {
            grid,
            title: title.into(),
            writer: Some(writer),
            state: LayoutState::Ready,
            records: 0,
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn grid(&self) -> &PageGrid {
        &self.grid
    }

    /// Draw `record` into the next free cell and return where it went.
    pub fn place(&mut self, record: &ImageRecord) -> ReportResult<Placement> {
        let (page, index) = match self.state {
            LayoutState::Ready => {
                self.open_page(1)?;
                (1, 0)
            }
            LayoutState::PageFull { page } => {
                self.open_page(page + 1)?;
                (page + 1, 0)
            }
            LayoutState::AccumulatingOnCurrentPage { page, filled } => (page, filled),
            LayoutState::Done { .. } => return Err(ReportError::Finished),
        };

        self.draw_record(record, index)?;
        self.records += 1;

        let (row, column) = self.grid.position(index);
        let filled = index + 1;
        if filled == self.grid.capacity() {
            self.close_page(page)?;
            self.state = LayoutState::PageFull { page };
        } else {
            self.state = LayoutState::AccumulatingOnCurrentPage { page, filled };
        }

        Ok(Placement { page, row, column })
    }

    /// Flush the last page and complete the document at `path`.
    ///
    /// A report with no records still gets one page saying so.
    pub fn finish(&mut self, path: &Path) -> ReportResult<(LayoutSummary, W::Output)> {
        let pages = match self.state {
            LayoutState::Ready => {
                self.open_page(1)?;
                let (x, y) = self.grid.caption_baselines(0)[0];
                let size = self.grid.font_size;
                self.writer_mut()?.draw_text(EMPTY_REPORT_TEXT, x, y, size)?;
                self.close_page(1)?;
                1
            }
            LayoutState::AccumulatingOnCurrentPage { page, .. } => {
                self.close_page(page)?;
                page
            }
            LayoutState::PageFull { page } => page,
            LayoutState::Done { .. } => return Err(ReportError::Finished),
        };

        let writer = self.writer.take().ok_or(ReportError::Finished)?;
        self.state = LayoutState::Done { pages };
        let output = writer.finish(path)?;

        tracing::debug!("Layout finished: {} record(s) on {} page(s)", self.records, pages);
        Ok((
            LayoutSummary {
                pages,
                records: self.records,
            },
            output,
        ))
    }

    fn writer_mut(&mut self) -> ReportResult<&mut W> {
        self.writer.as_mut().ok_or(ReportError::Finished)
    }

    fn open_page(&mut self, page: usize) -> ReportResult<()> {
        let (width, height) = (self.grid.page_width, self.grid.page_height);
        let (x, y) = self.grid.title_origin();
        let title = fit_to_width(&self.title, width - 2.0 * self.grid.margin, TITLE_SIZE_PT);

        tracing::trace!("Opening page {}", page);
        let writer = self.writer_mut()?;
        writer.begin_page(width, height)?;
        writer.draw_text(&title, x, y, TITLE_SIZE_PT)
    }

    fn close_page(&mut self, page: usize) -> ReportResult<()> {
        let (x, y) = self.grid.footer_origin();
        let size = self.grid.font_size;
        let writer = self.writer_mut()?;
        writer.draw_text(&format!("Page {page}"), x, y, size)?;
        writer.end_page()
    }

    fn draw_record(&mut self, record: &ImageRecord, index: usize) -> ReportResult<()> {
        let thumb = &record.thumbnail;
        let rect = self.grid.image_rect(index, thumb.width(), thumb.height());
        let baselines = self.grid.caption_baselines(index);
        let max_width = self.grid.caption_width();
        let size = self.grid.font_size;

        let writer = self.writer_mut()?;
        writer.draw_image(thumb, rect)?;
        for (line, (x, y)) in caption_lines(record).iter().zip(baselines) {
            writer.draw_text(&fit_to_width(line, max_width, size), x, y, size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::report::writer::{RecordedPage, RecordingWriter};
    use crate::test_helpers::sample_record;

    fn engine(columns: u32, rows: u32) -> LayoutEngine<RecordingWriter> {
        let config = ReportConfig {
            columns,
            rows,
            ..Default::default()
        };
        let grid = PageGrid::from_config(&config).unwrap();
        LayoutEngine::new(grid, "Test report", RecordingWriter::new())
    }

    fn run(columns: u32, rows: u32, count: usize) -> (Vec<Placement>, Vec<RecordedPage>) {
        let mut engine = engine(columns, rows);
        let placements = (0..count)
            .map(|i| engine.place(&sample_record(&format!("img{i:03}.jpg"))).unwrap())
            .collect();
        let (summary, pages) = engine.finish(Path::new("unused.pdf")).unwrap();
        assert_eq!(summary.pages, pages.len());
        assert_eq!(summary.records, count);
        (placements, pages)
    }

    #[test]
    fn test_state_transitions() {
        let mut engine = engine(2, 1);
        assert_eq!(engine.state(), LayoutState::Ready);

        engine.place(&sample_record("a.jpg")).unwrap();
        assert_eq!(
            engine.state(),
            LayoutState::AccumulatingOnCurrentPage { page: 1, filled: 1 }
        );

        engine.place(&sample_record("b.jpg")).unwrap();
        assert_eq!(engine.state(), LayoutState::PageFull { page: 1 });

        engine.place(&sample_record("c.jpg")).unwrap();
        assert_eq!(
            engine.state(),
            LayoutState::AccumulatingOnCurrentPage { page: 2, filled: 1 }
        );

        engine.finish(Path::new("unused.pdf")).unwrap();
        assert_eq!(engine.state(), LayoutState::Done { pages: 2 });
    }

    #[test]
    fn test_placements_fill_rows_then_pages() {
        let (placements, _) = run(3, 3, 10);
        assert_eq!(placements[0], Placement { page: 1, row: 0, column: 0 });
        assert_eq!(placements[2], Placement { page: 1, row: 0, column: 2 });
        assert_eq!(placements[3], Placement { page: 1, row: 1, column: 0 });
        assert_eq!(placements[8], Placement { page: 1, row: 2, column: 2 });
        assert_eq!(placements[9], Placement { page: 2, row: 0, column: 0 });
    }

    #[test]
    fn test_page_count() {
        assert_eq!(run(3, 3, 1).1.len(), 1);
        assert_eq!(run(3, 3, 9).1.len(), 1);
        assert_eq!(run(3, 3, 10).1.len(), 2);
        assert_eq!(run(2, 2, 12).1.len(), 3);
    }

    #[test]
    fn test_exactly_full_page_has_no_trailing_blank() {
        let (_, pages) = run(2, 2, 4);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].images.len(), 4);
    }

    #[test]
    fn test_each_page_has_title_and_footer() {
        let (_, pages) = run(2, 2, 5);
        assert!(pages[0].has_text("Test report"));
        assert!(pages[0].has_text("Page 1"));
        assert!(pages[1].has_text("Page 2"));
        assert_eq!(pages[1].images.len(), 1);
    }

    #[test]
    fn test_captions_drawn_under_each_image() {
        let (_, pages) = run(3, 3, 2);
        let page = &pages[0];
        assert!(page.has_text("File name: img000.jpg"));
        assert!(page.has_text("File name: img001.jpg"));
        assert!(page.has_text("Creation date: N/A"));
        assert!(page.has_text("Image DPI: 72 x 72 dpi"));

        let image = &page.images[0];
        let name = page
            .texts
            .iter()
            .find(|t| t.text == "File name: img000.jpg")
            .unwrap();
        assert!(name.y < image.rect.y);
        assert!((name.x - image.rect.x).abs() < page.width / 3.0);
    }

    #[test]
    fn test_long_file_name_is_truncated() {
        let mut engine = engine(3, 3);
        let name = format!("{}.jpg", "very_long_name_".repeat(20));
        engine.place(&sample_record(&name)).unwrap();
        let (_, pages) = engine.finish(Path::new("unused.pdf")).unwrap();

        let line = pages[0]
            .texts
            .iter()
            .find(|t| t.text.starts_with("File name: "))
            .unwrap();
        assert!(line.text.ends_with("..."));
        assert!(line.text.len() < name.len());
    }

    #[test]
    fn test_empty_report_has_placeholder_page() {
        let (_, pages) = run(3, 3, 0);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].images.is_empty());
        assert!(pages[0].has_text(EMPTY_REPORT_TEXT));
    }

    #[test]
    fn test_use_after_finish_fails() {
        let mut engine = engine(3, 3);
        engine.finish(Path::new("unused.pdf")).unwrap();
        assert!(matches!(
            engine.place(&sample_record("late.jpg")),
            Err(ReportError::Finished)
        ));
        assert!(matches!(
            engine.finish(Path::new("unused.pdf")),
            Err(ReportError::Finished)
        ));
    }
}
