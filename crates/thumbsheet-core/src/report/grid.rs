//! Page geometry: where each grid cell, thumbnail and caption line goes.
//!
//! All coordinates are PDF points with the origin at the bottom-left corner
//! of the page.

use crate::config::ReportConfig;
use crate::error::ConfigError;

/// A4 portrait width in points.
pub const A4_WIDTH_PT: f32 = 595.28;
/// A4 portrait height in points.
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Metadata lines drawn under each thumbnail.
pub const CAPTION_LINES: usize = 6;

/// Font size of the page title.
pub const TITLE_SIZE_PT: f32 = 11.0;

const CELL_PADDING_PT: f32 = 6.0;
const CAPTION_GAP_PT: f32 = 4.0;
const LINE_SPACING: f32 = 1.3;
const MIN_IMAGE_AREA_PT: f32 = 24.0;

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Whether `other` lies entirely inside this rectangle (with a small tolerance).
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f32 = 0.01;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.top() <= self.top() + EPS
    }
}

/// Fixed grid of equally sized cells on an A4 page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGrid {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub columns: u32,
    pub rows: u32,
    pub font_size: f32,
    pub line_height: f32,
    cell_width: f32,
    cell_height: f32,
    content_top: f32,
    image_area_width: f32,
    image_area_height: f32,
}

impl PageGrid {
    /// Compute the grid for a report configuration.
    ///
    /// Fails when the cells are too small to hold a thumbnail above its caption.
    pub fn from_config(config: &ReportConfig) -> Result<Self, ConfigError> {
        if config.columns == 0 || config.rows == 0 {
            return Err(ConfigError::ValidationError(
                "report.columns and report.rows must be > 0".into(),
            ));
        }

        let page_width = A4_WIDTH_PT;
        let page_height = A4_HEIGHT_PT;
        let margin = config.margin_pt;
        let font_size = config.font_size;
        let line_height = font_size * LINE_SPACING;

        let header_height = TITLE_SIZE_PT + 10.0;
        let footer_height = font_size + 8.0;
        let content_top = page_height - margin - header_height;
        let content_bottom = margin + footer_height;

        let cell_width = (page_width - 2.0 * margin) / config.columns as f32;
        let cell_height = (content_top - content_bottom) / config.rows as f32;
        let caption_height = CAPTION_LINES as f32 * line_height;

        let image_area_width = cell_width - 2.0 * CELL_PADDING_PT;
        let image_area_height =
            cell_height - 2.0 * CELL_PADDING_PT - caption_height - CAPTION_GAP_PT;

        if image_area_width < MIN_IMAGE_AREA_PT || image_area_height < MIN_IMAGE_AREA_PT {
            return Err(ConfigError::ValidationError(format!(
                "report grid {}x{} leaves cells too small for a thumbnail \
                 ({:.0}x{:.0}pt image area)",
                config.columns, config.rows, image_area_width, image_area_height
            )));
        }

        Ok(Self {
            page_width,
            page_height,
            margin,
            columns: config.columns,
            rows: config.rows,
            font_size,
            line_height,
            cell_width,
            cell_height,
            content_top,
            image_area_width,
            image_area_height,
        })
    }

    /// Cells per page.
    pub fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// (row, column) of the `index`-th cell on a page, filled row by row.
    pub fn position(&self, index: usize) -> (u32, u32) {
        let columns = self.columns as usize;
        ((index / columns) as u32, (index % columns) as u32)
    }

    /// Bounds of the `index`-th cell on a page.
    pub fn cell_rect(&self, index: usize) -> Rect {
        let (row, column) = self.position(index);
        Rect {
            x: self.margin + column as f32 * self.cell_width,
            y: self.content_top - (row + 1) as f32 * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    /// Where a `pixel_width` x `pixel_height` thumbnail is drawn in cell `index`.
    ///
    /// The image is scaled to fit the cell's image area (never above one
    /// point per pixel), centred horizontally and resting on the caption.
    pub fn image_rect(&self, index: usize, pixel_width: u32, pixel_height: u32) -> Rect {
        let cell = self.cell_rect(index);
        let (pw, ph) = (pixel_width.max(1) as f32, pixel_height.max(1) as f32);
        let scale = (self.image_area_width / pw)
            .min(self.image_area_height / ph)
            .min(1.0);
        let (width, height) = (pw * scale, ph * scale);

        let area_bottom = cell.top() - CELL_PADDING_PT - self.image_area_height;
        Rect {
            x: cell.x + CELL_PADDING_PT + (self.image_area_width - width) / 2.0,
            y: area_bottom,
            width,
            height,
        }
    }

    /// Baseline origins of the caption lines of cell `index`, top line first.
    pub fn caption_baselines(&self, index: usize) -> Vec<(f32, f32)> {
        let cell = self.cell_rect(index);
        let x = cell.x + CELL_PADDING_PT;
        let first = cell.top()
            - CELL_PADDING_PT
            - self.image_area_height
            - CAPTION_GAP_PT
            - self.font_size;
        (0..CAPTION_LINES)
            .map(|i| (x, first - i as f32 * self.line_height))
            .collect()
    }

    /// Usable caption width inside a cell.
    pub fn caption_width(&self) -> f32 {
        self.image_area_width
    }

    /// Baseline origin of the page title.
    pub fn title_origin(&self) -> (f32, f32) {
        (self.margin, self.page_height - self.margin - TITLE_SIZE_PT)
    }

    /// Baseline origin of the page footer.
    pub fn footer_origin(&self) -> (f32, f32) {
        (self.margin, self.margin)
    }
}
