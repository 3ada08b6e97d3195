//! # Tile Geometry
//!
//! Grid math for the body region and the variant selector. Everything here
//! is a pure function of the template and the body region.
//!
//! A tile's `width`/`height` is always its grid footprint:
//!
//! ```text
//! height = rowSpan * rowHeight + (rowSpan - 1) * gapY
//! width  = colSpan * cellWidth + (colSpan - 1) * gapX
//! cellWidth = (bodyWidth - (cols - 1) * gapX) / cols
//! ```
//!
//! Content budgets never enter these formulas.

use std::ops::Range;

use super::Region;
use crate::model::{MenuItem, SelectionConfig};
use crate::template::{GridConfig, Template, TileVariant};

/// Slack for float comparisons against the body height and column edges.
pub const EPSILON: f64 = 1e-6;

/// Width of one grid column.
pub fn cell_width(body_width: f64, cols: usize, gap_x: f64) -> f64 {
    if cols == 0 {
        return 0.0;
    }
    (body_width - (cols as f64 - 1.0) * gap_x) / cols as f64
}

/// Size of a span of `span` tracks of `unit` separated by `gap`.
pub fn span_size(span: usize, unit: f64, gap: f64) -> f64 {
    if span == 0 {
        return 0.0;
    }
    span as f64 * unit + (span as f64 - 1.0) * gap
}

/// Resolved grid geometry of one page's body region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub cols: usize,
    pub row_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub cell_width: f64,
    pub body_y: f64,
    pub body_width: f64,
    pub body_height: f64,
}

impl GridMetrics {
    pub fn new(grid: &GridConfig, body: &Region) -> Self {
        Self {
            cols: grid.cols,
            row_height: grid.row_height,
            gap_x: grid.gap_x,
            gap_y: grid.gap_y,
            cell_width: cell_width(body.width, grid.cols, grid.gap_x),
            body_y: body.y,
            body_width: body.width,
            body_height: body.height,
        }
    }

    pub fn footprint_width(&self, col_span: usize) -> f64 {
        span_size(col_span, self.cell_width, self.gap_x)
    }

    pub fn footprint_height(&self, row_span: usize) -> f64 {
        span_size(row_span, self.row_height, self.gap_y)
    }

    /// Horizontal distance between the left edges of adjacent columns.
    pub fn column_pitch(&self) -> f64 {
        self.cell_width + self.gap_x
    }

    pub fn row_pitch(&self) -> f64 {
        self.row_height + self.gap_y
    }

    /// X of a column's left edge (content-box relative).
    pub fn column_x(&self, col: usize) -> f64 {
        col as f64 * self.column_pitch()
    }

    /// Y of a row's top edge relative to the top of the body region.
    pub fn row_offset(&self, row: usize) -> f64 {
        row as f64 * self.row_pitch()
    }

    /// Y of a row's top edge (content-box relative).
    pub fn row_y(&self, row: usize) -> f64 {
        self.body_y + self.row_offset(row)
    }

    /// Does a tile of `row_span` rows starting at `row` stay inside the body?
    pub fn fits_vertically(&self, row: usize, row_span: usize) -> bool {
        self.row_offset(row) + self.footprint_height(row_span) <= self.body_height + EPSILON
    }

    /// Number of whole grid rows the body region can hold.
    pub fn row_capacity(&self) -> usize {
        if self.body_height < self.row_height - EPSILON {
            return 0;
        }
        ((self.body_height + self.gap_y) / self.row_pitch() + EPSILON).floor() as usize
    }

    /// Columns whose cell interval a horizontal extent overlaps.
    ///
    /// Used for occupancy after balancing: a centered tile can straddle two
    /// cells on screen while its `gridCol` still names the original column.
    pub fn covered_columns(&self, x: f64, width: f64) -> Range<usize> {
        let pitch = self.column_pitch();
        if pitch <= 0.0 || self.cols == 0 {
            return 0..0;
        }
        let start = (x / pitch + EPSILON).floor().max(0.0) as usize;
        let end = ((x + width) / pitch - EPSILON).ceil().max(0.0) as usize;
        start.min(self.cols)..end.min(self.cols).max(start.min(self.cols))
    }
}

/// A tile's size in grid cells and points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub col_span: usize,
    pub row_span: usize,
    pub width: f64,
    pub height: f64,
}

impl Footprint {
    pub fn from_spans(col_span: usize, row_span: usize, metrics: &GridMetrics) -> Self {
        Self {
            col_span,
            row_span,
            width: metrics.footprint_width(col_span),
            height: metrics.footprint_height(row_span),
        }
    }

    pub fn for_variant(template: &Template, variant: TileVariant, metrics: &GridMetrics) -> Self {
        let (col_span, row_span) = template.spans(variant);
        Self::from_spans(col_span, row_span, metrics)
    }
}

/// Pick the tile variant for an item.
///
/// `textOnly` forces text rows. Otherwise every item is an image card, with
/// a placeholder image box when it has no photo, so row heights stay uniform
/// regardless of which items have images. Featured items get the featured
/// card while the section still has featured slots left.
pub fn select_item_variant(
    item: &MenuItem,
    template: &Template,
    selection: &SelectionConfig,
    featured_so_far: usize,
) -> TileVariant {
    if selection.text_only {
        return TileVariant::ItemTextRow;
    }
    if item.is_featured
        && featured_so_far < template.policies.max_featured_per_section
        && template.variant(TileVariant::FeaturedCard).is_some()
    {
        return TileVariant::FeaturedCard;
    }
    TileVariant::ItemCard
}
