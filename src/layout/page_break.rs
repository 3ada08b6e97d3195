//! # Page Break Decisions
//!
//! The grid cursor and the fit predictions made against it. Every question
//! the paginator asks ("does this tile fit?", "do the header and its first
//! items fit together?") is answered here on a copy of the cursor, so asking
//! never moves real state.

use super::geometry::GridMetrics;

/// Where the next body tile goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCursor {
    pub row: usize,
    pub col: usize,
    /// Tallest row span seen in the current row.
    pub row_max_span: usize,
}

impl Default for GridCursor {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            row_max_span: 1,
        }
    }
}

/// The grid shape of a tile about to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub cols: usize,
    pub rows: usize,
    /// Starts a fresh row and keeps the rest of that row band to itself
    /// (section headers, dividers).
    pub own_row: bool,
}

impl Span {
    pub fn cell(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            own_row: false,
        }
    }

    pub fn row_band(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            own_row: true,
        }
    }
}

impl GridCursor {
    /// Is the cursor at the very start of the page?
    pub fn at_origin(&self) -> bool {
        self.row == 0 && self.col == 0
    }

    /// Move to the start of the next row unless already at a row start.
    pub fn start_fresh_row(&mut self) {
        if self.col > 0 {
            self.row += self.row_max_span;
            self.col = 0;
            self.row_max_span = 1;
        }
    }

    /// The (row, col) a tile would land on, without moving.
    pub fn peek(&self, span: Span, cols: usize) -> (usize, usize) {
        let mut sim = *self;
        sim.place(span, cols)
    }

    /// Commit a tile at the cursor and advance past it.
    /// Returns the (row, col) the tile landed on.
    pub fn place(&mut self, span: Span, cols: usize) -> (usize, usize) {
        if span.own_row {
            self.start_fresh_row();
            let slot = (self.row, 0);
            self.row += span.rows;
            self.col = 0;
            self.row_max_span = 1;
            return slot;
        }

        if self.col > 0 && self.col + span.cols > cols {
            self.start_fresh_row();
        }
        let slot = (self.row, self.col);
        self.row_max_span = self.row_max_span.max(span.rows);
        self.col += span.cols;
        if self.col >= cols {
            self.row += self.row_max_span;
            self.col = 0;
            self.row_max_span = 1;
        }
        slot
    }
}

/// Would placing `span` at the cursor keep it inside the body region?
/// Accounts for the column wrap the placement would trigger.
pub fn fits_in_current_page(cursor: &GridCursor, span: Span, metrics: &GridMetrics) -> bool {
    let (row, _) = cursor.peek(span, metrics.cols);
    metrics.fits_vertically(row, span.rows)
}

/// Would every span in `sequence`, placed in order from the cursor, fit?
pub fn sequence_fits(cursor: &GridCursor, sequence: &[Span], metrics: &GridMetrics) -> bool {
    let mut sim = *cursor;
    for &span in sequence {
        if !fits_in_current_page(&sim, span, metrics) {
            return false;
        }
        sim.place(span, metrics.cols);
    }
    true
}

/// Height a sequence covers when placed from the top of an empty page.
pub fn sequence_extent(sequence: &[Span], metrics: &GridMetrics) -> f64 {
    let mut sim = GridCursor::default();
    sequence.iter().fold(0.0, |extent: f64, &span| {
        let (row, _) = sim.place(span, metrics.cols);
        extent.max(metrics.row_offset(row) + metrics.footprint_height(span.rows))
    })
}

/// What to do before opening a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// The header and its kept items fit on the current page.
    Place,
    /// Finish this page first so the header isn't stranded at its bottom.
    MoveToNextPage,
    /// The lead overflows even an empty page.
    NeverFits,
}

/// Keep-with-next: decide whether a section's lead (optional divider,
/// header, first `k` items) can start on the current page.
///
/// A lead that overflows a fresh page can never be kept together, so the
/// caller must fail rather than strand the header.
pub fn decide_section_start(
    cursor: &GridCursor,
    lead: &[Span],
    metrics: &GridMetrics,
    page_has_body_content: bool,
) -> BreakDecision {
    if sequence_fits(cursor, lead, metrics) {
        BreakDecision::Place
    } else if !sequence_fits(&GridCursor::default(), lead, metrics) {
        BreakDecision::NeverFits
    } else if page_has_body_content {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::Place
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Region, RegionId};
    use crate::template::GridConfig;

    fn metrics(rows_that_fit: usize) -> GridMetrics {
        let body = Region {
            id: RegionId::Body,
            x: 0.0,
            y: 0.0,
            width: 400.0,
            height: rows_that_fit as f64 * 100.0,
        };
        let grid = GridConfig {
            cols: 4,
            row_height: 100.0,
            gap_x: 0.0,
            gap_y: 0.0,
        };
        GridMetrics::new(&grid, &body)
    }

    #[test]
    fn test_place_wraps_at_column_end() {
        let mut c = GridCursor::default();
        let slots: Vec<(usize, usize)> = (0..5).map(|_| c.place(Span::cell(1, 1), 4)).collect();
        assert_eq!(slots, vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 0)]);
        assert_eq!(c, GridCursor { row: 1, col: 1, row_max_span: 1 });
    }

    #[test]
    fn test_wide_tile_wraps_early() {
        let mut c = GridCursor::default();
        c.place(Span::cell(1, 1), 4);
        c.place(Span::cell(1, 1), 4);
        c.place(Span::cell(1, 1), 4);
        // A 2-wide tile can't start at col 3.
        assert_eq!(c.place(Span::cell(2, 1), 4), (1, 0));
    }

    #[test]
    fn test_row_max_span_advances_past_tall_tile() {
        let mut c = GridCursor::default();
        c.place(Span::cell(1, 2), 4);
        c.place(Span::cell(1, 1), 4);
        c.place(Span::cell(2, 1), 4);
        assert_eq!(c.row, 2);
        assert_eq!(c.place(Span::cell(1, 1), 4), (2, 0));
    }

    #[test]
    fn test_own_row_band() {
        let mut c = GridCursor::default();
        c.place(Span::cell(1, 1), 4);
        assert_eq!(c.place(Span::row_band(4, 1), 4), (1, 0));
        assert_eq!(c.place(Span::cell(1, 1), 4), (2, 0));
    }

    #[test]
    fn test_fit_accounts_for_wrap() {
        let m = metrics(2);
        let mut c = GridCursor::default();
        for _ in 0..7 {
            c.place(Span::cell(1, 1), 4);
        }
        // Cursor at (1, 3): one more fits, a 2-wide would wrap to row 2.
        assert!(fits_in_current_page(&c, Span::cell(1, 1), &m));
        assert!(!fits_in_current_page(&c, Span::cell(2, 1), &m));
    }

    #[test]
    fn test_keep_with_next() {
        let m = metrics(3);
        let mut c = GridCursor::default();
        for _ in 0..8 {
            c.place(Span::cell(1, 1), 4);
        }
        // One row left: a header fits alone but not with an item below it.
        let header = Span::row_band(4, 1);
        let item = Span::cell(1, 1);
        assert_eq!(decide_section_start(&c, &[header], &m, true), BreakDecision::Place);
        assert_eq!(
            decide_section_start(&c, &[header, item], &m, true),
            BreakDecision::MoveToNextPage
        );
        let fresh = GridCursor::default();
        assert_eq!(decide_section_start(&fresh, &[header, item], &m, false), BreakDecision::Place);
    }

    #[test]
    fn test_lead_taller_than_page_never_fits() {
        let m = metrics(3);
        let header = Span::row_band(4, 1);
        let tall = [header, Span::cell(1, 3)];
        let fresh = GridCursor::default();
        assert_eq!(decide_section_start(&fresh, &tall, &m, false), BreakDecision::NeverFits);

        let mut c = GridCursor::default();
        c.place(Span::cell(1, 1), 4);
        assert_eq!(decide_section_start(&c, &tall, &m, true), BreakDecision::NeverFits);
    }

    #[test]
    fn test_sequence_extent_from_page_top() {
        let m = metrics(3);
        let header = Span::row_band(4, 1);
        assert!((sequence_extent(&[header], &m) - 100.0).abs() < 0.001);
        // Two 1x2 cells share a row band below the header.
        let lead = [header, Span::cell(1, 2), Span::cell(1, 2)];
        assert!((sequence_extent(&lead, &m) - 300.0).abs() < 0.001);
        assert_eq!(sequence_extent(&[], &m), 0.0);
    }
}
