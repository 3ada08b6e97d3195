//! # Filler Manager
//!
//! Fills empty cells inside a page's safe zones with decorative tiles.
//!
//! Occupancy is a set of grid cells, never pixel rectangles. Each content
//! tile contributes the rows it spans and the columns its final `x` extent
//! covers, so a row shifted by balancing blocks the cells it is actually
//! drawn over. A filler goes down only when every cell it spans is free and
//! inside a safe zone.

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::geometry::GridMetrics;
use super::{PageType, RegionId, TileContent, TileInstance, TileType, LAYER_FILLER};
use crate::template::{FillerConfig, FillerTileDef, RowMarker, RowRef, SafeZone, SelectionPolicy};

/// A rows x cols grid of flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl CellGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mark(&mut self, row: usize, col: usize) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = true;
        }
    }

    /// Out-of-range cells read as unmarked.
    pub fn is_marked(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

/// The grid cells a tile covers: its row span, and the columns its drawn
/// horizontal extent overlaps.
pub fn tile_cells(tile: &TileInstance, metrics: &GridMetrics) -> Vec<(usize, usize)> {
    let cols = metrics.covered_columns(tile.x, tile.width);
    (tile.grid_row..tile.grid_row + tile.row_span)
        .flat_map(|r| cols.clone().map(move |c| (r, c)))
        .collect()
}

/// Occupancy of all content tiles in the body region.
pub fn occupancy(tiles: &[TileInstance], metrics: &GridMetrics) -> CellGrid {
    let rows = tiles
        .iter()
        .filter(|t| t.region_id == RegionId::Body)
        .map(|t| t.grid_row + t.row_span)
        .max()
        .unwrap_or(0)
        .max(metrics.row_capacity());

    let mut grid = CellGrid::new(rows, metrics.cols);
    for tile in tiles.iter().filter(|t| t.region_id == RegionId::Body) {
        for (r, c) in tile_cells(tile, metrics) {
            grid.mark(r, c);
        }
    }
    grid
}

/// A safe zone resolved to concrete, inclusive row and column bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedZone {
    pub rows: RangeInclusive<usize>,
    pub cols: RangeInclusive<usize>,
}

/// Resolve symbolic safe-zone rows for one page.
///
/// `LAST` is the last row the body can hold; `LAST_CONTENT` is the highest
/// `gridRow` among placed body tiles. Zones that resolve to nothing (an
/// empty page for `LAST_CONTENT`, rows past the body) are dropped.
pub fn resolve_safe_zones(
    zones: &[SafeZone],
    metrics: &GridMetrics,
    last_content_row: Option<usize>,
) -> Vec<ResolvedZone> {
    let capacity = metrics.row_capacity();
    if capacity == 0 || metrics.cols == 0 {
        return Vec::new();
    }
    let last_row = capacity - 1;
    let last_col = metrics.cols - 1;

    let resolve = |r: RowRef| match r {
        RowRef::Index(i) => Some(i),
        RowRef::Marker(RowMarker::Last) => Some(last_row),
        RowRef::Marker(RowMarker::LastContent) => last_content_row,
    };

    zones
        .iter()
        .filter_map(|zone| {
            let start = resolve(zone.start_row)?;
            let end = resolve(zone.end_row)?.min(last_row);
            let end_col = zone.end_col.unwrap_or(last_col).min(last_col);
            if start > end || zone.start_col > end_col {
                return None;
            }
            Some(ResolvedZone {
                rows: start..=end,
                cols: zone.start_col..=end_col,
            })
        })
        .collect()
}

/// Everything the filler needs to know about the page being finished.
#[derive(Debug, Clone)]
pub struct FillRequest<'a> {
    pub config: &'a FillerConfig,
    pub page_index: usize,
    pub page_type: PageType,
    /// Stable per-page seed for `RANDOM_SEEDED`.
    pub seed: u64,
    /// Only defs tagged with this pattern (or untagged) are used.
    pub pattern: Option<&'a str>,
}

enum Picker {
    Rotation { next: usize },
    Seeded(ChaCha8Rng),
}

impl Picker {
    fn start(&mut self, len: usize) -> usize {
        match self {
            Picker::Rotation { next } => *next % len,
            Picker::Seeded(rng) => rng.gen_range(0..len),
        }
    }

    fn placed(&mut self, index: usize) {
        if let Picker::Rotation { next } = self {
            *next = index + 1;
        }
    }
}

/// Place filler tiles into the free safe-zone cells of a finished page.
/// Returns how many fillers were added.
pub fn fill_page(tiles: &mut Vec<TileInstance>, metrics: &GridMetrics, request: &FillRequest) -> usize {
    let last_content_row = tiles
        .iter()
        .filter(|t| t.region_id == RegionId::Body)
        .map(|t| t.grid_row)
        .max();
    let zones = resolve_safe_zones(&request.config.safe_zones, metrics, last_content_row);
    if zones.is_empty() {
        return 0;
    }

    let candidates: Vec<&FillerTileDef> = request
        .config
        .tile_defs
        .iter()
        .filter(|d| match (request.pattern, d.pattern.as_deref()) {
            (Some(wanted), Some(tag)) => wanted == tag,
            _ => true,
        })
        .filter(|d| {
            request.config.selection_policy != SelectionPolicy::ByPageType
                || d.serves(request.page_type)
        })
        .collect();
    if candidates.is_empty() {
        return 0;
    }

    let mut occupied = occupancy(tiles, metrics);
    let mut safe = CellGrid::new(occupied.rows(), metrics.cols);
    for zone in &zones {
        for r in zone.rows.clone() {
            for c in zone.cols.clone() {
                safe.mark(r, c);
            }
        }
    }

    let mut picker = match request.config.selection_policy {
        SelectionPolicy::RandomSeeded => Picker::Seeded(ChaCha8Rng::seed_from_u64(request.seed)),
        SelectionPolicy::Sequential | SelectionPolicy::ByPageType => Picker::Rotation { next: 0 },
    };

    let fits = |def: &FillerTileDef, row: usize, col: usize, occupied: &CellGrid| {
        (row..row + def.row_span).all(|r| {
            (col..col + def.col_span).all(|c| safe.is_marked(r, c) && !occupied.is_marked(r, c))
        })
    };

    let mut placed = 0;
    for row in 0..safe.rows() {
        for col in 0..metrics.cols {
            if !safe.is_marked(row, col) || occupied.is_marked(row, col) {
                continue;
            }
            let start = picker.start(candidates.len());
            let chosen = (0..candidates.len())
                .map(|k| (start + k) % candidates.len())
                .find(|&i| fits(candidates[i], row, col, &occupied));
            let Some(index) = chosen else {
                continue;
            };
            let def = candidates[index];
            picker.placed(index);

            for r in row..row + def.row_span {
                for c in col..col + def.col_span {
                    occupied.mark(r, c);
                }
            }
            tiles.push(TileInstance {
                id: format!("filler-p{}-r{}-c{}", request.page_index, row, col),
                tile_type: TileType::Filler,
                region_id: RegionId::Body,
                x: metrics.column_x(col),
                y: metrics.row_y(row),
                width: metrics.footprint_width(def.col_span),
                height: metrics.footprint_height(def.row_span),
                col_span: def.col_span,
                row_span: def.row_span,
                grid_row: row,
                grid_col: col,
                layer: LAYER_FILLER,
                content: TileContent::Filler {
                    filler_id: def.id.clone(),
                    style: def.style.clone(),
                },
            });
            placed += 1;
        }
    }
    placed
}
