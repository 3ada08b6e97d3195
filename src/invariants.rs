//! # Layout Invariants
//!
//! A post-hoc validation pass over a finished [`LayoutDocument`]. Built for
//! development and tests (`invariants` feature); the paginator never calls
//! it. Every violation found is reported, not just the first.

use thiserror::Error;

use crate::layout::filler::{tile_cells, CellGrid};
use crate::layout::geometry::{GridMetrics, EPSILON};
use crate::layout::{LayoutDocument, PageLayout, PageType, Region, RegionId, TileContent, TileInstance, TileType};
use crate::template::Template;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("page {page_index}: '{tile_id}' overlaps '{other_id}' at cell ({row}, {col})")]
    Overlap {
        page_index: usize,
        tile_id: String,
        other_id: String,
        row: usize,
        col: usize,
    },
    #[error("page {page_index}: '{tile_id}' lies outside its {region:?} region")]
    OutOfBounds {
        page_index: usize,
        tile_id: String,
        region: RegionId,
    },
    #[error("page {page_index}: section '{section_id}' header has no items after it")]
    StrandedHeader { page_index: usize, section_id: String },
    #[error("page {page_index}: regions are not stacked header, title, body, footer without gaps")]
    RegionStack { page_index: usize },
    #[error("page {page_index}: page type is {actual:?}, expected {expected:?}")]
    PageType {
        page_index: usize,
        expected: PageType,
        actual: PageType,
    },
}

/// Check a document against the layout invariants for `template`.
pub fn check_document(document: &LayoutDocument, template: &Template) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let last = document.pages.len().saturating_sub(1);

    for (i, page) in document.pages.iter().enumerate() {
        let expected = PageType::for_position(i, i == last);
        if page.page_type != expected {
            violations.push(InvariantViolation::PageType {
                page_index: page.page_index,
                expected,
                actual: page.page_type,
            });
        }

        if !regions_stacked(&page.regions) {
            violations.push(InvariantViolation::RegionStack {
                page_index: page.page_index,
            });
            continue;
        }
        let Some(body) = page.regions.iter().find(|r| r.id == RegionId::Body) else {
            continue;
        };
        let metrics = GridMetrics::new(&template.body, body);

        check_bounds(page, &mut violations);
        check_overlaps(page, &metrics, &mut violations);
        if template.policies.section_header_keep_with_next_items > 0 {
            check_stranded_headers(page, &mut violations);
        }
    }
    violations
}

fn check_bounds(page: &PageLayout, violations: &mut Vec<InvariantViolation>) {
    for tile in &page.tiles {
        let Some(region) = page.regions.iter().find(|r| r.id == tile.region_id) else {
            continue;
        };
        if !inside(tile, region) {
            violations.push(InvariantViolation::OutOfBounds {
                page_index: page.page_index,
                tile_id: tile.id.clone(),
                region: region.id,
            });
        }
    }
}

fn inside(tile: &TileInstance, region: &Region) -> bool {
    tile.x >= region.x - EPSILON
        && tile.y >= region.y - EPSILON
        && tile.x + tile.width <= region.x + region.width + EPSILON
        && tile.y + tile.height <= region.y + region.height + EPSILON
}

fn regions_stacked(regions: &[Region]) -> bool {
    let order = [RegionId::Header, RegionId::Title, RegionId::Body, RegionId::Footer];
    if regions.len() != order.len() {
        return false;
    }
    let mut y = 0.0;
    for (region, id) in regions.iter().zip(order) {
        if region.id != id || (region.y - y).abs() > EPSILON || region.height < 0.0 {
            return false;
        }
        y += region.height;
    }
    true
}

/// Content tiles must not share a logical grid cell. Fillers must not share
/// a drawn cell with anything.
fn check_overlaps(page: &PageLayout, metrics: &GridMetrics, violations: &mut Vec<InvariantViolation>) {
    let body: Vec<&TileInstance> = page.body_tiles().collect();
    let rows = body
        .iter()
        .map(|t| t.grid_row + t.row_span)
        .max()
        .unwrap_or(0);

    let mut logical: Vec<Option<usize>> = vec![None; rows * metrics.cols];
    for (index, tile) in body.iter().enumerate().filter(|(_, t)| t.tile_type != TileType::Filler) {
        for r in tile.grid_row..tile.grid_row + tile.row_span {
            for c in tile.grid_col..(tile.grid_col + tile.col_span).min(metrics.cols) {
                let slot = &mut logical[r * metrics.cols + c];
                match slot {
                    Some(other) => violations.push(overlap(page, tile, body[*other], r, c)),
                    None => *slot = Some(index),
                }
            }
        }
    }

    let mut drawn = CellGrid::new(rows, metrics.cols);
    let mut owner: Vec<Option<usize>> = vec![None; rows * metrics.cols];
    for (index, tile) in body.iter().enumerate().filter(|(_, t)| t.tile_type != TileType::Filler) {
        for (r, c) in tile_cells(tile, metrics) {
            drawn.mark(r, c);
            if r < rows && c < metrics.cols {
                owner[r * metrics.cols + c].get_or_insert(index);
            }
        }
    }
    for (index, tile) in body.iter().enumerate().filter(|(_, t)| t.tile_type == TileType::Filler) {
        for (r, c) in tile_cells(tile, metrics) {
            if drawn.is_marked(r, c) {
                if let Some(other) = owner[r * metrics.cols + c] {
                    violations.push(overlap(page, tile, body[other], r, c));
                }
            } else {
                drawn.mark(r, c);
                if r < rows && c < metrics.cols {
                    owner[r * metrics.cols + c] = Some(index);
                }
            }
        }
    }
}

fn overlap(page: &PageLayout, tile: &TileInstance, other: &TileInstance, row: usize, col: usize) -> InvariantViolation {
    InvariantViolation::Overlap {
        page_index: page.page_index,
        tile_id: tile.id.clone(),
        other_id: other.id.clone(),
        row,
        col,
    }
}

/// Every section header must be followed on its page by an item of its own
/// section.
fn check_stranded_headers(page: &PageLayout, violations: &mut Vec<InvariantViolation>) {
    let body: Vec<&TileInstance> = page.body_tiles().collect();
    for (i, tile) in body.iter().enumerate() {
        let TileContent::SectionHeader { section_id, .. } = &tile.content else {
            continue;
        };
        let followed = body[i + 1..]
            .iter()
            .any(|t| t.tile_type.is_item() && t.section_id() == Some(section_id.as_str()));
        if !followed {
            violations.push(InvariantViolation::StrandedHeader {
                page_index: page.page_index,
                section_id: section_id.clone(),
            });
        }
    }
}
