//! # Last-Row Balancing
//!
//! Shifts the final, partially-filled row of item tiles on a page according
//! to the template's balancing policy. Only `x` moves. `gridCol` keeps the
//! logical column the tile was placed in, so a centered row can sit between
//! grid columns on screen.

use super::geometry::GridMetrics;
use super::{RegionId, TileInstance};
use crate::template::RowBalancing;

/// Balance the last item row among `tiles`.
///
/// Returns the x offset applied, or `None` when nothing moved.
pub fn balance_last_row(
    tiles: &mut [TileInstance],
    policy: RowBalancing,
    metrics: &GridMetrics,
) -> Option<f64> {
    let is_candidate = |t: &TileInstance| t.region_id == RegionId::Body && t.tile_type.is_item();

    let last_row = tiles.iter().filter(|t| is_candidate(t)).map(|t| t.grid_row).max()?;

    let occupied: usize = tiles
        .iter()
        .filter(|t| is_candidate(t) && t.grid_row == last_row)
        .map(|t| t.col_span)
        .sum();
    if occupied >= metrics.cols {
        return None;
    }
    let empty_cols = (metrics.cols - occupied) as f64;

    let offset = match policy {
        RowBalancing::Left => return None,
        RowBalancing::Right => empty_cols * metrics.column_pitch(),
        RowBalancing::Center => (empty_cols / 2.0) * metrics.column_pitch(),
    };

    for tile in tiles
        .iter_mut()
        .filter(|t| is_candidate(t) && t.grid_row == last_row)
    {
        tile.x += offset;
    }
    Some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Region, TileContent, TileType};
    use crate::template::GridConfig;

    fn metrics() -> GridMetrics {
        let body = Region {
            id: RegionId::Body,
            x: 0.0,
            y: 0.0,
            width: 430.0,
            height: 1000.0,
        };
        let grid = GridConfig {
            cols: 4,
            row_height: 100.0,
            gap_x: 10.0,
            gap_y: 10.0,
        };
        GridMetrics::new(&grid, &body)
    }

    fn tile(tile_type: TileType, row: usize, col: usize, m: &GridMetrics) -> TileInstance {
        TileInstance {
            id: format!("t-{}-{}", row, col),
            tile_type,
            region_id: RegionId::Body,
            x: m.column_x(col),
            y: m.row_y(row),
            width: m.footprint_width(1),
            height: m.footprint_height(1),
            col_span: 1,
            row_span: 1,
            grid_row: row,
            grid_col: col,
            layer: 1,
            content: TileContent::Title {
                text: String::new(),
            },
        }
    }

    fn row_of(n: usize, m: &GridMetrics) -> Vec<TileInstance> {
        let mut tiles = vec![tile(TileType::SectionHeader, 0, 0, m)];
        tiles[0].col_span = 4;
        for i in 0..n {
            tiles.push(tile(TileType::ItemCard, 1 + i / 4, i % 4, m));
        }
        tiles
    }

    #[test]
    fn test_center_shifts_by_half_empty_columns() {
        let m = metrics();
        let mut tiles = row_of(5, &m);
        let offset = balance_last_row(&mut tiles, RowBalancing::Center, &m).unwrap();
        // 3 empty columns * 110 / 2
        assert!((offset - 165.0).abs() < 0.001);
        assert!((tiles[5].x - 165.0).abs() < 0.001);
        assert_eq!(tiles[5].grid_col, 0);
        // Full row above untouched.
        assert!((tiles[1].x - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_right_shifts_by_all_empty_columns() {
        let m = metrics();
        let mut tiles = row_of(6, &m);
        let offset = balance_last_row(&mut tiles, RowBalancing::Right, &m).unwrap();
        assert!((offset - 220.0).abs() < 0.001);
        assert!((tiles[5].x - 220.0).abs() < 0.001);
        assert!((tiles[6].x - 330.0).abs() < 0.001);
    }

    #[test]
    fn test_left_and_full_rows_are_noops() {
        let m = metrics();
        let mut tiles = row_of(5, &m);
        assert_eq!(balance_last_row(&mut tiles, RowBalancing::Left, &m), None);
        assert!((tiles[5].x - 0.0).abs() < 0.001);

        let mut full = row_of(8, &m);
        assert_eq!(balance_last_row(&mut full, RowBalancing::Center, &m), None);
    }

    #[test]
    fn test_headers_are_not_balanced() {
        let m = metrics();
        let mut tiles = row_of(0, &m);
        tiles[0].col_span = 1;
        assert_eq!(balance_last_row(&mut tiles, RowBalancing::Center, &m), None);
        assert!((tiles[0].x - 0.0).abs() < 0.001);
    }
}
