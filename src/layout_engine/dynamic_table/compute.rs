use serde::Serialize;
use tracing::trace;

use crate::layout_engine::container::{LayoutChild, visible_children};
use crate::layout_engine::geometry::{Rect, Size};
use crate::layout_engine::request::SizingMode;

/// Grid dimensions and coordinate tables derived from one layout pass.
///
/// `column_coords` holds `columns + 1` offsets and `row_coords` holds
/// `rows + 1` offsets. Both always contain at least the leading `0.0`, even
/// when there is nothing to lay out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridMetrics {
    pub number_children: usize,
    pub rows: usize,
    pub columns: usize,
    /// Uniform width shared by every column.
    pub cell_width: f64,
    /// Uniform height fitted when rows are derived from a fixed height.
    /// Row extents themselves follow the tallest child of each row.
    pub cell_height: f64,
    pub row_spacing: f64,
    pub column_spacing: f64,
    pub column_coords: Vec<f64>,
    pub row_coords: Vec<f64>,
    /// Tallest natural height of each row.
    pub row_heights: Vec<f64>,
}

impl GridMetrics {
    pub fn empty(row_spacing: f64, column_spacing: f64) -> Self {
        Self {
            number_children: 0,
            rows: 0,
            columns: 0,
            cell_width: 0.0,
            cell_height: 0.0,
            row_spacing,
            column_spacing,
            column_coords: vec![0.0],
            row_coords: vec![0.0],
            row_heights: Vec::new(),
        }
    }

    pub fn min_width(&self) -> f64 {
        if self.columns == 0 {
            return 0.0;
        }
        (self.columns - 1) as f64 * self.column_spacing
    }

    pub fn natural_width(&self) -> f64 {
        if self.columns == 0 {
            return 0.0;
        }
        self.column_coords[self.columns]
    }

    pub fn min_height(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        (self.rows - 1) as f64 * self.row_spacing
    }

    pub fn natural_height(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        self.row_coords[self.rows]
    }

    /// Rectangle of the `index`-th visible child, counting visible children
    /// only. Spacing is cut from the trailing edge of every cell, the last row
    /// and column included; a cell never gets a negative extent.
    pub fn cell_rect(&self, index: usize) -> Option<Rect> {
        if index >= self.number_children || self.columns == 0 {
            return None;
        }
        let column = index % self.columns;
        let row = index / self.columns;

        let x1 = self.column_coords[column];
        let x2 = self.column_coords[column + 1] - self.column_spacing;
        let y1 = self.row_coords[row];
        let y2 = self.row_coords[row + 1] - self.row_spacing;
        Some(Rect::from_edges(x1, y1, x2, y2))
    }
}

/// Lays out the visible `children` as a table of uniform columns.
pub fn compute_grid<C: LayoutChild>(
    children: &[C],
    mode: SizingMode,
    row_spacing: f64,
    column_spacing: f64,
) -> GridMetrics {
    let sizes: Vec<Size> =
        visible_children(children).map(|(_, child)| child.natural_size()).collect();
    let number_children = sizes.len();
    if number_children == 0 {
        return GridMetrics::empty(row_spacing, column_spacing);
    }

    let largest = sizes.iter().fold(Size::default(), |acc, size| {
        Size::new(acc.width.max(size.width), acc.height.max(size.height))
    });

    let (columns, cell_width, cell_height) = match mode {
        SizingMode::Strip => (number_children, largest.width, largest.height),
        SizingMode::HeightForWidth(width) => {
            let (columns, cell_width) =
                fit_cells(width, largest.width, column_spacing, number_children);
            (columns, cell_width, largest.height)
        }
        SizingMode::WidthForHeight(height) => {
            let (rows, cell_height) =
                fit_cells(height, largest.height, row_spacing, number_children);
            (number_children.div_ceil(rows), largest.width, cell_height)
        }
    };
    // With a fixed height the fitted row count can exceed what the resulting
    // column count fills, so rows always follow from the columns.
    let rows = number_children.div_ceil(columns);

    let mut column_coords = Vec::with_capacity(columns + 1);
    let mut x = 0.0;
    for _ in 0..columns {
        column_coords.push(x);
        x += cell_width + column_spacing;
    }
    column_coords.push(x);

    let mut row_coords = Vec::with_capacity(rows + 1);
    let mut row_heights = Vec::with_capacity(rows);
    let mut y = 0.0;
    let mut tallest: f64 = 0.0;
    for (index, size) in sizes.iter().enumerate() {
        if index % columns == 0 {
            if index > 0 {
                row_heights.push(tallest);
                y += tallest + row_spacing;
            }
            row_coords.push(y);
            tallest = 0.0;
        }
        tallest = tallest.max(size.height);
    }
    row_heights.push(tallest);
    row_coords.push(y + tallest);

    trace!(?mode, ?largest, columns, rows, cell_width, "computed table grid");

    GridMetrics {
        number_children,
        rows,
        columns,
        cell_width,
        cell_height,
        row_spacing,
        column_spacing,
        column_coords,
        row_coords,
        row_heights,
    }
}

/// Finds how many cells of `largest` extent fit into `available` with
/// `spacing` between them, and the uniform extent each one then gets.
/// Never returns fewer than one cell.
fn fit_cells(available: f64, largest: f64, spacing: f64, count: usize) -> (usize, f64) {
    let upper = if largest > 0.0 {
        ((available / largest).ceil() as usize).min(count)
    } else {
        count
    };

    let mut cells = upper.max(1);
    while cells > 1 && span(cells, largest, spacing) > available {
        cells -= 1;
    }

    let extent = ((available - (cells - 1) as f64 * spacing).floor() / cells as f64).max(0.0);
    (cells, extent)
}

fn span(cells: usize, extent: f64, spacing: f64) -> f64 {
    cells as f64 * extent + (cells - 1) as f64 * spacing
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::dynamic_table::testing::Item;

    fn uniform(count: usize, width: f64, height: f64) -> Vec<Item> {
        (0..count).map(|_| Item::new(width, height)).collect()
    }

    #[test]
    fn unconstrained_layout_is_a_single_row() {
        let items = uniform(5, 10.0, 20.0);
        let grid = compute_grid(&items, SizingMode::Strip, 3.0, 4.0);

        assert_eq!(grid.rows, 1);
        assert_eq!(grid.columns, 5);
        assert_eq!(grid.column_coords, vec![0.0, 14.0, 28.0, 42.0, 56.0, 70.0]);
        assert_eq!(grid.row_coords, vec![0.0, 20.0]);
        assert_eq!(grid.natural_width(), 70.0);
        assert_eq!(grid.min_width(), 16.0);
    }

    #[test]
    fn fixed_width_fits_as_many_columns_as_possible() {
        let items = uniform(7, 50.0, 30.0);
        let grid = compute_grid(&items, SizingMode::HeightForWidth(200.0), 5.0, 10.0);

        assert_eq!(grid.columns, 3);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.cell_width, 60.0);
        assert_eq!(grid.column_coords, vec![0.0, 70.0, 140.0, 210.0]);
        assert_eq!(grid.row_coords, vec![0.0, 35.0, 70.0, 100.0]);
        assert_eq!(grid.natural_height(), 100.0);
        assert_eq!(grid.min_height(), 10.0);
    }

    #[test]
    fn rows_take_the_height_of_their_tallest_child() {
        let items: Vec<Item> =
            [10.0, 40.0, 20.0, 5.0, 15.0].into_iter().map(|h| Item::new(50.0, h)).collect();
        let grid = compute_grid(&items, SizingMode::HeightForWidth(100.0), 4.0, 0.0);

        assert_eq!(grid.columns, 2);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.row_heights, vec![40.0, 20.0, 15.0]);
        assert_eq!(grid.row_coords, vec![0.0, 44.0, 68.0, 83.0]);

        let total: f64 = grid.row_heights.iter().sum::<f64>()
            + (grid.rows - 1) as f64 * grid.row_spacing;
        assert_eq!(total, *grid.row_coords.last().unwrap());
    }

    #[test]
    fn fixed_height_fits_rows_then_derives_columns() {
        let items = uniform(5, 20.0, 30.0);
        let grid = compute_grid(&items, SizingMode::WidthForHeight(100.0), 10.0, 0.0);

        assert_eq!(grid.rows, 2);
        assert_eq!(grid.columns, 3);
        assert_eq!(grid.cell_height, 45.0);
        assert_eq!(grid.cell_width, 20.0);
        assert_eq!(grid.column_coords.len(), 4);
        assert_eq!(grid.row_coords, vec![0.0, 40.0, 70.0]);
    }

    #[test]
    fn fixed_height_row_count_matches_the_filled_rows() {
        // Four rows fit, but two columns only ever fill three of them.
        let items = uniform(5, 20.0, 30.0);
        let grid = compute_grid(&items, SizingMode::WidthForHeight(130.0), 0.0, 0.0);

        assert_eq!(grid.columns, 2);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.row_coords.len(), grid.rows + 1);
        assert_eq!(grid.natural_height(), 90.0);
    }

    #[test]
    fn nothing_visible_yields_an_empty_grid() {
        let items = vec![Item::hidden(10.0, 10.0), Item::hidden(20.0, 20.0)];
        for mode in [
            SizingMode::Strip,
            SizingMode::HeightForWidth(100.0),
            SizingMode::WidthForHeight(100.0),
        ] {
            let grid = compute_grid(&items, mode, 2.0, 2.0);
            assert_eq!(grid.number_children, 0);
            assert_eq!(grid.rows, 0);
            assert_eq!(grid.columns, 0);
            assert_eq!(grid.column_coords, vec![0.0]);
            assert_eq!(grid.row_coords, vec![0.0]);
            assert_eq!(grid.natural_width(), 0.0);
            assert_eq!(grid.min_height(), 0.0);
            assert_eq!(grid.cell_rect(0), None);
        }
    }

    #[test]
    fn single_child_gets_one_cell() {
        let items = uniform(1, 64.0, 48.0);
        let grid = compute_grid(&items, SizingMode::HeightForWidth(1000.0), 6.0, 6.0);

        assert_eq!((grid.rows, grid.columns), (1, 1));
        assert_eq!(grid.cell_width, 1000.0);
        assert_eq!(grid.cell_rect(0), Some(Rect::from_edges(0.0, 0.0, 1000.0, 42.0)));
    }

    #[test]
    fn hidden_children_do_not_affect_sizing() {
        let items = vec![
            Item::new(30.0, 30.0),
            Item::hidden(500.0, 500.0),
            Item::new(30.0, 30.0),
        ];
        let grid = compute_grid(&items, SizingMode::Strip, 0.0, 0.0);

        assert_eq!(grid.number_children, 2);
        assert_eq!(grid.cell_width, 30.0);
        assert_eq!(grid.natural_width(), 60.0);
        assert_eq!(grid.natural_height(), 30.0);
    }

    #[test]
    fn width_narrower_than_any_child_still_gets_one_column() {
        let items = uniform(3, 50.0, 10.0);
        let grid = compute_grid(&items, SizingMode::HeightForWidth(30.0), 0.0, 5.0);

        assert_eq!(grid.columns, 1);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.cell_width, 30.0);
    }

    #[test]
    fn zero_width_constraint_keeps_one_column() {
        let items = uniform(4, 50.0, 10.0);
        let grid = compute_grid(&items, SizingMode::HeightForWidth(0.0), 0.0, 5.0);

        assert_eq!(grid.columns, 1);
        assert_eq!(grid.rows, 4);
        assert_eq!(grid.cell_width, 0.0);
    }

    #[test]
    fn zero_sized_children_are_limited_by_spacing() {
        let items = uniform(4, 0.0, 0.0);
        let grid = compute_grid(&items, SizingMode::HeightForWidth(25.0), 0.0, 10.0);

        assert_eq!(grid.columns, 3);
        assert_eq!(grid.rows, 2);
        assert!(grid.cell_width >= 0.0);
    }

    #[test]
    fn chosen_column_count_fits_and_is_maximal() {
        let largest = 37.0;
        let spacing = 6.0;
        let count = 9;
        let items = uniform(count, largest, 12.0);

        for width in (0..=400).step_by(7) {
            let width = width as f64;
            let grid = compute_grid(&items, SizingMode::HeightForWidth(width), 0.0, spacing);
            let columns = grid.columns;

            assert!(columns >= 1 && columns <= count);
            assert!(
                columns as f64 * grid.cell_width + (columns - 1) as f64 * spacing <= width + 1e-9,
                "{columns} columns overflow {width}"
            );
            if columns < count {
                let next = (columns + 1) as f64 * largest + columns as f64 * spacing;
                assert!(next > width, "{} columns would have fit into {width}", columns + 1);
            }
            assert_eq!(grid.rows, count.div_ceil(columns));
            assert_eq!(grid.column_coords.len(), columns + 1);
            assert_eq!(grid.row_coords.len(), grid.rows + 1);
        }
    }

    #[test]
    fn cells_in_a_row_or_column_line_up() {
        let items: Vec<Item> = (0..8)
            .map(|i| Item::new(40.0 + i as f64, 10.0 + (i * 7 % 5) as f64))
            .collect();
        let grid = compute_grid(&items, SizingMode::HeightForWidth(160.0), 3.0, 2.0);
        let rects: Vec<Rect> = (0..grid.number_children).map(|i| grid.cell_rect(i).unwrap()).collect();

        for (i, a) in rects.iter().enumerate() {
            for (j, b) in rects.iter().enumerate() {
                if i / grid.columns == j / grid.columns {
                    assert_eq!((a.min_y(), a.max_y()), (b.min_y(), b.max_y()));
                }
                if i % grid.columns == j % grid.columns {
                    assert_eq!((a.min_x(), a.max_x()), (b.min_x(), b.max_x()));
                }
            }
            assert_eq!(a.width(), grid.cell_width);
            let row = i / grid.columns;
            let expected = if row + 1 == grid.rows {
                grid.row_heights[row] - grid.row_spacing
            } else {
                grid.row_heights[row]
            };
            assert_eq!(a.height(), expected);
        }
    }

    #[test]
    fn spacing_is_cut_from_the_trailing_edge() {
        let items = uniform(4, 20.0, 10.0);
        let grid = compute_grid(&items, SizingMode::HeightForWidth(50.0), 5.0, 10.0);

        assert_eq!((grid.rows, grid.columns), (2, 2));
        assert_eq!(grid.cell_rect(0), Some(Rect::from_edges(0.0, 0.0, 20.0, 10.0)));
        assert_eq!(grid.cell_rect(1), Some(Rect::from_edges(30.0, 0.0, 50.0, 10.0)));
        assert_eq!(grid.cell_rect(2), Some(Rect::from_edges(0.0, 15.0, 20.0, 20.0)));
        assert_eq!(grid.cell_rect(3), Some(Rect::from_edges(30.0, 15.0, 50.0, 20.0)));
        assert_eq!(grid.cell_rect(4), None);
    }

    #[test]
    fn last_row_loses_its_trailing_spacing_too() {
        let items = uniform(4, 20.0, 10.0);
        let grid = compute_grid(&items, SizingMode::HeightForWidth(50.0), 5.0, 10.0);

        assert_eq!(grid.row_coords, vec![0.0, 15.0, 25.0]);
        let last = grid.cell_rect(2).unwrap();
        assert_eq!(last.min_y(), 15.0);
        assert_eq!(last.max_y(), grid.row_coords[2] - grid.row_spacing);
        assert_eq!(last.max_y(), 20.0);
    }

    #[test]
    fn spacing_wider_than_a_row_collapses_the_cell() {
        let items = uniform(1, 20.0, 4.0);
        let grid = compute_grid(&items, SizingMode::Strip, 10.0, 0.0);

        let rect = grid.cell_rect(0).unwrap();
        assert_eq!(rect.min_y(), 0.0);
        assert_eq!(rect.height(), 0.0);
        assert_eq!(rect.width(), 20.0);
    }
}
