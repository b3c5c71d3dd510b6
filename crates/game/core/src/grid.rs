//! Placement grid and cell occupancy.
//!
//! The grid maps world positions onto discrete cells. Occupancy is keyed by
//! the integer `(column, row)` index, so float drift in world coordinates can
//! never alias two cells or split one.

use std::fmt;

use crate::types::Vec2;

/// Discrete grid coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub column: u32,
    pub row: u32,
}

impl Cell {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Fixed-size placement grid.
///
/// `origin` is the world position of the lower-left corner of cell `(0, 0)`;
/// columns grow along +x and rows along +y.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    origin: Vec2,
    columns: u32,
    rows: u32,
    cell_size: f32,
    busy: Vec<bool>,
}

impl Grid {
    pub fn new(origin: Vec2, columns: u32, rows: u32, cell_size: f32) -> Self {
        Self {
            origin,
            columns,
            rows,
            cell_size,
            busy: vec![false; columns as usize * rows as usize],
        }
    }

    /// Grid whose bottom edge is centred horizontally on `anchor`.
    pub fn centered(anchor: Vec2, columns: u32, rows: u32, cell_size: f32) -> Self {
        let origin = Vec2::new(anchor.x - columns as f32 * cell_size / 2.0, anchor.y);
        Self::new(origin, columns, rows, cell_size)
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space extent covered by the grid.
    pub fn size(&self) -> Vec2 {
        Vec2::new(
            self.columns as f32 * self.cell_size,
            self.rows as f32 * self.cell_size,
        )
    }

    /// Validates a `(column, row)` index.
    pub fn cell(&self, column: u32, row: u32) -> Option<Cell> {
        (column < self.columns && row < self.rows).then_some(Cell::new(column, row))
    }

    /// Cell containing `world`, or `None` outside the grid.
    ///
    /// Cells are half-open: the lower-left edges belong to the cell, the
    /// upper-right edges belong to its neighbours.
    pub fn cell_at(&self, world: Vec2) -> Option<Cell> {
        let local = (world - self.origin) / self.cell_size;
        if !(local.x >= 0.0 && local.y >= 0.0) {
            return None;
        }
        let column = local.x.floor();
        let row = local.y.floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }
        Some(Cell::new(column as u32, row as u32))
    }

    /// Lower-left corner of `cell` in world space.
    pub fn world_position(&self, cell: Cell) -> Vec2 {
        self.origin + Vec2::new(cell.column as f32, cell.row as f32) * self.cell_size
    }

    /// Centre of `cell` in world space.
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        self.world_position(cell) + Vec2::splat(self.cell_size / 2.0)
    }

    /// Snaps `world` to the centre of the cell containing it.
    pub fn nearest_cell_center(&self, world: Vec2) -> Option<Vec2> {
        self.cell_at(world).map(|cell| self.cell_center(cell))
    }

    /// Returns true if `cell` is inside the grid and occupied.
    pub fn is_busy(&self, cell: Cell) -> bool {
        self.slot(cell).is_some_and(|index| self.busy[index])
    }

    /// Marks `cell` occupied or free. Returns false if `cell` is outside the grid.
    pub fn set_busy(&mut self, cell: Cell, busy: bool) -> bool {
        match self.slot(cell) {
            Some(index) => {
                self.busy[index] = busy;
                true
            }
            None => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.busy.iter().filter(|busy| **busy).count()
    }

    /// Every cell, row by row from the bottom.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |column| Cell::new(column, row)))
    }

    fn slot(&self, cell: Cell) -> Option<usize> {
        self.cell(cell.column, cell.row)
            .map(|cell| cell.row as usize * self.columns as usize + cell.column as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_by_five() -> Grid {
        Grid::new(Vec2::ZERO, 10, 5, 1.0)
    }

    #[test]
    fn queries_outside_bounds_return_no_cell() {
        let grid = ten_by_five();

        assert_eq!(grid.cell_at(Vec2::new(-0.01, 2.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(10.0, 2.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(3.0, 5.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(3.0, -1.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(f32::NAN, 1.0)), None);
        assert_eq!(grid.nearest_cell_center(Vec2::new(25.0, 1.0)), None);
    }

    #[test]
    fn queries_inside_bounds_snap_to_cell_centres() {
        let grid = ten_by_five();

        assert_eq!(grid.cell_at(Vec2::ZERO), Some(Cell::new(0, 0)));
        assert_eq!(grid.cell_at(Vec2::new(9.99, 4.99)), Some(Cell::new(9, 4)));
        assert_eq!(
            grid.nearest_cell_center(Vec2::new(3.2, 1.7)),
            Some(Vec2::new(3.5, 1.5))
        );
    }

    #[test]
    fn centered_grid_straddles_the_anchor() {
        let grid = Grid::centered(Vec2::new(0.0, -2.0), 10, 5, 1.0);

        assert_eq!(grid.origin(), Vec2::new(-5.0, -2.0));
        assert_eq!(grid.cell_at(Vec2::new(-0.5, -1.5)), Some(Cell::new(4, 0)));
        assert_eq!(grid.cell_center(Cell::new(5, 0)), Vec2::new(0.5, -1.5));
    }

    #[test]
    fn index_and_world_conversions_agree() {
        let grid = Grid::new(Vec2::new(2.0, 1.0), 4, 3, 0.5);

        for cell in grid.cells() {
            assert_eq!(grid.cell_at(grid.cell_center(cell)), Some(cell));
            assert_eq!(grid.cell_at(grid.world_position(cell)), Some(cell));
        }
        assert_eq!(grid.cells().count(), 12);
        assert_eq!(grid.cell(4, 0), None);
    }

    #[test]
    fn occupancy_is_keyed_by_index() {
        let mut grid = ten_by_five();
        let cell = Cell::new(2, 3);

        assert!(!grid.is_busy(cell));
        assert!(grid.set_busy(cell, true));
        assert!(grid.is_busy(cell));
        assert_eq!(grid.occupied_count(), 1);

        assert!(!grid.set_busy(Cell::new(10, 0), true));
        assert!(!grid.is_busy(Cell::new(10, 0)));

        grid.set_busy(cell, false);
        assert_eq!(grid.occupied_count(), 0);
    }
}
