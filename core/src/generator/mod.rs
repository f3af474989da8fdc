use ndarray::Array2;

use crate::*;
pub use random::*;

mod random;

/// Lays mines on an empty grid, given the cell of the opening click.
pub trait MineGenerator {
    /// Places exactly `mines` mines and fills in every cell's adjacent-mine count.
    ///
    /// Every round starts from blank cells, whatever the grid held before.
    fn place_mines(&mut self, grid: &mut Array2<Cell>, start: Coord2, mines: CellCount);
}

/// Marks `coords` as a mine and bumps the count of each neighbour.
pub(crate) fn lay_mine(grid: &mut Array2<Cell>, coords: Coord2) {
    grid[coords.to_nd_index()].flags.insert(CellFlags::MINE);
    for pos in grid.iter_neighbors(coords) {
        grid[pos.to_nd_index()].adjacent += 1;
    }
}

/// Wipes the grid back to blank cells: no mines, counts, flags or reveals.
pub(crate) fn clear_mines(grid: &mut Array2<Cell>) {
    grid.fill(Cell::default());
}
