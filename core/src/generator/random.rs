use rand::Rng;

use super::*;

/// Boards tried before giving up on pure rejection sampling.
pub const MAX_REJECTION_ROUNDS: u32 = 10_000;

/// Uniformly scatters mines, throwing the whole board away until the starting cell is a zero.
///
/// Past [`MAX_REJECTION_ROUNDS`] it falls back to keeping the 3x3 zone around the start clear
/// up front, so very dense boards still terminate.
#[derive(Debug)]
pub struct RejectionSampler<R> {
    rng: R,
    max_rounds: u32,
}

impl<R: Rng> RejectionSampler<R> {
    pub fn new(rng: R) -> Self {
        Self::with_max_rounds(rng, MAX_REJECTION_ROUNDS)
    }

    pub fn with_max_rounds(rng: R, max_rounds: u32) -> Self {
        Self { rng, max_rounds }
    }

    fn scatter(&mut self, grid: &mut Array2<Cell>, mines: CellCount) {
        let cols = grid.ncols();
        let total = grid.len();
        let mut placed = 0;
        while placed < mines {
            let index = self.rng.random_range(0..total);
            let coords = index_to_coords(index, cols);
            if grid[coords.to_nd_index()].is_mine() {
                continue;
            }
            lay_mine(grid, coords);
            placed += 1;
        }
    }

    fn scatter_outside(&mut self, grid: &mut Array2<Cell>, excluded: &[Coord2], mines: CellCount) {
        let cols = grid.ncols();
        let candidates: Vec<Coord2> = (0..grid.len())
            .map(|index| index_to_coords(index, cols))
            .filter(|coords| !excluded.contains(coords))
            .collect();

        let amount = usize::from(mines).min(candidates.len());
        for index in rand::seq::index::sample(&mut self.rng, candidates.len(), amount) {
            lay_mine(grid, candidates[index]);
        }
    }
}

impl<R: Rng> MineGenerator for RejectionSampler<R> {
    fn place_mines(&mut self, grid: &mut Array2<Cell>, start: Coord2, mines: CellCount) {
        for round in 1..=self.max_rounds {
            clear_mines(grid);
            self.scatter(grid, mines);

            let start_cell = grid[start.to_nd_index()];
            if !start_cell.is_mine() && start_cell.adjacent_mines() == 0 {
                log::debug!("Generated minefield around {:?} in {} round(s)", start, round);
                return;
            }
        }

        log::warn!(
            "No zero start after {} rounds, clearing the start zone directly",
            self.max_rounds
        );
        clear_mines(grid);

        let mines_usize = usize::from(mines);
        let mut excluded: Vec<Coord2> = grid.iter_neighbors(start).collect();
        excluded.push(start);
        if mines_usize + excluded.len() > grid.len() {
            if mines_usize < grid.len() {
                log::warn!("Cannot make start cell zero, fallback to simple safe");
                excluded = vec![start];
            } else {
                log::warn!("Minefield already full, start cell cannot be safe");
                excluded.clear();
            }
        }
        self.scatter_outside(grid, &excluded, mines);
    }
}

fn index_to_coords(index: usize, cols: usize) -> Coord2 {
    // grids never exceed Coord::MAX on either axis
    ((index % cols) as Coord, (index / cols) as Coord)
}
