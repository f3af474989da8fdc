use core::time::Duration;
use std::collections::VecDeque;

use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Produced once per won game, the UI pairs it with a player id to submit a score.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    elapsed: Duration,
}

impl Completion {
    pub const fn new(elapsed: Duration) -> Self {
        Self { elapsed }
    }

    pub const fn elapsed(self) -> Duration {
        self.elapsed
    }

    pub fn duration_nanos(self) -> u64 {
        self.elapsed.as_nanos().try_into().unwrap_or(u64::MAX)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Nothing changed, the reason is informational only.
    Rejected(GameError),
    Continuing,
    Lost,
    Won(Completion),
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    Rejected(GameError),
    Flagged,
    Unflagged,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Clock {
    Ready,
    Running(Instant),
    Stopped(Duration),
}

/// One game session: the grid, its lazily generated mines, and the timer.
///
/// Not synchronized, hosts sharing it across threads must serialize access themselves.
#[derive(Clone, Debug)]
pub struct Minefield {
    config: GameConfig,
    grid: Array2<Cell>,
    rng: SmallRng,
    generated: bool,
    safe_cells_left: CellCount,
    flagged_count: CellCount,
    click_count: u32,
    clock: Clock,
    outcome: Outcome,
    detonated: Option<Coord2>,
}

impl Minefield {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let side = usize::from(config.side());
        Self {
            config,
            grid: Array2::default((side, side)),
            rng: SmallRng::seed_from_u64(seed),
            generated: false,
            safe_cells_left: config.safe_cells(),
            flagged_count: 0,
            click_count: 0,
            clock: Clock::Ready,
            outcome: Outcome::InProgress,
            detonated: None,
        }
    }

    /// Session over a fixed mine layout, skipping random generation.
    pub fn with_layout(side: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let mut grid: Array2<Cell> = Array2::default((usize::from(side), usize::from(side)));
        let mut mines: CellCount = 0;
        for &coords in mine_coords {
            if coords.0 >= side || coords.1 >= side {
                return Err(GameError::InvalidCoords);
            }
            if grid[coords.to_nd_index()].is_mine() {
                continue;
            }
            lay_mine(&mut grid, coords);
            mines += 1;
        }
        if mines == 0 {
            return Err(GameError::NoMines);
        }

        let config = GameConfig::new_unchecked(side, mines);
        let mut minefield = Self::new(config, 0);
        minefield.grid = grid;
        minefield.generated = true;
        Ok(minefield)
    }

    /// Starts over with a fresh seed, mines are only placed on the next first reveal.
    pub fn reset(&mut self, seed: u64) {
        self.grid.fill(Cell::default());
        self.rng = SmallRng::seed_from_u64(seed);
        self.generated = false;
        self.safe_cells_left = self.config.safe_cells();
        self.flagged_count = 0;
        self.click_count = 0;
        self.clock = Clock::Ready;
        self.outcome = Outcome::InProgress;
        self.detonated = None;
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn side(&self) -> Coord {
        self.config.side()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_finished()
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    /// Safe cells still hidden, zero means the game is won.
    pub fn safe_cells_left(&self) -> CellCount {
        self.safe_cells_left
    }

    /// Mines minus flags, negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        (self.config.mines() as isize) - (self.flagged_count as isize)
    }

    /// Zero before the first reveal, frozen once the game ends.
    pub fn elapsed(&self) -> Duration {
        match self.clock {
            Clock::Ready => Duration::ZERO,
            Clock::Running(started_at) => started_at.elapsed(),
            Clock::Stopped(elapsed) => elapsed,
        }
    }

    pub fn detonated(&self) -> Option<Coord2> {
        self.detonated
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<Cell> {
        let coords = self.config.validate_coords(coords).ok()?;
        Some(self.grid[coords.to_nd_index()])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.grid
            .indexed_iter()
            .map(|((row, col), &cell)| ((col as Coord, row as Coord), cell))
    }

    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        self.try_reveal(coords).unwrap_or_else(|err| {
            log::trace!("Reveal at {:?} rejected: {}", coords, err);
            RevealOutcome::Rejected(err)
        })
    }

    /// Same as [`Minefield::reveal`] but reports why a move was refused.
    pub fn try_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.config.validate_coords(coords)?;
        self.check_in_progress()?;

        let cell = self.grid[coords.to_nd_index()];
        if cell.is_revealed() {
            return Err(GameError::AlreadyRevealed);
        }
        if cell.is_flagged() {
            return Err(GameError::Flagged);
        }

        if !self.generated {
            // generation starts from a blank board, early flags included
            self.flagged_count = 0;
            RejectionSampler::new(&mut self.rng).place_mines(
                &mut self.grid,
                coords,
                self.config.mines(),
            );
            self.generated = true;
        }
        if matches!(self.clock, Clock::Ready) {
            self.clock = Clock::Running(Instant::now());
        }
        self.click_count += 1;

        if self.grid[coords.to_nd_index()].is_mine() {
            self.grid[coords.to_nd_index()]
                .flags
                .insert(CellFlags::DETONATED);
            self.detonated = Some(coords);
            self.end_game(Outcome::Lost);
            return Ok(RevealOutcome::Lost);
        }

        self.cascade(coords);

        if self.safe_cells_left == 0 {
            let elapsed = self.end_game(Outcome::Won);
            Ok(RevealOutcome::Won(Completion::new(elapsed)))
        } else {
            Ok(RevealOutcome::Continuing)
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> FlagOutcome {
        self.try_toggle_flag(coords).unwrap_or_else(|err| {
            log::trace!("Flag at {:?} rejected: {}", coords, err);
            FlagOutcome::Rejected(err)
        })
    }

    pub fn try_toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.config.validate_coords(coords)?;
        self.check_in_progress()?;

        let cell = &mut self.grid[coords.to_nd_index()];
        if cell.is_revealed() {
            return Err(GameError::AlreadyRevealed);
        }

        cell.flags.toggle(CellFlags::FLAGGED);
        Ok(if cell.is_flagged() {
            self.flagged_count += 1;
            FlagOutcome::Flagged
        } else {
            self.flagged_count -= 1;
            FlagOutcome::Unflagged
        })
    }

    /// Breadth-first reveal from `origin`, expanding through cells with no adjacent mines.
    fn cascade(&mut self, origin: Coord2) {
        let mut to_visit = VecDeque::from([origin]);

        while let Some(coords) = to_visit.pop_front() {
            let cell = &mut self.grid[coords.to_nd_index()];
            if cell.is_revealed() {
                continue;
            }

            cell.flags.insert(CellFlags::REVEALED);
            if cell.is_flagged() {
                cell.flags.remove(CellFlags::FLAGGED);
                self.flagged_count -= 1;
            }
            self.safe_cells_left -= 1;

            if cell.adjacent_mines() == 0 {
                let grid = &self.grid;
                to_visit.extend(
                    grid.iter_neighbors(coords)
                        .filter(|&pos| !grid[pos.to_nd_index()].is_revealed()),
                );
            }
        }
        log::trace!(
            "Cascade from {:?} done, {} safe cells left",
            origin,
            self.safe_cells_left
        );
    }

    fn end_game(&mut self, outcome: Outcome) -> Duration {
        let elapsed = self.elapsed();
        self.clock = Clock::Stopped(elapsed);
        self.outcome = outcome;
        for cell in self.grid.iter_mut() {
            cell.flags.insert(CellFlags::REVEALED);
        }
        log::debug!("Game ended {:?} after {:?}", outcome, elapsed);
        elapsed
    }

    fn check_in_progress(&self) -> Result<()> {
        if self.outcome.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
