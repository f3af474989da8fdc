use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use ranking::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod ranking;
mod tile;
mod types;

/// Side of the classic board.
pub const DEFAULT_SIDE: Coord = 13;

/// Fraction of the cells holding a mine on the classic board.
pub const DEFAULT_DENSITY: f32 = 0.15;

/// Cells that must stay clear so the first click can open a zero: itself plus 8 neighbours.
const START_ZONE_CELLS: CellCount = 9;

/// Shape of a square minefield.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig")]
pub struct GameConfig {
    side: Coord,
    mines: CellCount,
}

#[derive(Deserialize)]
struct RawGameConfig {
    side: Coord,
    mines: CellCount,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = GameError;

    fn try_from(raw: RawGameConfig) -> Result<Self> {
        Self::new(raw.side, raw.mines)
    }
}

impl GameConfig {
    pub(crate) const fn new_unchecked(side: Coord, mines: CellCount) -> Self {
        Self { side, mines }
    }

    /// Validated constructor, the board must leave room for an all-clear starting neighbourhood.
    pub fn new(side: Coord, mines: CellCount) -> Result<Self> {
        if mines == 0 {
            return Err(GameError::NoMines);
        }
        if mines.saturating_add(START_ZONE_CELLS) > mult(side, side) {
            return Err(GameError::TooManyMines);
        }
        Ok(Self { side, mines })
    }

    /// Mine count derived as `floor(density * side²)`, never below one.
    pub fn with_density(side: Coord, density: f32) -> Result<Self> {
        let total = f32::from(mult(side, side));
        let mines = (density.clamp(0.0, 1.0) * total) as CellCount;
        Self::new(side, mines.max(1))
    }

    pub const fn side(&self) -> Coord {
        self.side
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn size(&self) -> Coord2 {
        (self.side, self.side)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.side, self.side)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.side && coords.1 < self.side {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        // floor(0.15 * 13 * 13)
        Self {
            side: DEFAULT_SIDE,
            mines: 25,
        }
    }
}
