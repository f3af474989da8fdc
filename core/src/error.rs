use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("A minefield needs at least one mine")]
    NoMines,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Cell is already revealed")]
    AlreadyRevealed,
    #[error("Cell is flagged")]
    Flagged,
}

pub type Result<T> = core::result::Result<T, GameError>;
