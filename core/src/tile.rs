use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CellFlags: u8 {
        const MINE      = 1;
        const FLAGGED   = 1 << 1;
        const REVEALED  = 1 << 2;
        /// Only ever set on the mine that ended a lost game.
        const DETONATED = 1 << 3;
    }
}

/// One square of the minefield: state flags plus the number of adjacent mines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) adjacent: u8,
    pub(crate) flags: CellFlags,
}

impl Cell {
    pub const fn adjacent_mines(self) -> u8 {
        self.adjacent
    }

    pub const fn flags(self) -> CellFlags {
        self.flags
    }

    pub const fn is_mine(self) -> bool {
        self.flags.contains(CellFlags::MINE)
    }

    pub const fn is_flagged(self) -> bool {
        self.flags.contains(CellFlags::FLAGGED)
    }

    pub const fn is_revealed(self) -> bool {
        self.flags.contains(CellFlags::REVEALED)
    }

    pub const fn is_detonated(self) -> bool {
        self.flags.contains(CellFlags::DETONATED)
    }

    /// What the player gets to see of this cell.
    pub const fn view(self) -> CellView {
        if !self.is_revealed() {
            if self.is_flagged() {
                CellView::Flagged
            } else {
                CellView::Hidden
            }
        } else if self.is_detonated() {
            CellView::Detonated
        } else if self.is_mine() {
            CellView::Mine
        } else {
            CellView::Revealed(self.adjacent)
        }
    }
}

/// Player-visible projection of a [`Cell`], what UI glue renders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    /// Mine uncovered when the game ended.
    Mine,
    /// The mine that was stepped on.
    Detonated,
}

impl CellView {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl Default for CellView {
    fn default() -> Self {
        Self::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(adjacent: u8, flags: CellFlags) -> Cell {
        Cell { adjacent, flags }
    }

    #[test]
    fn hidden_cells_hide_their_contents() {
        assert_eq!(cell(3, CellFlags::MINE).view(), CellView::Hidden);
        assert_eq!(
            cell(0, CellFlags::MINE | CellFlags::FLAGGED).view(),
            CellView::Flagged
        );
    }

    #[test]
    fn revealed_cells_show_mine_state() {
        assert_eq!(cell(2, CellFlags::REVEALED).view(), CellView::Revealed(2));
        assert_eq!(
            cell(1, CellFlags::REVEALED | CellFlags::MINE).view(),
            CellView::Mine
        );
        assert_eq!(
            cell(1, CellFlags::REVEALED | CellFlags::MINE | CellFlags::DETONATED).view(),
            CellView::Detonated
        );
    }

    #[test]
    fn default_cell_is_blank() {
        let blank = Cell::default();
        assert!(!blank.is_mine());
        assert!(!blank.is_revealed());
        assert_eq!(blank.adjacent_mines(), 0);
        assert!(blank.view().is_unrevealed());
    }
}
