use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a revealed clue shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClueReading {
    /// Number hidden by a shroud.
    Concealed,
    Total(u8),
    Split { hazards: u8, currency: u8 },
}

/// A cell as seen from outside: hidden kinds never leak.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewCell {
    Hidden(Option<MarkKind>),
    Hole,
    Clue(ClueReading),
    /// A revealed non-clue cell.
    Open(CellKind),
}

impl ViewCell {
    fn from_cell(cell: &Cell) -> Self {
        if cell.is_hidden() {
            return Self::Hidden(cell.mark);
        }
        if cell.is_hole() {
            return Self::Hole;
        }
        if cell.kind != CellKind::Clue {
            return Self::Open(cell.kind);
        }
        let reading = match cell.visible_counts() {
            None => ClueReading::Concealed,
            Some(counts) if cell.flags.contains(CellFlags::SPLIT_COUNTS) => ClueReading::Split {
                hazards: counts.hazards,
                currency: counts.currency,
            },
            Some(counts) => ClueReading::Total(counts.total),
        };
        Self::Clue(reading)
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden(_))
    }
}

/// Read-only observation of a board handed to decision policies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    cells: Array2<ViewCell>,
}

impl BoardView {
    pub fn from_board(board: &Board) -> Self {
        let (rows, cols) = board.size();
        let cells = Array2::from_shape_fn((usize::from(rows), usize::from(cols)), |(row, col)| {
            // shape comes from the board, both indices fit in `Coord`
            let coords = (row as Coord, col as Coord);
            ViewCell::from_cell(&board[coords])
        });
        Self { cells }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (
            Coord::try_from(rows).unwrap_or(Coord::MAX),
            Coord::try_from(cols).unwrap_or(Coord::MAX),
        )
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<ViewCell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    pub fn hidden_cells(&self) -> Vec<Coord2> {
        self.iter_coords()
            .filter(|&coords| self.cells[coords.to_nd_index()].is_hidden())
            .collect()
    }

    pub fn is_hidden(&self, coords: Coord2) -> bool {
        self.cell_at(coords).is_some_and(ViewCell::is_hidden)
    }
}
