use alloc::vec::Vec;
use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Board-wide overlay switches derived from echoes and statuses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Overlays {
    pub split_counts: bool,
    pub hide_clues: bool,
}

impl Overlays {
    pub fn for_state(echoes: &ActiveEchoes, player: &Player) -> Self {
        Self {
            split_counts: echoes.get(EchoFamily::Clairvoyance).is_some(),
            hide_clues: player.is_shrouded(),
        }
    }
}

/// Rectangular grid of cells, dimensions fixed for its lifetime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    /// All-`Empty`, all-hidden board; clues are not computed yet.
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
        }
    }

    /// Builds a board from a textual layout, one line per row:
    /// `.` clue, `H` hazard, `$` currency, `T` trap, `o` hole.
    /// Clues are computed before returning.
    pub fn from_layout(layout: &str) -> Result<Self> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let cols = rows.first().map_or(0, |row| row.chars().count());
        let size = (
            Coord::try_from(rows.len()).map_err(|_| GameError::InvalidBoardShape)?,
            Coord::try_from(cols).map_err(|_| GameError::InvalidBoardShape)?,
        );
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidDimensions {
                rows: size.0.into(),
                cols: size.1.into(),
            });
        }

        let mut board = Self::new(size);
        for (line, row) in rows.iter().zip(0..) {
            if line.chars().count() != cols {
                return Err(GameError::InvalidBoardShape);
            }
            for (symbol, col) in line.chars().zip(0..) {
                let cell = &mut board[(row, col)];
                match symbol {
                    '.' => cell.kind = CellKind::Empty,
                    'H' => cell.kind = CellKind::Hazard,
                    '$' => cell.kind = CellKind::Currency,
                    'T' => cell.kind = CellKind::Trap,
                    'o' => {
                        cell.revealed = true;
                        cell.flags.insert(CellFlags::HOLE);
                    }
                    other => return Err(GameError::UnknownSymbol(other)),
                }
            }
        }
        board.recompute_clues();
        Ok(board)
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (
            Coord::try_from(rows).unwrap_or(Coord::MAX),
            Coord::try_from(cols).unwrap_or(Coord::MAX),
        )
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn contains(&self, (row, col): Coord2) -> bool {
        let (rows, cols) = self.size();
        row < rows && col < cols
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<&Cell> {
        self.contains(coords).then(|| &self[coords])
    }

    /// Row-major iteration over every coordinate.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    pub fn count_kind(&self, kind: CellKind) -> CellCount {
        let count = self.cells.iter().filter(|cell| cell.kind == kind).count();
        CellCount::try_from(count).unwrap_or(CellCount::MAX)
    }

    pub fn revealed_count(&self) -> CellCount {
        let count = self.cells.iter().filter(|cell| cell.revealed).count();
        CellCount::try_from(count).unwrap_or(CellCount::MAX)
    }

    pub fn hidden_cells(&self) -> Vec<Coord2> {
        self.iter_coords()
            .filter(|&coords| self[coords].is_hidden())
            .collect()
    }

    pub fn has_hidden_hazard(&self) -> bool {
        self.cells
            .iter()
            .any(|cell| cell.is_hidden() && cell.kind == CellKind::Hazard)
    }

    /// Tally of hazards and currency around `coords`.
    pub fn tally_neighbors(&self, coords: Coord2) -> AdjacentCounts {
        let mut counts = AdjacentCounts::default();
        for pos in self.iter_neighbors(coords) {
            counts.add(self[pos].kind);
        }
        counts
    }

    /// Turns every `Empty` into a `Clue` and refreshes all adjacency counts.
    ///
    /// This is the only place counts are written; every board mutation funnels
    /// through here.
    pub fn recompute_clues(&mut self) {
        let coords: Vec<Coord2> = self.iter_coords().collect();
        for &pos in &coords {
            if self[pos].kind == CellKind::Empty {
                self[pos].kind = CellKind::Clue;
            }
        }
        for pos in coords {
            let counts = if self[pos].kind.is_clue_like() {
                self.tally_neighbors(pos)
            } else {
                AdjacentCounts::default()
            };
            self[pos].counts = counts;
        }
    }

    /// Re-derives overlay flags on revealed clues.
    pub fn apply_overlays(&mut self, overlays: Overlays) {
        for cell in self.cells.iter_mut() {
            cell.flags.remove(CellFlags::OVERLAYS);
            if !cell.revealed || cell.kind != CellKind::Clue || cell.is_hole() {
                continue;
            }
            cell.flags.set(CellFlags::SPLIT_COUNTS, overlays.split_counts);
            cell.flags.set(CellFlags::CLUE_HIDDEN, overlays.hide_clues);
        }
    }

    /// Cycles a mark on a hidden cell: none -> `kind` -> none, or replaces a
    /// different mark with `kind`.
    pub fn toggle_mark(&mut self, coords: Coord2, kind: MarkKind) -> Result<MarkOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self[coords];
        if cell.revealed {
            return Ok(MarkOutcome::NoChange);
        }
        cell.mark = match cell.mark {
            Some(current) if current == kind => None,
            _ => Some(kind),
        };
        Ok(MarkOutcome::Changed)
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}
