use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// What a cell holds underneath its cover.
///
/// `Empty` only exists between carving/placement and the first clue
/// recomputation, after which every non-item cell is a `Clue`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Empty,
    Clue,
    Currency,
    Hazard,
    Trap,
}

impl CellKind {
    /// Whether neighboring clues count this cell.
    pub const fn is_counted(self) -> bool {
        matches!(self, Self::Hazard | Self::Currency)
    }

    pub const fn is_clue_like(self) -> bool {
        matches!(self, Self::Empty | Self::Clue)
    }
}

/// Player annotation on a hidden cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkKind {
    Hazard,
    Currency,
    Unsure,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacentCounts {
    pub hazards: u8,
    pub currency: u8,
    pub total: u8,
}

impl AdjacentCounts {
    pub fn add(&mut self, kind: CellKind) {
        match kind {
            CellKind::Hazard => self.hazards += 1,
            CellKind::Currency => self.currency += 1,
            _ => return,
        }
        self.total += 1;
    }
}

bitflags! {
    /// Overlay and history bits that do not change what a cell is.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CellFlags: u8 {
        /// Carved out by an irregular pattern, never playable.
        const HOLE         = 1;
        /// Hazard neutralized during a cascade.
        const DISARMED     = 1 << 1;
        /// Clue shows hazards and currency separately.
        const SPLIT_COUNTS = 1 << 2;
        /// Clue number is hidden from view.
        const CLUE_HIDDEN  = 1 << 3;
    }
}

impl CellFlags {
    /// Bits recomputed from scratch on every overlay pass.
    pub const OVERLAYS: Self = Self::SPLIT_COUNTS.union(Self::CLUE_HIDDEN);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    pub revealed: bool,
    pub mark: Option<MarkKind>,
    pub counts: AdjacentCounts,
    pub flags: CellFlags,
}

impl Cell {
    pub const fn hidden(kind: CellKind) -> Self {
        Self {
            kind,
            revealed: false,
            mark: None,
            counts: AdjacentCounts {
                hazards: 0,
                currency: 0,
                total: 0,
            },
            flags: CellFlags::empty(),
        }
    }

    pub const fn is_hidden(&self) -> bool {
        !self.revealed
    }

    pub fn is_hole(&self) -> bool {
        self.flags.contains(CellFlags::HOLE)
    }

    /// Counts as shown to whoever looks at the board, `None` when not a
    /// revealed clue or when the number is hidden.
    pub fn visible_counts(&self) -> Option<AdjacentCounts> {
        let shown = self.revealed
            && self.kind == CellKind::Clue
            && !self.flags.intersects(CellFlags::HOLE | CellFlags::CLUE_HIDDEN);
        shown.then_some(self.counts)
    }
}
