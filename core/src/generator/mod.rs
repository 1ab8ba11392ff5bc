use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn generate(self, params: &BoardParameters) -> Result<Board>;
}

/// Shape tweaks applied before item placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrregularPattern {
    /// Carve a few revealed, unplayable cells into the grid.
    Holes,
}

/// Smallest side a battlefield reduction will shrink to.
pub const MIN_REDUCED_SIDE: Coord = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardParameters {
    pub rows: Coord,
    pub cols: Coord,
    pub density_percent: u8,
    pub ratio: String,
    pub trap_count: CellCount,
    #[serde(default)]
    pub pattern: Option<IrregularPattern>,
}

impl BoardParameters {
    pub fn new(size: Coord2, density_percent: u8, ratio: &str, trap_count: CellCount) -> Self {
        Self {
            rows: size.0,
            cols: size.1,
            density_percent,
            ratio: ratio.to_string(),
            trap_count,
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: IrregularPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    /// Fails fast on content bugs: bad dimensions, density or ratio key.
    pub fn validate(&self) -> Result<&'static ItemRatio> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::InvalidDimensions {
                rows: self.rows.into(),
                cols: self.cols.into(),
            });
        }
        if self.density_percent > 100 {
            return Err(GameError::InvalidDensity(self.density_percent));
        }
        ItemRatio::lookup(&self.ratio)
    }

    /// Item counts for `effective` placeable cells.
    ///
    /// Traps are reserved first and never shrink; when everything does not
    /// fit, hazards and currency shrink proportionally into the remaining room.
    pub fn plan(&self, ratio: &ItemRatio, effective: CellCount) -> ItemPlan {
        let total_items = u32::from(effective) * u32::from(self.density_percent) / 100;
        let (mut hazards, mut currency) = ratio.split(total_items);
        let traps = u32::from(self.trap_count);

        let room = u32::from(effective).saturating_sub(traps);
        let wanted = hazards + currency;
        if wanted > room {
            let fitted_hazards = hazards * room / wanted;
            currency = currency.min(room - fitted_hazards);
            hazards = fitted_hazards;
            log::warn!(
                "Board overcommitted, shrunk items to {} hazards and {} currency around {} traps",
                hazards,
                currency,
                traps
            );
        }

        ItemPlan {
            hazards: clamp_count(hazards),
            currency: clamp_count(currency),
            traps: self.trap_count,
        }
    }

    /// One row and one column smaller, `None` once both sides hit the floor.
    pub fn reduced(&self) -> Option<Self> {
        if self.rows <= MIN_REDUCED_SIDE && self.cols <= MIN_REDUCED_SIDE {
            return None;
        }
        Some(Self {
            rows: self.rows.saturating_sub(1).max(MIN_REDUCED_SIDE.min(self.rows)),
            cols: self.cols.saturating_sub(1).max(MIN_REDUCED_SIDE.min(self.cols)),
            ..self.clone()
        })
    }
}

fn clamp_count(value: u32) -> CellCount {
    CellCount::try_from(value).unwrap_or(CellCount::MAX)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ItemPlan {
    pub hazards: CellCount,
    pub currency: CellCount,
    pub traps: CellCount,
}

/// Named hazard:currency weighting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ItemRatio {
    pub key: &'static str,
    pub hazard_weight: u32,
    pub currency_weight: u32,
}

pub static ITEM_RATIOS: [ItemRatio; 4] = [
    ItemRatio {
        key: "balanced",
        hazard_weight: 7,
        currency_weight: 2,
    },
    ItemRatio {
        key: "hazardous",
        hazard_weight: 4,
        currency_weight: 1,
    },
    ItemRatio {
        key: "lucrative",
        hazard_weight: 1,
        currency_weight: 1,
    },
    ItemRatio {
        key: "sparse",
        hazard_weight: 1,
        currency_weight: 2,
    },
];

impl ItemRatio {
    pub fn lookup(key: &str) -> Result<&'static Self> {
        ITEM_RATIOS
            .iter()
            .find(|ratio| ratio.key == key)
            .ok_or_else(|| GameError::UnknownRatio(key.to_string()))
    }

    /// Floor-rounded `(hazards, currency)` share of `total_items`.
    pub fn split(&self, total_items: u32) -> (u32, u32) {
        let weights = self.hazard_weight + self.currency_weight;
        if weights == 0 {
            return (0, 0);
        }
        (
            total_items * self.hazard_weight / weights,
            total_items * self.currency_weight / weights,
        )
    }
}
