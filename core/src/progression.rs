use alloc::vec::Vec;
use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Floor {
    pub number: u32,
    pub levels: RangeInclusive<u32>,
}

pub static FLOORS: [Floor; 4] = [
    Floor {
        number: 1,
        levels: 1..=3,
    },
    Floor {
        number: 2,
        levels: 4..=6,
    },
    Floor {
        number: 3,
        levels: 7..=9,
    },
    Floor {
        number: 4,
        levels: 10..=12,
    },
];

pub fn floor_for_level(level: u32) -> Option<u32> {
    FLOORS
        .iter()
        .find(|floor| floor.levels.contains(&level))
        .map(|floor| floor.number)
}

pub fn levels_for_floor(number: u32) -> Option<RangeInclusive<u32>> {
    FLOORS
        .iter()
        .find(|floor| floor.number == number)
        .map(|floor| floor.levels.clone())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpponentProfile {
    pub hp: u32,
    pub armor: u32,
    pub charge: ChargeModel,
    /// Furies used in round-robin order.
    pub loadout: Vec<FuryId>,
}

impl OpponentProfile {
    pub fn spawn(&self) -> Opponent {
        Opponent::new(self.hp, self.armor, self.charge)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    pub params: BoardParameters,
    pub opponent: OpponentProfile,
}

struct LevelDef {
    size: Coord2,
    density: u8,
    ratio: &'static str,
    traps: CellCount,
    holes: bool,
    hp: u32,
    armor: u32,
    threshold: u32,
    loadout: &'static [u8],
}

impl LevelDef {
    fn config(&self, level: u32) -> LevelConfig {
        let mut params = BoardParameters::new(self.size, self.density, self.ratio, self.traps);
        if self.holes {
            params = params.with_pattern(IrregularPattern::Holes);
        }
        LevelConfig {
            level,
            params,
            opponent: OpponentProfile {
                hp: self.hp,
                armor: self.armor,
                charge: ChargeModel {
                    threshold: self.threshold,
                    ..ChargeModel::default()
                },
                loadout: self.loadout.iter().copied().map(FuryId).collect(),
            },
        }
    }
}

#[rustfmt::skip]
static LEVELS: [LevelDef; 12] = [
    LevelDef { size: (6, 6),   density: 12, ratio: "balanced",  traps: 0, holes: false, hp: 3,  armor: 0, threshold: 6, loadout: &[0] },
    LevelDef { size: (7, 7),   density: 13, ratio: "balanced",  traps: 1, holes: false, hp: 4,  armor: 0, threshold: 6, loadout: &[0, 6] },
    LevelDef { size: (8, 8),   density: 15, ratio: "balanced",  traps: 1, holes: false, hp: 5,  armor: 1, threshold: 5, loadout: &[0, 1] },
    LevelDef { size: (8, 8),   density: 15, ratio: "sparse",    traps: 2, holes: true,  hp: 6,  armor: 1, threshold: 5, loadout: &[3, 0, 7] },
    LevelDef { size: (9, 9),   density: 16, ratio: "balanced",  traps: 2, holes: false, hp: 7,  armor: 2, threshold: 5, loadout: &[4, 0, 6] },
    LevelDef { size: (9, 9),   density: 16, ratio: "lucrative", traps: 2, holes: true,  hp: 8,  armor: 2, threshold: 5, loadout: &[1, 2, 0] },
    LevelDef { size: (10, 10), density: 17, ratio: "balanced",  traps: 3, holes: false, hp: 9,  armor: 2, threshold: 5, loadout: &[5, 0, 3] },
    LevelDef { size: (10, 10), density: 17, ratio: "hazardous", traps: 3, holes: true,  hp: 10, armor: 3, threshold: 4, loadout: &[2, 7, 0] },
    LevelDef { size: (11, 11), density: 18, ratio: "balanced",  traps: 3, holes: false, hp: 11, armor: 3, threshold: 4, loadout: &[8, 4, 0] },
    LevelDef { size: (12, 12), density: 18, ratio: "hazardous", traps: 4, holes: true,  hp: 12, armor: 3, threshold: 4, loadout: &[9, 5, 0, 6] },
    LevelDef { size: (12, 12), density: 19, ratio: "balanced",  traps: 4, holes: false, hp: 14, armor: 4, threshold: 4, loadout: &[8, 2, 10] },
    LevelDef { size: (13, 13), density: 20, ratio: "hazardous", traps: 5, holes: true,  hp: 16, armor: 5, threshold: 3, loadout: &[9, 3, 8, 10] },
];

pub const LEVEL_COUNT: u32 = LEVELS.len() as u32;

/// Board and opponent for a 1-based level number.
pub fn level_config(level: u32) -> Result<LevelConfig> {
    level
        .checked_sub(1)
        .and_then(|index| LEVELS.get(usize::try_from(index).ok()?))
        .map(|def| def.config(level))
        .ok_or(GameError::UnknownLevel(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_partition_levels() {
        for level in 1..=LEVEL_COUNT {
            let floor = floor_for_level(level).unwrap();
            assert!(levels_for_floor(floor).unwrap().contains(&level));
        }
        assert_eq!(floor_for_level(0), None);
        assert_eq!(floor_for_level(13), None);
        assert_eq!(floor_for_level(5), Some(2));
        assert_eq!(levels_for_floor(4), Some(10..=12));
    }

    #[test]
    fn every_level_is_valid() {
        for level in 1..=LEVEL_COUNT {
            let config = level_config(level).unwrap();
            assert_eq!(config.level, level);
            config.params.validate().unwrap();
            assert!(!config.opponent.loadout.is_empty());
            for &id in &config.opponent.loadout {
                Fury::by_id(id).unwrap();
            }
        }
    }

    #[test]
    fn unknown_levels_are_errors() {
        assert_eq!(level_config(0), Err(GameError::UnknownLevel(0)));
        assert_eq!(level_config(13), Err(GameError::UnknownLevel(13)));
    }

    #[test]
    fn profile_spawns_opponent() {
        let config = level_config(3).unwrap();
        let opponent = config.opponent.spawn();

        assert_eq!(opponent.vitals.hp, 5);
        assert_eq!(opponent.armor(), 1);
        assert_eq!(opponent.charge_model.per_currency, 2);
        assert_eq!(config.params.rows, 8);
    }
}
