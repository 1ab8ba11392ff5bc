use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FuryId(pub u8);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// What a fury does, each variant carrying its own payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuryEffect {
    /// Direct damage to the player.
    Strike { damage: u32 },
    /// Steal player gold.
    Drain { gold: u32 },
    /// Turn hidden clue cells into hazards.
    Seed { hazards: u8 },
    /// Hide clue numbers for a while.
    Shroud { clicks: u8 },
    /// Weaken the player's hazard hits.
    Blunt { reduction: u32, clicks: u8 },
    /// Make the player's hazard hits recoil.
    Thorns { damage: u32, clicks: u8 },
    /// Heal the opponent.
    Mend { hp: u32 },
    /// Grow opponent armor.
    Harden { armor: u32 },
    /// Switch off the player's strongest echo.
    Silence { clicks: u8 },
    /// Limit cascade depth.
    Mire { depth: u8, clicks: u8 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fury {
    pub id: FuryId,
    pub name: &'static str,
    pub rarity: Rarity,
    pub effect: FuryEffect,
}

impl Fury {
    pub fn by_id(id: FuryId) -> Result<&'static Self> {
        FURIES
            .get(usize::from(id.0))
            .filter(|fury| fury.id == id)
            .ok_or(GameError::UnknownFury(id))
    }
}

const fn fury(id: u8, name: &'static str, rarity: Rarity, effect: FuryEffect) -> Fury {
    Fury {
        id: FuryId(id),
        name,
        rarity,
        effect,
    }
}

/// Indexed by `FuryId`.
pub static FURIES: [Fury; 11] = [
    fury(0, "Cinder Lash", Rarity::Common, FuryEffect::Strike { damage: 2 }),
    fury(1, "Pickpocket", Rarity::Common, FuryEffect::Drain { gold: 3 }),
    fury(2, "Sow Ruin", Rarity::Rare, FuryEffect::Seed { hazards: 2 }),
    fury(3, "Veil", Rarity::Rare, FuryEffect::Shroud { clicks: 3 }),
    fury(
        4,
        "Dull Edge",
        Rarity::Rare,
        FuryEffect::Blunt {
            reduction: 1,
            clicks: 3,
        },
    ),
    fury(
        5,
        "Bramble Hide",
        Rarity::Epic,
        FuryEffect::Thorns {
            damage: 1,
            clicks: 3,
        },
    ),
    fury(6, "Second Wind", Rarity::Common, FuryEffect::Mend { hp: 3 }),
    fury(7, "Carapace", Rarity::Common, FuryEffect::Harden { armor: 2 }),
    fury(8, "Hush", Rarity::Epic, FuryEffect::Silence { clicks: 4 }),
    fury(
        9,
        "Quagmire",
        Rarity::Legendary,
        FuryEffect::Mire {
            depth: 1,
            clicks: 3,
        },
    ),
    fury(10, "Cataclysm", Rarity::Legendary, FuryEffect::Strike { damage: 5 }),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_catalog_positions() {
        for (index, fury) in FURIES.iter().enumerate() {
            assert_eq!(usize::from(fury.id.0), index);
        }
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(Fury::by_id(FuryId(3)).unwrap().name, "Veil");
        assert_eq!(
            Fury::by_id(FuryId(42)),
            Err(GameError::UnknownFury(FuryId(42)))
        );
    }
}
