use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    CellRevealed,
    HazardStruck,
    HazardDisarmed,
    CurrencyCollected,
    TrapSprung,
    TrapWarded,
    ThornsRecoil,
    PlayerStruck,
    OpponentTrapped,
    ChargeGained,
    StatusExpired,
    EchoRestored,
    FuryUnleashed,
    GoldDrained,
    HazardsSeeded,
    StatusApplied,
    EchoSilenced,
    OpponentHealed,
    ArmorGained,
    Considering,
    DecisionFallback,
    BoardReduced,
}

/// One entry of the ordered per-action event stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    pub text: String,
    pub target: Option<Coord2>,
}

impl GameEvent {
    pub fn new(kind: EventKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            target: None,
        }
    }

    pub fn at(mut self, coords: Coord2) -> Self {
        self.target = Some(coords);
        self
    }
}
