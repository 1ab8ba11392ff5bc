use serde::{Deserialize, Serialize};

/// Run-wide tallies, only ever advanced from resolver output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub cells_revealed: u32,
    pub hazards_by_player: u32,
    pub hazards_by_opponent: u32,
    pub hazards_disarmed: u32,
    pub currency_collected: u32,
    pub traps_sprung: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
}
