#![cfg_attr(not(test), no_std)]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use echo::*;
pub use effect::*;
pub use entity::*;
pub use error::*;
pub use event::*;
pub use fury::*;
pub use generator::*;
pub use progression::*;
pub use reveal::*;
pub use snapshot::*;
pub use stats::*;
pub use types::*;
pub use view::*;

mod board;
mod cell;
mod echo;
mod effect;
mod entity;
mod error;
mod event;
mod fury;
mod generator;
mod progression;
mod reveal;
mod snapshot;
mod stats;
mod types;
mod view;

/// Everything a level's combat touches, moved through the resolvers by value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub board: Board,
    pub player: Player,
    pub opponent: Opponent,
    pub stats: RunStats,
}

impl Encounter {
    pub fn new(board: Board, player: Player, opponent: Opponent) -> Self {
        Self {
            board,
            player,
            opponent,
            stats: RunStats::default(),
        }
    }

    pub fn both_alive(&self) -> bool {
        self.player.is_alive() && self.opponent.is_alive()
    }

    /// Player death is checked first, so a double knockout is a defeat.
    pub fn outcome(&self) -> Option<LevelOutcome> {
        if !self.player.is_alive() {
            Some(LevelOutcome::Defeat)
        } else if !self.opponent.is_alive() {
            Some(LevelOutcome::Victory)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    Victory,
    Defeat,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}
