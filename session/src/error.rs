use furysweep_core::{GameError, LevelOutcome};
use thiserror::Error;

use crate::TurnPhase;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("expected phase {expected:?}, but session is in {actual:?}")]
    WrongPhase {
        expected: TurnPhase,
        actual: TurnPhase,
    },

    #[error("level already ended in {0:?}")]
    LevelEnded(LevelOutcome),
}

pub type Result<T> = std::result::Result<T, SessionError>;
