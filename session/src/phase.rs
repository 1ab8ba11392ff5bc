use furysweep_core::LevelOutcome;
use serde::{Deserialize, Serialize};

/// Valid transitions:
/// - PlayerTurn -> PlayerActionResolving
/// - PlayerActionResolving -> OpponentThinking
/// - OpponentThinking -> OpponentActionPendingReveal
/// - OpponentActionPendingReveal -> OpponentActionResolving
/// - OpponentActionResolving -> PlayerTurn
/// - PlayerActionResolving | OpponentActionResolving -> PreDefeatSequence
/// - PlayerActionResolving | OpponentActionResolving -> PreVictorySequence
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for player input
    #[default]
    PlayerTurn,
    PlayerActionResolving,
    /// Waiting on the decision policy
    OpponentThinking,
    OpponentActionPendingReveal,
    OpponentActionResolving,
    /// Level lost, waiting for the outcome handler
    PreDefeatSequence,
    /// Level won, waiting for the outcome handler
    PreVictorySequence,
}

impl TurnPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::PreDefeatSequence | Self::PreVictorySequence)
    }

    /// Regular successor in the turn cycle, `None` for terminal phases.
    pub const fn next(self) -> Option<Self> {
        use TurnPhase::*;
        match self {
            PlayerTurn => Some(PlayerActionResolving),
            PlayerActionResolving => Some(OpponentThinking),
            OpponentThinking => Some(OpponentActionPendingReveal),
            OpponentActionPendingReveal => Some(OpponentActionResolving),
            OpponentActionResolving => Some(PlayerTurn),
            PreDefeatSequence | PreVictorySequence => None,
        }
    }

    pub const fn terminal(outcome: LevelOutcome) -> Self {
        match outcome {
            LevelOutcome::Victory => Self::PreVictorySequence,
            LevelOutcome::Defeat => Self::PreDefeatSequence,
        }
    }
}
