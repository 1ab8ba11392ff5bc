use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and seeding for a session. Every field has a default so partial
/// config files work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pause after the player's reveal settles.
    pub player_resolve_ms: u64,
    /// Pause between the opponent choosing a cell and revealing it.
    pub opponent_reveal_ms: u64,
    /// Pause after the opponent's action settles.
    pub opponent_resolve_ms: u64,
    /// Longest the opponent may think before a random fallback.
    pub decision_ceiling_ms: u64,
    /// How often a `Considering` hint is emitted while thinking.
    pub hint_interval_ms: u64,
    pub seed: u64,
    pub base_hp: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_resolve_ms: 400,
            opponent_reveal_ms: 300,
            opponent_resolve_ms: 400,
            decision_ceiling_ms: 1500,
            hint_interval_ms: 250,
            seed: 0,
            base_hp: 10,
        }
    }
}

impl SessionConfig {
    /// No pauses between phases, thinking still bounded by the ceiling.
    pub fn instant(self) -> Self {
        Self {
            player_resolve_ms: 0,
            opponent_reveal_ms: 0,
            opponent_resolve_ms: 0,
            ..self
        }
    }

    pub fn player_resolve(&self) -> Duration {
        Duration::from_millis(self.player_resolve_ms)
    }

    pub fn opponent_reveal(&self) -> Duration {
        Duration::from_millis(self.opponent_reveal_ms)
    }

    pub fn opponent_resolve(&self) -> Duration {
        Duration::from_millis(self.opponent_resolve_ms)
    }

    pub fn decision_ceiling(&self) -> Duration {
        Duration::from_millis(self.decision_ceiling_ms)
    }

    /// Never zero, intervals cannot tick at zero period.
    pub fn hint_interval(&self) -> Duration {
        Duration::from_millis(self.hint_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_keeps_thinking_bounds() {
        let config = SessionConfig {
            hint_interval_ms: 0,
            ..SessionConfig::default()
        }
        .instant();

        assert_eq!(config.player_resolve(), Duration::ZERO);
        assert_eq!(config.decision_ceiling(), Duration::from_millis(1500));
        assert_eq!(config.hint_interval(), Duration::from_millis(1));
    }
}
