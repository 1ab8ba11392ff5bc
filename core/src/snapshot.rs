use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};

use crate::*;

/// Flat key-value capture of a run, for whoever persists or displays it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, i64>);

impl Snapshot {
    pub fn capture(player: &Player, opponent: &Opponent, stats: &RunStats) -> Self {
        let mut snapshot = Self::default();
        for (key, value) in [
            ("player.hp", player.vitals.hp),
            ("player.max_hp", player.vitals.max_hp),
            ("player.shield", player.vitals.guard),
            ("player.gold", player.gold),
            ("player.hazard_streak", player.hazard_streak),
            ("player.crit_charges", player.crit_charges),
            ("player.trap_wards", player.trap_wards),
            ("opponent.hp", opponent.vitals.hp),
            ("opponent.max_hp", opponent.vitals.max_hp),
            ("opponent.armor", opponent.vitals.guard),
            ("opponent.charge", opponent.charge),
            ("stats.cells_revealed", stats.cells_revealed),
            ("stats.hazards_by_player", stats.hazards_by_player),
            ("stats.hazards_by_opponent", stats.hazards_by_opponent),
            ("stats.hazards_disarmed", stats.hazards_disarmed),
            ("stats.currency_collected", stats.currency_collected),
            ("stats.traps_sprung", stats.traps_sprung),
            ("stats.damage_dealt", stats.damage_dealt),
            ("stats.damage_taken", stats.damage_taken),
        ] {
            snapshot.set(key, i64::from(value));
        }
        snapshot
    }

    pub fn of(encounter: &Encounter) -> Self {
        Self::capture(&encounter.player, &encounter.opponent, &encounter.stats)
    }

    pub fn set(&mut self, key: &str, value: i64) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(key, &value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_both_sides_and_stats() {
        let mut encounter = Encounter::new(
            Board::new((2, 2)),
            Player::new(10),
            Opponent::new(8, 2, ChargeModel::default()),
        );
        encounter.player.gold = 4;
        encounter.stats.cells_revealed = 3;

        let snapshot = Snapshot::of(&encounter);

        assert_eq!(snapshot.get("player.hp"), Some(10));
        assert_eq!(snapshot.get("player.gold"), Some(4));
        assert_eq!(snapshot.get("opponent.armor"), Some(2));
        assert_eq!(snapshot.get("stats.cells_revealed"), Some(3));
        assert_eq!(snapshot.get("missing"), None);
    }

    #[test]
    fn serializes_as_flat_map() {
        let mut snapshot = Snapshot::default();
        snapshot.set("run.level", 3);
        snapshot.set("player.hp", 7);

        let json = serde_json::to_string(&snapshot).unwrap();

        assert_eq!(json, r#"{"player.hp":7,"run.level":3}"#);
        assert_eq!(serde_json::from_str::<Snapshot>(&json).unwrap(), snapshot);
    }
}
