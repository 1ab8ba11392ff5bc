use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// How a hit was split between the absorbing layer and hit points.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub absorbed: u32,
    pub hp_lost: u32,
}

impl DamageReport {
    pub const fn total(self) -> u32 {
        self.absorbed + self.hp_lost
    }
}

/// Hit points behind an absorbing `guard`: shield for the player, armor for
/// the opponent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: u32,
    pub max_hp: u32,
    pub guard: u32,
}

impl Vitals {
    pub const fn new(max_hp: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            guard: 0,
        }
    }

    pub const fn with_guard(mut self, guard: u32) -> Self {
        self.guard = guard;
        self
    }

    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Guard absorbs first, the remainder comes off hp, which floors at 0.
    pub fn take_damage(&mut self, amount: u32) -> DamageReport {
        let absorbed = self.guard.min(amount);
        self.guard -= absorbed;
        let hp_lost = (amount - absorbed).min(self.hp);
        self.hp -= hp_lost;
        DamageReport { absorbed, hp_lost }
    }

    /// Returns the hp actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_hp - self.hp.min(self.max_hp));
        self.hp += restored;
        restored
    }
}

/// Timed debuffs an opponent's fury can leave on the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Hazard hits deal less damage.
    Blunt { reduction: u32 },
    /// Each hazard hit recoils onto the player.
    Thorns { damage: u32 },
    /// Clue numbers are hidden.
    Shroud,
    /// Cascades stop after `depth` steps.
    Mire { depth: u8 },
}

impl StatusEffect {
    fn same_family(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedStatus {
    pub effect: StatusEffect,
    pub clicks_remaining: u8,
}

pub type Statuses = SmallVec<[TimedStatus; 4]>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub vitals: Vitals,
    pub gold: u32,
    /// Consecutive hazards revealed by the player.
    pub hazard_streak: u32,
    /// Upcoming hazard hits that deal double damage.
    pub crit_charges: u32,
    /// Traps that can still be ignored this level.
    pub trap_wards: u32,
    pub statuses: Statuses,
}

impl Player {
    pub fn new(max_hp: u32) -> Self {
        Self {
            vitals: Vitals::new(max_hp),
            ..Default::default()
        }
    }

    /// Fresh player for a run, with run-wide echoes such as `Vitality` baked in.
    pub fn new_run(base_hp: u32, echoes: &ActiveEchoes) -> Self {
        let mut player = Self::new(base_hp + echoes.strength(EchoFamily::Vitality));
        player.begin_level(echoes);
        player
    }

    /// Refreshes per-level resources and drops anything level-scoped.
    pub fn begin_level(&mut self, echoes: &ActiveEchoes) {
        self.trap_wards = echoes.strength(EchoFamily::IronSoles);
        self.hazard_streak = 0;
        self.crit_charges = 0;
        self.statuses.clear();
    }

    pub fn is_alive(&self) -> bool {
        self.vitals.is_alive()
    }

    /// Applies `effect`, replacing any status of the same family.
    pub fn apply_status(&mut self, effect: StatusEffect, clicks: u8) {
        self.statuses.retain(|status| !status.effect.same_family(&effect));
        if clicks > 0 {
            self.statuses.push(TimedStatus {
                effect,
                clicks_remaining: clicks,
            });
        }
    }

    /// Counts every status down by one player action, returning those that ran out.
    pub fn tick_statuses(&mut self) -> SmallVec<[StatusEffect; 4]> {
        let mut expired = SmallVec::new();
        self.statuses.retain(|status| {
            status.clicks_remaining = status.clicks_remaining.saturating_sub(1);
            if status.clicks_remaining == 0 {
                expired.push(status.effect);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn blunt_reduction(&self) -> u32 {
        self.statuses
            .iter()
            .find_map(|status| match status.effect {
                StatusEffect::Blunt { reduction } => Some(reduction),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn thorns(&self) -> Option<u32> {
        self.statuses.iter().find_map(|status| match status.effect {
            StatusEffect::Thorns { damage } => Some(damage),
            _ => None,
        })
    }

    pub fn is_shrouded(&self) -> bool {
        self.statuses
            .iter()
            .any(|status| status.effect == StatusEffect::Shroud)
    }

    /// Maximum cascade depth, 0 when unbounded.
    pub fn cascade_budget(&self) -> u8 {
        self.statuses
            .iter()
            .find_map(|status| match status.effect {
                StatusEffect::Mire { depth } => Some(depth.max(1)),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn public(&self) -> PlayerPublic {
        PlayerPublic {
            hp: self.vitals.hp,
            max_hp: self.vitals.max_hp,
            shield: self.vitals.guard,
            gold: self.gold,
            hazard_streak: self.hazard_streak,
        }
    }
}

/// What an opponent is allowed to know about the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPublic {
    pub hp: u32,
    pub max_hp: u32,
    pub shield: u32,
    pub gold: u32,
    pub hazard_streak: u32,
}

/// How fast an opponent's fury meter fills.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeModel {
    pub threshold: u32,
    pub per_player_action: u32,
    pub per_currency: u32,
}

impl Default for ChargeModel {
    fn default() -> Self {
        Self {
            threshold: 5,
            per_player_action: 1,
            per_currency: 2,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Opponent {
    pub vitals: Vitals,
    pub charge: u32,
    pub charge_model: ChargeModel,
}

impl Opponent {
    pub fn new(max_hp: u32, armor: u32, charge_model: ChargeModel) -> Self {
        Self {
            vitals: Vitals::new(max_hp).with_guard(armor),
            charge: 0,
            charge_model,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.vitals.is_alive()
    }

    pub fn armor(&self) -> u32 {
        self.vitals.guard
    }

    pub fn add_charge(&mut self, amount: u32) {
        self.charge = self.charge.saturating_add(amount);
    }

    pub fn is_charged(&self) -> bool {
        self.charge_model.threshold > 0 && self.charge >= self.charge_model.threshold
    }

    pub fn reset_charge(&mut self) {
        self.charge = 0;
    }
}
