use alloc::collections::BTreeMap;
use alloc::string::ToString;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Base effect an echo belongs to; at most one echo per family is installed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EchoFamily {
    /// Flat bonus hazard damage while on a streak.
    ComboStrike,
    /// Higher-tier streak bonus, overrides `ComboStrike`.
    ChainReaction,
    /// Percent chance to double collected currency.
    GoldenTouch,
    /// Percent chance to neutralize hazards touched by a cascade.
    Defuser,
    /// Traps ignored per level.
    IronSoles,
    /// Percent mitigation of fury damage.
    Bulwark,
    /// Crit charges gained when a trap springs.
    Adrenaline,
    /// Clues show the hazard/currency split.
    Clairvoyance,
    /// Extra max hp for the run.
    Vitality,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EchoId(pub u16);

/// An installed passive modifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub id: EchoId,
    pub family: EchoFamily,
    pub level: u8,
    pub value: u32,
    /// Effectiveness in percent, raised by installing duplicates.
    pub multiplier: u32,
}

impl Echo {
    pub fn from_key(key: &str) -> Result<Self> {
        ECHOES
            .iter()
            .find(|def| def.key == key)
            .map(EchoDef::instantiate)
            .ok_or_else(|| GameError::UnknownEcho(key.to_string()))
    }

    pub fn def(&self) -> Option<&'static EchoDef> {
        ECHOES.iter().find(|def| def.id == self.id)
    }

    /// `value × multiplier`, the number every consumer reads.
    pub fn strength(&self) -> u32 {
        self.value.saturating_mul(self.multiplier) / 100
    }
}

/// Static catalog entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EchoDef {
    pub id: EchoId,
    pub key: &'static str,
    pub name: &'static str,
    pub family: EchoFamily,
    pub level: u8,
    pub value: u32,
}

impl EchoDef {
    pub fn instantiate(&self) -> Echo {
        Echo {
            id: self.id,
            family: self.family,
            level: self.level,
            value: self.value,
            multiplier: 100,
        }
    }
}

const fn def(
    id: u16,
    key: &'static str,
    name: &'static str,
    family: EchoFamily,
    level: u8,
    value: u32,
) -> EchoDef {
    EchoDef {
        id: EchoId(id),
        key,
        name,
        family,
        level,
        value,
    }
}

pub static ECHOES: [EchoDef; 16] = [
    def(0, "combo-strike-1", "Combo Strike", EchoFamily::ComboStrike, 1, 1),
    def(1, "combo-strike-2", "Combo Strike II", EchoFamily::ComboStrike, 2, 2),
    def(2, "chain-reaction-1", "Chain Reaction", EchoFamily::ChainReaction, 1, 3),
    def(3, "chain-reaction-2", "Chain Reaction II", EchoFamily::ChainReaction, 2, 4),
    def(4, "golden-touch-1", "Golden Touch", EchoFamily::GoldenTouch, 1, 25),
    def(5, "golden-touch-2", "Golden Touch II", EchoFamily::GoldenTouch, 2, 50),
    def(6, "defuser-1", "Defuser", EchoFamily::Defuser, 1, 20),
    def(7, "defuser-2", "Defuser II", EchoFamily::Defuser, 2, 40),
    def(8, "iron-soles-1", "Iron Soles", EchoFamily::IronSoles, 1, 1),
    def(9, "bulwark-1", "Bulwark", EchoFamily::Bulwark, 1, 25),
    def(10, "bulwark-2", "Bulwark II", EchoFamily::Bulwark, 2, 50),
    def(11, "adrenaline-1", "Adrenaline", EchoFamily::Adrenaline, 1, 1),
    def(12, "clairvoyance-1", "Clairvoyance", EchoFamily::Clairvoyance, 1, 0),
    def(13, "vitality-1", "Vitality", EchoFamily::Vitality, 1, 3),
    def(14, "vitality-2", "Vitality II", EchoFamily::Vitality, 2, 6),
    def(15, "iron-soles-2", "Iron Soles II", EchoFamily::IronSoles, 2, 2),
];

/// Multiplier bonus for installing an echo that is already installed.
pub const DUPLICATE_BONUS: u32 = 50;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Upgraded,
    Stacked,
    Ignored,
}

/// The echoes in effect for a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEchoes {
    installed: BTreeMap<EchoFamily, Echo>,
    suppressed: BTreeMap<EchoId, u8>,
}

impl ActiveEchoes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut echoes = Self::new();
        for key in keys {
            echoes.install(Echo::from_key(key)?);
        }
        Ok(echoes)
    }

    /// A duplicate raises the installed multiplier, a higher level replaces,
    /// an equal level replaces (newest wins), a lower level is ignored.
    pub fn install(&mut self, echo: Echo) -> InstallOutcome {
        use InstallOutcome::*;

        let Some(current) = self.installed.get_mut(&echo.family) else {
            self.installed.insert(echo.family, echo);
            return Installed;
        };

        if current.id == echo.id {
            current.multiplier += DUPLICATE_BONUS;
            Stacked
        } else if echo.level >= current.level {
            self.suppressed.remove(&current.id);
            *current = echo;
            Upgraded
        } else {
            Ignored
        }
    }

    pub fn remove(&mut self, family: EchoFamily) -> Option<Echo> {
        let removed = self.installed.remove(&family)?;
        self.suppressed.remove(&removed.id);
        Some(removed)
    }

    /// Installed and not suppressed.
    pub fn get(&self, family: EchoFamily) -> Option<&Echo> {
        self.installed
            .get(&family)
            .filter(|echo| !self.suppressed.contains_key(&echo.id))
    }

    pub fn strength(&self, family: EchoFamily) -> u32 {
        self.get(family).map_or(0, Echo::strength)
    }

    pub fn installed(&self) -> impl Iterator<Item = &Echo> {
        self.installed.values()
    }

    pub fn is_suppressed(&self, id: EchoId) -> bool {
        self.suppressed.contains_key(&id)
    }

    /// Highest-level active echo, the natural target for silencing.
    pub fn strongest(&self) -> Option<&Echo> {
        self.installed
            .values()
            .filter(|echo| !self.suppressed.contains_key(&echo.id))
            .max_by_key(|echo| (echo.level, echo.strength()))
    }

    pub fn suppress(&mut self, id: EchoId, clicks: u8) {
        if clicks == 0 || !self.installed.values().any(|echo| echo.id == id) {
            return;
        }
        let remaining = self.suppressed.entry(id).or_insert(0);
        *remaining = (*remaining).max(clicks);
    }

    /// Counts suppressions down by one player action, returning the echoes
    /// that came back.
    pub fn tick(&mut self) -> Vec<EchoId> {
        let mut restored = Vec::new();
        self.suppressed.retain(|&id, remaining| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                restored.push(id);
                false
            } else {
                true
            }
        });
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(key: &str) -> Echo {
        Echo::from_key(key).unwrap()
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (index, def) in ECHOES.iter().enumerate() {
            assert!(ECHOES[index + 1..].iter().all(|other| other.id != def.id));
            assert!(ECHOES[index + 1..].iter().all(|other| other.key != def.key));
        }
    }

    #[test]
    fn duplicate_stacks_multiplier() {
        let mut echoes = ActiveEchoes::new();
        assert_eq!(echoes.install(echo("golden-touch-1")), InstallOutcome::Installed);
        assert_eq!(echoes.install(echo("golden-touch-1")), InstallOutcome::Stacked);

        let installed = echoes.get(EchoFamily::GoldenTouch).unwrap();
        assert_eq!(installed.multiplier, 150);
        assert_eq!(installed.strength(), 37);
    }

    #[test]
    fn highest_level_per_family_wins() {
        let mut echoes = ActiveEchoes::new();
        echoes.install(echo("bulwark-2"));

        assert_eq!(echoes.install(echo("bulwark-1")), InstallOutcome::Ignored);
        assert_eq!(echoes.strength(EchoFamily::Bulwark), 50);

        echoes.install(echo("combo-strike-1"));
        assert_eq!(echoes.install(echo("combo-strike-2")), InstallOutcome::Upgraded);
        assert_eq!(echoes.strength(EchoFamily::ComboStrike), 2);
        assert_eq!(echoes.installed().count(), 2);
    }

    #[test]
    fn suppression_hides_without_removing() {
        let mut echoes = ActiveEchoes::from_keys(["defuser-2", "vitality-1"]).unwrap();
        let target = *echoes.strongest().unwrap();
        assert_eq!(target.family, EchoFamily::Defuser);

        echoes.suppress(target.id, 2);
        assert!(echoes.get(EchoFamily::Defuser).is_none());
        assert_eq!(echoes.installed().count(), 2);
        assert_eq!(echoes.strongest().unwrap().family, EchoFamily::Vitality);

        assert!(echoes.tick().is_empty());
        assert_eq!(echoes.tick(), vec![target.id]);
        assert!(echoes.get(EchoFamily::Defuser).is_some());
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert_eq!(
            Echo::from_key("lucky-socks"),
            Err(GameError::UnknownEcho("lucky-socks".into()))
        );
    }
}
