use std::fs;
use std::path::Path;

use anyhow::Context;
use furysweep_session::SessionConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub session: SessionConfig,
    pub run: RunConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub start_level: u32,
    /// How many levels to attempt, stopping early on defeat.
    pub levels: u32,
    /// Echo keys installed before the first level, like `"combo-strike-1"`.
    pub echoes: Vec<String>,
    /// Upper bound on cycles per level so a stuck autopilot cannot spin.
    pub max_cycles: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_level: 1,
            levels: 3,
            echoes: Vec::new(),
            max_cycles: 1000,
        }
    }
}

impl SimConfig {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("Could not parse sim config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = SimConfig::parse(
            r#"
            [session]
            seed = 42
            decision_ceiling_ms = 200

            [run]
            echoes = ["combo-strike-1"]
            "#,
        )
        .unwrap();

        assert_eq!(config.session.seed, 42);
        assert_eq!(config.session.decision_ceiling_ms, 200);
        assert_eq!(config.session.player_resolve_ms, 400);
        assert_eq!(config.run.echoes, ["combo-strike-1"]);
        assert_eq!(config.run.start_level, 1);
        assert_eq!(config.run.levels, 3);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(SimConfig::parse("").unwrap(), SimConfig::default());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(SimConfig::parse("[run]\nlevels = \"many\"").is_err());
    }
}
