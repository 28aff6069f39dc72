//! Top-level game configuration.
//!
//! Wraps the mechanics tuning from `racket-sim` together with the
//! session-level knobs: how many businesses a player may run at once and
//! what a brand-new player starts with. Everything deserializes with
//! per-field defaults, so an empty file is a valid (default) config and
//! a partial one overrides only what it names.

use std::path::Path;

use serde::Deserialize;

use racket_sim::MechanicsConfig;

/// Errors raised while loading the game configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse the config YAML.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },
}

/// What a brand-new player is seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StartingState {
    /// Starting cash.
    pub cash: u64,
    /// Starting premium currency.
    pub premium: u64,
    /// Starting energy.
    pub energy: u32,
    /// Starting soldiers in reserve.
    pub soldiers: u32,
}

impl Default for StartingState {
    fn default() -> Self {
        Self {
            cash: 500,
            premium: 10,
            energy: 100,
            soldiers: 10,
        }
    }
}

/// The full game configuration for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Mechanics tuning passed through to the simulation engines.
    pub mechanics: MechanicsConfig,
    /// How many businesses one player may operate at once.
    pub business_slots: BusinessSlots,
    /// What a brand-new player starts with.
    pub starting: StartingState,
}

/// The business slot limit, newtyped so the default is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct BusinessSlots(pub u32);

impl Default for BusinessSlots {
    fn default() -> Self {
        Self(5)
    }
}

impl GameConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(yaml)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let config = GameConfig::parse("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.business_slots.0, 5);
        assert_eq!(config.starting.cash, 500);
        assert_eq!(config.mechanics.energy.cap, 100);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = r"
business_slots: 8
mechanics:
  energy:
    regen_interval_secs: 15
starting:
  cash: 1000
";
        let config = GameConfig::parse(yaml).unwrap();
        assert_eq!(config.business_slots.0, 8);
        assert_eq!(config.mechanics.energy.regen_interval_secs, 15);
        assert_eq!(config.mechanics.energy.cap, 100);
        assert_eq!(config.starting.cash, 1000);
        assert_eq!(config.starting.premium, 10);
    }
}
