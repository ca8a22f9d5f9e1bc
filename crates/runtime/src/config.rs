//! Runtime configuration.
//!
//! Engine tuning lives in [`BattleConfig`]; this struct only carries what the
//! runtime itself needs plus environment overrides applied on top of the
//! tuning file.

use std::path::PathBuf;
use std::str::FromStr;

use battle_content::ConfigLoader;
use battle_core::{ArenaTheme, BattleConfig};

use crate::error::{Result, RuntimeError};

/// Environment variables read by [`RuntimeConfig::from_env`].
pub mod env {
    pub const BASE_SEED: &str = "BATTLE_BASE_SEED";
    pub const DETECTION_RADIUS: &str = "BATTLE_DETECTION_RADIUS";
    pub const MESSAGE_CAPACITY: &str = "BATTLE_MESSAGE_CAPACITY";
    pub const HAZARD_WEIGHT: &str = "BATTLE_HAZARD_WEIGHT";
    pub const CONFIG_PATH: &str = "BATTLE_CONFIG_PATH";
    pub const ARENA_THEME: &str = "BATTLE_ARENA_THEME";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Mixed with the battle counter and origin when a battle starts without
    /// an explicit seed.
    pub base_seed: u64,
    pub theme: ArenaTheme,
    pub message_capacity: usize,
    /// Overrides the tuning file's detection radius.
    pub detection_radius: Option<u32>,
    /// Overrides the tuning file's hazard penalty weight.
    pub hazard_penalty_weight: Option<i64>,
    /// TOML tuning file; built-in defaults when unset.
    pub battle_config_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_seed: 0,
            theme: ArenaTheme::default(),
            message_capacity: BattleConfig::DEFAULT_MESSAGE_CAPACITY,
            detection_radius: None,
            hazard_penalty_weight: None,
            battle_config_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Reads the process environment after loading `.env`, if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(seed) = parse(&lookup, env::BASE_SEED)? {
            config.base_seed = seed;
        }
        if let Some(capacity) = parse(&lookup, env::MESSAGE_CAPACITY)? {
            config.message_capacity = capacity;
        }
        if let Some(theme) = parse(&lookup, env::ARENA_THEME)? {
            config.theme = theme;
        }
        config.detection_radius = parse(&lookup, env::DETECTION_RADIUS)?;
        config.hazard_penalty_weight = parse(&lookup, env::HAZARD_WEIGHT)?;
        config.battle_config_path = lookup(env::CONFIG_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(config)
    }

    /// Engine tuning with this configuration's overrides applied.
    pub fn battle_config(&self) -> Result<BattleConfig> {
        let mut config = match &self.battle_config_path {
            Some(path) => {
                ConfigLoader::load(path).map_err(|e| RuntimeError::Config(format!("{e:#}")))?
            }
            None => BattleConfig::default(),
        };
        if let Some(radius) = self.detection_radius {
            config = config.with_detection_radius(radius);
        }
        if let Some(weight) = self.hazard_penalty_weight {
            config = config.with_hazard_penalty_weight(weight);
        }
        config.message_capacity = self.message_capacity;
        Ok(config)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| RuntimeError::Config(format!("{key}={raw:?}: {e}"))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.battle_config().unwrap(), BattleConfig::default());
    }

    #[test]
    fn overrides_apply_on_top_of_tuning() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            (env::BASE_SEED, "42"),
            (env::DETECTION_RADIUS, "6"),
            (env::HAZARD_WEIGHT, "20"),
            (env::ARENA_THEME, "volcano"),
        ]))
        .unwrap();
        assert_eq!(config.base_seed, 42);
        assert_eq!(config.theme, ArenaTheme::Volcano);

        let tuning = config.battle_config().unwrap();
        assert_eq!(tuning.detection_radius, 6);
        assert_eq!(tuning.hazard_penalty_weight, 20);
    }

    #[test]
    fn bad_values_are_reported() {
        let err = RuntimeConfig::from_lookup(lookup(&[(env::BASE_SEED, "lots")])).unwrap_err();
        assert!(err.to_string().contains("BATTLE_BASE_SEED"));
    }

    #[test]
    fn tuning_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "summon_cap = 1").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let config = RuntimeConfig::from_lookup(lookup(&[(env::CONFIG_PATH, path.as_str())])).unwrap();
        assert_eq!(config.battle_config().unwrap().summon_cap, 1);
    }
}
