//! Content factory for loading everything from a data directory.

use std::path::PathBuf;

use battle_core::{BattleConfig, TemplatePool};

use crate::loaders::{ArenaLoader, ConfigLoader, LoadResult, RosterLoader};
use crate::roster::Roster;

/// Loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── roster.ron
/// └── arenas.ron
/// ```
///
/// Every file is optional: a missing file yields the built-in default.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
    }

    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    pub fn load_roster(&self) -> LoadResult<Roster> {
        let path = self.data_dir.join("roster.ron");
        if !path.exists() {
            return RosterLoader::builtin();
        }
        RosterLoader::load(&path)
    }

    pub fn load_arenas(&self) -> LoadResult<TemplatePool> {
        let path = self.data_dir.join("arenas.ron");
        if !path.exists() {
            return Ok(TemplatePool::builtin());
        }
        ArenaLoader::load_pool(&path)
    }
}
