//! Enemy roster loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::roster::{EnemyTemplate, Roster};

/// Roster shipped with the crate.
const DEFAULT_ROSTER: &str = include_str!("../../data/roster.ron");

/// Loader for the enemy roster from RON files.
///
/// RON format: `[EnemyTemplate, ...]`
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<Roster> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load roster {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Roster> {
        let templates: Vec<EnemyTemplate> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;
        Ok(Roster::new(templates)?)
    }

    /// The embedded default roster.
    pub fn builtin() -> LoadResult<Roster> {
        Self::parse(DEFAULT_ROSTER)
    }
}
