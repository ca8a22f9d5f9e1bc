//! Arena template loader.

use std::path::Path;

use battle_core::{ArenaTemplate, TemplatePool};

use crate::loaders::{LoadResult, read_file};

/// Loader for extra arena templates from RON files.
///
/// RON format: `[ArenaTemplate, ...]`. Every template is compiled once while
/// loading so layout mistakes surface here rather than at battle start.
pub struct ArenaLoader;

impl ArenaLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ArenaTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load arenas {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Vec<ArenaTemplate>> {
        let templates: Vec<ArenaTemplate> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse arena RON: {}", e))?;
        for template in &templates {
            template.compile()?;
        }
        Ok(templates)
    }

    /// Built-in templates followed by the ones in `path`.
    pub fn load_pool(path: &Path) -> LoadResult<TemplatePool> {
        let mut pool = TemplatePool::builtin();
        for template in Self::load(path)? {
            pool.insert(template);
        }
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::ArenaTheme;

    #[test]
    fn shipped_arenas_compile() {
        let templates = ArenaLoader::parse(include_str!("../../data/arenas.ron")).unwrap();
        assert_eq!(templates.len(), 2);
        assert!(templates.iter().any(|t| t.is_boss && t.theme == ArenaTheme::Cavern));
    }

    #[test]
    fn ragged_layout_is_rejected() {
        let ron = r####"[(name: "broken", theme: crypt, is_boss: false, rows: ["###", "#P#"])]"####;
        let err = ArenaLoader::parse(ron).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
