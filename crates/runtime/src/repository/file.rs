//! File-based SnapshotRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::traits::validate_slot;
use super::{RepositoryError, Result, SnapshotRepository};

const EXTENSION: &str = "btl";

/// Stores each slot as `{slot}.btl` in one directory.
///
/// Writes go to `{slot}.btl.tmp` first and are renamed into place, so a
/// crash mid-write never leaves a truncated snapshot behind.
pub struct FileSnapshotRepository {
    base_dir: PathBuf,
}

impl FileSnapshotRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf> {
        validate_slot(slot)?;
        Ok(self.base_dir.join(format!("{slot}.{EXTENSION}")))
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn save(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        let path = self.slot_path(slot)?;
        let temp_path = path.with_extension(format!("{EXTENSION}.tmp"));

        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!(slot, bytes = bytes.len(), "saved snapshot to {}", path.display());
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        let path = self.slot_path(slot)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        tracing::debug!(slot, bytes = bytes.len(), "loaded snapshot from {}", path.display());
        Ok(Some(bytes))
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let path = self.slot_path(slot)?;
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!(slot, "deleted snapshot");
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_slot(stem).is_ok()
            {
                slots.push(stem.to_owned());
            }
        }
        slots.sort_unstable();
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{DeserializationError, Position, StateBuilder};
    use tempfile::TempDir;

    #[test]
    fn state_survives_a_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();
        let state = StateBuilder::open(9, 7)
            .enemy_at(1, Position::new(5, 3))
            .seed(3)
            .build();

        repo.save_state("camp-1", &state).unwrap();
        assert!(repo.exists("camp-1"));
        assert!(!dir.path().join("camp-1.btl.tmp").exists());
        assert_eq!(repo.load_state("camp-1").unwrap(), Some(state));
        assert_eq!(repo.list().unwrap(), vec!["camp-1".to_owned()]);

        repo.delete("camp-1").unwrap();
        assert_eq!(repo.load_state("camp-1").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();
        fs::write(dir.path().join("broken.btl"), b"BTLS\x01\x00garbage").unwrap();

        let err = repo.load_state("broken").unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Corrupted(DeserializationError::TooShort(_))
        ));
    }

    #[test]
    fn slot_names_cannot_escape_the_directory() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();
        assert!(matches!(
            repo.save("../outside", b"x"),
            Err(RepositoryError::InvalidSlot(_))
        ));
    }
}
