//! In-memory SnapshotRepository implementation for tests and simulations.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::traits::validate_slot;
use super::{RepositoryError, Result, SnapshotRepository};

#[derive(Default)]
pub struct InMemorySnapshotRepository {
    slots: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn save(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        validate_slot(slot)?;
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots.insert(slot.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slots.get(slot).cloned())
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots.remove(slot);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slots.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{DeserializationError, Position, StateBuilder};

    #[test]
    fn tampered_bytes_fail_checksum() {
        let repo = InMemorySnapshotRepository::new();
        let state = StateBuilder::open(9, 7)
            .enemy_at(1, Position::new(5, 3))
            .build();
        repo.save_state("slot", &state).unwrap();

        let mut bytes = repo.load("slot").unwrap().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x5a;
        repo.save("slot", &bytes).unwrap();

        assert!(matches!(
            repo.load_state("slot"),
            Err(RepositoryError::Corrupted(DeserializationError::ChecksumMismatch))
        ));
    }

    #[test]
    fn missing_slot_is_none() {
        let repo = InMemorySnapshotRepository::new();
        assert_eq!(repo.load_state("nothing").unwrap(), None);
        assert!(!repo.exists("nothing"));
        assert!(repo.list().unwrap().is_empty());
    }
}
