//! Repository contract for suspended battles.

use battle_core::{BattleState, decode_snapshot, encode_snapshot};

use super::{RepositoryError, Result};

/// Storage for encoded battle snapshots, keyed by slot name.
///
/// Implementations only move bytes; encoding and validation happen in the
/// provided `save_state` / `load_state` methods so every backend rejects
/// corrupt saves the same way.
pub trait SnapshotRepository: Send + Sync {
    /// Stores `bytes` under `slot`, replacing any previous snapshot.
    fn save(&self, slot: &str, bytes: &[u8]) -> Result<()>;

    fn load(&self, slot: &str) -> Result<Option<Vec<u8>>>;

    fn delete(&self, slot: &str) -> Result<()>;

    /// Slot names in ascending order.
    fn list(&self) -> Result<Vec<String>>;

    fn exists(&self, slot: &str) -> bool {
        matches!(self.load(slot), Ok(Some(_)))
    }

    fn save_state(&self, slot: &str, state: &BattleState) -> Result<()> {
        let bytes =
            encode_snapshot(state).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.save(slot, &bytes)
    }

    /// Loads and validates a snapshot. Corrupt data is an error, never
    /// repaired.
    fn load_state(&self, slot: &str) -> Result<Option<BattleState>> {
        match self.load(slot)? {
            Some(bytes) => Ok(Some(decode_snapshot(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// Slot names become file names, so only a conservative alphabet is allowed.
pub(crate) fn validate_slot(slot: &str) -> Result<()> {
    let valid = !slot.is_empty()
        && slot.len() <= 64
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidSlot(slot.to_owned()))
    }
}
