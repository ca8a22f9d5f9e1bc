//! Battle snapshots for suspend and resume.
//!
//! Binary layout:
//!
//! ```text
//! +-------+---------+-----------------+------------------+
//! | magic | version | sha256(payload) | bincode payload  |
//! | 4 B   | u16 LE  | 32 B            | ...              |
//! +-------+---------+-----------------+------------------+
//! ```
//!
//! Decoding verifies the envelope, then the structural invariants of the
//! decoded state. A snapshot that fails either check is rejected as a whole.

use sha2::{Digest, Sha256};

use crate::error::{BattleError, ErrorSeverity};
use crate::state::{BattleState, InvariantViolation};

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"BTLS";
pub const SNAPSHOT_VERSION: u16 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 2 + 32;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to encode battle state: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("failed to encode battle state as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl BattleError for EncodeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Bincode(_) => "SNAPSHOT_ENCODE_BINARY",
            Self::Json(_) => "SNAPSHOT_ENCODE_JSON",
        }
    }
}

/// A saved battle that cannot be restored.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeserializationError {
    #[error("snapshot is {0} bytes, shorter than its header")]
    TooShort(usize),

    #[error("snapshot magic mismatch")]
    BadMagic,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u16),

    #[error("snapshot checksum mismatch")]
    ChecksumMismatch,

    #[error("malformed snapshot payload: {0}")]
    Malformed(String),

    #[error("malformed snapshot JSON: {0}")]
    Json(String),

    #[error("snapshot violates battle invariants: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl BattleError for DeserializationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TooShort(_) => "SNAPSHOT_TOO_SHORT",
            Self::BadMagic => "SNAPSHOT_BAD_MAGIC",
            Self::UnsupportedVersion(_) => "SNAPSHOT_UNSUPPORTED_VERSION",
            Self::ChecksumMismatch => "SNAPSHOT_CHECKSUM_MISMATCH",
            Self::Malformed(_) => "SNAPSHOT_MALFORMED",
            Self::Json(_) => "SNAPSHOT_MALFORMED_JSON",
            Self::Invariant(inner) => inner.error_code(),
        }
    }
}

fn checksum(payload: &[u8]) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(payload));
    digest
}

/// Serializes `state` into the binary envelope.
pub fn encode_snapshot(state: &BattleState) -> Result<Vec<u8>, EncodeError> {
    let payload = bincode::serialize(state)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&SNAPSHOT_MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&checksum(&payload));
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Restores a state written by [`encode_snapshot`].
pub fn decode_snapshot(bytes: &[u8]) -> Result<BattleState, DeserializationError> {
    if bytes.len() < HEADER_LEN {
        return Err(DeserializationError::TooShort(bytes.len()));
    }
    let (magic, rest) = bytes.split_at(SNAPSHOT_MAGIC.len());
    if magic != SNAPSHOT_MAGIC {
        return Err(DeserializationError::BadMagic);
    }
    let (version, rest) = rest.split_at(2);
    let version = u16::from_le_bytes([version[0], version[1]]);
    if version != SNAPSHOT_VERSION {
        return Err(DeserializationError::UnsupportedVersion(version));
    }
    let (digest, payload) = rest.split_at(32);
    if digest != checksum(payload) {
        return Err(DeserializationError::ChecksumMismatch);
    }

    let state: BattleState = bincode::deserialize(payload)
        .map_err(|e| DeserializationError::Malformed(e.to_string()))?;
    state.validate()?;
    Ok(state)
}

/// Pretty JSON form, for inspection tools.
pub fn to_json(state: &BattleState) -> Result<String, EncodeError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parses and validates the JSON form.
pub fn from_json(json: &str) -> Result<BattleState, DeserializationError> {
    let state: BattleState =
        serde_json::from_str(json).map_err(|e| DeserializationError::Json(e.to_string()))?;
    state.validate()?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateBuilder;
    use crate::state::{EntityId, Position, StatusKind};

    fn sample() -> BattleState {
        let mut state = StateBuilder::open(9, 7)
            .enemy_at(1, Position::new(5, 3))
            .enemy_at(2, Position::new(6, 4))
            .seed(99)
            .build();
        state.player.statuses.apply(StatusKind::Poisoned, 2);
        state.enemies[0]
            .cooldowns
            .insert(crate::state::AbilityKind::PowerStrike, 2);
        state.rng.next_u32();
        state
    }

    #[test]
    fn restores_identical_state() {
        let state = sample();
        let bytes = encode_snapshot(&state).unwrap();
        assert_eq!(&bytes[..4], b"BTLS");
        assert_eq!(decode_snapshot(&bytes).unwrap(), state);

        let json = to_json(&state).unwrap();
        assert_eq!(from_json(&json).unwrap(), state);
    }

    #[test]
    fn rejects_corruption() {
        let bytes = encode_snapshot(&sample()).unwrap();

        assert_eq!(
            decode_snapshot(&bytes[..10]),
            Err(DeserializationError::TooShort(10))
        );

        let mut flipped = bytes.clone();
        let last = flipped.len() - 1;
        flipped[last] ^= 0xff;
        assert_eq!(
            decode_snapshot(&flipped),
            Err(DeserializationError::ChecksumMismatch)
        );

        let mut magic = bytes.clone();
        magic[0] = b'X';
        assert_eq!(decode_snapshot(&magic), Err(DeserializationError::BadMagic));

        let mut version = bytes;
        version[4] = 9;
        assert_eq!(
            decode_snapshot(&version),
            Err(DeserializationError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn rejects_dead_entity_in_turn_order() {
        let mut state = sample();
        state.enemies[0].stats.hp = 0;
        let bytes = encode_snapshot(&state).unwrap();
        let err = decode_snapshot(&bytes).unwrap_err();
        assert_eq!(
            err,
            DeserializationError::Invariant(InvariantViolation::DeadInTurnOrder(EntityId(1)))
        );
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
    }
}
