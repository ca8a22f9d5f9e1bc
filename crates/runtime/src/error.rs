//! Unified error type surfaced by the runtime.
//!
//! Wraps rejected commands, arena compilation, snapshot decoding and
//! repository failures so callers can classify them through
//! [`BattleError::severity`] in one place.
use battle_core::{
    ArenaError, BattleError, CommandError, DeserializationError, EncodeError, ErrorSeverity,
    WorldId,
};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error(transparent)]
    Snapshot(#[from] DeserializationError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("world entity {0} is not registered")]
    UnknownWorldEntity(WorldId),

    #[error("a battle is already in progress")]
    BattleInProgress,

    #[error("battle cannot end with a pending outcome")]
    OutcomePending,

    #[error("no snapshot saved in slot {0:?}")]
    NoSnapshot(String),

    #[error("invalid runtime configuration: {0}")]
    Config(String),
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Command(inner) => inner.severity(),
            Self::Arena(inner) => inner.severity(),
            Self::Snapshot(inner) => inner.severity(),
            Self::Encode(inner) => inner.severity(),
            Self::Repository(RepositoryError::Corrupted(_)) => ErrorSeverity::Fatal,
            Self::Repository(_) => ErrorSeverity::Recoverable,
            Self::UnknownWorldEntity(_)
            | Self::BattleInProgress
            | Self::OutcomePending
            | Self::NoSnapshot(_) => ErrorSeverity::Validation,
            Self::Config(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Command(inner) => inner.error_code(),
            Self::Arena(inner) => inner.error_code(),
            Self::Snapshot(inner) => inner.error_code(),
            Self::Encode(inner) => inner.error_code(),
            Self::Repository(_) => "RUNTIME_REPOSITORY",
            Self::UnknownWorldEntity(_) => "RUNTIME_UNKNOWN_WORLD_ENTITY",
            Self::BattleInProgress => "RUNTIME_BATTLE_IN_PROGRESS",
            Self::OutcomePending => "RUNTIME_OUTCOME_PENDING",
            Self::NoSnapshot(_) => "RUNTIME_NO_SNAPSHOT",
            Self::Config(_) => "RUNTIME_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_the_wrapped_error() {
        let err = RuntimeError::from(CommandError::NotPlayerTurn);
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.error_code(), "COMMAND_NOT_PLAYER_TURN");

        let err = RuntimeError::from(DeserializationError::BadMagic);
        assert_eq!(err.severity(), ErrorSeverity::Fatal);

        let err = RuntimeError::UnknownWorldEntity(WorldId(7));
        assert_eq!(err.to_string(), "world entity w7 is not registered");
    }
}
