//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`CommandError`, `ArenaError`, `InvariantViolation`,
//! `DeserializationError`) live next to the code that raises them. This module
//! only provides the shared classification used by callers to pick a recovery
//! strategy.
//!
//! Normal game conditions (misses, empty target lists, abilities on cooldown
//! for the AI) are never errors; they are ordinary outcomes.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can retry with the same or an alternative command.
    Recoverable,

    /// Invalid input; rejected without mutating state.
    Validation,

    /// Unexpected inconsistency in static data (templates, tables).
    Internal,

    /// Data cannot be trusted; the caller must discard it.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }
}

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - `error_code` returns a stable identifier for logs and tests
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
